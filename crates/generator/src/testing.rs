//! In-memory schema used by unit tests
//!
//! ```text
//! package t;  (Go: example.com/t/pb, alias pb)
//! message Req {
//!   A a; string b; bool flag; E e; Top top; repeated A items;
//!   repeated string tags; bytes data; string name = "shelves/{shelf}";
//!   enum E { FOO = 0; }
//! }
//! message A { int64 x; float y; }
//! message Resp { string title; repeated A items; map<string, A> m; int32 count; }
//! enum Top { BAR = 0; }
//! service Service { rpc Do(Req) returns (Resp); rpc Delete(Req) returns (google.protobuf.Empty); }
//! ```

use protosample_common::{
    EnumRef, FieldShape, MessageRef, NamePattern, QualifiedName, RpcMethod, ScalarKind,
    SchemaOracle,
};

pub struct FixtureOracle;

impl FixtureOracle {
    pub fn new() -> Self {
        FixtureOracle
    }

    pub fn request(&self) -> MessageRef {
        MessageRef::new("t.Req")
    }

    pub fn response(&self) -> MessageRef {
        MessageRef::new("t.Resp")
    }
}

fn a() -> FieldShape {
    FieldShape::message(MessageRef::new("t.A"))
}

impl SchemaOracle for FixtureOracle {
    fn field_of(&self, message: &MessageRef, field: &str) -> Option<FieldShape> {
        let shape = match (message.full_name.as_str(), field) {
            ("t.Req", "a") => a(),
            ("t.Req", "b") => FieldShape::scalar(ScalarKind::String),
            ("t.Req", "flag") => FieldShape::scalar(ScalarKind::Bool),
            ("t.Req", "e") => FieldShape::enumeration(EnumRef::new("t.Req.E")),
            ("t.Req", "top") => FieldShape::enumeration(EnumRef::new("t.Top")),
            ("t.Req", "items") | ("t.Resp", "items") => a().into_repeated(),
            ("t.Req", "tags") => FieldShape::scalar(ScalarKind::String).into_repeated(),
            ("t.Req", "data") => FieldShape::scalar(ScalarKind::Bytes),
            ("t.Req", "name") => FieldShape::scalar(ScalarKind::String)
                .with_name_pattern(NamePattern::parse("shelves/{shelf}").ok()?)
                .ok()?,
            ("t.A", "x") => FieldShape::scalar(ScalarKind::Int64),
            ("t.A", "y") => FieldShape::scalar(ScalarKind::Float),
            ("t.Resp", "title") => FieldShape::scalar(ScalarKind::String),
            ("t.Resp", "m") => FieldShape::map(ScalarKind::String, a()),
            ("t.Resp", "count") => FieldShape::scalar(ScalarKind::Int32),
            _ => return None,
        };
        Some(shape)
    }

    fn enum_has_value(&self, enum_ref: &EnumRef, value: &str) -> bool {
        matches!(
            (enum_ref.full_name.as_str(), value),
            ("t.Req.E", "FOO") | ("t.Top", "BAR")
        )
    }

    fn qualified_name(&self, full_name: &str) -> Option<QualifiedName> {
        let name = match full_name {
            "t.Req" => "Req",
            "t.A" => "A",
            "t.Resp" => "Resp",
            "t.Req.E" => "Req_E",
            "t.Top" => "Top",
            _ => return None,
        };
        Some(QualifiedName {
            import_path: "example.com/t/pb".to_string(),
            package: "pb".to_string(),
            name: name.to_string(),
        })
    }

    fn enclosing_message(&self, enum_ref: &EnumRef) -> Option<MessageRef> {
        (enum_ref.full_name == "t.Req.E").then(|| MessageRef::new("t.Req"))
    }

    fn method(&self, service: &str, rpc: &str) -> Option<RpcMethod> {
        let output = match (service, rpc) {
            ("t.Service", "Do") => "t.Resp",
            ("t.Service", "Delete") => "google.protobuf.Empty",
            _ => return None,
        };
        Some(RpcMethod {
            name: rpc.to_string(),
            input: MessageRef::new("t.Req"),
            output: MessageRef::new(output),
        })
    }
}
