//! Schema oracle interface
//!
//! The sample compiler never reads descriptors directly. Everything it needs
//! to know about the schema goes through [`SchemaOracle`].

use crate::{EnumRef, FieldShape, MessageRef};
use serde::{Deserialize, Serialize};

/// Target-language name of a message or enum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Import path of the package declaring the type
    pub import_path: String,
    /// Package alias used to qualify the type
    pub package: String,
    /// Type name inside the package (e.g. `Book_Kind`)
    pub name: String,
}

impl QualifiedName {
    /// `package.Name`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }
}

/// A unary RPC resolved against the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcMethod {
    /// Method name as declared (e.g. `GetBook`)
    pub name: String,
    pub input: MessageRef,
    pub output: MessageRef,
}

impl RpcMethod {
    /// Whether the method returns `google.protobuf.Empty`
    pub fn returns_empty(&self) -> bool {
        self.output.full_name == "google.protobuf.Empty"
    }
}

/// Descriptor/type-info service consumed by the sample compiler
pub trait SchemaOracle {
    /// Shape of `field` in `message`, or `None` if the message has no such field
    fn field_of(&self, message: &MessageRef, field: &str) -> Option<FieldShape>;

    /// Whether `value` names a member of the enum
    fn enum_has_value(&self, enum_ref: &EnumRef, value: &str) -> bool;

    /// Target-language name and import location of a message or enum
    fn qualified_name(&self, full_name: &str) -> Option<QualifiedName>;

    /// The message an enum is nested in, if any
    fn enclosing_message(&self, enum_ref: &EnumRef) -> Option<MessageRef>;

    /// Resolve `rpc` on the fully-qualified `service`
    fn method(&self, service: &str, rpc: &str) -> Option<RpcMethod>;
}
