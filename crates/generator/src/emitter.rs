//! Go composite-literal emission for request trees

use crate::golang;
use crate::value::{NodeContent, ValueNode, ValueTree};
use crate::writer::SourceWriter;
use protosample_common::naming::go_camel_case;
use protosample_common::{
    EnumRef, FieldShape, GeneratorError, PatternSegment, Result, SampleError, SchemaOracle,
    ShapeKind,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// An aliased import of a generated proto package
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GoImport {
    pub path: String,
    pub alias: String,
}

/// Serializes request trees and typed values to Go source
pub struct ValueEmitter<'a> {
    oracle: &'a dyn SchemaOracle,
    imports: BTreeSet<GoImport>,
    uses_fmt: bool,
}

impl<'a> ValueEmitter<'a> {
    pub fn new(oracle: &'a dyn SchemaOracle) -> Self {
        Self {
            oracle,
            imports: BTreeSet::new(),
            uses_fmt: false,
        }
    }

    /// Proto packages referenced so far
    pub fn imports(&self) -> &BTreeSet<GoImport> {
        &self.imports
    }

    /// Whether a resource name was formatted with `fmt.Sprintf`
    pub fn uses_fmt(&self) -> bool {
        self.uses_fmt
    }

    /// Write `var := &pkg.Request{...}` for the whole tree
    pub fn emit_request(
        &mut self,
        tree: &ValueTree,
        var: &str,
        writer: &mut SourceWriter,
    ) -> Result<()> {
        self.emit_node(tree.root(), &format!("{} := ", var), "", writer)
    }

    /// `pkg.Name` for a message or enum, recording its import
    pub fn qualify(&mut self, full_name: &str) -> Result<String> {
        let name = self.oracle.qualified_name(full_name).ok_or_else(|| {
            GeneratorError::Generation(format!("No Go name for type {}", full_name))
        })?;
        self.imports.insert(GoImport {
            path: name.import_path.clone(),
            alias: name.package.clone(),
        });
        Ok(name.qualified())
    }

    /// Go constant for an enum value
    ///
    /// A value of an enum nested in a message is prefixed with the message
    /// name only (`Book_HARDCOVER`), a top-level enum keeps its own name
    /// (`Format_PDF`).
    pub fn enum_value(&mut self, enum_ref: &EnumRef, value: &str) -> Result<String> {
        let scope = match self.oracle.enclosing_message(enum_ref) {
            Some(message) => self.qualify(&message.full_name)?,
            None => self.qualify(&enum_ref.full_name)?,
        };
        Ok(format!("{}_{}", scope, value))
    }

    /// Go type of a shape
    pub fn go_type(&mut self, shape: &FieldShape) -> Result<String> {
        let element = match &shape.kind {
            ShapeKind::Scalar { kind } => golang::scalar_type(*kind).to_string(),
            ShapeKind::Enum { enum_ref } => self.qualify(&enum_ref.full_name)?,
            ShapeKind::Message { message } => format!("*{}", self.qualify(&message.full_name)?),
            ShapeKind::Map { key, value } => format!(
                "map[{}]{}",
                golang::scalar_type(*key),
                self.go_type(value)?
            ),
        };

        Ok(if shape.repeated {
            format!("[]{}", element)
        } else {
            element
        })
    }

    /// Go expression for a validated literal of a terminal shape
    pub fn literal_expr(&mut self, shape: &FieldShape, literal: &str) -> Result<String> {
        match &shape.kind {
            ShapeKind::Enum { enum_ref } => self.enum_value(enum_ref, literal),
            _ => Ok(literal.to_string()),
        }
    }

    fn emit_node(
        &mut self,
        node: &ValueNode,
        prefix: &str,
        suffix: &str,
        writer: &mut SourceWriter,
    ) -> Result<()> {
        if let Some(comment) = &node.comment {
            for line in comment.lines() {
                writer.line(format!("// {}", line.trim()));
            }
        }

        match &node.content {
            NodeContent::Unset => {
                if let Some(message) = node.shape.as_message() {
                    let ty = self.qualify(&message.full_name)?;
                    writer.line(format!("{}&{}{{}}{}", prefix, ty, suffix));
                }
            }
            NodeContent::Leaf(leaf) => {
                let expr = match &leaf.parameter {
                    Some(parameter) => parameter.clone(),
                    None => self.literal_expr(&node.shape, &leaf.literal)?,
                };
                writer.line(format!("{}{}{}", prefix, expr, suffix));
            }
            NodeContent::FileRef(file) => {
                writer.line(format!("{}{}{}", prefix, file.variable, suffix));
            }
            NodeContent::Composite(children) => match &node.shape.name_pattern {
                Some(pattern) => {
                    let mut args = Vec::new();
                    for segment in &pattern.segments {
                        if let PatternSegment::Placeholder(name) = segment {
                            args.push(placeholder_arg(children, name, pattern)?);
                        }
                    }
                    self.uses_fmt = true;
                    writer.line(format!(
                        "{}fmt.Sprintf({}, {}){}",
                        prefix,
                        golang::quote(&pattern.format_string()),
                        args.join(", "),
                        suffix
                    ));
                }
                None => {
                    let message = node.shape.as_message().ok_or_else(|| {
                        GeneratorError::Generation(format!("Composite value for {}", node.shape))
                    })?;
                    let ty = self.qualify(&message.full_name)?;
                    writer.line(format!("{}&{}{{", prefix, ty));
                    for (name, child) in children {
                        let member = format!("{}: ", go_camel_case(name));
                        self.emit_node(child, &member, ",", writer)?;
                    }
                    writer.line(format!("}}{}", suffix));
                }
            },
            NodeContent::Elements(items) => {
                let ty = self.go_type(&node.shape)?;
                let contiguous = items.keys().copied().eq(0..items.len());
                writer.line(format!("{}{}{{", prefix, ty));
                for (index, item) in items {
                    let key = if contiguous {
                        String::new()
                    } else {
                        format!("{}: ", index)
                    };
                    self.emit_node(item, &key, ",", writer)?;
                }
                writer.line(format!("}}{}", suffix));
            }
        }

        Ok(())
    }
}

/// Argument filling one placeholder of a resource name
fn placeholder_arg(
    children: &[(String, ValueNode)],
    name: &str,
    pattern: &protosample_common::NamePattern,
) -> Result<String> {
    let child = children
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, child)| child);

    match child.map(|c| &c.content) {
        Some(NodeContent::Leaf(leaf)) => Ok(leaf
            .parameter
            .clone()
            .unwrap_or_else(|| leaf.literal.clone())),
        _ => Err(SampleError::IncompletePattern {
            path: pattern.to_string(),
            placeholder: name.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureOracle;
    use crate::value::{AssignOptions, Binding};
    use mockall::mock;
    use protosample_common::{MessageRef, QualifiedName, RpcMethod, ScalarKind};

    mock! {
        pub Oracle {}

        impl SchemaOracle for Oracle {
            fn field_of(&self, message: &MessageRef, field: &str) -> Option<FieldShape>;
            fn enum_has_value(&self, enum_ref: &EnumRef, value: &str) -> bool;
            fn qualified_name(&self, full_name: &str) -> Option<QualifiedName>;
            fn enclosing_message(&self, enum_ref: &EnumRef) -> Option<MessageRef>;
            fn method(&self, service: &str, rpc: &str) -> Option<RpcMethod>;
        }
    }

    fn go_name(name: &str) -> QualifiedName {
        QualifiedName {
            import_path: "example.com/library/apiv1/librarypb".to_string(),
            package: "librarypb".to_string(),
            name: name.to_string(),
        }
    }

    fn build(specs: &[&str]) -> String {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        for spec in specs {
            tree.assign(&oracle, spec, AssignOptions::default(), |_| {
                Ok(Binding::Literal)
            })
            .unwrap();
        }

        let mut writer = SourceWriter::new(0);
        let mut emitter = ValueEmitter::new(&oracle);
        emitter.emit_request(&tree, "req", &mut writer).unwrap();
        writer.finish()
    }

    #[test]
    fn test_request_build() {
        let out = build(&["a.x=42", "a.y=3.14159", "b=\"foobar\""]);
        assert_eq!(
            out,
            "req := &pb.Req{\n\tA: &pb.A{\n\t\tX: 42,\n\t\tY: 3.14159,\n\t},\n\tB: \"foobar\",\n}\n"
        );
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(build(&[]), "req := &pb.Req{}\n");
        assert_eq!(build(&["a"]), "req := &pb.Req{\n\tA: &pb.A{},\n}\n");
    }

    #[test]
    fn test_repeated_elements() {
        let out = build(&["tags[0]=\"x\"", "tags[1]=\"y\""]);
        assert!(out.contains("Tags: []string{\n\t\t\"x\",\n\t\t\"y\",\n\t},"));

        let out = build(&["items[2].x=1"]);
        assert!(out.contains("Items: []*pb.A{\n\t\t2: &pb.A{\n\t\t\tX: 1,\n\t\t},\n\t},"));
    }

    #[test]
    fn test_enum_and_bytes_leaves() {
        let out = build(&["e=FOO", "top=BAR", "data=\"raw\""]);
        assert!(out.contains("E: pb.Req_FOO,"));
        assert!(out.contains("Top: pb.Top_BAR,"));
        assert!(out.contains("Data: []byte(\"raw\"),"));
    }

    #[test]
    fn test_resource_name_pattern() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        tree.assign(&oracle, "name.shelf=\"s1\"", AssignOptions::default(), |_| {
            Ok(Binding::Literal)
        })
        .unwrap();

        let mut writer = SourceWriter::new(0);
        let mut emitter = ValueEmitter::new(&oracle);
        emitter.emit_request(&tree, "req", &mut writer).unwrap();
        assert!(emitter.uses_fmt());
        assert!(writer
            .finish()
            .contains("Name: fmt.Sprintf(\"shelves/%s\", \"s1\"),"));
    }

    #[test]
    fn test_parameters_and_comments() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        let options = AssignOptions {
            comment: Some("The title"),
            file_backed: false,
        };
        tree.assign(&oracle, "b=\"t\"", options, |_| {
            Ok(Binding::Parameter("title".to_string()))
        })
        .unwrap();

        let mut writer = SourceWriter::new(0);
        ValueEmitter::new(&oracle)
            .emit_request(&tree, "req", &mut writer)
            .unwrap();
        assert_eq!(
            writer.finish(),
            "req := &pb.Req{\n\t// The title\n\tB: title,\n}\n"
        );
    }

    #[test]
    fn test_nested_enum_drops_enum_type_name() {
        let mut oracle = MockOracle::new();
        oracle
            .expect_enclosing_message()
            .times(1)
            .returning(|_| Some(MessageRef::new("library.v1.Book")));
        oracle
            .expect_qualified_name()
            .withf(|name| name.to_string() == "library.v1.Book")
            .returning(|_| Some(go_name("Book")));

        let mut emitter = ValueEmitter::new(&oracle);
        let value = emitter
            .enum_value(&EnumRef::new("library.v1.Book.Kind"), "HARDCOVER")
            .unwrap();
        assert_eq!(value, "librarypb.Book_HARDCOVER");
        assert_eq!(emitter.imports().len(), 1);
    }

    #[test]
    fn test_top_level_enum_keeps_enum_type_name() {
        let mut oracle = MockOracle::new();
        oracle.expect_enclosing_message().returning(|_| None);
        oracle
            .expect_qualified_name()
            .withf(|name| name.to_string() == "library.v1.Format")
            .returning(|_| Some(go_name("Format")));

        let mut emitter = ValueEmitter::new(&oracle);
        let value = emitter
            .enum_value(&EnumRef::new("library.v1.Format"), "PDF")
            .unwrap();
        assert_eq!(value, "librarypb.Format_PDF");
    }

    #[test]
    fn test_go_types() {
        let mut oracle = MockOracle::new();
        oracle
            .expect_qualified_name()
            .returning(|name| Some(go_name(name.rsplit('.').next().unwrap_or(name))));

        let mut emitter = ValueEmitter::new(&oracle);
        let book = FieldShape::message(MessageRef::new("library.v1.Book"));
        assert_eq!(
            emitter.go_type(&book.clone().into_repeated()).unwrap(),
            "[]*librarypb.Book"
        );
        assert_eq!(
            emitter
                .go_type(&FieldShape::scalar(ScalarKind::Bytes).into_repeated())
                .unwrap(),
            "[][]byte"
        );
        assert_eq!(
            emitter
                .go_type(&FieldShape::map(ScalarKind::String, book))
                .unwrap(),
            "map[string]*librarypb.Book"
        );
    }

    #[test]
    fn test_unknown_type_is_generation_error() {
        let mut oracle = MockOracle::new();
        oracle.expect_qualified_name().returning(|_| None);

        let mut emitter = ValueEmitter::new(&oracle);
        assert!(matches!(
            emitter.qualify("nope.Missing"),
            Err(GeneratorError::Generation(_))
        ));
    }
}
