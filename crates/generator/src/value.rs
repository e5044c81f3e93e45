//! Request initialization tree
//!
//! Each request entry of a sample is an assignment such as `a.b[0].c=42`. The
//! path is checked step by step against the schema and the tree grows by
//! get-or-create, so `a.x=1` and `a.y=2` end up as two children of the same
//! `a` node, in the order they were first seen.
//!
//! The schema may be cyclic; descent is bounded by the length of the path.

use crate::golang;
use crate::lexer::{parse_assignment, Segment, Token};
use protosample_common::{FieldShape, MessageRef, SampleError, ScalarKind, SchemaOracle, ShapeKind};
use std::collections::BTreeMap;

/// A schema-checked node of the request tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    /// Shape the node was checked against (downgraded to `string` for file refs)
    pub shape: FieldShape,
    pub comment: Option<String>,
    pub content: NodeContent,
}

/// What a node holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// Nothing assigned yet; a message node in this state emits an empty literal
    Unset,
    Leaf(Leaf),
    FileRef(FileRef),
    /// Message fields, or placeholders of a name-patterned string, in first-seen order
    Composite(Vec<(String, ValueNode)>),
    /// Elements of a repeated field by index
    Elements(BTreeMap<usize, ValueNode>),
}

/// A validated literal, possibly routed through a sample parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Literal in target syntax; enum leaves keep the bare value name
    pub literal: String,
    pub parameter: Option<String>,
}

/// A `bytes` leaf filled from a file at sample run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Quoted default path
    pub path_literal: String,
    /// Parameter holding the path
    pub parameter: String,
    /// Local variable holding the file contents
    pub variable: String,
}

/// How an assigned leaf reaches the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Literal,
    Parameter(String),
    File { parameter: String, variable: String },
}

/// Leaf details handed to the binding callback of [`ValueTree::assign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedLeaf {
    /// Name of the last field step of the path
    pub field: String,
    /// Effective shape (`string` for file-backed leaves)
    pub shape: FieldShape,
    /// Validated literal text
    pub literal: String,
}

/// Per-entry options of an assignment
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignOptions<'a> {
    pub comment: Option<&'a str>,
    pub file_backed: bool,
}

impl ValueNode {
    fn new(shape: FieldShape) -> Self {
        Self {
            shape,
            comment: None,
            content: NodeContent::Unset,
        }
    }

    fn child_mut(&mut self, name: &str, shape: FieldShape, src: &str) -> Result<&mut ValueNode, SampleError> {
        if matches!(self.content, NodeContent::Unset) {
            self.content = NodeContent::Composite(Vec::new());
        }

        match &mut self.content {
            NodeContent::Composite(children) => {
                let index = match children.iter().position(|(n, _)| n == name) {
                    Some(index) => index,
                    None => {
                        children.push((name.to_string(), ValueNode::new(shape)));
                        children.len() - 1
                    }
                };
                Ok(&mut children[index].1)
            }
            _ => Err(already_assigned(src)),
        }
    }

    fn element_mut(&mut self, index: usize, src: &str) -> Result<&mut ValueNode, SampleError> {
        let element = self.shape.element();
        if matches!(self.content, NodeContent::Unset) {
            self.content = NodeContent::Elements(BTreeMap::new());
        }

        match &mut self.content {
            NodeContent::Elements(items) => Ok(items
                .entry(index)
                .or_insert_with(|| ValueNode::new(element))),
            _ => Err(already_assigned(src)),
        }
    }

    /// Walk `self` and its descendants depth-first
    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a ValueNode)) {
        f(self);
        match &self.content {
            NodeContent::Composite(children) => {
                for (_, child) in children {
                    child.visit(f);
                }
            }
            NodeContent::Elements(items) => {
                for item in items.values() {
                    item.visit(f);
                }
            }
            _ => {}
        }
    }
}

/// Request initialization tree of one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTree {
    root: ValueNode,
}

impl ValueTree {
    /// Empty tree rooted at the request message
    pub fn new(request: MessageRef) -> Self {
        Self {
            root: ValueNode::new(FieldShape::message(request)),
        }
    }

    pub fn root(&self) -> &ValueNode {
        &self.root
    }

    /// Apply one `path[=literal]` assignment
    ///
    /// Once the leaf literal is validated, `bind` decides whether the request
    /// refers to it directly, through a parameter or through a file read.
    ///
    /// # Example
    /// ```rust,ignore
    /// let mut tree = ValueTree::new(MessageRef::new("library.v1.GetBookRequest"));
    /// tree.assign(&oracle, "name.shelf=\"s1\"", AssignOptions::default(), |_| Ok(Binding::Literal))?;
    /// ```
    pub fn assign<F>(
        &mut self,
        oracle: &dyn SchemaOracle,
        src: &str,
        options: AssignOptions<'_>,
        bind: F,
    ) -> Result<(), SampleError>
    where
        F: FnOnce(&AssignedLeaf) -> Result<Binding, SampleError>,
    {
        let assignment = parse_assignment(src)?;

        let mut node = &mut self.root;
        for step in assignment.path.field_steps() {
            node = descend(node, oracle, &step, src)?;
        }

        if let Some(comment) = options.comment {
            node.comment = Some(comment.to_string());
        }

        let Some(token) = assignment.literal else {
            if options.file_backed {
                return Err(SampleError::syntax(src, "a file-backed field needs a path value"));
            }
            return Ok(());
        };

        if !node.shape.is_terminal() {
            return Err(SampleError::NotALeaf {
                path: src.to_string(),
                shape: node.shape.to_string(),
            });
        }
        if !matches!(node.content, NodeContent::Unset) {
            return Err(already_assigned(src));
        }

        let (shape, literal) = if options.file_backed {
            if node.shape.scalar_kind() != Some(ScalarKind::Bytes) {
                return Err(SampleError::TypeMismatch {
                    path: src.to_string(),
                    expected: format!("bytes for a file-backed value, found {}", node.shape),
                    literal: token.text().to_string(),
                });
            }
            (
                FieldShape::scalar(ScalarKind::String),
                golang::quote(plain_text(&token)),
            )
        } else {
            (
                node.shape.clone(),
                literal_text(oracle, &node.shape, &token, src)?,
            )
        };

        let leaf = AssignedLeaf {
            field: assignment.path.last_field().to_string(),
            shape,
            literal,
        };
        node.content = match bind(&leaf)? {
            Binding::Literal => NodeContent::Leaf(Leaf {
                literal: leaf.literal,
                parameter: None,
            }),
            Binding::Parameter(parameter) => NodeContent::Leaf(Leaf {
                literal: leaf.literal,
                parameter: Some(parameter),
            }),
            Binding::File {
                parameter,
                variable,
            } => {
                node.shape = leaf.shape;
                NodeContent::FileRef(FileRef {
                    path_literal: leaf.literal,
                    parameter,
                    variable,
                })
            }
        };
        Ok(())
    }

    /// File-backed leaves in tree order
    pub fn file_refs(&self) -> Vec<&FileRef> {
        let mut refs = Vec::new();
        self.root.visit(&mut |node| {
            if let NodeContent::FileRef(file) = &node.content {
                refs.push(file);
            }
        });
        refs
    }
}

fn already_assigned(src: &str) -> SampleError {
    SampleError::AlreadyAssigned {
        path: src.to_string(),
    }
}

/// One step of an assignment path
fn descend<'n>(
    node: &'n mut ValueNode,
    oracle: &dyn SchemaOracle,
    step: &Segment,
    src: &str,
) -> Result<&'n mut ValueNode, SampleError> {
    match step {
        Segment::Field(name) => {
            let shape = child_shape(&node.shape, oracle, name, src)?;
            if matches!(node.content, NodeContent::Leaf(_) | NodeContent::FileRef(_)) {
                return Err(already_assigned(src));
            }
            node.child_mut(name, shape, src)
        }
        Segment::Index(index) => {
            if !node.shape.repeated {
                return Err(SampleError::NotRepeated {
                    path: src.to_string(),
                });
            }
            node.element_mut(*index, src)
        }
    }
}

/// Shape of `.name` below a node of `shape`
fn child_shape(
    shape: &FieldShape,
    oracle: &dyn SchemaOracle,
    name: &str,
    src: &str,
) -> Result<FieldShape, SampleError> {
    if let Some(pattern) = &shape.name_pattern {
        if pattern.has_placeholder(name) {
            return Ok(FieldShape::scalar(ScalarKind::String));
        }
        return Err(SampleError::UnknownField {
            path: src.to_string(),
            message: format!("name pattern `{}`", pattern),
            field: name.to_string(),
        });
    }

    let message = shape.as_message().ok_or_else(|| SampleError::NotAMessage {
        path: src.to_string(),
        shape: shape.to_string(),
    })?;

    oracle
        .field_of(message, name)
        .ok_or_else(|| SampleError::UnknownField {
            path: src.to_string(),
            message: message.full_name.clone(),
            field: name.to_string(),
        })
}

/// Unquoted contents of a literal token
fn plain_text(token: &Token) -> &str {
    match token {
        Token::Str { value, .. } => value,
        other => other.text(),
    }
}

/// Validate `token` against a terminal shape and spell it in target syntax
fn literal_text(
    oracle: &dyn SchemaOracle,
    shape: &FieldShape,
    token: &Token,
    src: &str,
) -> Result<String, SampleError> {
    let mismatch = |expected: &str| SampleError::TypeMismatch {
        path: src.to_string(),
        expected: expected.to_string(),
        literal: token.text().to_string(),
    };
    let chars_in = |allowed: &str| {
        let text = token.text();
        !text.is_empty() && text.chars().all(|c| allowed.contains(c))
    };

    match &shape.kind {
        ShapeKind::Scalar { kind } => match kind {
            ScalarKind::Bool => match token {
                Token::Ident(text) if matches!(text.as_str(), "true" | "True" | "false" | "False") => {
                    Ok(text.to_ascii_lowercase())
                }
                _ => Err(mismatch("bool")),
            },
            kind if kind.is_integer() => {
                if chars_in("+-0123456789") {
                    Ok(token.text().to_string())
                } else {
                    Err(mismatch(kind.proto_name()))
                }
            }
            kind if kind.is_float() => {
                if chars_in("+-.0123456789") {
                    Ok(token.text().to_string())
                } else {
                    Err(mismatch(kind.proto_name()))
                }
            }
            ScalarKind::Bytes => Ok(format!("[]byte({})", golang::quote(plain_text(token)))),
            _ => Ok(golang::quote(plain_text(token))),
        },
        ShapeKind::Enum { enum_ref } => match token {
            Token::Ident(value) if oracle.enum_has_value(enum_ref, value) => Ok(value.clone()),
            Token::Ident(value) => Err(SampleError::UnknownEnumValue {
                path: src.to_string(),
                enum_name: enum_ref.full_name.clone(),
                value: value.clone(),
            }),
            _ => Err(mismatch(&format!("enum {}", enum_ref.full_name))),
        },
        ShapeKind::Message { .. } | ShapeKind::Map { .. } => Err(SampleError::NotALeaf {
            path: src.to_string(),
            shape: shape.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureOracle;

    fn literal(tree: &mut ValueTree, oracle: &FixtureOracle, src: &str) -> Result<(), SampleError> {
        tree.assign(oracle, src, AssignOptions::default(), |_| Ok(Binding::Literal))
    }

    fn children(node: &ValueNode) -> &[(String, ValueNode)] {
        match &node.content {
            NodeContent::Composite(children) => children,
            other => panic!("expected composite, found {:?}", other),
        }
    }

    fn leaf(node: &ValueNode) -> &str {
        match &node.content {
            NodeContent::Leaf(leaf) => &leaf.literal,
            other => panic!("expected leaf, found {:?}", other),
        }
    }

    #[test]
    fn test_builds_nested_composite() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "a.x=42").unwrap();
        literal(&mut tree, &oracle, "a.y=3.14159").unwrap();
        literal(&mut tree, &oracle, "b=\"foobar\"").unwrap();

        let top = children(tree.root());
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "a");
        assert_eq!(top[1].0, "b");
        assert_eq!(leaf(&top[1].1), "\"foobar\"");

        let a = children(&top[0].1);
        assert_eq!(leaf(&a[0].1), "42");
        assert_eq!(leaf(&a[1].1), "3.14159");
    }

    #[test]
    fn test_literal_round_trip() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "b=\"say \\\"hi\\\"\"").unwrap();
        let emitted = leaf(&children(tree.root())[0].1).to_string();

        let mut again = ValueTree::new(oracle.request());
        literal(&mut again, &oracle, &format!("b={}", emitted)).unwrap();
        assert_eq!(leaf(&children(again.root())[0].1), emitted);
    }

    #[test]
    fn test_string_to_int_is_type_mismatch() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        let err = literal(&mut tree, &oracle, "a.x=\"foo\"").unwrap_err();
        assert!(matches!(err, SampleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_bool_and_float_validation() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "flag=True").unwrap();
        assert_eq!(leaf(&children(tree.root())[0].1), "true");

        assert!(matches!(
            literal(&mut tree, &oracle, "a.y=pi"),
            Err(SampleError::TypeMismatch { .. })
        ));
        let mut tree = ValueTree::new(oracle.request());
        assert!(matches!(
            literal(&mut tree, &oracle, "flag=1"),
            Err(SampleError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_index_on_singular_is_not_repeated() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        let err = literal(&mut tree, &oracle, "a[0].x=1").unwrap_err();
        assert_eq!(
            err,
            SampleError::NotRepeated {
                path: "a[0].x=1".to_string()
            }
        );
    }

    #[test]
    fn test_enum_values() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "e=FOO").unwrap();

        let mut tree = ValueTree::new(oracle.request());
        let err = literal(&mut tree, &oracle, "e=DERP").unwrap_err();
        assert!(matches!(err, SampleError::UnknownEnumValue { .. }));

        let mut tree = ValueTree::new(oracle.request());
        let err = literal(&mut tree, &oracle, "e=\"FOO\"").unwrap_err();
        assert!(matches!(err, SampleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_shape_errors() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        assert!(matches!(
            literal(&mut tree, &oracle, "a=1"),
            Err(SampleError::NotALeaf { .. })
        ));
        assert!(matches!(
            literal(&mut tree, &oracle, "b.c=1"),
            Err(SampleError::NotAMessage { .. })
        ));
        assert!(matches!(
            literal(&mut tree, &oracle, "nope=1"),
            Err(SampleError::UnknownField { .. })
        ));
        assert!(matches!(
            literal(&mut tree, &oracle, "a.x=1 2"),
            Err(SampleError::Syntax { .. })
        ));
    }

    #[test]
    fn test_leaf_written_twice() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "a.x=1").unwrap();
        assert!(matches!(
            literal(&mut tree, &oracle, "a.x=2"),
            Err(SampleError::AlreadyAssigned { .. })
        ));
    }

    #[test]
    fn test_repeated_elements() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "items[1].x=2").unwrap();
        literal(&mut tree, &oracle, "items[0].x=1").unwrap();
        literal(&mut tree, &oracle, "tags[0]=\"t\"").unwrap();

        let top = children(tree.root());
        match &top[0].1.content {
            NodeContent::Elements(items) => {
                assert_eq!(items.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
                assert!(!items[&0].shape.repeated);
            }
            other => panic!("expected elements, found {:?}", other),
        }

        assert!(matches!(
            literal(&mut tree, &oracle, "items=1"),
            Err(SampleError::NotALeaf { .. })
        ));
    }

    #[test]
    fn test_name_pattern_placeholders() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        literal(&mut tree, &oracle, "name.shelf=\"s1\"").unwrap();

        let name = &children(tree.root())[0].1;
        assert_eq!(leaf(&children(name)[0].1), "\"s1\"");

        assert!(matches!(
            literal(&mut tree, &oracle, "name.book=\"b\""),
            Err(SampleError::UnknownField { .. })
        ));
        assert!(matches!(
            literal(&mut tree, &oracle, "name=\"shelves/s1\""),
            Err(SampleError::AlreadyAssigned { .. })
        ));
    }

    #[test]
    fn test_parameter_binding() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        tree.assign(&oracle, "a.x=7", AssignOptions::default(), |leaf| {
            assert_eq!(leaf.field, "x");
            assert_eq!(leaf.literal, "7");
            Ok(Binding::Parameter("x".to_string()))
        })
        .unwrap();

        let a = children(&children(tree.root())[0].1);
        match &a[0].1.content {
            NodeContent::Leaf(leaf) => assert_eq!(leaf.parameter.as_deref(), Some("x")),
            other => panic!("expected leaf, found {:?}", other),
        }
    }

    #[test]
    fn test_file_ref() {
        let oracle = FixtureOracle::new();
        let mut tree = ValueTree::new(oracle.request());
        let options = AssignOptions {
            comment: Some("Image to upload"),
            file_backed: true,
        };
        tree.assign(&oracle, "data=\"cover.png\"", options, |leaf| {
            assert_eq!(leaf.shape, FieldShape::scalar(ScalarKind::String));
            assert_eq!(leaf.literal, "\"cover.png\"");
            Ok(Binding::File {
                parameter: "dataPath".to_string(),
                variable: "dataContent".to_string(),
            })
        })
        .unwrap();

        let node = &children(tree.root())[0].1;
        assert_eq!(node.shape, FieldShape::scalar(ScalarKind::String));
        assert_eq!(node.comment.as_deref(), Some("Image to upload"));
        assert_eq!(tree.file_refs().len(), 1);
        assert_eq!(tree.file_refs()[0].variable, "dataContent");

        let err = tree
            .assign(&oracle, "b=\"x\"", options, |_| Ok(Binding::Literal))
            .unwrap_err();
        assert!(matches!(err, SampleError::TypeMismatch { .. }));
    }
}
