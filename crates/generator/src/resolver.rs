//! Read-path resolution
//!
//! Turns `root.field[0].other` into the shape it reads and a Go expression
//! using nil-safe `GetX()` accessors. Resolution never touches the request
//! tree; it only consults the scope and the schema.

use crate::lexer::{parse_read_path, Segment};
use crate::scope::ScopeTable;
use protosample_common::naming::go_camel_case;
use protosample_common::{FieldShape, MessageRef, SampleError, SchemaOracle};
use std::cell::Cell;

/// Reserved root naming the RPC response
pub const RESPONSE_ROOT: &str = "$resp";

/// Go variable the response is bound to
pub const RESPONSE_VAR: &str = "resp";

/// Shape and accessor expression of a read path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub shape: FieldShape,
    pub accessor: String,
}

/// Resolves read paths against the scope and the schema
pub struct PathResolver<'a> {
    oracle: &'a dyn SchemaOracle,
    response: Option<FieldShape>,
    response_used: Cell<bool>,
}

impl<'a> PathResolver<'a> {
    /// Resolver for a sample whose RPC returns `response`
    ///
    /// `None` leaves `$resp` undeclared, for RPCs without a response body.
    pub fn new(oracle: &'a dyn SchemaOracle, response: Option<MessageRef>) -> Self {
        Self {
            oracle,
            response: response.map(FieldShape::message),
            response_used: Cell::new(false),
        }
    }

    pub fn oracle(&self) -> &'a dyn SchemaOracle {
        self.oracle
    }

    /// Whether any resolved path was rooted at `$resp`
    pub fn response_used(&self) -> bool {
        self.response_used.get()
    }

    /// Resolve `src` in `scope`
    pub fn resolve(&self, scope: &ScopeTable, src: &str) -> Result<ResolvedPath, SampleError> {
        let path = parse_read_path(src)?;
        let undeclared = || SampleError::UndeclaredVariable {
            path: src.to_string(),
            name: path.root.clone(),
        };

        let (mut shape, mut accessor) = if path.root == RESPONSE_ROOT {
            let shape = self.response.clone().ok_or_else(undeclared)?;
            self.response_used.set(true);
            (shape, RESPONSE_VAR.to_string())
        } else {
            let shape = scope.lookup(&path.root).cloned().ok_or_else(undeclared)?;
            (shape, path.root.clone())
        };

        for segment in &path.segments {
            match segment {
                Segment::Field(name) => {
                    let message = shape.as_message().ok_or_else(|| SampleError::NotAMessage {
                        path: src.to_string(),
                        shape: shape.to_string(),
                    })?;
                    let field = self.oracle.field_of(message, name).ok_or_else(|| {
                        SampleError::UnknownField {
                            path: src.to_string(),
                            message: message.full_name.clone(),
                            field: name.clone(),
                        }
                    })?;
                    accessor.push_str(&format!(".Get{}()", go_camel_case(name)));
                    shape = field;
                }
                Segment::Index(index) => {
                    if !shape.repeated {
                        return Err(SampleError::NotRepeated {
                            path: src.to_string(),
                        });
                    }
                    accessor.push_str(&format!("[{}]", index));
                    shape = shape.element();
                }
            }
        }

        Ok(ResolvedPath { shape, accessor })
    }
}
