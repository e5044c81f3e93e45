//! Sample DSL error taxonomy
//!
//! Every error carries the offending path or spec text. Errors are local to
//! the sample being processed and are never retried.

use thiserror::Error;

/// Errors raised while parsing, type-checking or interpreting sample specs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("syntax error in `{path}`: {message}")]
    Syntax { path: String, message: String },

    #[error("unknown field `{field}` in {message} (in `{path}`)")]
    UnknownField {
        path: String,
        message: String,
        field: String,
    },

    #[error("`{path}` is a {shape}, not a message")]
    NotAMessage { path: String, shape: String },

    #[error("`{path}` indexes a field that is not repeated")]
    NotRepeated { path: String },

    #[error("`{path}` is a {shape}, which cannot be assigned a literal")]
    NotALeaf { path: String, shape: String },

    #[error("`{path}` is a {shape}, not a repeated field")]
    NotIterable { path: String, shape: String },

    #[error("`{path}` is a {shape}, not a map")]
    NotAMap { path: String, shape: String },

    #[error("`{value}` is not a value of enum {enum_name} (in `{path}`)")]
    UnknownEnumValue {
        path: String,
        enum_name: String,
        value: String,
    },

    #[error("literal `{literal}` does not match {expected} (in `{path}`)")]
    TypeMismatch {
        path: String,
        expected: String,
        literal: String,
    },

    #[error("variable `{name}` is not declared (in `{path}`)")]
    UndeclaredVariable { path: String, name: String },

    #[error("variable `{name}` is already declared in this sample")]
    DuplicateName { name: String },

    #[error("output spec must have exactly one action, found {found} (in `{spec}`)")]
    ConflictingActions { spec: String, found: usize },

    #[error("map loop over `{path}` binds neither key nor value")]
    MissingBinding { path: String },

    #[error("`{path}` has already been assigned")]
    AlreadyAssigned { path: String },

    #[error("placeholder `{placeholder}` of `{path}` was never assigned")]
    IncompletePattern { path: String, placeholder: String },
}

impl SampleError {
    /// Shorthand for a syntax error at `path`
    pub fn syntax(path: &str, message: impl Into<String>) -> Self {
        SampleError::Syntax {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
