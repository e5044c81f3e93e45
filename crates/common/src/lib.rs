//! Common types and utilities for protosample
//!
//! This crate contains the shape model that sample paths are checked against,
//! the schema oracle interface, the sample-DSL error taxonomy and the YAML
//! sample configuration shared by the parser, generator, and CLI components.

mod error;
pub mod naming;
mod oracle;
mod sample_config;
mod shape;

pub use error::SampleError;
pub use oracle::{QualifiedName, RpcMethod, SchemaOracle};
pub use sample_config::{
    ClientInfo, LoopSpec, OutputSpec, RequestField, ResourcePattern, SampleConfig, SampleSpec,
};
pub use shape::{EnumRef, FieldShape, MessageRef, NamePattern, PatternSegment, ScalarKind, ShapeKind};

use thiserror::Error;

/// Errors that can occur during sample generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Sample error: {0}")]
    Sample(#[from] SampleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
