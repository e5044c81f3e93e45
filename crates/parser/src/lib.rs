//! Descriptor parsing for protosample
//!
//! This crate turns compiled protobuf descriptors into the schema oracle the
//! sample compiler type-checks against.
//!
//! ## Naming
//!
//! Shapes and names follow what protoc-gen-go generates:
//! - nested types are joined with `_` (`Book.Kind` -> `Book_Kind`)
//! - fields are camel-cased (`book_id` -> `BookId`)
//! - the package alias comes from `go_package`, or from the proto package

mod protobuf;
mod type_mapper;

pub use protobuf::{DescriptorOracle, ProtobufParser};
pub use type_mapper::TypeMapper;

use protosample_common::{ResourcePattern, Result};
use std::path::Path;

/// Load a descriptor set file and build its schema oracle
///
/// # Arguments
/// * `path` - Binary FileDescriptorSet
/// * `patterns` - Resource name patterns to overlay
pub fn load_descriptor_set(path: &Path, patterns: &[ResourcePattern]) -> Result<DescriptorOracle> {
    let parser = ProtobufParser::from_file(path)?;
    parser.parse(patterns)
}
