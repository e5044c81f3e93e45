//! Protobuf descriptor loading
//!
//! Loads a Protocol Buffer FileDescriptorSet and exposes it to the sample
//! compiler as a [`SchemaOracle`](protosample_common::SchemaOracle).
//!
//! ## Example
//! ```rust,ignore
//! use protosample_parser::ProtobufParser;
//!
//! let parser = ProtobufParser::from_file("library.pb")?;
//! let oracle = parser.parse(&config.resource_patterns)?;
//! let method = oracle.method("library.v1.LibraryService", "GetBook");
//! ```

mod converter;
mod oracle;
mod parser;

pub use oracle::DescriptorOracle;
pub use parser::ProtobufParser;
