//! Loading compiled descriptor sets

use super::DescriptorOracle;
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::FileDescriptorSet;
use protosample_common::{GeneratorError, ResourcePattern, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a binary `FileDescriptorSet` into a reflection pool
///
/// The set must be self-contained, which is what
/// `protoc --include_imports --descriptor_set_out` produces.
pub struct ProtobufParser {
    pool: DescriptorPool,
}

impl ProtobufParser {
    /// Read a descriptor set from disk
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = ProtobufParser::from_file("library.pb")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            GeneratorError::Parse(format!(
                "Cannot read descriptor set {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "read descriptor set");
        Self::from_file_descriptor_set(&bytes)
    }

    /// Decode an encoded descriptor set and link it
    ///
    /// Fails if a file imports something the set does not contain.
    pub fn from_file_descriptor_set(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes)
            .map_err(|e| GeneratorError::Parse(format!("Malformed descriptor set: {}", e)))?;

        let pool = DescriptorPool::from_file_descriptor_set(set).map_err(|e| {
            GeneratorError::Parse(format!("Descriptor set does not link: {}", e))
        })?;

        let services = pool.services().count();
        if services == 0 && pool.files().count() > 0 {
            warn!("descriptor set declares no services; every sample will fail to resolve");
        }
        debug!(
            files = pool.files().count(),
            services,
            "linked descriptor pool"
        );

        Ok(Self { pool })
    }

    /// Build the schema oracle, overlaying the given resource name patterns
    pub fn parse(&self, patterns: &[ResourcePattern]) -> Result<DescriptorOracle> {
        DescriptorOracle::new(self.pool.clone()).with_resource_patterns(patterns)
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}
