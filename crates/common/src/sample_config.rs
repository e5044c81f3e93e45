//! Sample configuration loading from YAML files
//!
//! A sample configuration names the RPCs to demonstrate, how to fill in their
//! request objects, and what to do with their responses.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Root structure of a sample configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SampleConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Client package used to call the RPCs
    #[serde(default)]
    pub client: Option<ClientInfo>,
    /// Resource name patterns attached to string request fields
    #[serde(default)]
    pub resource_patterns: Vec<ResourcePattern>,
    /// Sample definitions
    #[serde(default)]
    pub samples: Vec<SampleSpec>,
}

fn default_version() -> u32 {
    1
}

/// Generated client package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientInfo {
    /// Import path (e.g., "example.com/library/apiv1")
    pub import_path: String,
    /// Package alias (e.g., "library")
    pub package: String,
    /// Client constructor (e.g., "NewClient")
    #[serde(default = "default_constructor")]
    pub constructor: String,
}

fn default_constructor() -> String {
    "NewClient".to_string()
}

/// Resource name pattern for one request field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourcePattern {
    /// Fully-qualified message name
    pub message: String,
    /// Field name within the message
    pub field: String,
    /// Template such as "shelves/{shelf}/books/{book}"
    pub pattern: String,
}

/// One sample definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleSpec {
    /// User-supplied sample id
    pub id: String,
    /// Optional region tag for `[START]`/`[END]` markers
    #[serde(default)]
    pub region_tag: Option<String>,
    /// Fully-qualified service name
    pub service: String,
    /// RPC name
    pub rpc: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Request field assignments
    #[serde(default)]
    pub request: Vec<RequestField>,
    /// Response handling actions
    #[serde(default)]
    pub response: Vec<OutputSpec>,
}

/// One request assignment: `field` path plus optional literal `value`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestField {
    pub field: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Expose the value as a sample function parameter
    #[serde(default)]
    pub input_parameter: Option<String>,
    /// The value is a path whose file contents fill a bytes field
    #[serde(default)]
    pub value_is_file: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RequestField {
    /// The assignment text `field[=value]`
    pub fn assignment(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.field, value),
            None => self.field.clone(),
        }
    }
}

/// One response-handling action
///
/// Exactly one of the fields must be set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputSpec {
    /// `name=path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<String>,
    /// Format string followed by argument paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<Vec<String>>,
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_spec: Option<LoopSpec>,
}

/// Loop over a repeated field (`collection` + `variable`) or a map
/// (`map` + `key` and/or `value`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoopSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub body: Vec<OutputSpec>,
}

impl SampleConfig {
    /// Load a configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Parse(format!("Failed to read sample config {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to parse sample config YAML from {:?}: {}",
                path, e
            ))
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Merge configurations in order
    ///
    /// Samples and resource patterns are concatenated; the first client
    /// block wins.
    pub fn merge(configs: impl IntoIterator<Item = SampleConfig>) -> Self {
        let mut merged = SampleConfig {
            version: default_version(),
            ..Default::default()
        };

        for config in configs {
            if let Some(client) = config.client {
                if merged.client.is_none() {
                    merged.client = Some(client);
                } else if let Some(existing) = merged.client.as_ref().filter(|c| **c != client) {
                    warn!(
                        kept = %existing.import_path,
                        ignored = %client.import_path,
                        "conflicting client packages across sample configs"
                    );
                }
            }
            merged.resource_patterns.extend(config.resource_patterns);
            merged.samples.extend(config.samples);
        }

        merged
    }
}
