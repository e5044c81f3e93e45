//! Sample-initialization DSL compiler and Go sample generation
//!
//! This crate turns sample definitions into runnable Go programs:
//! - request assignments are type-checked into a [`ValueTree`]
//! - response actions are interpreted against a [`ScopeTable`]
//! - the request literal and statements are emitted through a [`SourceWriter`]
//! - each sample is rendered into a `main.go` through tera templates

mod emitter;
mod golang;
mod lexer;
mod output;
mod resolver;
mod sample;
mod scope;
mod templates;
mod value;
mod writer;

#[cfg(test)]
mod testing;

pub use emitter::{GoImport, ValueEmitter};
pub use lexer::{parse_assignment, parse_read_path, Assignment, PathExpr, Segment, Token};
pub use output::{OutputAction, OutputInterpreter};
pub use resolver::{PathResolver, ResolvedPath, RESPONSE_ROOT};
pub use sample::{
    build_sample, disambiguate_sample_ids, GeneratedSample, SampleParameter, RESERVED_NAMES,
};
pub use scope::{BlockScope, ScopeTable};
pub use value::{AssignOptions, AssignedLeaf, Binding, FileRef, Leaf, NodeContent, ValueNode, ValueTree};
pub use writer::SourceWriter;

use protosample_common::{ClientInfo, GeneratorError, Result, SampleConfig, SchemaOracle};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::Tera;
use tracing::{debug, warn};

/// A sample that could not be generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFailure {
    /// Disambiguated sample id
    pub id: String,
    pub error: String,
}

/// Outcome of a generation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub samples: Vec<GeneratedSample>,
    pub failures: Vec<SampleFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sample generator
///
/// Builds every sample of a merged configuration against one schema. A sample
/// that fails is reported and skipped; the others are unaffected.
pub struct SampleGenerator<'a> {
    oracle: &'a dyn SchemaOracle,
    config: SampleConfig,
    tera: Tera,
}

impl<'a> SampleGenerator<'a> {
    /// Create a new sample generator
    ///
    /// # Example
    /// ```rust,ignore
    /// let oracle = load_descriptor_set(Path::new("library.pb"), &config.resource_patterns)?;
    /// let generator = SampleGenerator::new(&oracle, config)?;
    /// let report = generator.generate();
    /// ```
    pub fn new(oracle: &'a dyn SchemaOracle, config: SampleConfig) -> Result<Self> {
        if config.client.is_none() && !config.samples.is_empty() {
            return Err(GeneratorError::Generation(
                "Sample config has no client package".to_string(),
            ));
        }

        let tera = templates::load_templates()?;
        Ok(Self {
            oracle,
            config,
            tera,
        })
    }

    /// Build and render every sample
    pub fn generate(&self) -> GenerationReport {
        let mut report = GenerationReport::default();
        let Some(client) = &self.config.client else {
            return report;
        };

        let ids = disambiguate_sample_ids(&self.config.samples);
        for (spec, id) in self.config.samples.iter().zip(ids) {
            if id != spec.id {
                debug!(original = %spec.id, id = %id, "renamed duplicate sample id");
            }

            match self.generate_sample(client, spec, &id) {
                Ok(sample) => {
                    debug!(sample = %id, rpc = %sample.rpc, "generated sample");
                    report.samples.push(sample);
                }
                Err(e) => {
                    warn!(sample = %id, error = %e, "skipping sample");
                    report.failures.push(SampleFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn generate_sample(
        &self,
        client: &ClientInfo,
        spec: &protosample_common::SampleSpec,
        id: &str,
    ) -> Result<GeneratedSample> {
        let mut sample = build_sample(self.oracle, client, spec, id)?;
        sample.source = self.render(&sample)?;
        Ok(sample)
    }

    /// Render a sample into a Go source file
    pub fn render(&self, sample: &GeneratedSample) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("sample", sample);

        self.tera
            .render("sample.go", &context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {:?}", e)))
    }

    /// Generate all samples to `<output_dir>/<id>/main.go`
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<GenerationReport> {
        fs::create_dir_all(output_dir).map_err(|e| {
            GeneratorError::Generation(format!("Failed to create output directory: {}", e))
        })?;

        let report = self.generate();
        for sample in &report.samples {
            let sample_dir = output_dir.join(&sample.id);
            fs::create_dir_all(&sample_dir).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create directory for sample {}: {}",
                    sample.id, e
                ))
            })?;

            fs::write(sample_dir.join("main.go"), &sample.source).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to write sample {}: {}",
                    sample.id, e
                ))
            })?;
        }

        Ok(report)
    }
}
