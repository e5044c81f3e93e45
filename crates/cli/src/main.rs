//! protosample CLI
//!
//! Command-line interface for type-checking sample configurations against a
//! protobuf descriptor set and generating runnable Go samples from them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use protosample_common::SampleConfig;
use protosample_generator::{GenerationReport, SampleGenerator};
use protosample_parser::load_descriptor_set;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "protosample")]
#[command(version, about = "Generate runnable Go samples for protobuf RPCs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the sample configs come from
#[derive(clap::Args)]
struct Inputs {
    /// Binary FileDescriptorSet (protoc --include_imports --descriptor_set_out)
    #[arg(short, long)]
    descriptor: PathBuf,

    /// Comma-separated list of sample config files
    #[arg(short, long, value_delimiter = ',', conflicts_with = "sample_dir")]
    samples: Option<Vec<PathBuf>>,

    /// Directory containing sample configs (alternative to --samples)
    #[arg(long, conflicts_with = "samples")]
    sample_dir: Option<PathBuf>,

    /// Number of config files read in parallel
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and type-check every sample without writing files
    #[command(after_help = "EXAMPLES:\n  \
        # Check one config\n  \
        protosample check --descriptor library.pb --samples library.yaml\n\n  \
        # Check every config in a directory and dump the result as JSON\n  \
        protosample check --descriptor library.pb --sample-dir ./samples --json")]
    Check {
        #[command(flatten)]
        inputs: Inputs,

        /// Print the generated samples as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate Go samples
    #[command(after_help = "EXAMPLES:\n  \
        protosample generate \\\n    \
        --descriptor library.pb \\\n    \
        --samples library.yaml,shelves.yaml \\\n    \
        --output ./samples-go")]
    Generate {
        #[command(flatten)]
        inputs: Inputs,

        /// Output directory
        #[arg(short, long, default_value = "./samples")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    let report = match cli.command {
        Commands::Check { inputs, json } => check_command(&inputs, json, cli.verbose)?,
        Commands::Generate { inputs, output } => {
            generate_command(&inputs, output.as_path(), cli.verbose)?
        }
    };

    if !report.is_success() {
        anyhow::bail!("{} sample(s) failed", report.failures.len());
    }

    Ok(())
}

fn check_command(inputs: &Inputs, json: bool, verbose: bool) -> Result<GenerationReport> {
    let config = load_inputs(inputs, verbose)?;
    let oracle = load_descriptor_set(&inputs.descriptor, &config.resource_patterns)
        .context("Failed to load descriptor set")?;

    println!("{} Checking {} samples", "→".cyan(), config.samples.len());
    let generator = SampleGenerator::new(&oracle, config).context("Failed to create generator")?;
    let report = generator.generate();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report, verbose);
    }

    Ok(report)
}

fn generate_command(inputs: &Inputs, output: &Path, verbose: bool) -> Result<GenerationReport> {
    let config = load_inputs(inputs, verbose)?;
    let oracle = load_descriptor_set(&inputs.descriptor, &config.resource_patterns)
        .context("Failed to load descriptor set")?;

    if verbose {
        println!("  Descriptor: {}", inputs.descriptor.display());
        println!("  Output: {}", output.display());
    }

    println!(
        "{} Generating {} samples...",
        "→".cyan(),
        config.samples.len()
    );
    let generator = SampleGenerator::new(&oracle, config).context("Failed to create generator")?;
    let report = generator
        .generate_to_directory(output)
        .context("Failed to generate samples")?;

    print_report(&report, verbose);
    if !report.samples.is_empty() {
        println!("\n{}", "Generated files:".bold());
        for sample in &report.samples {
            println!("  {}/{}/main.go", output.display(), sample.id);
        }
    }

    Ok(report)
}

fn print_report(report: &GenerationReport, verbose: bool) {
    for sample in &report.samples {
        println!("{} {} ({})", "✓".green(), sample.id, sample.rpc.yellow());
        if verbose {
            for parameter in &sample.parameters {
                println!("    {} {}", parameter.name.cyan(), parameter.go_type);
            }
        }
    }
    for failure in &report.failures {
        println!("{} {}: {}", "✗".red(), failure.id, failure.error);
    }

    let summary = format!(
        "{} succeeded, {} failed",
        report.samples.len(),
        report.failures.len()
    );
    if report.is_success() {
        println!("\n{}", summary.green().bold());
    } else {
        println!("\n{}", summary.red().bold());
    }
}

/// Read and merge the sample configs named on the command line
fn load_inputs(inputs: &Inputs, verbose: bool) -> Result<SampleConfig> {
    let paths: Vec<PathBuf> = if let Some(dir) = &inputs.sample_dir {
        println!(
            "{} Scanning directory for sample configs: {}",
            "→".cyan(),
            dir.display()
        );
        discover_configs(dir, verbose)?
    } else if let Some(paths) = &inputs.samples {
        paths.clone()
    } else {
        anyhow::bail!("Either --samples or --sample-dir must be provided");
    };

    if paths.is_empty() {
        anyhow::bail!("No sample configs found");
    }

    let configs = read_configs(&paths, inputs.jobs)?;
    Ok(SampleConfig::merge(configs))
}

/// Read configs with up to `jobs` worker threads, keeping input order
fn read_configs(paths: &[PathBuf], jobs: usize) -> Result<Vec<SampleConfig>> {
    let next = AtomicUsize::new(0);
    let results: Mutex<Vec<(usize, Result<SampleConfig>)>> =
        Mutex::new(Vec::with_capacity(paths.len()));

    std::thread::scope(|scope| {
        let jobs = jobs.max(1).min(paths.len());
        for _ in 0..jobs {
            scope.spawn(|| loop {
                let idx = next.fetch_add(1, Ordering::Relaxed);
                if idx >= paths.len() {
                    return;
                }

                let path = &paths[idx];
                debug!(path = %path.display(), "reading sample config");
                let result = SampleConfig::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()));
                if let Ok(mut guard) = results.lock() {
                    guard.push((idx, result));
                }
            });
        }
    });

    let mut results = results
        .into_inner()
        .map_err(|_| anyhow::anyhow!("config reader thread panicked"))?;
    if results.len() != paths.len() {
        anyhow::bail!("config reader thread panicked");
    }
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, config)| config).collect()
}

/// Discover sample configs (`.yaml`/`.yml`) in a directory, sorted by path
fn discover_configs(dir: &Path, verbose: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut configs: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            matches!(
                e.path().extension().and_then(|s| s.to_str()),
                Some("yaml" | "yml")
            )
        })
        .map(|e| e.into_path())
        .collect();
    configs.sort();

    if verbose {
        for path in &configs {
            println!("  Found: {}", path.display());
        }
    }
    println!(
        "{} Discovered {} sample configs",
        "✓".green(),
        configs.len()
    );

    Ok(configs)
}
