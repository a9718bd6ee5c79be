//! # akn-cli
//!
//! Command-line front end for the Akoma Ntoso application profiler.
//!
//! Validates profiles, generates scaffolds and runs the cascade operations
//! on profile files.

mod config;

use akn_cascade::{ExpandOptions, GenerateOptions};
use akn_profile::Severity;
use akn_schema::{SchemaLoader, SchemaModel};
use akn_validation::{ValidationConfig, ValidationEngine, ValidationReport};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "akn-profiler")]
#[command(about = "Akoma Ntoso application profile toolkit")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Grammar (XSD) to use instead of the bundled Akoma Ntoso 3.0 core
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a profile against the grammar
    Validate {
        /// Profile file path
        profile: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Drop diagnostics below this severity (error, warning, info)
        #[arg(long)]
        min_severity: Option<Severity>,
    },

    /// Generate a minimum viable profile for a document type
    Generate {
        /// Document type (a child of the grammar root, e.g. act)
        doc_type: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List every grammar child, not only the mandatory ones
        #[arg(long)]
        all_children: bool,

        /// Include optional attributes
        #[arg(long)]
        all_attributes: bool,

        /// Omit the explanatory comments
        #[arg(long)]
        no_comments: bool,
    },

    /// Add an element and its mandatory subtree to a profile
    Expand {
        /// Profile file path
        profile: PathBuf,

        /// Element to add
        element: String,

        /// Attach eId where supported
        #[arg(long)]
        eid: bool,

        /// Attach wId where supported
        #[arg(long)]
        wid: bool,

        /// Attach GUID where supported
        #[arg(long)]
        guid: bool,

        /// Mark attached identity attributes as optional
        #[arg(long)]
        optional_ids: bool,

        /// Rewrite the profile file instead of printing
        #[arg(short, long)]
        in_place: bool,
    },

    /// Remove an element and every entry only it kept reachable
    Collapse {
        /// Profile file path
        profile: PathBuf,

        /// Element to remove
        element: String,

        /// Rewrite the profile file instead of printing
        #[arg(short, long)]
        in_place: bool,
    },

    /// Sort a profile into canonical order
    Reorder {
        /// Profile file path
        profile: PathBuf,

        /// Rewrite the profile file instead of printing
        #[arg(short, long)]
        in_place: bool,
    },

    /// List the grammar's element names
    Elements,

    /// List the document types accepted under the grammar root
    DocTypes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let schema = load_schema(cli.schema.as_deref().or(config.schema.as_deref()))?;

    match cli.command {
        Commands::Validate {
            profile,
            format,
            min_severity,
        } => {
            let minimum = min_severity
                .or(config.validation.minimum_severity)
                .unwrap_or(Severity::Info);
            let report = validate(&profile, &schema, minimum)?;
            match format {
                Format::Text => print!("{}", report.to_text()),
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            return Ok(if report.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Commands::Generate {
            doc_type,
            output,
            all_children,
            all_attributes,
            no_comments,
        } => {
            let options = GenerateOptions::default()
                .with_optional_children(all_children)
                .with_optional_attributes(all_attributes)
                .with_comments(!no_comments);
            let text = akn_cascade::generate_yaml(&schema, &doc_type, &options)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} profile to {}", doc_type, path.display());
                }
                None => print!("{}", text),
            }
        }
        Commands::Expand {
            profile,
            element,
            eid,
            wid,
            guid,
            optional_ids,
            in_place,
        } => {
            let options = expand_options(config.expand, eid, wid, guid, optional_ids);
            debug!("Expand options: {:?}", options);
            rewrite(&profile, in_place, |text| {
                Ok(akn_cascade::expand_element(text, &element, &schema, &options)?)
            })?;
        }
        Commands::Collapse {
            profile,
            element,
            in_place,
        } => {
            rewrite(&profile, in_place, |text| {
                Ok(akn_cascade::collapse_element(text, &element, &schema)?)
            })?;
        }
        Commands::Reorder { profile, in_place } => {
            rewrite(&profile, in_place, |text| {
                Ok(akn_cascade::reorder_profile(text, &schema)?)
            })?;
        }
        Commands::Elements => {
            for name in schema.element_names() {
                println!("{}", name);
            }
        }
        Commands::DocTypes => {
            for name in schema.document_types() {
                println!("{}", name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_schema(path: Option<&Path>) -> anyhow::Result<Arc<SchemaModel>> {
    match path {
        Some(path) => {
            let schema = SchemaLoader::new()
                .load_from_path(path)
                .with_context(|| format!("Failed to load grammar {}", path.display()))?;
            Ok(Arc::new(schema))
        }
        None => akn_schema::bundled().context("Failed to load the bundled grammar"),
    }
}

fn validate(path: &Path, schema: &SchemaModel, minimum: Severity) -> anyhow::Result<ValidationReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let config = ValidationConfig::default().with_minimum_severity(minimum);
    let diagnostics = ValidationEngine::with_config(config).validate_text(&text, schema);
    Ok(ValidationReport::new(path.display().to_string(), diagnostics))
}

/// Command-line switches only ever turn options on; the config file
/// supplies the baseline.
fn expand_options(base: ExpandOptions, eid: bool, wid: bool, guid: bool, optional_ids: bool) -> ExpandOptions {
    let required = base.auto_id_required && !optional_ids;
    ExpandOptions {
        auto_add_eid: base.auto_add_eid || eid,
        auto_add_wid: base.auto_add_wid || wid,
        auto_add_guid: base.auto_add_guid || guid,
        auto_id_required: required,
    }
}

/// Apply `edit` to the profile file, printing the result or writing it back
fn rewrite(
    path: &Path,
    in_place: bool,
    edit: impl FnOnce(&str) -> anyhow::Result<String>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let updated = edit(&text).with_context(|| format!("Failed to update {}", path.display()))?;
    if in_place {
        if updated != text {
            std::fs::write(path, &updated)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        info!("Updated {}", path.display());
    } else {
        print!("{}", updated);
    }
    Ok(())
}
