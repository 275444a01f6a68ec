//! ChittySchema CLI
//!
//! Compiles a SQL DDL schema plus a workspace template document into:
//! - SQL subsets (`sql/`)
//! - JSON Schema and OpenAPI documents (`json/`)
//! - workspace database templates (`templates/`)
//! - documentation and an ERD (`docs/`)
//! - `manifest.json` indexing all of the above
//!
//! and optionally publishes every artifact to a remote API.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;
mod upload;

use chittyschema_ir::DEFAULT_SCHEMA_VERSION;
use config::UploadConfig;
use pipeline::Sources;

#[derive(Parser)]
#[command(name = "chittyschema")]
#[command(author, version, about = "ChittyChain schema compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: parse, emit, write, upload, manifest.
    Compile {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output root directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,

        /// Remote API base URL (falls back to CHITTYSCHEMA_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Remote API key (falls back to CHITTYSCHEMA_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Parse both sources and report what was extracted, without writing.
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// SQL DDL source file
    #[arg(long, default_value = "schema.sql")]
    sql: PathBuf,

    /// Template document (markdown)
    #[arg(long, default_value = "templates.md")]
    templates: PathBuf,

    /// JSON file overriding the built-in entity/type mappings
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Version recorded in metadata and the manifest
    #[arg(long, default_value = DEFAULT_SCHEMA_VERSION)]
    schema_version: String,

    /// Fail when any construct was skipped or overridden
    #[arg(long)]
    strict: bool,
}

impl From<SourceArgs> for Sources {
    fn from(args: SourceArgs) -> Self {
        Sources {
            sql: args.sql,
            templates: args.templates,
            mappings: args.mappings,
            schema_version: args.schema_version,
            strict: args.strict,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            sources,
            out,
            api_url,
            api_key,
        } => {
            let upload = UploadConfig::resolve(api_url, api_key);
            pipeline::compile(&sources.into(), &out, upload)?;
        }
        Commands::Check { sources } => {
            let sources: Sources = sources.into();
            println!(
                "{} {} + {}",
                "Checking".green().bold(),
                sources.sql.display(),
                sources.templates.display()
            );
            let (ir, _) = pipeline::load(&sources)?;
            pipeline::print_summary(&ir);
        }
    }

    Ok(())
}
