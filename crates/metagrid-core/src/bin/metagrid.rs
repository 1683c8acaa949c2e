//! metagrid: inspect filter and grid schemas derived from a metadata document.
//!
//! Every command prints pretty JSON to stdout. Logs go to stderr and are
//! controlled by `RUST_LOG` and `LOG_FORMAT`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metagrid_core::{
    logging, select, ExtraMeta, FilterSchemaDeriver, MetaDocument, MetaRegistry, MetaSource,
    MetagridConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "metagrid")]
#[command(author, version, about = "Filter and grid schema inspector")]
#[command(propagate_version = true)]
struct Cli {
    /// Metadata document (.json or .toml)
    #[arg(short, long, global = true)]
    meta: Option<PathBuf>,

    /// Configuration file (default: the user config directory, then METAGRID_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the search filter schema of a class or view
    Filter {
        /// Class name
        #[arg(long)]
        class: String,

        /// View name
        #[arg(long)]
        view: Option<String>,

        /// Relation expansion depth (default: each attribute's search depth)
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Print the prepared grid metadata of a class or view
    View {
        /// Class name
        #[arg(long)]
        class: String,

        /// View name
        #[arg(long)]
        view: Option<String>,
    },

    /// List classes
    Classes {
        /// Case-insensitive text matched against names and labels
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Load and resolve the document, reporting the first error
    Validate,
}

fn main() -> ExitCode {
    logging::init_from_env();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let meta = cli
        .meta
        .as_deref()
        .context("--meta <file> is required")?;
    let registry = load_registry(meta)?;

    match cli.command {
        Commands::Filter { class, view, depth } => {
            cmd_filter(&registry, &config, &class, view.as_deref(), depth)
        }
        Commands::View { class, view } => cmd_view(&registry, config, &class, view.as_deref()),
        Commands::Classes { search } => cmd_classes(&registry, search.as_deref()),
        Commands::Validate => cmd_validate(&registry),
    }
}

fn load_config(path: Option<&Path>) -> Result<MetagridConfig> {
    let config = match path {
        Some(path) => MetagridConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MetagridConfig::load().context("Failed to load config")?,
    };
    Ok(config)
}

fn load_registry(path: &Path) -> Result<MetaRegistry> {
    let doc = MetaDocument::from_path(path)
        .with_context(|| format!("Failed to read metadata {}", path.display()))?;
    let registry = MetaRegistry::from_document(&doc)
        .with_context(|| format!("Invalid metadata {}", path.display()))?;
    Ok(registry)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_filter(
    registry: &MetaRegistry,
    config: &MetagridConfig,
    class: &str,
    view: Option<&str>,
    depth: Option<u32>,
) -> Result<()> {
    let class = registry.find_class(class)?;
    let source = registry.view_or_class(class, view, None)?;
    let deriver = FilterSchemaDeriver::new(registry, &config.filter);
    print_json(&deriver.derive_columns(&source, depth))
}

fn cmd_view(
    registry: &MetaRegistry,
    config: MetagridConfig,
    class: &str,
    view: Option<&str>,
) -> Result<()> {
    let class = registry.find_class(class)?;
    let source = registry.view_or_class(class, view, None)?;

    let mut extra = ExtraMeta::new(config);
    extra.prepare(registry);

    let id = match source {
        MetaSource::Class(class) => class.name.as_str(),
        MetaSource::View(view) => view.id.as_str(),
    };
    let data = extra
        .data(id)
        .with_context(|| format!("No grid metadata prepared for {}", id))?;
    print_json(data)
}

fn cmd_classes(registry: &MetaRegistry, search: Option<&str>) -> Result<()> {
    print_json(&select::class_items(registry, search)?)
}

fn cmd_validate(registry: &MetaRegistry) -> Result<()> {
    let view_count: usize = registry.classes().iter().map(|class| class.views.len()).sum();
    print_json(&serde_json::json!({
        "valid": true,
        "classes": registry.len(),
        "views": view_count,
    }))
}
