//! CLI commands implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use crate::analysis::Pipeline;
use crate::backends::{BackendMode, BackendSet, TesseractOcr};
use crate::config::Settings;
use crate::server;
use crate::storage::FsObjectStore;

#[derive(Parser)]
#[command(name = "docsight")]
#[command(about = "Document intelligence and analysis service")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP analysis service
    Serve {
        /// Bind address
        #[arg(long, env = "DOCSIGHT_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(long, env = "DOCSIGHT_PORT", default_value_t = 8000)]
        port: u16,
    },

    /// Run the full analysis pipeline on a local file and print the result
    Analyze {
        /// Path to the document (PDF, image or text)
        file: PathBuf,
    },

    /// Report which capability backends are available
    Check,
}

/// Peek at argv for the verbose flag before clap parses, so logging can be
/// initialized first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and dispatch to the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Serve { host, port } => server::serve(settings, &host, port).await,
        Command::Analyze { file } => analyze_file(settings, &file).await,
        Command::Check => check_backends(settings).await,
    }
}

/// Run the pipeline against a single local file, rooted at its parent
/// directory, and print the JSON envelope.
async fn analyze_file(settings: Settings, file: &Path) -> anyhow::Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("cannot access {}", file.display()))?;
    let parent = file
        .parent()
        .context("file has no parent directory")?
        .to_path_buf();
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?
        .to_string();

    let settings = Arc::new(settings);
    let backends = Arc::new(BackendSet::load(&settings).await);
    let store = Arc::new(FsObjectStore::new(parent));
    let pipeline = Pipeline::new(backends, store, settings);

    let document_id = uuid::Uuid::new_v4().to_string();
    let response = pipeline.analyze_document(&document_id, &name).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.success {
        Ok(())
    } else {
        anyhow::bail!("analysis failed: {}", response.message)
    }
}

/// Print the mode each capability resolved to and why.
async fn check_backends(settings: Settings) -> anyhow::Result<()> {
    let backends = BackendSet::load(&settings).await;

    println!("{}", style("Capability backends").bold());
    for (capability, mode) in backends.modes() {
        let label = match mode {
            BackendMode::Real => style(mode.as_str()).green(),
            BackendMode::Simulated => style(mode.as_str()).yellow(),
        };
        println!("  {:<12} {}", capability, label);
    }

    println!();
    println!("{}", style("External tools").bold());
    println!("  {}", TesseractOcr::availability_hint());
    match &settings.inference_endpoint {
        Some(endpoint) => println!("  inference endpoint: {}", endpoint),
        None => println!("  inference endpoint: not configured (DOCSIGHT_INFERENCE_URL)"),
    }

    Ok(())
}
