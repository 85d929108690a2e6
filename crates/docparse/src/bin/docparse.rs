//! docparse command-line interface
//!
//! Run with: cargo run -p docparse --features cli -- parse <PATH>...

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docparse::{
    available_backends, discover_files, BackendStatus, DocumentRecord, FileLoader, LoaderConfig,
    PdfLoaderMethod,
};

#[derive(Parser, Debug)]
#[command(name = "docparse", version, about = "Load documents into uniform text records")]
struct Cli {
    /// Config file (defaults to <config dir>/docparse/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load files and print their records
    Parse {
        /// Files or directories to load
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// PDF backend: local, unstructured or document-ai
        #[arg(short, long)]
        pdf_backend: Option<PdfLoaderMethod>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Show which PDF backends this build can use
    Backends {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = LoaderConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Parse {
            paths,
            pdf_backend,
            recursive,
            format,
        } => {
            let mut loader = FileLoader::new(config);
            if let Some(method) = pdf_backend {
                loader = loader.with_pdf_method(method);
            }
            let records = parse(&loader, &paths, recursive)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                OutputFormat::Text => print_records(&records),
            }
        }
        Command::Backends { format } => {
            let statuses = available_backends(&config);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
                OutputFormat::Text => print_backends(&statuses),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "docparse=debug" } else { "docparse=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse(loader: &FileLoader, roots: &[PathBuf], recursive: bool) -> Result<Vec<DocumentRecord>> {
    let mut files = Vec::new();
    for root in roots {
        let found = discover_files(root, recursive)
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        files.extend(found);
    }
    tracing::debug!("{} files to load (PDF backend: {})", files.len(), loader.pdf_choice().name());

    let pb = ProgressBar::with_draw_target(Some(files.len() as u64), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut records = Vec::new();
    for file in &files {
        pb.set_message(file.display().to_string());
        let loaded = loader
            .load(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        records.extend(loaded);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(records)
}

fn print_records(records: &[DocumentRecord]) {
    for record in records {
        let mut header = format!(
            "==> {} [{}]",
            record.source().unwrap_or_default(),
            record.file_type().unwrap_or_default()
        );
        for key in ["page", "row", "page_number"] {
            if let Some(value) = record.metadata.get(key) {
                header.push_str(&format!(" {}={}", key, value));
            }
        }
        println!("{}", style(header).bold().cyan());
        println!("{}", record.content);
        println!();
    }
}

fn print_backends(statuses: &[BackendStatus]) {
    println!("{}", style("PDF backends").bold());
    for status in statuses {
        let state = if status.available {
            style("available").green()
        } else {
            style("unavailable").red()
        };
        println!(
            "  {} {}  {}",
            style(format!("{:<14}", status.name)).bold(),
            state,
            style(status.purpose).dim()
        );
        if let Some(ref hint) = status.install_hint {
            println!("      install: {}", hint);
        }
        if let Some(ref missing) = status.missing_config {
            println!("      missing: {}", missing);
        }
    }
}
