//! PDF Letterhead CLI tool
//!
//! A command-line tool for stamping rendered reports onto a letterhead template.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pdf_letterhead::config::AppConfig;
use pdf_letterhead::pdf::{extract_metadata, merge_with_template, TemplateSource};
use pdf_letterhead::report::{
    DiskStore, DocumentStore, GenerateRequest, GeneratedPdf, HttpRenderer, MemoryStore,
    ReportService,
};

/// PDF Letterhead - Print reports on a letterhead template
#[derive(Parser)]
#[command(name = "pdf-letterhead")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Stamp an already rendered PDF onto the letterhead
    pdf-letterhead merge content.pdf --template antet.pdf -o report.pdf

    # Render and stamp a plain-text report
    pdf-letterhead generate --title \"Monthly Report\" --content-file body.txt -o report.pdf

    # Rebuild a stored report
    pdf-letterhead fetch 0f8fad5b-d9cb-469f-a165-70867728950e -o report.pdf")]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay a content PDF onto the letterhead template
    Merge {
        /// Rendered content PDF
        content: PathBuf,

        /// Letterhead template PDF (overrides the configured one)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create a new report, render it and stamp it onto the letterhead
    Generate {
        /// Report title
        #[arg(long)]
        title: String,

        /// Report body
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,

        /// Read the report body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// How to interpret the body: "plain" or "html"
        #[arg(long, default_value = "plain")]
        content_type: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Regenerate a stored report by id
    Fetch {
        /// Document id
        id: Uuid,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the metadata of a stored report as JSON
    Metadata {
        /// Document id
        id: Uuid,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load(),
    }
    .apply_env();

    match cli.command {
        Commands::Merge { content, template, output } => cmd_merge(&config, content, template, output),
        Commands::Generate { title, content, content_file, content_type, output } => {
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("either --content or --content-file is required"),
            };
            let request = GenerateRequest::new(title, content, content_type);
            let pdf = service(&config, false)?.generate(&request)?;
            write_pdf(&pdf, &output)
        }
        Commands::Fetch { id, output } => {
            let pdf = service(&config, true)?.regenerate(id)?;
            write_pdf(&pdf, &output)
        }
        Commands::Metadata { id } => {
            let metadata = service(&config, true)?.metadata(id)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            Ok(())
        }
        Commands::Info { input } => cmd_info(input),
    }
}

/// Build the report service; `lookup` commands need a persistent store
fn service(
    config: &AppConfig,
    lookup: bool,
) -> anyhow::Result<ReportService<HttpRenderer, Box<dyn DocumentStore>>> {
    if lookup {
        config.store.persistent_path()?;
    }

    let renderer = HttpRenderer::new(config.renderer.endpoint.clone(), config.renderer.timeout())?;

    let store: Box<dyn DocumentStore> = match &config.store.path {
        Some(path) => Box::new(DiskStore::open(path)?),
        None => {
            tracing::warn!("No store path configured; documents will not outlive this process");
            Box::new(MemoryStore::new())
        }
    };

    let template = TemplateSource::from(config.template_path.clone());
    Ok(ReportService::new(renderer, store, template).with_margins(config.layout))
}

fn write_pdf(pdf: &GeneratedPdf, output: &Path) -> anyhow::Result<()> {
    std::fs::write(output, &pdf.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!("Document: {}", pdf.id);
    eprintln!("Created: {}", pdf.created_at.to_rfc3339());
    eprintln!("Output: {} ({})", output.display(), pdf.file_name());
    Ok(())
}

/// Overlay an existing content PDF onto the template
fn cmd_merge(
    config: &AppConfig,
    content: PathBuf,
    template: Option<PathBuf>,
    output: PathBuf,
) -> anyhow::Result<()> {
    if !content.exists() {
        bail!("Input file not found: {}", content.display());
    }

    let bytes = std::fs::read(&content)
        .with_context(|| format!("Failed to read {}", content.display()))?;
    let template = TemplateSource::from(template.unwrap_or_else(|| config.template_path.clone()));

    let merged = merge_with_template(&bytes, &template)?;
    std::fs::write(&output, merged)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!("Output: {}", output.display());
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(page_box) = metadata.first_page_box {
        println!("Page size: {:.1} x {:.1} pt", page_box.width(), page_box.height());
    }
    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
