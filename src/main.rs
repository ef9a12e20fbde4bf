//! # Vitae CLI
//!
//! Usage:
//!   vitae render resume.json -t modern -o out/
//!   vitae render                     (renders the saved session)
//!   vitae import resume.json         (replaces the saved session's resume)
//!   vitae validate resume.json
//!   vitae templates
//!   vitae example > resume.json

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vitae::config::VitaeConfig;
use vitae::customize::{FontChoice, RenderStyle, StylePreferences, TextColorScheme};
use vitae::export::{ExportController, ExportOptions, ExportSnapshot, Exporter, FileDelivery, Notifier};
use vitae::font::FontBook;
use vitae::layout::{LayoutRenderer, RenderMode};
use vitae::model::ResumeDocument;
use vitae::raster::Rasterizer;
use vitae::storage::{FileStore, Session};
use vitae::template::{self, TemplateId};
use vitae::validate::{self, FormSection};

#[derive(Parser, Debug)]
#[command(name = "vitae", version, about = "Render a resume to a one-page, print-faithful PDF")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a resume to PDF
    Render {
        /// Resume JSON; `-` reads stdin. Omit to render the saved session.
        input: Option<PathBuf>,

        #[arg(short, long)]
        template: Option<TemplateId>,

        /// Font id, e.g. `inter` or `eb-garamond`
        #[arg(long)]
        font: Option<FontChoice>,

        /// Text color scheme, e.g. `charcoal` or `navy`
        #[arg(long)]
        color: Option<TextColorScheme>,

        /// Accent hex; must be one of the template's swatches
        #[arg(long)]
        accent: Option<String>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Raster scale factor (at least 2)
        #[arg(long)]
        scale: Option<u32>,

        /// Keep preview placeholders for empty sections
        #[arg(long)]
        placeholders: bool,

        /// Also write the rendered page as PNG
        #[arg(long, value_name = "PATH")]
        png: Option<PathBuf>,

        /// Print the laid-out page as JSON instead of exporting
        #[arg(long)]
        dump_layout: bool,
    },
    /// Save a resume into the session used by `render` without an input
    Import { input: PathBuf },
    /// Check a resume the way the builder form does
    Validate { input: PathBuf },
    /// List templates and their accent swatches
    Templates,
    /// Print an example resume
    Example,
}

/// Prints alerts to stderr.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("✗ {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VitaeConfig::load_from(path)
            .with_context(|| format!("Failed to load config at {}", path.display()))?,
        None => VitaeConfig::load().context("Failed to load vitae config")?.0,
    };

    match cli.command {
        Command::Render {
            input,
            template,
            font,
            color,
            accent,
            output,
            scale,
            placeholders,
            png,
            dump_layout,
        } => {
            let template = template.unwrap_or(config.default_template);
            let (document, mut prefs) = match input {
                Some(path) => (read_document(&path)?, StylePreferences::default()),
                None => {
                    let session = Session::open(FileStore::new(&config.storage_dir));
                    (session.document().clone(), session.preferences().clone())
                }
            };
            if let Some(font) = font {
                prefs.set_font(font);
            }
            if let Some(color) = color {
                prefs.set_text_color(color);
            }
            if let Some(accent) = accent {
                prefs.set_accent(template, &accent)?;
            }

            let fonts = load_fonts(config.font_dir.as_deref())?;
            let options = ExportOptions {
                scale: scale.unwrap_or(config.scale),
                placeholders,
                creation_date: Some(chrono::Utc::now()),
            };
            let snapshot = ExportSnapshot {
                document,
                template,
                style: RenderStyle::resolve(template, &prefs),
            };

            if dump_layout || png.is_some() {
                let mode = if placeholders { RenderMode::Preview } else { RenderMode::Final };
                let page = LayoutRenderer::new(&fonts).render(&snapshot.document, template, &snapshot.style, mode);
                if dump_layout {
                    println!("{}", serde_json::to_string_pretty(&page)?);
                    return Ok(());
                }
                if let Some(path) = &png {
                    let raster = Rasterizer::new(&fonts, options.scale)?.rasterize(&page)?;
                    std::fs::write(path, raster.to_png()?)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✓ Wrote preview to {}", path.display());
                }
            }

            let output = output.unwrap_or(config.output_dir);
            let controller = ExportController::new(
                Exporter::new(Arc::new(fonts), options),
                FileDelivery::new(output),
                StderrNotifier,
            );
            let receipt = controller
                .download(snapshot)
                .await
                .ok_or_else(|| anyhow::anyhow!("export failed"))?;
            eprintln!("✓ Written {} bytes to {}", receipt.bytes, receipt.location);
        }
        Command::Import { input } => {
            let document = read_document(&input)?;
            let mut session = Session::open(FileStore::new(&config.storage_dir));
            session.edit(|docs| docs.replace(document));
            if session.is_degraded() {
                anyhow::bail!("could not save into {}", config.storage_dir.display());
            }
            eprintln!("✓ Imported {} into {}", input.display(), config.storage_dir.display());
        }
        Command::Validate { input } => {
            let document = read_document(&input)?;
            let errors = validate::validate_all(&document);
            if errors.is_empty() {
                println!("✓ {} is complete", input.display());
                return Ok(());
            }
            for section in FormSection::ALL {
                let section_errors = validate::validate_section(section, &document);
                if section_errors.is_empty() {
                    continue;
                }
                println!("{section}:");
                for (key, message) in section_errors.iter() {
                    println!("  {key}: {message}");
                }
            }
            anyhow::bail!("{} problem(s) found", errors.len());
        }
        Command::Templates => {
            for descriptor in template::registry() {
                println!(
                    "{:<10} {:<24} {:<12} {}",
                    descriptor.id.as_str(),
                    descriptor.name,
                    format!("{:?}", descriptor.category),
                    descriptor.swatches.join(" ")
                );
            }
        }
        Command::Example => print!("{}", example_resume_json()),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(path: &Path) -> Result<ResumeDocument> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    let mut document = ResumeDocument::from_json(&raw)?;
    document.backfill_empty_sections();
    Ok(document)
}

fn load_fonts(dir: Option<&Path>) -> Result<FontBook> {
    let mut fonts = FontBook::new();
    if let Some(dir) = dir {
        let loaded = fonts.load_dir(dir)?;
        tracing::info!(loaded, dir = %dir.display(), "loaded font faces");
    }
    Ok(fonts)
}

fn example_resume_json() -> &'static str {
    r##"{
  "personalInfo": {
    "fullName": "Jane Doe",
    "title": "Senior Software Engineer",
    "email": "jane.doe@example.com",
    "phone": "(555) 010-4477",
    "location": "Austin, TX",
    "linkedin": "linkedin.com/in/janedoe",
    "github": "github.com/janedoe"
  },
  "summary": "Backend engineer with eight years of experience building payment and data platforms. Comfortable owning systems end to end, from schema design to on-call.",
  "experience": [
    {
      "id": "exp-1",
      "company": "Acme Payments",
      "position": "Senior Software Engineer",
      "location": "Austin, TX",
      "startDate": "Mar 2020",
      "current": true,
      "description": "Led the rewrite of the settlement service, cutting batch time from 4h to 20m\nDesigned an idempotent ledger API used by 30 internal teams\nMentored four engineers through their first on-call rotations"
    },
    {
      "id": "exp-2",
      "company": "Northwind Data",
      "position": "Software Engineer",
      "location": "Remote",
      "startDate": "Jun 2016",
      "endDate": "Feb 2020",
      "current": false,
      "description": "Built streaming ingestion for 2B events per day\nOwned the customer-facing query API"
    }
  ],
  "education": [
    {
      "id": "edu-1",
      "school": "University of Texas at Austin",
      "degree": "B.S.",
      "field": "Computer Science",
      "startDate": "2012",
      "endDate": "2016",
      "gpa": "3.8"
    }
  ],
  "skills": [
    { "id": "sk-1", "name": "Distributed systems" },
    { "id": "sk-2", "name": "API design" },
    { "id": "sk-3", "name": "Performance tuning" }
  ],
  "tools": [
    { "id": "tl-1", "name": "Rust" },
    { "id": "tl-2", "name": "PostgreSQL" },
    { "id": "tl-3", "name": "Kafka" }
  ],
  "languages": [
    { "id": "ln-1", "name": "English", "proficiency": "Native" },
    { "id": "ln-2", "name": "Spanish", "proficiency": "Professional" }
  ],
  "certifications": [
    { "id": "ct-1", "name": "AWS Solutions Architect", "issuer": "Amazon", "date": "2022" }
  ],
  "projects": [
    {
      "id": "pr-1",
      "name": "ledgerlite",
      "technologies": "Rust, SQLite",
      "repository": "github.com/janedoe/ledgerlite",
      "description": "Embedded double-entry ledger with crash-safe journaling"
    }
  ]
}
"##
}
