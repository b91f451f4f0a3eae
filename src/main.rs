use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use exiftool_desk::app::EditorSession;
use exiftool_desk::config::AppConfig;
use exiftool_desk::core::bulk::BatchFileList;
use exiftool_desk::core::metadata::{ExifTool, MetadataTool};
use exiftool_desk::core::templates::TemplateStore;
use exiftool_desk::core::worker::{ToolJob, ToolOutcome, ToolWorker};
use exiftool_desk::models::{BatchOperation, ShiftDelta, TagValue, Template};

#[derive(Parser)]
#[command(name = "exiftool_desk", version, about = "Inspect and edit file metadata through ExifTool")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the exiftool executable, overriding discovery
    #[arg(long, global = true)]
    exiftool: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print all tags grouped by family
    Show {
        file: PathBuf,
        /// Only tags whose name or value contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Set one or more tags and save
    Set {
        file: PathBuf,
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
    /// Remove all metadata
    Strip { file: PathBuf },
    /// Shift every date/time tag
    Shift {
        file: PathBuf,
        #[command(flatten)]
        delta: ShiftArgs,
        /// Print the resulting dates without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Write all tags to a JSON file
    Export { file: PathBuf, output: PathBuf },
    /// Merge tags from a JSON export into the file and save
    Import { file: PathBuf, input: PathBuf },
    /// Remove all metadata from many files; directories are expanded
    BatchStrip {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Manage saved templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Save embedded album art of an audio file
    Art { file: PathBuf, output: PathBuf },
}

#[derive(Subcommand)]
enum TemplateAction {
    List,
    Show { name: String },
    /// Save a template from a text file of `Key=Value` lines
    Save { name: String, file: PathBuf },
    Delete { name: String },
    /// Apply a template to a file and save
    Apply { name: String, file: PathBuf },
}

#[derive(clap::Args)]
struct ShiftArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    years: i32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    months: i32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    days: i32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    hours: i32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    minutes: i32,
}

impl From<&ShiftArgs> for ShiftDelta {
    fn from(args: &ShiftArgs) -> Self {
        ShiftDelta::new(args.years, args.months, args.days, args.hours, args.minutes)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(executable) = args.exiftool {
        config.tool.executable = Some(executable);
    }

    let tool: Arc<dyn MetadataTool> =
        Arc::new(ExifTool::discover(&config.tool).context("ExifTool is required but was not found")?);

    match args.command {
        Command::Show { file, filter } => show(tool, &file, filter.as_deref().unwrap_or("")),
        Command::Set { file, assignments } => set(tool, &file, &assignments),
        Command::Strip { file } => {
            let mut session = open_session(tool, &file)?;
            session.strip_all()?;
            println!("{}", session.status());
            Ok(())
        }
        Command::Shift {
            file,
            delta,
            dry_run,
        } => shift(tool, &file, &ShiftDelta::from(&delta), dry_run),
        Command::Export { file, output } => {
            let mut session = open_session(tool, &file)?;
            session.export_to(&output)?;
            println!("{}", session.status());
            Ok(())
        }
        Command::Import { file, input } => {
            let mut session = open_session(tool, &file)?;
            let count = session.import_from(&input)?;
            println!("{}", session.status());
            if count > 0 {
                session.save()?;
                println!("{}", session.status());
            }
            Ok(())
        }
        Command::BatchStrip { paths } => batch_strip(tool, &paths),
        Command::Template { action } => {
            let store = TemplateStore::open(config.templates.store_path())?;
            template(tool, store, action)
        }
        Command::Art { file, output } => {
            let session = open_session(tool, &file)?;
            let Some(bytes) = session.album_art() else {
                bail!("no album art in {}", file.display());
            };
            fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Saved {} bytes to {}", bytes.len(), output.display());
            Ok(())
        }
    }
}

fn open_session(tool: Arc<dyn MetadataTool>, file: &Path) -> Result<EditorSession> {
    let mut session = EditorSession::new(tool);
    session
        .open(file)
        .with_context(|| format!("failed to read metadata from {}", file.display()))?;
    Ok(session)
}

fn show(tool: Arc<dyn MetadataTool>, file: &Path, filter: &str) -> Result<()> {
    let session = open_session(tool, file)?;

    for group in session.grouped_view(filter) {
        println!("[{}] ({})", group.name, group.len());
        for entry in &group.entries {
            println!("  {:<32} {}", entry.tag, entry.display);
        }
    }
    Ok(())
}

fn set(tool: Arc<dyn MetadataTool>, file: &Path, assignments: &[String]) -> Result<()> {
    let mut session = open_session(tool, file)?;

    for assignment in assignments {
        let Some((key, value)) = assignment.split_once('=') else {
            bail!("expected KEY=VALUE, got '{assignment}'");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty tag name in '{assignment}'");
        }
        session.set_field(key, TagValue::text(value))?;
    }

    let written = session.save()?;
    println!("Saved {written} field(s) to {}", file.display());
    Ok(())
}

fn shift(tool: Arc<dyn MetadataTool>, file: &Path, delta: &ShiftDelta, dry_run: bool) -> Result<()> {
    let mut session = open_session(tool, file)?;

    for preview in session.shift_preview(delta) {
        println!("{}: {} -> {}", preview.key, preview.before, preview.after);
    }

    if dry_run {
        return Ok(());
    }

    if !session.shift_dates(delta)? {
        warn!("all shift amounts are zero, nothing written");
    }
    println!("{}", session.status());
    Ok(())
}

fn batch_strip(tool: Arc<dyn MetadataTool>, paths: &[PathBuf]) -> Result<()> {
    let mut files = BatchFileList::new();
    for path in paths {
        if path.is_dir() {
            files
                .add_folder(path)
                .with_context(|| format!("failed to list {}", path.display()))?;
        } else {
            files.add_files([path]);
        }
    }

    if files.is_empty() {
        bail!("no supported files to process");
    }
    info!(files = %files.count_label(), "starting batch");

    let worker = ToolWorker::spawn(tool).context("failed to start tool worker")?;
    worker
        .submit(ToolJob::Batch {
            files: files.paths().to_vec(),
            operation: BatchOperation::StripAll,
        })
        .context("failed to queue batch")?;

    while let Some(outcome) = worker.recv() {
        match outcome {
            ToolOutcome::Progress(event) => {
                println!("Processing {}/{}: {}", event.index + 1, event.total, event.filename());
            }
            ToolOutcome::BatchFinished(report) => {
                for failure in report.failures() {
                    eprintln!(
                        "failed: {}: {}",
                        failure.path.display(),
                        failure.error.as_deref().unwrap_or("unknown error")
                    );
                }
                println!(
                    "Processed {} file(s), {} succeeded, {} failed",
                    report.attempted(),
                    report.succeeded(),
                    report.failed()
                );
                return Ok(());
            }
            ToolOutcome::Loaded { .. } => {}
        }
    }

    bail!("tool worker stopped before the batch finished")
}

fn template(tool: Arc<dyn MetadataTool>, mut store: TemplateStore, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => {
            if store.is_empty() {
                println!("No templates in {}", store.path().display());
            }
            for name in store.names() {
                println!("{name}");
            }
        }
        TemplateAction::Show { name } => {
            print!("{}", store.require(&name)?.to_text());
        }
        TemplateAction::Save { name, file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let template = Template::new(name.trim(), Template::parse_text(&text));
            let count = template.len();
            store.save(template)?;
            println!("Saved template '{}' with {count} tag(s)", name.trim());
        }
        TemplateAction::Delete { name } => {
            if !store.delete(&name)? {
                bail!("template not found: {name}");
            }
            println!("Deleted template '{name}'");
        }
        TemplateAction::Apply { name, file } => {
            let template = store.require(&name)?;
            let mut session = open_session(tool, &file)?;
            let count = session.apply_template(&template)?;
            println!("{}", session.status());
            if count > 0 {
                session.save()?;
            }
        }
    }
    Ok(())
}
