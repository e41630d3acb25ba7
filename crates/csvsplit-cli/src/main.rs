//! csvsplit CLI
//!
//! Command-line front end for deduplicating a CSV column and splitting it
//! into numbered files of bounded size.

use clap::{Args, Parser, Subcommand};
use csvsplit_core::{
    preview, run_batch, split, BatchFile, BatchJob, SplitOptions, SplitReport,
    DEFAULT_COLUMN_INDEX, DEFAULT_MAX_ROWS_PER_FILE,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "csvsplit")]
#[command(about = "Split a deduplicated CSV column into capped files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate one column and write it out in numbered files
    Split {
        #[command(flatten)]
        job: JobArgs,

        /// Output directory (must exist)
        #[arg(short, long)]
        output: PathBuf,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what `split` would write without writing anything
    Preview {
        #[command(flatten)]
        job: JobArgs,

        /// Output directory used for the listed file names
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Run every job in a batch file
    Batch {
        /// Path to batch file (JSON)
        #[arg(short, long)]
        batch: PathBuf,
    },

    /// Create a batch file template
    CreateBatch {
        /// Output path for the batch file
        #[arg(short, long)]
        output: PathBuf,

        /// Output directory for the split files
        #[arg(long)]
        export_dir: PathBuf,

        /// Source CSV files to include
        #[arg(short, long)]
        file: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Path to the source CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// 1-based column to extract
    #[arg(short, long, default_value_t = DEFAULT_COLUMN_INDEX, allow_negative_numbers = true)]
    column: i64,

    /// Maximum data rows per output file
    #[arg(short, long, default_value_t = DEFAULT_MAX_ROWS_PER_FILE, allow_negative_numbers = true)]
    max_rows: i64,
}

impl JobArgs {
    fn options(&self, output: &Path) -> csvsplit_core::Result<SplitOptions> {
        SplitOptions::new(&self.file, self.column, self.max_rows, output)
    }
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> csvsplit_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split { job, output, json } => cmd_split(&job, &output, json),
        Commands::Preview { job, output } => cmd_preview(&job, &output),
        Commands::Batch { batch } => cmd_batch(&batch),
        Commands::CreateBatch {
            output,
            export_dir,
            file,
        } => cmd_create_batch(&output, &export_dir, &file),
    }
}

fn cmd_split(job: &JobArgs, output: &Path, json: bool) -> csvsplit_core::Result<()> {
    info!(
        file = %job.file.display(),
        column = job.column,
        max_rows = job.max_rows,
        output = %output.display(),
        "split requested"
    );

    let options = job.options(output)?;
    let report = split(&options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    println!();
    println!("Wrote {} files to {}", report.file_count(), output.display());
    for path in &report.files {
        println!("  - {}", path.display());
    }

    Ok(())
}

fn cmd_preview(job: &JobArgs, output: &Path) -> csvsplit_core::Result<()> {
    let options = job.options(output)?;
    let report = preview(&options)?;

    print_summary(&report);
    println!();
    println!("Would write {} files:", report.file_count());
    for path in &report.files {
        println!("  - {}", path.display());
    }

    Ok(())
}

fn cmd_batch(batch_path: &Path) -> csvsplit_core::Result<()> {
    let batch = BatchFile::load(batch_path)?;

    println!("Running batch with {} jobs", batch.jobs.len());
    println!("Output: {}", batch.output_dir.display());
    println!();

    let result = run_batch(&batch);

    for report in &result.reports {
        println!(
            "  {}: {} distinct values, {} files",
            report.source.display(),
            report.distinct_values,
            report.file_count()
        );
    }

    println!();
    println!("Batch complete:");
    println!("  {} jobs succeeded", result.reports.len());
    println!("  {} total files written", result.files_written());

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for (path, err) in &result.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn cmd_create_batch(output: &Path, export_dir: &Path, files: &[PathBuf]) -> csvsplit_core::Result<()> {
    let jobs = if files.is_empty() {
        vec![BatchJob::new("input1.csv"), BatchJob::new("input2.csv")]
    } else {
        files.iter().map(BatchJob::new).collect()
    };

    let batch = BatchFile {
        output_dir: export_dir.to_path_buf(),
        jobs,
    };

    batch.save(output)?;
    println!("Created batch file: {}", output.display());
    println!();
    println!("Edit the file to configure your batch, then run:");
    println!("  csvsplit batch --batch {}", output.display());

    Ok(())
}

fn print_summary(report: &SplitReport) {
    println!("File: {}", report.source.display());
    println!("Records read: {}", report.records_read);
    println!("Distinct values: {}", report.distinct_values);
    if report.skipped_rows > 0 {
        println!("Skipped rows (not enough columns): {}", report.skipped_rows);
    }
    if report.empty_values > 0 {
        println!("Empty values ignored: {}", report.empty_values);
    }
    if let Some(record) = report.truncated_at {
        println!("Warning: stopped reading at unparseable record {}", record);
    }
}
