//! fscatalog - Catalogs large file trees into per-project manifests.
//!
//! Usage:
//!   fscatalog --output-dir OUT DIR...       Catalog one or more trees
//!   fscatalog --output-dir OUT --json DIR   Print run totals as JSON
//!   fscatalog --help                        Show help

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fscatalog_core::{
    CatalogOptions, CatalogStats, DEFAULT_ANCHOR_FILE, DEFAULT_IGNORE_FILE, DEFAULT_SKIP_PATTERNS,
    Source, TimestampZone,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "FSCATALOG_LOG";

#[derive(Parser)]
#[command(
    name = "fscatalog",
    version,
    about = "Catalog file trees into project manifests",
    long_about = "fscatalog walks each base directory, treats every directory holding the \
                  anchor file as a project, and writes per-project manifests, summaries and \
                  documentation copies. Everything else is listed as unfiled.\n\n\
                  The output directory is deleted and regenerated on every run."
)]
struct Cli {
    /// Base directories to catalog, in order
    #[arg(required = true, value_name = "BASE_DIR")]
    sources: Vec<PathBuf>,

    /// Output directory (deleted and recreated)
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Marker file that designates a project root
    #[arg(long, default_value = DEFAULT_ANCHOR_FILE)]
    anchor_file: String,

    /// Marker file that excludes a directory subtree
    #[arg(long, default_value = DEFAULT_IGNORE_FILE)]
    ignore_file: String,

    /// Directory name glob skipped inside projects (repeatable, replaces the defaults)
    #[arg(long = "skip-dir", value_name = "GLOB")]
    skip_dirs: Vec<String>,

    /// Do not skip any tooling directories inside projects
    #[arg(long, conflicts_with = "skip_dirs")]
    no_skip: bool,

    /// Render modification times in UTC instead of the local offset
    #[arg(long)]
    utc: bool,

    /// Print run totals as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn skip_patterns(&self) -> Vec<String> {
        if self.no_skip {
            Vec::new()
        } else if self.skip_dirs.is_empty() {
            DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect()
        } else {
            self.skip_dirs.clone()
        }
    }

    fn options(&self) -> Result<CatalogOptions> {
        let zone = if self.utc {
            TimestampZone::Utc
        } else {
            TimestampZone::Local
        };
        CatalogOptions::builder()
            .output_dir(self.output_dir.clone())
            .anchor_file(self.anchor_file.clone())
            .ignore_file(self.ignore_file.clone())
            .skip_patterns(self.skip_patterns())
            .timestamp_zone(zone)
            .build()
            .wrap_err("Invalid options")
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let options = cli.options()?;
    let sources = build_sources(&cli.sources)?;

    let stats = fscatalog_scan::generate(&sources, &options).wrap_err_with(|| {
        format!(
            "Catalog failed; {} is incomplete and must be regenerated",
            options.output_dir.display()
        )
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&options, &stats);
    }

    Ok(())
}

/// Install the stderr log subscriber, filtered by `FSCATALOG_LOG`.
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Build one local source per base directory, keeping the given order.
fn build_sources(dirs: &[PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !dir.is_dir() {
            bail!("Not a directory: {}", dir.display());
        }
        sources.push(Source::local(dir));
    }
    Ok(sources)
}

/// Print a human-readable run summary.
fn print_summary(options: &CatalogOptions, stats: &CatalogStats) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" Catalog written to {}", options.output_dir.display());
    println!("{}", "─".repeat(60));
    println!(
        " {} source(s), {} project(s)",
        stats.sources, stats.projects
    );
    println!(
        " {} project files ({})",
        stats.project_files,
        format_size(stats.project_size)
    );
    println!(
        " {} unfiled files ({})",
        stats.unfiled_files,
        format_size(stats.unfiled_size)
    );
    println!(" {} documents copied", stats.documents_copied);
    println!(
        " {} ignored, {} skipped directories",
        stats.ignored_dirs, stats.skipped_dirs
    );
    if stats.projects_replaced > 0 {
        println!(
            " {} project(s) replaced by a later project of the same name",
            stats.projects_replaced
        );
    }
    println!();
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
