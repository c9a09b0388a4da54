//! sparcify CLI
//!
//! Classifies lab image paths by naming convention, normalizes them to
//! SPARC-style metadata and canonical paths, and applies the result: CSV
//! metadata log, XMP tags, renames, and warehouse upload.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sparcify::batch::{BatchItem, SourceImage};
use sparcify::warehouse::{self, UploadOutcome};
use sparcify::{
    classify, deliver, BatchCollector, BatchSummary, Config, ImageWalker, MetadataLog,
    MetadataRow, NamingConvention, NormalizedImage, Normalizer, Placement, SqliteWarehouse,
    TagWriter, Uploader, XmpSidecarWriter,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sparcify")]
#[command(
    author,
    version,
    about = "Normalize lab image paths to SPARC metadata and canonical paths"
)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "SPARCIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the naming convention of each path
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Parse paths and print their metadata and canonical path
    Inspect {
        #[arg(required = true)]
        paths: Vec<String>,
        /// Modification date for paths that do not exist on disk (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Walk a directory, normalize every image, and apply the chosen sinks
    Scan {
        #[command(flatten)]
        walk: WalkArgs,
        /// Append one row per image to this CSV file
        #[arg(long)]
        metadata_file: Option<PathBuf>,
        /// Rename each file to its canonical file name, in place
        #[arg(long, conflicts_with = "relocate")]
        rename_in_place: bool,
        /// Move each file to DIR/<canonical path>
        #[arg(long, value_name = "DIR")]
        relocate: Option<PathBuf>,
        /// Write an XMP sidecar with searchable tags
        #[arg(long)]
        write_tags: bool,
        /// One JSON object per normalized image
        #[arg(long)]
        json: bool,
    },

    /// Walk a directory and upload every image into the collection hierarchy
    Upload {
        #[command(flatten)]
        walk: WalkArgs,
        /// Dataset (top-level collection) to upload into
        #[arg(long)]
        dataset: Option<String>,
        /// Warehouse database
        #[arg(long)]
        warehouse: Option<PathBuf>,
        /// Label recorded with each upload
        #[arg(long)]
        profile: Option<String>,
        /// Upload what exists even when some sources are missing
        #[arg(long)]
        allow_missing: bool,
    },
}

#[derive(Args)]
struct WalkArgs {
    /// Directory to walk
    #[arg(default_value = ".")]
    root: PathBuf,
    /// Image extension to pick up
    #[arg(long)]
    extension: Option<String>,
    /// Normalize across all cores
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify { paths } => {
            for path in &paths {
                println!("{}\t{}", classify(path), path);
            }
            Ok(())
        }
        Commands::Inspect { paths, date, json } => inspect(&config, &paths, date, json),
        Commands::Scan {
            walk,
            metadata_file,
            rename_in_place,
            relocate,
            write_tags,
            json,
        } => {
            let placement = match (rename_in_place, relocate) {
                (true, _) => Placement::RenameInPlace,
                (false, Some(dest)) => Placement::Relocate(dest),
                (false, None) => Placement::Leave,
            };
            let sinks = ScanSinks {
                metadata_file,
                placement,
                write_tags,
                json,
            };
            scan(&config, &walk, sinks)
        }
        Commands::Upload {
            walk,
            dataset,
            warehouse,
            profile,
            allow_missing,
        } => {
            let dataset = match dataset.or_else(|| config.upload.dataset.clone()) {
                Some(dataset) => dataset,
                None => bail!("No dataset given: pass --dataset or set upload.dataset in the config"),
            };
            let warehouse = warehouse.unwrap_or_else(|| config.upload.warehouse.clone());
            let profile = profile.or_else(|| config.upload.profile.clone());
            upload(&config, &walk, &dataset, &warehouse, profile, allow_missing)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sparcify=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sparcify=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ============================================================================
// inspect
// ============================================================================

#[derive(Serialize)]
struct Inspection {
    convention: NamingConvention,
    #[serde(flatten)]
    row: MetadataRow,
    warnings: Vec<String>,
}

impl Inspection {
    fn new(image: &NormalizedImage) -> Self {
        Self {
            convention: image.convention,
            row: image.record.to_row(image.canonical.as_str()),
            warnings: image.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn inspect(config: &Config, paths: &[String], date: Option<NaiveDate>, json: bool) -> Result<()> {
    let normalizer = Normalizer::new(config.parse_options());
    let mut failed = 0;

    for path in paths {
        let modified = modified_date(path, date)?;
        match normalizer.normalize(path, modified) {
            Ok(image) => {
                for warning in &image.warnings {
                    warn!(path = %path, "{}", warning);
                }
                let inspection = Inspection::new(&image);
                if json {
                    println!("{}", serde_json::to_string(&inspection)?);
                } else {
                    print_inspection(path, &inspection);
                }
            }
            Err(e) => {
                eprintln!("{}: {}", path, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} paths could not be normalized", failed, paths.len());
    }
    Ok(())
}

/// Date from the file when it exists, else `--date`, else today
fn modified_date(path: &str, fallback: Option<NaiveDate>) -> Result<NaiveDate> {
    if Path::new(path).exists() {
        return Ok(SourceImage::from_path(Path::new(path))?.modified);
    }
    Ok(fallback.unwrap_or_else(|| {
        warn!(path = %path, "Not on disk and no --date given, using today");
        Local::now().date_naive()
    }))
}

fn print_inspection(path: &str, inspection: &Inspection) {
    let row = &inspection.row;
    println!("{}", path);
    println!("  convention     {}", inspection.convention);
    println!("  canonical      {}", row.canonical_path);
    println!("  sample_id      {}", row.sample_id);
    println!("  specimen       {}", row.specimen);
    println!("  laterality     {}", row.laterality);
    println!("  stain          {}", row.stain);
    println!("  channel        {}", row.channel);
    println!("  section        {}", row.section);
    println!("  magnification  {}", row.magnification);
    if let Some(z) = &row.z_stack {
        println!("  z_stack        {}", z);
    }
    println!("  filetype       {}", row.filetype);
    println!("  creation_date  {}", row.creation_date);
    for warning in &inspection.warnings {
        println!("  warning        {}", warning);
    }
}

// ============================================================================
// scan
// ============================================================================

struct ScanSinks {
    metadata_file: Option<PathBuf>,
    placement: Placement,
    write_tags: bool,
    json: bool,
}

/// Walk `root` and normalize, sequentially and lazily unless parallel
fn for_each_item(
    config: &Config,
    walk: &WalkArgs,
    mut apply: impl FnMut(BatchItem) -> Result<()>,
) -> Result<BatchSummary> {
    let extension = walk.extension.as_deref().unwrap_or(&config.extension);
    let walker = ImageWalker::new(extension);
    let collector = BatchCollector::new(Normalizer::new(config.parse_options()));
    let sources = walker
        .walk(&walk.root)
        .context(format!("Cannot scan {}", walk.root.display()))?;

    let items: Box<dyn Iterator<Item = BatchItem> + '_> = if walk.parallel || config.parallel {
        Box::new(collector.collect_parallel(sources.collect()).into_iter())
    } else {
        Box::new(collector.collect(sources))
    };

    let mut summary = BatchSummary::default();
    for item in items {
        summary.record(&item);
        apply(item)?;
    }
    Ok(summary)
}

fn scan(config: &Config, walk: &WalkArgs, sinks: ScanSinks) -> Result<()> {
    let mut log = match &sinks.metadata_file {
        Some(path) => Some(MetadataLog::open(path)?),
        None => None,
    };
    let xmp = XmpSidecarWriter;
    let tagger: Option<&dyn TagWriter> = if sinks.write_tags {
        Some(&xmp)
    } else {
        None
    };
    let mut sink_failures = 0;

    let summary = for_each_item(config, walk, |item| {
        let Ok(image) = item else {
            return Ok(());
        };
        if sinks.json {
            println!("{}", serde_json::to_string(&Inspection::new(&image))?);
        }
        if let Err(e) = deliver(&image, &sinks.placement, log.as_mut(), tagger) {
            warn!(path = %image.record.source_path(), "{:#}", e);
            sink_failures += 1;
        }
        Ok(())
    })?;

    if let Some(log) = log.as_mut() {
        log.flush()?;
        info!("Wrote {} rows to {}", log.rows_written(), log.path().display());
    }

    info!(
        "Scanned {} files: {} normalized, {} unrecognized, {} failed to parse, {} warnings",
        summary.seen, summary.normalized, summary.unrecognized, summary.parse_failed, summary.warnings
    );
    if sinks.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "seen {}  normalized {}  unrecognized {}  parse-failed {}",
            summary.seen, summary.normalized, summary.unrecognized, summary.parse_failed
        );
    }
    if sink_failures > 0 {
        bail!("{} images could not be written to every sink", sink_failures);
    }
    Ok(())
}

// ============================================================================
// upload
// ============================================================================

fn upload(
    config: &Config,
    walk: &WalkArgs,
    dataset: &str,
    warehouse_path: &Path,
    profile: Option<String>,
    allow_missing: bool,
) -> Result<()> {
    let mut images = Vec::new();
    let summary = for_each_item(config, walk, |item| {
        if let Ok(image) = item {
            images.push(image);
        }
        Ok(())
    })?;
    info!(
        "{} of {} files normalized for upload",
        summary.normalized, summary.seen
    );

    warehouse::preflight(&images, allow_missing)?;

    let store = SqliteWarehouse::open(warehouse_path)?;
    let mut uploader = Uploader::new(store, dataset, profile);
    for image in &images {
        match uploader.upload(image) {
            Ok(UploadOutcome::Uploaded { name, .. }) => println!("uploaded  {}", name),
            Ok(UploadOutcome::AlreadyPresent { name, .. }) => println!("present   {}", name),
            Err(e) => warn!(path = %image.record.source_path(), "Upload failed: {:#}", e),
        }
    }

    let totals = uploader.summary();
    println!(
        "uploaded {}  already present {}  failed {}  collections created {}",
        totals.uploaded, totals.already_present, totals.failed, totals.collections_created
    );
    if totals.failed > 0 {
        bail!("{} uploads failed", totals.failed);
    }
    Ok(())
}
