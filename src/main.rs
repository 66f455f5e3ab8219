// src/main.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

mod blob;
mod cache;
mod compositor;
mod config;
mod logging;
mod meta;
mod pipeline;
mod query;
#[cfg(test)]
mod test_utils;

use crate::blob::S3BlobStore;
use crate::cache::MokaListingCache;
use crate::meta::{JobOptionsPatch, PostgresMetadataStore};
use crate::pipeline::Engine;
use crate::query::QueryService;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct OptionOverrides {
    /// Width of each resized tile in pixels
    #[arg(long)]
    resize_width: Option<u32>,

    /// Height of each resized tile in pixels
    #[arg(long)]
    resize_height: Option<u32>,

    /// Number of rows in the collage grid
    #[arg(long)]
    rows: Option<u32>,

    /// Number of columns in the collage grid
    #[arg(long)]
    cols: Option<u32>,

    /// Requested output width in pixels
    #[arg(long)]
    output_width: Option<u32>,

    /// Requested output height in pixels
    #[arg(long)]
    output_height: Option<u32>,
}

impl From<OptionOverrides> for JobOptionsPatch {
    fn from(overrides: OptionOverrides) -> Self {
        JobOptionsPatch {
            resize_width: overrides.resize_width,
            resize_height: overrides.resize_height,
            collage_rows: overrides.rows,
            collage_cols: overrides.cols,
            output_width: overrides.output_width,
            output_height: overrides.output_height,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload an image and create a processing job
    Upload {
        /// Path to the image file
        file: PathBuf,

        /// Owner the job is recorded under
        #[arg(long)]
        owner: String,

        #[command(flatten)]
        options: OptionOverrides,
    },
    /// Run the resize/collage pipeline for an uploaded job
    Process {
        /// Job identifier returned by upload
        job_id: Uuid,

        #[command(flatten)]
        options: OptionOverrides,
    },
    /// Show processing progress and retrieval URLs for a job
    Progress {
        /// Job identifier
        job_id: Uuid,
    },
    /// List all jobs for an owner
    List {
        /// Owner name
        owner: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config, e);
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;
    info!("Collage processor v{}", env!("CARGO_PKG_VERSION"));

    let meta = Arc::new(PostgresMetadataStore::new(&config.database).await?);
    let blobs = Arc::new(S3BlobStore::new(&config.s3).await?);

    let result = match cli.command {
        Commands::Upload {
            file,
            owner,
            options,
        } => {
            let engine = Engine::new(meta, blobs, &config.processing)?;
            upload(&engine, &file, &owner, options.into()).await
        }
        Commands::Process { job_id, options } => {
            let engine = Engine::new(meta, blobs, &config.processing)?;
            process_job(&engine, job_id, options.into()).await
        }
        Commands::Progress { job_id } => {
            let cache = Arc::new(MokaListingCache::new(&config.cache));
            let service = QueryService::new(
                meta,
                blobs,
                cache,
                config.cache.listing_ttl_secs,
                config.processing.signed_url_ttl_secs,
            );
            show_progress(&service, job_id).await
        }
        Commands::List { owner } => {
            let cache = Arc::new(MokaListingCache::new(&config.cache));
            let service = QueryService::new(
                meta,
                blobs,
                cache,
                config.cache.listing_ttl_secs,
                config.processing.signed_url_ttl_secs,
            );
            list_jobs(&service, &owner).await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    Ok(())
}

async fn upload(
    engine: &Engine<PostgresMetadataStore, S3BlobStore>,
    file: &PathBuf,
    owner: &str,
    overrides: JobOptionsPatch,
) -> Result<()> {
    let raw_bytes = tokio::fs::read(file)
        .await
        .context(format!("Failed to read {}", file.display()))?;

    let receipt = engine
        .start_upload(owner, raw_bytes.into(), overrides)
        .await?;

    println!("{}", receipt.job_id);
    info!("Uploaded {} as job {}", file.display(), receipt.job_id);
    Ok(())
}

async fn process_job(
    engine: &Engine<PostgresMetadataStore, S3BlobStore>,
    job_id: Uuid,
    overrides: JobOptionsPatch,
) -> Result<()> {
    let outcome = engine.process(job_id, overrides).await?;

    println!("resized:  {}", outcome.resized_url);
    println!("collage:  {}", outcome.collage_url);
    Ok(())
}

async fn show_progress(
    service: &QueryService<PostgresMetadataStore, S3BlobStore, MokaListingCache>,
    job_id: Uuid,
) -> Result<()> {
    let report = service.get_progress(job_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn list_jobs(
    service: &QueryService<PostgresMetadataStore, S3BlobStore, MokaListingCache>,
    owner: &str,
) -> Result<()> {
    let jobs = service.list_by_owner(owner).await?;
    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}
