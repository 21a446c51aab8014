//! reelmap: turns food videos into a deduplicated map of venues.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{info, warn};

use reelmap::config::{load_config, Config};
use reelmap::db::Database;
use reelmap::error::WorkerError;
use reelmap::ingest::IngestService;
use reelmap::pipeline::{BroadcastProgress, Pipeline, ProgressEvent};
use reelmap::places::{PlaceCatalog, PlaceQuery};
use reelmap::worker::{BatchWorker, WorkerScheduler};
use reelmap::ReelmapError;

#[derive(Parser)]
#[command(name = "reelmap")]
#[command(about = "Turns food videos from social platforms into a map of venues")]
#[command(version)]
struct Cli {
    /// Configuration file path. Built-in defaults are used when omitted.
    #[arg(short, long, env = "REELMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process queued sources
    Worker {
        /// Process the current queue once and exit
        #[arg(long)]
        once: bool,

        /// Print progress events as JSON lines
        #[arg(long)]
        events: bool,
    },

    /// Queue a video URL for processing
    Enqueue {
        url: String,

        /// Process the queue right away instead of leaving it for the worker
        #[arg(long)]
        run_now: bool,
    },

    /// Show the place a source resolved to, or its current status
    Status { source_id: i64 },

    /// Put a source back into the queue
    Requeue { source_id: i64 },

    /// List places, newest first
    Places {
        /// Bounding box as minLng,minLat,maxLng,maxLat
        #[arg(long)]
        bbox: Option<String>,

        /// Text search over name, address and city
        #[arg(short, long)]
        query: Option<String>,

        /// Only places with an id below this cursor
        #[arg(long)]
        before: Option<i64>,

        #[arg(short, long)]
        limit: Option<u32>,

        /// Print a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Show one place by id or slug
    Place { id_or_slug: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ReelmapError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    reelmap::logging::init(&config.logging)?;

    let db = open_database(&config)?;

    match cli.command {
        Commands::Worker { once, events } => run_worker(db, &config, once, events),
        Commands::Enqueue { url, run_now } => {
            let receipt = IngestService::new(db.clone()).enqueue(&url, false)?;
            print_json(&receipt)?;
            if run_now {
                let report = batch_worker(db, &config, Arc::new(AtomicBool::new(false)))?.run_once()?;
                print_json(&report)?;
            }
            Ok(())
        }
        Commands::Status { source_id } => {
            let lookup = IngestService::new(db).place_for_source(source_id)?;
            print_json(&lookup)
        }
        Commands::Requeue { source_id } => {
            let receipt = IngestService::new(db).requeue(source_id, false)?;
            print_json(&receipt)
        }
        Commands::Places {
            bbox,
            query,
            before,
            limit,
            geojson,
        } => {
            let page = PlaceCatalog::new(db).list(&PlaceQuery {
                bbox,
                q: query,
                before_id: before,
                limit,
            })?;
            if geojson {
                print_json(&page.to_geojson())
            } else {
                print_json(&page)
            }
        }
        Commands::Place { id_or_slug } => {
            let catalog = PlaceCatalog::new(db);
            let detail = match id_or_slug.parse::<i64>() {
                Ok(id) => catalog.detail(id)?,
                Err(_) => catalog.detail_by_slug(&id_or_slug)?,
            };
            match detail {
                Some(detail) => print_json(&detail),
                None => {
                    eprintln!("No place '{}'", id_or_slug);
                    Ok(())
                }
            }
        }
    }
}

fn open_database(config: &Config) -> Result<Database, ReelmapError> {
    let path = config.resolved_database_path().ok_or_else(|| {
        reelmap::ConfigError::Validation {
            message: "No database_path configured and no home directory found".to_string(),
        }
    })?;
    Ok(Database::open(&path)?)
}

fn batch_worker(
    db: Database,
    config: &Config,
    shutdown: Arc<AtomicBool>,
) -> Result<BatchWorker, ReelmapError> {
    let pipeline = Pipeline::from_config(db, config)?;
    Ok(BatchWorker::new(Arc::new(pipeline)).with_shutdown(shutdown))
}

fn run_worker(db: Database, config: &Config, once: bool, events: bool) -> Result<(), ReelmapError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut worker = batch_worker(db, config, Arc::clone(&shutdown))?;
    let mut printer = None;
    if events {
        let progress = BroadcastProgress::channel(256);
        printer = Some(spawn_event_printer(progress.subscribe())?);
        worker = worker.with_progress(Arc::new(progress));
    }

    if once {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .map_err(|e| WorkerError::SignalHandler(e.to_string()))?;
        let report = worker.run_once();
        // Closes the event channel.
        drop(worker);
        if let Some(handle) = printer {
            let _ = handle.join();
        }
        return print_json(&report?);
    }

    let idle_delay = Duration::from_secs(config.worker.idle_delay_secs);
    let scheduler = WorkerScheduler::start_with_shutdown(worker, idle_delay, Arc::clone(&shutdown))?;

    let trigger = scheduler.trigger();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
        trigger.trigger();
    })
    .map_err(|e| WorkerError::SignalHandler(e.to_string()))?;

    info!("Worker running, press Ctrl-C to stop");
    scheduler.wait();
    if let Some(handle) = printer {
        let _ = handle.join();
    }
    Ok(())
}

fn spawn_event_printer(
    mut events: Receiver<ProgressEvent>,
) -> Result<JoinHandle<()>, WorkerError> {
    thread::Builder::new()
        .name("reelmap-events".into())
        .spawn(move || loop {
            match events.blocking_recv() {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to render progress event: {}", e),
                },
                Err(RecvError::Lagged(missed)) => warn!("Dropped {} progress events", missed),
                Err(RecvError::Closed) => break,
            }
        })
        .map_err(|e| WorkerError::SpawnFailed(e.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ReelmapError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
