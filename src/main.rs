use std::path::{Path, PathBuf};
#[cfg(feature = "database-mongodb")]
use std::sync::Arc;

use clap::Parser;
use price_alert_archiver::{
    archive::ArchiveExporter, config::ArchiverConfig, db::build_connection_parameters,
    observability,
};
#[cfg(feature = "database-mongodb")]
use price_alert_archiver::{db::StoreHandle, retention::PurgeCoordinator};

#[derive(Parser, Debug)]
#[command(version, about = "Archive and purge recent price alert history", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "price-alert-archiver.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Archive and purge price alerts (default)
    Run {
        /// Write the archive but do not delete anything
        #[arg(long)]
        dry_run: bool,
        /// Override retention.window_hours
        #[arg(long)]
        window_hours: Option<u64>,
    },
    /// Validate the config file and show what a run would touch
    Check,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        None => run_purge(&args.config, false, None).await,
        Some(Command::Run {
            dry_run,
            window_hours,
        }) => run_purge(&args.config, dry_run, window_hours).await,
        Some(Command::Check) => run_check(&args.config),
    }
}

fn load_config(config_path: &Path) -> ArchiverConfig {
    match ArchiverConfig::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    }
}

async fn run_purge(config_path: &Path, dry_run: bool, window_hours: Option<u64>) {
    let mut config = load_config(config_path);

    if dry_run {
        config.retention.dry_run = true;
    }
    if let Some(hours) = window_hours {
        config.retention.window_hours = hours;
        if let Err(e) = config.retention.validate() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %config_path.display(),
        "Starting price alert archiver"
    );

    #[cfg(feature = "database-mongodb")]
    {
        let store = Arc::new(StoreHandle::mongodb(&config.database));
        let coordinator = PurgeCoordinator::new(
            store,
            ArchiveExporter::new(&config.archive),
            config.retention.clone(),
        );

        match coordinator.run().await {
            Ok(report) => {
                tracing::info!(
                    fetched = report.fetched,
                    deleted = report.deleted(),
                    outcome = ?report.delete,
                    "Price alert archiver complete"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Price alert archiver failed");
                std::process::exit(1);
            }
        }
    }

    #[cfg(not(feature = "database-mongodb"))]
    {
        tracing::error!("Running the archiver requires the 'database-mongodb' feature");
        std::process::exit(1);
    }
}

fn run_check(config_path: &Path) {
    let config = load_config(config_path);

    // Connection option warnings are emitted while building parameters
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let params = build_connection_parameters(&config.database);
    let exporter = ArchiveExporter::new(&config.archive);
    let now = chrono::Utc::now();

    println!("Config OK: {}", config_path.display());
    println!("  store:    {}", params.redacted_uri());
    println!("  database: {}", params.database);
    println!(
        "  window:   {}h (cutoff {})",
        config.retention.window_hours,
        config.retention.cutoff(now)
    );
    println!("  archive:  {}", exporter.archive_path(now).display());
    if config.retention.dry_run {
        println!("  dry run:  records will be archived but not deleted");
    }
}
