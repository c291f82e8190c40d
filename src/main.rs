use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use testament::application::engine::TestamentEngine;
use testament::config::{DEFAULT_VALIDITY_DAYS, EngineConfig};
use testament::domain::clock::{Clock, ManualClock, SystemClock};
use testament::domain::ports::LedgerBox;
use testament::infrastructure::in_memory::InMemoryStore;
use testament::interfaces::csv::command_reader::CommandReader;
use testament::interfaces::csv::event_writer::EventWriter;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Days a subscription stays valid after its last renewal
    #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
    validity_days: u64,
}

fn init_logging() {
    // stdout carries the event CSV, so logs go to stderr.
    // Accepted `RUST_LOG` values are `trace`, `debug`, `info`, `warn`, and `error`.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }
}

fn in_memory_ledger() -> LedgerBox {
    Box::new(InMemoryStore::new())
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerBox> {
    use testament::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            info!("Using persistent RocksDB storage");
            Ok(Box::new(store))
        }
        None => Ok(in_memory_ledger()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_ledger())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let ledger = open_ledger(cli.db_path)?;
    let clock = Arc::new(ManualClock::new(SystemClock.now()));
    let engine = TestamentEngine::new(
        ledger,
        clock.clone(),
        EngineConfig::with_validity_days(cli.validity_days),
    );

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let stdout = io::stdout();
    let mut writer = EventWriter::new(stdout.lock());

    for command in reader.commands() {
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Error reading command");
                continue;
            }
        };

        if let Some(time) = command.time {
            clock.set(time);
        }
        match engine.process_command(command).await {
            Ok(events) => {
                for event in &events {
                    writer.write_event(event).into_diagnostic()?;
                }
            }
            Err(e) if e.is_rejection() => warn!(error = %e, "Command rejected"),
            Err(e) => error!(error = %e, "Error processing command"),
        }
    }
    writer.flush().into_diagnostic()?;

    let remaining = engine.into_results().await.into_diagnostic()?;
    info!(testaments = remaining.len(), "Replay finished");

    Ok(())
}
