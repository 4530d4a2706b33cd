//! SkillSwap CLI - a command line client for the SkillSwap service.
//!
//! Every subcommand runs one or more gateway calls and prints the result
//! as JSON on stdout. The session (token and profile) is kept in the
//! selected store between runs.

mod cli;
mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skillswap_core::storage::{EncryptedFileStore, FileStore, KeyringStore, MemoryStore};
use skillswap_core::{ApiClient, Config, KeyValueStore, SessionStore};

use cli::{Args, StoreKind};
use commands::Runtime;

// ============================================================================
// Constants
// ============================================================================

/// Log file written in the cache directory
const LOG_FILE: &str = "skillswap.log";

/// Passphrase for the encrypted store; prompted for when unset
const PASSPHRASE_ENV: &str = "SKILLSWAP_PASSPHRASE";

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Output goes to stderr and,
/// when a cache directory is available, to a log file there as well. The
/// returned guard flushes the file writer on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn open_store(kind: StoreKind, config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match kind {
        StoreKind::File => Box::new(FileStore::new(config.cache_dir()?)),
        StoreKind::Keyring => Box::new(KeyringStore::default()),
        StoreKind::Encrypted => {
            let passphrase = match std::env::var(PASSPHRASE_ENV) {
                Ok(value) if !value.is_empty() => value,
                _ => rpassword::prompt_password("Store passphrase: ")?,
            };
            Box::new(EncryptedFileStore::open(config.cache_dir()?, &passphrase)?)
        }
        StoreKind::Memory => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

async fn run(args: Args, mut config: Config) -> Result<()> {
    let api = ApiClient::from_config(&config)?;
    let store = open_store(args.store, &config)?;
    let mut session = SessionStore::initialize(store);
    info!(
        base_url = api.base_url(),
        origin = api.origin(),
        store = ?args.store,
        authenticated = session.is_authenticated(),
        "Session restored"
    );

    let output = commands::run(
        Runtime {
            config: &mut config,
            api: &api,
            session: &mut session,
        },
        args.command,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_dir = Config::default().cache_dir().ok();
    let guard = init_tracing(log_dir.as_deref());

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        let mut config = Config::default();
        config.apply_env();
        config
    });

    if let Err(e) = run(args, config).await {
        eprintln!("Error: {}", e);
        drop(guard);
        std::process::exit(1);
    }
}
