use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use revloop::{config::ServerConfig, rest, storage::Storage, AppContext};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "revloopd",
    about = "Revloop — review-request SaaS backend server",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST API server port
    #[arg(long, env = "REVLOOP_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "REVLOOP_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REVLOOP_LOG")]
    log: Option<String>,

    /// Bind address for the REST server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "REVLOOP_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "REVLOOP_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server (default when no subcommand given).
    ///
    /// Runs revloopd in the foreground.
    ///
    /// Examples:
    ///   revloopd serve
    ///   revloopd
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        None | Some(Command::Serve) => run_serve(args).await,
    }
}

async fn run_serve(args: Args) -> Result<()> {
    let config = Arc::new(ServerConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));

    let _log_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    let storage = Arc::new(
        Storage::new_with_slow_query(
            &config.data_dir,
            config.observability.slow_query_threshold_ms,
        )
        .await
        .context("failed to open database")?,
    );

    let purged = storage.purge_expired_sessions().await?;
    if purged > 0 {
        info!(purged, "expired auth sessions removed");
    }

    let ctx = Arc::new(AppContext {
        config: config.clone(),
        storage,
        started_at: std::time::Instant::now(),
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "revloopd starting"
    );

    rest::start_rest_server(ctx).await
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Initialize tracing with optional daily-rotated file output.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("revloopd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
