use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4500;
const DEFAULT_SESSION_TTL_HOURS: u32 = 24 * 14;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ObservabilityConfig ─────────────────────────────────────────────────────

/// Server observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── AuthConfig ──────────────────────────────────────────────────────────────

/// Session authentication configuration (`[auth]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long a bearer session token stays valid, in hours. Default: 336 (14 days).
    pub session_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

// ─── TOML config file ────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// REST server port (default: 4500).
    port: Option<u16>,
    /// Log level filter string, e.g. "debug", "info,revloop=trace" (default: "info").
    log: Option<String>,
    /// Bind address for the REST server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Session authentication configuration (`[auth]`).
    auth: Option<AuthConfig>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ServerConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// Bind address for the REST server (REVLOOP_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    /// Log output format: "pretty" (default) | "json" (structured for Loki/Elasticsearch).
    pub log_format: String,
    /// Session authentication: token lifetime.
    pub auth: AuthConfig,
    /// Observability: slow query threshold.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("REVLOOP_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("REVLOOP_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let auth = toml.auth.unwrap_or_default();
        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            data_dir,
            log,
            bind_address,
            log_format,
            auth,
            observability,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/revloop
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("revloop");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/revloop or ~/.local/share/revloop
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("revloop");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("revloop");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\revloop
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("revloop");
        }
    }
    // Fallback
    PathBuf::from(".revloop")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_file() {
        let dir = std::env::temp_dir().join("revloop-config-test-missing");
        let cfg = ServerConfig::new(None, Some(dir), None, None);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.auth.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(cfg.observability.slow_query_threshold_ms, 100);
    }

    #[test]
    fn cli_values_win_over_defaults() {
        let dir = std::env::temp_dir().join("revloop-config-test-cli");
        let cfg = ServerConfig::new(
            Some(9100),
            Some(dir),
            Some("debug".to_string()),
            Some("0.0.0.0".to_string()),
        );
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.log, "debug");
        assert_eq!(cfg.bind_address, "0.0.0.0");
    }
}
