use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

/// First of `keys` that is set, checking every prefixed key before any plain one.
fn profiled_env_first(profile: &str, keys: &[&str]) -> Option<String> {
    if !profile.is_empty() {
        if let Some(v) = keys.iter().find_map(|k| env_opt(&format!("{}_{}", profile, k))) {
            return Some(v);
        }
    }
    keys.iter().find_map(|k| env_opt(k))
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
    pub llm: LlmConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &["GEMINI_API_KEY", "DATA_DIR", "TELEMETRY_SEED"];

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CELLSCOPE_PROFILE`. When set (e.g. `BENCH`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CELLSCOPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            telemetry: TelemetryConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  storage:     data_dir={}, history_limit={}",
            self.storage.data_dir.display(),
            self.storage.history_limit
        );
        tracing::info!(
            "  telemetry:   cells={}, interval={}ms, seed={}",
            self.telemetry.cell_count,
            self.telemetry.interval_ms,
            self.telemetry
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(entropy)".into())
        );
        tracing::info!(
            "  llm:         model={}, configured={}",
            self.llm.gemini_model,
            self.llm.is_configured()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "storage": {
                "data_dir": self.storage.data_dir,
                "history_limit": self.storage.history_limit,
            },
            "telemetry": {
                "cell_count": self.telemetry.cell_count,
                "interval_ms": self.telemetry.interval_ms,
                "seeded": self.telemetry.seed.is_some(),
            },
            "llm": {
                "model": self.llm.gemini_model,
                "configured": self.llm.is_configured(),
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            // PROXY_PORT is the older name for the same setting.
            port: profiled_env_first(p, &["PORT", "PROXY_PORT"])
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Number of most recent scans kept in history.
    pub history_limit: usize,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
            history_limit: profiled_env_parse(p, "HISTORY_LIMIT", 20),
        }
    }
}

// ── Telemetry ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub interval_ms: u64,
    pub cell_count: u32,
    /// Fixed seed for reproducible mock telemetry and clustering.
    pub seed: Option<u64>,
}

impl TelemetryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            interval_ms: profiled_env_parse(p, "TELEMETRY_INTERVAL_MS", 2000),
            cell_count: profiled_env_parse(p, "TELEMETRY_CELLS", 96),
            seed: profiled_env_opt(p, "TELEMETRY_SEED").and_then(|v| v.parse().ok()),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

// ── LLM (Gemini) ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.5-pro"),
            gemini_base_url: profiled_env_or(
                p,
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.2),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 2048),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile prefix so parallel tests never share keys.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CSCFGA_PORT", "4100");
        env::set_var("CSCFGA_HISTORY_LIMIT", "5");
        let config = Config::for_profile("cscfga");

        assert_eq!(config.profile, "CSCFGA");
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.storage.history_limit, 5);
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        env::set_var("CSCFGB_TELEMETRY_CELLS", "lots");
        env::set_var("CSCFGB_TELEMETRY_SEED", "not-a-number");
        let config = Config::for_profile("CSCFGB");

        assert_eq!(config.telemetry.cell_count, 96);
        assert!(config.telemetry.seed.is_none());
    }

    #[test]
    fn profile_discovery_finds_prefixed_markers() {
        env::set_var("CSCFGC_TELEMETRY_SEED", "7");
        let profiles = Config::available_profiles();
        assert!(profiles.contains(&"default".to_string()));
        assert!(profiles.contains(&"CSCFGC".to_string()));
    }

    #[test]
    fn redacted_summary_hides_api_key() {
        env::set_var("CSCFGD_GEMINI_API_KEY", "secret-key");
        let config = Config::for_profile("CSCFGD");
        assert!(config.llm.is_configured());

        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("secret-key"));
        assert_eq!(config.profile_label(), "CSCFGD");
    }

    #[test]
    fn proxy_port_is_accepted_as_port() {
        env::set_var("CSCFGE_PROXY_PORT", "4200");
        assert_eq!(Config::for_profile("CSCFGE").server.port, 4200);
    }

    #[test]
    fn port_wins_over_proxy_port() {
        env::set_var("CSCFGF_PORT", "4300");
        env::set_var("CSCFGF_PROXY_PORT", "4400");
        assert_eq!(Config::for_profile("CSCFGF").server.port, 4300);
    }
}
