use std::env;
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
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `BATCHGATE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("BATCHGATE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            scheduler: SchedulerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        let s = &self.scheduler;
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:     host={}, port={}", self.server.host, self.server.port);
        tracing::info!(
            "  scheduler:  batch_size={}, rate_limit_interval_ms={}, max_retry_attempts={}",
            s.batch_size,
            s.rate_limit_interval_ms,
            s.max_retry_attempts
        );
        tracing::info!(
            "  simulation: failure_probability={}, work_unit_ms={}",
            s.failure_probability,
            s.work_unit_ms
        );
    }

    /// Return a JSON view for API responses.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "scheduler": self.scheduler,
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 5000),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Scheduler ─────────────────────────────────────────────────

/// Batching, throttling and retry knobs.
///
/// `Default` yields the production constants: batches of 3, one processing
/// start every 5000 ms system-wide, 3 attempts per batch, 20% simulated
/// failure rate, 1000 ms simulated latency per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub rate_limit_interval_ms: u64,
    pub max_retry_attempts: u32,
    pub failure_probability: f64,
    pub work_unit_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            rate_limit_interval_ms: 5000,
            max_retry_attempts: 3,
            failure_probability: 0.2,
            work_unit_ms: 1000,
        }
    }
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            batch_size: profiled_env_parse(p, "BATCH_SIZE", d.batch_size),
            rate_limit_interval_ms: profiled_env_parse(
                p,
                "RATE_LIMIT_INTERVAL_MS",
                d.rate_limit_interval_ms,
            ),
            max_retry_attempts: profiled_env_parse(p, "MAX_RETRY_ATTEMPTS", d.max_retry_attempts),
            failure_probability: profiled_env_parse(
                p,
                "FAILURE_PROBABILITY",
                d.failure_probability,
            ),
            work_unit_ms: profiled_env_parse(p, "WORK_UNIT_MS", d.work_unit_ms),
        }
        .normalized()
    }

    /// Clamp values into their valid ranges: at least one id per batch, at
    /// least one attempt, and a probability within `[0, 1]`.
    pub fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.max_retry_attempts = self.max_retry_attempts.max(1);
        self.failure_probability = if self.failure_probability.is_nan() {
            0.0
        } else {
            self.failure_probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }

    pub fn work_unit(&self) -> Duration {
        Duration::from_millis(self.work_unit_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.batch_size, 3);
        assert_eq!(c.rate_limit_interval(), Duration::from_millis(5000));
        assert_eq!(c.max_retry_attempts, 3);
        assert_eq!(c.failure_probability, 0.2);
        assert_eq!(c.work_unit(), Duration::from_secs(1));
    }

    #[test]
    fn test_normalized_clamps() {
        let c = SchedulerConfig {
            batch_size: 0,
            rate_limit_interval_ms: 0,
            max_retry_attempts: 0,
            failure_probability: 7.5,
            work_unit_ms: 0,
        }
        .normalized();
        assert_eq!(c.batch_size, 1);
        assert_eq!(c.max_retry_attempts, 1);
        assert_eq!(c.failure_probability, 1.0);

        let c = SchedulerConfig {
            failure_probability: f64::NAN,
            ..SchedulerConfig::default()
        }
        .normalized();
        assert_eq!(c.failure_probability, 0.0);
    }

    #[test]
    fn test_profiled_lookup() {
        env::set_var("BGCFGTEST_PORT", "7001");
        env::set_var("BGCFGTEST_BATCH_SIZE", "5");
        env::set_var("BGCFGTEST_MAX_RETRY_ATTEMPTS", "not-a-number");

        let config = Config::for_profile("bgcfgtest");
        assert_eq!(config.profile_label(), "BGCFGTEST");
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.scheduler.batch_size, 5);
        // Unparseable values fall back to the default.
        assert_eq!(config.scheduler.max_retry_attempts, 3);
    }

    #[test]
    fn test_redacted_summary_shape() {
        let config = Config {
            profile: String::new(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            scheduler: SchedulerConfig::default(),
        };
        let v = config.redacted_summary();
        assert_eq!(v["profile"], "default");
        assert_eq!(v["server"]["port"], 5000);
        assert_eq!(v["scheduler"]["batch_size"], 3);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
    }
}
