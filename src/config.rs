use anyhow::{bail, Result};

use crate::logging::{log, obj, params_hash, v_str, Domain, Level};
use crate::reading::RiskSampling;
use crate::render::TimestampMode;
use crate::twin::TwinEmbed;

pub const DEFAULT_FEED_PERIOD_MS: u64 = 3000;
pub const DEFAULT_CLOCK_PERIOD_MS: u64 = 1000;
pub const DEFAULT_FEED_CAPACITY: usize = 8;
pub const MAX_FEED_CAPACITY: usize = 10_000;
pub const DEFAULT_TWIN_URL: &str = "http://localhost:5173/";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_period_ms: u64,
    pub clock_period_ms: u64,
    pub feed_capacity: usize,
    /// Fixed seed for the reading generator; entropy when unset
    pub feed_seed: Option<u64>,
    pub risk_sampling: RiskSampling,
    pub timestamp_mode: TimestampMode,
    pub twin_url: String,
    /// Binary only: tear the view down after this many seconds
    pub run_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_period_ms: DEFAULT_FEED_PERIOD_MS,
            clock_period_ms: DEFAULT_CLOCK_PERIOD_MS,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            feed_seed: None,
            risk_sampling: RiskSampling::Single,
            timestamp_mode: TimestampMode::Capture,
            twin_url: DEFAULT_TWIN_URL.to_string(),
            run_secs: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            feed_period_ms: std::env::var("FEED_PERIOD_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.feed_period_ms),
            clock_period_ms: std::env::var("CLOCK_PERIOD_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.clock_period_ms),
            feed_capacity: std::env::var("FEED_CAPACITY").ok().and_then(|v| v.parse().ok()).unwrap_or(d.feed_capacity),
            feed_seed: std::env::var("FEED_SEED").ok().and_then(|v| v.parse().ok()),
            risk_sampling: std::env::var("RISK_SAMPLING").ok().and_then(|v| RiskSampling::parse(&v)).unwrap_or(d.risk_sampling),
            timestamp_mode: std::env::var("TIMESTAMP_MODE").ok().and_then(|v| TimestampMode::parse(&v)).unwrap_or(d.timestamp_mode),
            twin_url: std::env::var("TWIN_URL").unwrap_or(d.twin_url),
            run_secs: std::env::var("RUN_SECS").ok().and_then(|v| v.parse().ok()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_period_ms == 0 {
            bail!("FEED_PERIOD_MS must be positive");
        }
        if self.clock_period_ms == 0 {
            bail!("CLOCK_PERIOD_MS must be positive");
        }
        if self.feed_capacity == 0 {
            bail!("FEED_CAPACITY must be positive");
        }
        if self.feed_capacity > MAX_FEED_CAPACITY {
            bail!("FEED_CAPACITY must be at most {}, got {}", MAX_FEED_CAPACITY, self.feed_capacity);
        }
        TwinEmbed::parse(&self.twin_url)?;
        Ok(())
    }

    /// Stable fingerprint of the settings that shape the feed's output.
    pub fn fingerprint(&self) -> String {
        params_hash(&format!(
            "period={};cap={};seed={:?};risk={};ts={}",
            self.feed_period_ms,
            self.feed_capacity,
            self.feed_seed,
            self.risk_sampling.as_str(),
            self.timestamp_mode.as_str(),
        ))
    }

    pub fn log_loaded(&self) {
        log(
            Level::Info,
            Domain::Config,
            "config.loaded",
            obj(&[
                ("feed_period_ms", serde_json::json!(self.feed_period_ms)),
                ("clock_period_ms", serde_json::json!(self.clock_period_ms)),
                ("feed_capacity", serde_json::json!(self.feed_capacity)),
                ("seeded", serde_json::json!(self.feed_seed.is_some())),
                ("risk_sampling", v_str(self.risk_sampling.as_str())),
                ("timestamp_mode", v_str(self.timestamp_mode.as_str())),
                ("twin_url", v_str(&self.twin_url)),
                ("fingerprint", v_str(&self.fingerprint())),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let cfg = Config::default();
        assert_eq!(cfg.feed_period_ms, 3000);
        assert_eq!(cfg.clock_period_ms, 1000);
        assert_eq!(cfg.feed_capacity, 8);
        assert_eq!(cfg.twin_url, "http://localhost:5173/");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_period() {
        let cfg = Config { feed_period_ms: 0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("FEED_PERIOD_MS"));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let cfg = Config { feed_capacity: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_capacity() {
        let cfg = Config { feed_capacity: MAX_FEED_CAPACITY, ..Default::default() };
        assert!(cfg.validate().is_ok());
        let cfg = Config { feed_capacity: MAX_FEED_CAPACITY + 1, ..Default::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("at most"));
        let cfg = Config { feed_capacity: usize::MAX, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_twin_url() {
        let cfg = Config { twin_url: "not a url".to_string(), ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { twin_url: "ftp://twin.local/".to_string(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_fingerprint_tracks_feed_settings() {
        let a = Config::default();
        let b = Config { feed_seed: Some(7), ..Default::default() };
        assert_eq!(a.fingerprint(), Config::default().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
