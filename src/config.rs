use anyhow::{ensure, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Longest single wait accepted for delays and retry backoffs.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Scraper settings. Built once and handed to every component, so tests can
/// swap in zero delays and a fixed user agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agents: Vec<String>,
    pub page_delay: DelayRange,
    pub brand_delay: DelayRange,
    pub timeout_secs: u64,
    pub max_pages: u32,
    pub challenge_cooldown_secs: u64,
    pub retry: RetryPolicy,
    pub show_progress: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.otomoto.pl".to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            page_delay: DelayRange::new(1.0, 3.0),
            brand_delay: DelayRange::new(1.0, 3.0),
            timeout_secs: 10,
            max_pages: 1000,
            challenge_cooldown_secs: 30,
            retry: RetryPolicy::default(),
            show_progress: true,
        }
    }
}

impl ScraperConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&raw).context(format!("Invalid config file: {}", path.display()))
    }

    /// Parses a JSON object; omitted keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.user_agents.is_empty(), "user_agents must not be empty");
        ensure!(self.max_pages >= 1, "max_pages must be at least 1");
        ensure!(self.timeout_secs >= 1, "timeout_secs must be at least 1");
        ensure!(self.retry.max_attempts >= 1, "retry.max_attempts must be at least 1");
        self.page_delay.validate().context("invalid page_delay")?;
        self.brand_delay.validate().context("invalid brand_delay")?;
        self.retry.jitter.validate().context("invalid retry.jitter")?;
        ensure!(
            self.retry
                .backoff_secs
                .iter()
                .all(|secs| (0.0..=MAX_DELAY_SECS).contains(secs)),
            "retry.backoff_secs must be between 0 and {} seconds",
            MAX_DELAY_SECS
        );
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn challenge_cooldown(&self) -> Duration {
        Duration::from_secs(self.challenge_cooldown_secs)
    }

    /// Picks a user agent from the rotation pool.
    pub fn random_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }
}

/// Inclusive range of seconds to wait, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const NONE: DelayRange = DelayRange {
        min_secs: 0.0,
        max_secs: 0.0,
    };

    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.min_secs.is_finite() && self.max_secs.is_finite(),
            "delay bounds must be finite"
        );
        ensure!(self.min_secs >= 0.0, "min_secs must be non-negative");
        ensure!(self.min_secs <= self.max_secs, "min_secs must not exceed max_secs");
        ensure!(
            self.max_secs <= MAX_DELAY_SECS,
            "max_secs must not exceed {} seconds",
            MAX_DELAY_SECS
        );
        Ok(())
    }

    /// Samples a delay. Bounds are capped at [`MAX_DELAY_SECS`] so an
    /// unvalidated range never overflows `Duration`.
    pub fn sample(&self) -> Duration {
        let min = self.min_secs.clamp(0.0, MAX_DELAY_SECS);
        let max = self.max_secs.min(MAX_DELAY_SECS);
        let secs = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        secs_to_duration(secs)
    }

    /// Blocks the current thread for a sampled delay. A zero range returns
    /// immediately.
    pub fn sleep(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// How often a page request is repeated after a transient failure and how
/// long to wait in between.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per page, including the first one.
    pub max_attempts: u32,
    /// Wait before retry n is `backoff_secs[min(n, len - 1)]`.
    pub backoff_secs: Vec<f64>,
    pub jitter: DelayRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_secs: vec![2.0, 5.0, 10.0],
            jitter: DelayRange::new(0.0, 1.0),
        }
    }
}

impl RetryPolicy {
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            backoff_secs: Vec::new(),
            jitter: DelayRange::NONE,
        }
    }

    /// Backoff before the retry following the zero-based `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = match self.backoff_secs.len() {
            0 => 0.0,
            len => self.backoff_secs[(attempt as usize).min(len - 1)],
        };
        secs_to_duration(base) + self.jitter.sample()
    }
}

/// Negative and NaN inputs become zero, oversized ones [`MAX_DELAY_SECS`].
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.min(MAX_DELAY_SECS))
}
