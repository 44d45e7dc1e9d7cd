//! Request pacing between symbol fetches.
//!
//! The price provider throttles per client, so the scanner runs one request
//! at a time with a fixed gap, plus a cooldown after any failure (longer when
//! the failure was a rate-limit signal).

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub between_requests_secs: f64,
    pub on_error_secs: f64,
    pub on_rate_limit_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            between_requests_secs: 2.0,
            on_error_secs: 5.0,
            on_rate_limit_secs: 10.0,
        }
    }
}

/// Which pause is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    BetweenRequests,
    AfterError,
    AfterRateLimit,
}

/// Blocks the current thread. Swappable so tests never actually wait.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.recorded().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

/// Applies the configured pauses through a `Sleeper`.
pub struct Pacer<'a> {
    config: PacingConfig,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Pacer<'a> {
    pub fn new(config: PacingConfig, sleeper: &'a dyn Sleeper) -> Self {
        Self { config, sleeper }
    }

    pub fn duration(&self, pause: Pause) -> Duration {
        let secs = match pause {
            Pause::BetweenRequests => self.config.between_requests_secs,
            Pause::AfterError => self.config.on_error_secs,
            Pause::AfterRateLimit => self.config.on_rate_limit_secs,
        };
        seconds(secs)
    }

    pub fn pause(&self, pause: Pause) -> Duration {
        let d = self.duration(pause);
        self.sleeper.sleep(d);
        d
    }
}

/// Negative, NaN or infinite settings collapse to zero rather than panicking.
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
