//! Timing configuration for the phase cycle.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shortest dwell time of a phase, in milliseconds.
pub const DEFAULT_MIN_CYCLE_MS: u64 = 4000;
/// Longest dwell time of a phase, in milliseconds.
pub const DEFAULT_MAX_CYCLE_MS: u64 = 6000;
/// Polling quantum of the cycle loop, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1;

/// How long each phase lasts and how often the cycle loop checks the clock.
///
/// Every phase lasts a duration drawn uniformly from `[min_cycle_ms, max_cycle_ms]`.
/// The loop wakes every `tick_ms` to compare the elapsed time against that draw, so a
/// flip happens at most about one tick after its target.
///
/// Missing fields fall back to the defaults when deserializing:
///
/// ```
/// use traffic_lib::config::CycleConfig;
///
/// let config = CycleConfig::from_json(r#"{ "min_cycle_ms": 100, "max_cycle_ms": 200 }"#).unwrap();
/// assert_eq!(config.tick().as_millis(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    min_cycle_ms: u64,
    max_cycle_ms: u64,
    tick_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig {
            min_cycle_ms: DEFAULT_MIN_CYCLE_MS,
            max_cycle_ms: DEFAULT_MAX_CYCLE_MS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl CycleConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CycleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.min_cycle_ms == 0 {
            return Err(Error::InvalidConfig(
                "min_cycle_ms must be greater than zero".to_string(),
            ));
        }
        if self.min_cycle_ms > self.max_cycle_ms {
            return Err(Error::InvalidConfig(format!(
                "min_cycle_ms ({}) exceeds max_cycle_ms ({})",
                self.min_cycle_ms, self.max_cycle_ms
            )));
        }
        if self.tick_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The inclusive range a cycle duration is drawn from.
    pub fn cycle_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_cycle_ms),
            Duration::from_millis(self.max_cycle_ms),
        )
    }

    /// The polling quantum of the cycle loop.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Draws a cycle duration uniformly from the configured range, at millisecond
    /// resolution and inclusive of both bounds.
    pub fn draw_cycle_duration<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_cycle_ms..=self.max_cycle_ms))
    }
}

/// A builder for [`CycleConfig`].
///
/// ```
/// use std::time::Duration;
/// use traffic_lib::config::CycleConfigBuilder;
///
/// let config = CycleConfigBuilder::new()
///     .cycle_range(Duration::from_millis(50), Duration::from_millis(80))
///     .tick(Duration::from_millis(2))
///     .build()
///     .unwrap();
/// assert_eq!(config.tick(), Duration::from_millis(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CycleConfigBuilder {
    config: CycleConfig,
}

impl CycleConfigBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive range cycle durations are drawn from.
    ///
    /// Sub-millisecond parts are truncated.
    pub fn cycle_range(mut self, min: Duration, max: Duration) -> Self {
        self.config.min_cycle_ms = duration_to_millis(min);
        self.config.max_cycle_ms = duration_to_millis(max);
        self
    }

    /// Sets the polling quantum of the cycle loop.
    pub fn tick(mut self, tick: Duration) -> Self {
        self.config.tick_ms = duration_to_millis(tick);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<CycleConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
