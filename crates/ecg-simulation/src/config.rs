//! Runtime configuration for synthesis and the reveal sweep

use crate::normalizer::DEFAULT_SAMPLING_RATE;
use ecg_core::{config_error, EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Waveform generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Length of the generated trace in seconds
    pub duration_seconds: f32,
    /// Sampling rate in Hz
    pub sampling_rate: u32,
    /// Seed for the fibrillation jitter (None = entropy)
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 3.0,
            sampling_rate: DEFAULT_SAMPLING_RATE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> EcgResult<()> {
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(EcgError::invalid(
                "duration_seconds",
                self.duration_seconds,
                "must be a positive finite number",
            ));
        }
        if self.sampling_rate == 0 {
            return Err(EcgError::invalid("sampling_rate", 0.0, "must be positive"));
        }
        Ok(())
    }
}

/// Sweep cadence: how many samples appear per tick, how often, and how long
/// the finished trace stays on screen before the next sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealConfig {
    pub step_size: usize,
    pub tick_interval_ms: u64,
    pub pause_ms: u64,
}

impl RevealConfig {
    /// One sample every 5ms, 200ms dwell
    pub fn web() -> Self {
        Self {
            step_size: 1,
            tick_interval_ms: 5,
            pause_ms: 200,
        }
    }

    /// Fifteen samples per ~60Hz frame, one second dwell
    pub fn mobile() -> Self {
        Self {
            step_size: 15,
            tick_interval_ms: 16,
            pause_ms: 1000,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn validate(&self) -> EcgResult<()> {
        if self.step_size == 0 {
            return Err(config_error!("reveal step size must be at least 1"));
        }
        if self.tick_interval_ms == 0 {
            return Err(config_error!("reveal tick interval must be at least 1ms"));
        }
        Ok(())
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> EcgResult<()> {
        self.simulation.validate()?;
        self.reveal.validate()
    }

    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| config_error!("Failed to serialize config: {}", e))
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> EcgResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| config_error!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}
