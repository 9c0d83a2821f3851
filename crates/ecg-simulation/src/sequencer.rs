//! Multi-cycle sequencing: lays repeated cardiac cycles along absolute time

use crate::config::SimulationConfig;
use crate::cycle::CycleSynthesizer;
use crate::normalizer::{normalize, total_samples};
use ecg_core::{EcgParameters, EcgResult, Waveform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Generate a trace with an entropy-seeded jitter source.
///
/// Output is deterministic for every rhythm except atrial fibrillation; use
/// [`generate_with_rng`] or a seeded [`EcgSimulator`] to reproduce that one.
pub fn generate(params: &EcgParameters, duration_seconds: f32, sampling_rate: u32) -> EcgResult<Waveform> {
    let mut rng = StdRng::from_entropy();
    generate_with_rng(params, duration_seconds, sampling_rate, &mut rng)
}

/// Generate a trace drawing fibrillation jitter from `rng`
pub fn generate_with_rng<R: Rng + ?Sized>(
    params: &EcgParameters,
    duration_seconds: f32,
    sampling_rate: u32,
    rng: &mut R,
) -> EcgResult<Waveform> {
    let sample_count = total_samples(duration_seconds, sampling_rate)?;
    let plan = normalize(params, sampling_rate)?;
    let synth = CycleSynthesizer::new(plan);

    let amplitudes: Vec<f32> = (0..sample_count)
        .map(|i| synth.amplitude_at(i % plan.cycle_length_samples, &mut *rng))
        .collect();

    debug!(
        samples = sample_count,
        cycles = sample_count.div_ceil(plan.cycle_length_samples),
        rhythm = %params.rhythm,
        "Generated ECG waveform"
    );

    Waveform::from_amplitudes(amplitudes, sampling_rate)
}

/// Generator bound to one configuration and one seeded jitter source
pub struct EcgSimulator {
    config: SimulationConfig,
    rng: StdRng,
}

impl EcgSimulator {
    /// Create new simulator; the seed comes from the config or from entropy
    pub fn new(config: SimulationConfig) -> EcgResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(EcgSimulator { config, rng })
    }

    /// Generate a trace for `params` using the configured duration and rate
    pub fn generate(&mut self, params: &EcgParameters) -> EcgResult<Waveform> {
        generate_with_rng(
            params,
            self.config.duration_seconds,
            self.config.sampling_rate,
            &mut self.rng,
        )
    }

    /// Get current configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace configuration; a new seed restarts the jitter sequence
    pub fn update_config(&mut self, config: SimulationConfig) -> EcgResult<()> {
        config.validate()?;

        if let Some(seed) = config.seed {
            if self.config.seed != Some(seed) {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }

        self.config = config;
        Ok(())
    }
}
