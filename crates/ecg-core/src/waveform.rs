//! Waveform: immutable container for a synthesized ECG trace

use crate::error::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One sample of the trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Seconds since the start of the trace
    pub time: f64,
    /// Amplitude in millivolt-like units
    pub amplitude: f32,
}

/// Finite, time-ordered ECG trace produced once per parameter set
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Unique identifier for this trace
    pub id: Uuid,
    samples: Vec<SamplePoint>,
    sampling_rate: u32,
}

impl Waveform {
    /// Build a trace from evenly spaced amplitudes.
    ///
    /// Sample `i` is stamped at `i / sampling_rate` seconds.
    pub fn from_amplitudes(amplitudes: Vec<f32>, sampling_rate: u32) -> EcgResult<Self> {
        if sampling_rate == 0 {
            return Err(EcgError::invalid("sampling_rate", 0.0, "must be positive"));
        }

        let samples = amplitudes
            .into_iter()
            .enumerate()
            .map(|(i, amplitude)| SamplePoint {
                time: sample_time(i, sampling_rate),
                amplitude,
            })
            .collect();

        Ok(Waveform {
            id: Uuid::new_v4(),
            samples,
            sampling_rate,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the trace holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sampling rate in Hz
    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// Trace duration in seconds
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sampling_rate as f32
    }

    /// All samples in time order
    pub fn samples(&self) -> &[SamplePoint] {
        &self.samples
    }

    /// The first `visible` samples; saturates at the trace length
    pub fn prefix(&self, visible: usize) -> &[SamplePoint] {
        &self.samples[..visible.min(self.samples.len())]
    }

    /// Amplitude column
    pub fn amplitudes(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().map(|s| s.amplitude)
    }

    /// Timestamp of sample `index`
    pub fn time_at(&self, index: usize) -> Option<f64> {
        self.samples.get(index).map(|s| s.time)
    }

    /// Basic statistics over the amplitude column
    pub fn stats(&self) -> WaveformStats {
        let amplitudes: Vec<f32> = self.amplitudes().collect();
        WaveformStats::calculate(&amplitudes)
    }
}

/// Timestamp of sample `index` at `sampling_rate` Hz, in seconds
pub fn sample_time(index: usize, sampling_rate: u32) -> f64 {
    index as f64 / sampling_rate as f64
}

/// Basic statistics for a trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformStats {
    pub mean: f32,
    pub rms: f32,
    pub min: f32,
    pub max: f32,
    pub peak_to_peak: f32,
}

impl WaveformStats {
    pub fn calculate(data: &[f32]) -> Self {
        if data.is_empty() {
            return Self {
                mean: 0.0,
                rms: 0.0,
                min: 0.0,
                max: 0.0,
                peak_to_peak: 0.0,
            };
        }

        let sum: f32 = data.iter().sum();
        let mean = sum / data.len() as f32;

        let sum_sq: f32 = data.iter().map(|x| x * x).sum();
        let rms = (sum_sq / data.len() as f32).sqrt();

        let min = data.iter().fold(f32::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

        Self {
            mean,
            rms,
            min,
            max,
            peak_to_peak: max - min,
        }
    }
}
