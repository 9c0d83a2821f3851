//! Piecewise model of a single cardiac cycle

use crate::normalizer::{SamplingPlan, P_WAVE_LEAD, P_WAVE_SAMPLES};
use ecg_core::Rhythm;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// P-lobe peak amplitude
pub const P_WAVE_AMPLITUDE: f32 = 0.15;
/// Q deflection amplitude
pub const Q_WAVE_AMPLITUDE: f32 = -0.3;
/// R peak amplitude
pub const R_WAVE_AMPLITUDE: f32 = 1.5;
/// S deflection amplitude
pub const S_WAVE_AMPLITUDE: f32 = -0.5;
/// U-lobe peak amplitude
pub const U_WAVE_AMPLITUDE: f32 = 0.05;

/// Per-sample probability of an ectopic spike during atrial fibrillation
pub const FIBRILLATION_JITTER_PROBABILITY: f64 = 0.01;
/// Spikes are drawn uniformly from `[-max, +max]`
pub const FIBRILLATION_JITTER_MAX: f32 = 0.75;

/// Gain applied to every bradycardic sample
pub const BRADYCARDIA_GAIN: f32 = 0.8;
/// Gain applied to every tachycardic sample
pub const TACHYCARDIA_GAIN: f32 = 1.1;

/// Region of the cycle a phase falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardiacBand {
    PWave,
    QWave,
    RWave,
    SWave,
    /// Flat remainder of the QRS window
    QrsTail,
    StSegment,
    TWave,
    UWave,
    Baseline,
}

impl CardiacBand {
    pub fn is_qrs(&self) -> bool {
        matches!(
            self,
            CardiacBand::QWave | CardiacBand::RWave | CardiacBand::SWave | CardiacBand::QrsTail
        )
    }
}

/// Offset of `t` inside `[start, start + width)`; zero-width bands never match
fn within(t: i64, start: i64, width: usize) -> Option<f32> {
    if width == 0 {
        return None;
    }
    let offset = t - start;
    (offset >= 0 && offset < width as i64).then_some(offset as f32)
}

fn half_sine(amplitude: f32, offset: f32, width: f32) -> f32 {
    amplitude * (PI * offset / width).sin()
}

/// Band lookup in fixed priority order, with the offset into the band
fn locate(plan: &SamplingPlan, phase: usize) -> Option<(CardiacBand, f32)> {
    let t = phase as i64;
    let pr = plan.pr_delay_samples as i64;

    if let Some(offset) = within(t, pr - P_WAVE_LEAD as i64, P_WAVE_SAMPLES) {
        return Some((CardiacBand::PWave, offset));
    }

    if let Some(offset) = within(t, pr, plan.qrs_samples) {
        let segment = plan.qrs_samples as f32 / 5.0;
        let band = if offset < segment {
            (CardiacBand::QWave, offset)
        } else if offset < 2.0 * segment {
            (CardiacBand::RWave, offset - segment)
        } else if offset < 3.0 * segment {
            (CardiacBand::SWave, offset - 2.0 * segment)
        } else {
            (CardiacBand::QrsTail, 0.0)
        };
        return Some(band);
    }

    if let Some(offset) = within(t, plan.qrs_end() as i64, plan.st_samples) {
        return Some((CardiacBand::StSegment, offset));
    }

    if let Some(offset) = within(t, plan.t_wave_start() as i64, plan.t_wave_samples) {
        return Some((CardiacBand::TWave, offset));
    }

    within(t, plan.u_wave_start() as i64, plan.u_wave_samples)
        .map(|offset| (CardiacBand::UWave, offset))
}

/// Which band `phase` belongs to
pub fn classify(plan: &SamplingPlan, phase: usize) -> CardiacBand {
    locate(plan, phase)
        .map(|(band, _)| band)
        .unwrap_or(CardiacBand::Baseline)
}

/// Amplitude from band evaluation alone, before offset and rhythm effects
pub fn band_amplitude(plan: &SamplingPlan, phase: usize) -> f32 {
    let Some((band, offset)) = locate(plan, phase) else {
        return 0.0;
    };
    let qrs_segment = plan.qrs_samples as f32 / 5.0;

    match band {
        CardiacBand::PWave => half_sine(P_WAVE_AMPLITUDE, offset, P_WAVE_SAMPLES as f32),
        CardiacBand::QWave => half_sine(Q_WAVE_AMPLITUDE, offset, qrs_segment),
        CardiacBand::RWave => half_sine(R_WAVE_AMPLITUDE, offset, qrs_segment),
        CardiacBand::SWave => half_sine(S_WAVE_AMPLITUDE, offset, qrs_segment),
        CardiacBand::QrsTail | CardiacBand::Baseline => 0.0,
        CardiacBand::StSegment => plan.st_level,
        CardiacBand::TWave => {
            half_sine(plan.t_wave_amplitude, offset, plan.t_wave_samples as f32)
        }
        CardiacBand::UWave => {
            half_sine(U_WAVE_AMPLITUDE, offset, plan.u_wave_samples as f32)
        }
    }
}

/// Cycle evaluator holding the plan and the fibrillation jitter distribution
#[derive(Debug, Clone)]
pub struct CycleSynthesizer {
    plan: SamplingPlan,
    jitter: Uniform<f32>,
}

impl CycleSynthesizer {
    pub fn new(plan: SamplingPlan) -> Self {
        Self {
            plan,
            jitter: Uniform::new_inclusive(-FIBRILLATION_JITTER_MAX, FIBRILLATION_JITTER_MAX),
        }
    }

    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    /// Amplitude at `phase` after baseline offset and rhythm post-processing.
    ///
    /// Only atrial fibrillation draws from `rng`; every other rhythm is a
    /// pure function of the plan and phase.
    pub fn amplitude_at<R: Rng + ?Sized>(&self, phase: usize, rng: &mut R) -> f32 {
        let mut value = band_amplitude(&self.plan, phase) + self.plan.baseline_offset;

        match self.plan.rhythm {
            Rhythm::AtrialFibrillation => {
                if rng.gen_bool(FIBRILLATION_JITTER_PROBABILITY) {
                    value += self.jitter.sample(rng);
                }
            }
            Rhythm::Bradycardia => value *= BRADYCARDIA_GAIN,
            Rhythm::Tachycardia => value *= TACHYCARDIA_GAIN,
            Rhythm::Sinus => {}
        }

        value
    }
}

/// Amplitude at integer offset `phase` within one cycle
pub fn synthesize_cycle<R: Rng + ?Sized>(plan: &SamplingPlan, phase: usize, rng: &mut R) -> f32 {
    CycleSynthesizer::new(*plan).amplitude_at(phase, rng)
}
