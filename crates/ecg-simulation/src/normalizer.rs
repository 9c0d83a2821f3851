//! Parameter normalization and sample-count planning

use ecg_core::{EcgError, EcgParameters, EcgResult, Rhythm};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default sampling rate in Hz
pub const DEFAULT_SAMPLING_RATE: u32 = 500;

/// Minimum QRS width in samples
pub const MIN_QRS_SAMPLES: usize = 3;
/// Minimum T-wave width in samples
pub const MIN_T_WAVE_SAMPLES: usize = 10;
/// P lobe width in samples
pub const P_WAVE_SAMPLES: usize = 20;
/// Distance from P-lobe onset to QRS onset, in samples
pub const P_WAVE_LEAD: usize = 30;
/// Flat ST segment width in samples
pub const ST_SEGMENT_SAMPLES: usize = 10;
/// U lobe width in samples
pub const U_WAVE_SAMPLES: usize = 20;
/// Largest trace, and so the longest cycle, the engine will materialize
pub const MAX_TOTAL_SAMPLES: usize = 1 << 25;

/// Everything the synthesizer needs for one cardiac cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingPlan {
    pub sampling_rate_hz: u32,
    pub cycle_length_samples: usize,
    /// QRS onset within the cycle
    pub pr_delay_samples: usize,
    pub qrs_samples: usize,
    pub st_samples: usize,
    pub t_wave_samples: usize,
    /// Zero when the U wave is disabled
    pub u_wave_samples: usize,
    /// ST plateau level
    pub st_level: f32,
    pub t_wave_amplitude: f32,
    /// Constant offset derived from the electrical axis
    pub baseline_offset: f32,
    pub rhythm: Rhythm,
}

impl SamplingPlan {
    /// Samples for `duration_seconds` of signal
    pub fn total_samples(&self, duration_seconds: f32) -> EcgResult<usize> {
        total_samples(duration_seconds, self.sampling_rate_hz)
    }

    /// Cycles needed to cover `duration_seconds`, counting a trailing partial one
    pub fn cycle_count(&self, duration_seconds: f32) -> EcgResult<usize> {
        Ok(self.total_samples(duration_seconds)?.div_ceil(self.cycle_length_samples))
    }

    /// First sample after the QRS complex
    pub fn qrs_end(&self) -> usize {
        self.pr_delay_samples.saturating_add(self.qrs_samples)
    }

    /// First sample of the T wave
    pub fn t_wave_start(&self) -> usize {
        self.qrs_end().saturating_add(self.st_samples)
    }

    /// First sample of the U wave
    pub fn u_wave_start(&self) -> usize {
        self.t_wave_start().saturating_add(self.t_wave_samples)
    }
}

/// Sample count for `duration_seconds` at `sampling_rate`, rounded.
///
/// Fails for a non-positive or non-finite duration and for traces longer
/// than [`MAX_TOTAL_SAMPLES`].
pub fn total_samples(duration_seconds: f32, sampling_rate: u32) -> EcgResult<usize> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(EcgError::invalid(
            "duration_seconds",
            duration_seconds,
            "must be a positive finite number",
        ));
    }

    let samples = (duration_seconds as f64 * sampling_rate as f64).round();
    if samples > MAX_TOTAL_SAMPLES as f64 {
        return Err(EcgError::invalid(
            "duration_seconds",
            duration_seconds,
            "trace would exceed the maximum sample count",
        ));
    }
    Ok(samples as usize)
}

fn ms_to_samples(ms: f32, sampling_rate: u32) -> i64 {
    (ms as f64 / 1000.0 * sampling_rate as f64).round() as i64
}

/// Floor at `min`, cap at the cycle length; the floor wins on very short cycles
fn bound_samples(samples: i64, min: usize, cycle: usize) -> usize {
    (samples.max(min as i64) as usize).min(cycle.max(min))
}

/// Validate, clamp and derive the per-cycle sampling plan.
///
/// Fails with `InvalidParameter` for a non-positive heart rate, a non-finite
/// field or a zero sampling rate; out-of-range intervals are clamped.
pub fn normalize(raw: &EcgParameters, sampling_rate: u32) -> EcgResult<SamplingPlan> {
    raw.validate()?;
    if sampling_rate == 0 {
        return Err(EcgError::invalid("sampling_rate", 0.0, "must be positive"));
    }

    let params = raw.clamped();

    let cycle_length = ((60.0 / params.heart_rate as f64) * sampling_rate as f64).round().max(1.0);
    if cycle_length > MAX_TOTAL_SAMPLES as f64 {
        return Err(EcgError::invalid(
            "heart_rate",
            params.heart_rate,
            "cycle would exceed the maximum sample count",
        ));
    }
    let cycle_length_samples = cycle_length as usize;

    let qrs_samples = bound_samples(
        ms_to_samples(params.qrs_duration, sampling_rate),
        MIN_QRS_SAMPLES,
        cycle_length_samples,
    );
    let pr_delay_samples = bound_samples(
        ms_to_samples(params.pr_interval, sampling_rate),
        0,
        cycle_length_samples,
    );
    let t_wave_raw = ms_to_samples(params.qtc_interval, sampling_rate)
        .saturating_sub(qrs_samples as i64)
        .saturating_sub(pr_delay_samples as i64);
    if t_wave_raw < MIN_T_WAVE_SAMPLES as i64 {
        trace!(raw = t_wave_raw, "T wave shorter than floor, widening");
    }
    let t_wave_samples = bound_samples(t_wave_raw, MIN_T_WAVE_SAMPLES, cycle_length_samples);
    let u_wave_samples = if params.has_u_wave() { U_WAVE_SAMPLES } else { 0 };

    let plan = SamplingPlan {
        sampling_rate_hz: sampling_rate,
        cycle_length_samples,
        pr_delay_samples,
        qrs_samples,
        st_samples: ST_SEGMENT_SAMPLES,
        t_wave_samples,
        u_wave_samples,
        st_level: params.st_segment,
        t_wave_amplitude: params.t_wave.peak_amplitude(),
        baseline_offset: (params.electrical_axis / 180.0) * 0.3,
        rhythm: params.rhythm,
    };

    debug!(
        cycle = plan.cycle_length_samples,
        pr = plan.pr_delay_samples,
        qrs = plan.qrs_samples,
        t = plan.t_wave_samples,
        u = plan.u_wave_samples,
        "Derived sampling plan"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::TWaveMorphology;

    #[test]
    fn test_reference_plan() {
        let plan = normalize(&EcgParameters::default(), 500).unwrap();

        assert_eq!(plan.cycle_length_samples, 400);
        assert_eq!(plan.pr_delay_samples, 80);
        assert_eq!(plan.qrs_samples, 50);
        assert_eq!(plan.st_samples, 10);
        // 200 - 50 - 80
        assert_eq!(plan.t_wave_samples, 70);
        assert_eq!(plan.u_wave_samples, 0);
        assert_eq!(plan.t_wave_start(), 140);
        assert_eq!(plan.u_wave_start(), 210);
        assert_eq!(plan.total_samples(3.0), Ok(1500));
        assert_eq!(plan.cycle_count(3.0), Ok(4));
    }

    #[test]
    fn test_zero_heart_rate_fails_fast() {
        let params = EcgParameters { heart_rate: 0.0, ..Default::default() };
        assert!(matches!(
            normalize(&params, 500),
            Err(EcgError::InvalidParameter { field: "heart_rate", .. })
        ));
    }

    #[test]
    fn test_zero_sampling_rate_rejected() {
        assert!(normalize(&EcgParameters::default(), 0).is_err());
    }

    #[test]
    fn test_qrs_below_floor_matches_floor() {
        let low = normalize(&EcgParameters { qrs_duration: 1.0, ..Default::default() }, 500).unwrap();
        let floor = normalize(&EcgParameters { qrs_duration: 40.0, ..Default::default() }, 500).unwrap();
        assert_eq!(low, floor);
        assert_eq!(low.qrs_samples, 20);
    }

    #[test]
    fn test_inconsistent_qtc_keeps_t_wave_floor() {
        // QTc shorter than PR + QRS
        let params = EcgParameters {
            pr_interval: 200.0,
            qrs_duration: 120.0,
            qtc_interval: 250.0,
            ..Default::default()
        };
        let plan = normalize(&params, 500).unwrap();
        assert_eq!(plan.t_wave_samples, MIN_T_WAVE_SAMPLES);
    }

    #[test]
    fn test_segments_capped_at_cycle_length() {
        // 300 bpm -> 100-sample cycles, PR of 400ms would be 200 samples
        let params = EcgParameters {
            heart_rate: 300.0,
            pr_interval: 400.0,
            qtc_interval: 1500.0,
            ..Default::default()
        };
        let plan = normalize(&params, 500).unwrap();
        assert_eq!(plan.cycle_length_samples, 100);
        assert_eq!(plan.pr_delay_samples, 100);
        assert!(plan.t_wave_samples <= 100);
    }

    #[test]
    fn test_extreme_heart_rate_keeps_one_sample_cycle() {
        let params = EcgParameters { heart_rate: 1.0e6, ..Default::default() };
        let plan = normalize(&params, 500).unwrap();
        assert_eq!(plan.cycle_length_samples, 1);
    }

    #[test]
    fn test_vanishing_heart_rate_rejected() {
        let params = EcgParameters {
            heart_rate: 1.0e-20,
            pr_interval: 1.0e30,
            qrs_duration: 1.0e30,
            ..Default::default()
        };
        assert!(matches!(
            normalize(&params, 500),
            Err(EcgError::InvalidParameter { field: "heart_rate", .. })
        ));

        // one beat per minute is still representable
        let slow = normalize(&EcgParameters { heart_rate: 1.0, ..Default::default() }, 500).unwrap();
        assert_eq!(slow.cycle_length_samples, 30_000);
    }

    #[test]
    fn test_huge_intervals_stay_within_cycle() {
        let params = EcgParameters {
            pr_interval: 1.0e30,
            qrs_duration: 1.0e30,
            qtc_interval: f32::MAX,
            ..Default::default()
        };
        let plan = normalize(&params, 500).unwrap();

        assert_eq!(plan.pr_delay_samples, plan.cycle_length_samples);
        assert_eq!(plan.qrs_samples, plan.cycle_length_samples);
        assert_eq!(plan.t_wave_samples, plan.cycle_length_samples);
        assert_eq!(plan.u_wave_start(), 400 * 3 + ST_SEGMENT_SAMPLES);

        // QTc far below PR + QRS still lands on the floor
        let inverted = EcgParameters { qtc_interval: 200.0, ..params };
        assert_eq!(normalize(&inverted, 500).unwrap().t_wave_samples, MIN_T_WAVE_SAMPLES);
    }

    #[test]
    fn test_total_samples_bounds() {
        assert_eq!(total_samples(3.0, 500), Ok(1500));
        for duration in [0.0, -1.0, f32::NAN, f32::INFINITY, 1.0e30, f32::MAX] {
            assert!(matches!(
                total_samples(duration, 500),
                Err(EcgError::InvalidParameter { field: "duration_seconds", .. })
            ));
        }
        let limit_seconds = MAX_TOTAL_SAMPLES as f32 / 1000.0;
        assert!(total_samples(limit_seconds * 2.0, 1000).is_err());
    }

    #[test]
    fn test_u_wave_enabled_for_long_qt_and_bradycardia() {
        let long_qt = normalize(&EcgParameters { qtc_interval: 480.0, ..Default::default() }, 500).unwrap();
        assert_eq!(long_qt.u_wave_samples, U_WAVE_SAMPLES);

        let brady = normalize(&EcgParameters { rhythm: Rhythm::Bradycardia, ..Default::default() }, 500).unwrap();
        assert_eq!(brady.u_wave_samples, U_WAVE_SAMPLES);
    }

    #[test]
    fn test_plan_scalars() {
        let params = EcgParameters {
            st_segment: -1.0,
            electrical_axis: 90.0,
            t_wave: TWaveMorphology::Peaked,
            ..Default::default()
        };
        let plan = normalize(&params, 500).unwrap();
        assert_eq!(plan.st_level, EcgParameters::MIN_ST_SEGMENT);
        assert_eq!(plan.t_wave_amplitude, 0.35);
        assert!((plan.baseline_offset - 0.15).abs() < 1e-6);
    }
}
