//! Clinical parameter types driving the waveform synthesis

use serde::{Deserialize, Serialize};
use crate::error::{EcgError, EcgResult};

/// Cardiac rhythm classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rhythm {
    Sinus,
    Bradycardia,
    Tachycardia,
    #[serde(rename = "Atrial Fibrillation")]
    AtrialFibrillation,
}

impl Rhythm {
    /// All rhythms in ordinal order
    pub const ALL: [Rhythm; 4] = [
        Rhythm::Sinus,
        Rhythm::Bradycardia,
        Rhythm::Tachycardia,
        Rhythm::AtrialFibrillation,
    ];

    /// Ordinal index used by the inference feature vector
    pub fn index(&self) -> usize {
        match self {
            Rhythm::Sinus => 0,
            Rhythm::Bradycardia => 1,
            Rhythm::Tachycardia => 2,
            Rhythm::AtrialFibrillation => 3,
        }
    }

    /// Rate-based rhythm guess: below 60 bpm is bradycardic, above 100 tachycardic
    pub fn infer_from_heart_rate(heart_rate: f32) -> Self {
        if heart_rate < 60.0 {
            Rhythm::Bradycardia
        } else if heart_rate > 100.0 {
            Rhythm::Tachycardia
        } else {
            Rhythm::Sinus
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rhythm::Sinus => "Sinus",
            Rhythm::Bradycardia => "Bradycardia",
            Rhythm::Tachycardia => "Tachycardia",
            Rhythm::AtrialFibrillation => "Atrial Fibrillation",
        }
    }
}

/// T-wave shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TWaveMorphology {
    Normal,
    Inverted,
    Peaked,
    Flattened,
}

impl TWaveMorphology {
    /// All morphologies in ordinal order
    pub const ALL: [TWaveMorphology; 4] = [
        TWaveMorphology::Normal,
        TWaveMorphology::Inverted,
        TWaveMorphology::Peaked,
        TWaveMorphology::Flattened,
    ];

    /// Ordinal index used by the inference feature vector
    pub fn index(&self) -> usize {
        match self {
            TWaveMorphology::Normal => 0,
            TWaveMorphology::Inverted => 1,
            TWaveMorphology::Peaked => 2,
            TWaveMorphology::Flattened => 3,
        }
    }

    /// Peak amplitude of the T-wave lobe
    pub fn peak_amplitude(&self) -> f32 {
        match self {
            TWaveMorphology::Normal => 0.2,
            TWaveMorphology::Peaked => 0.35,
            TWaveMorphology::Flattened => 0.1,
            TWaveMorphology::Inverted => -0.2,
        }
    }

    /// QTc-based morphology guess
    pub fn infer_from_qtc(qtc_interval: f32) -> Self {
        if qtc_interval < 340.0 {
            TWaveMorphology::Inverted
        } else if qtc_interval < 360.0 {
            TWaveMorphology::Flattened
        } else if qtc_interval < 440.0 {
            TWaveMorphology::Normal
        } else {
            TWaveMorphology::Peaked
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TWaveMorphology::Normal => "Normal",
            TWaveMorphology::Inverted => "Inverted",
            TWaveMorphology::Peaked => "Peaked",
            TWaveMorphology::Flattened => "Flattened",
        }
    }
}

/// High-level cardiac parameters for one generation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcgParameters {
    /// Heart rate in beats per minute
    pub heart_rate: f32,
    /// PR interval in milliseconds
    pub pr_interval: f32,
    /// QRS duration in milliseconds
    pub qrs_duration: f32,
    /// ST elevation (millivolt-like units)
    pub st_segment: f32,
    /// Corrected QT interval in milliseconds
    pub qtc_interval: f32,
    /// Electrical axis in degrees
    pub electrical_axis: f32,
    pub rhythm: Rhythm,
    pub t_wave: TWaveMorphology,
}

impl EcgParameters {
    /// Minimum PR interval used for synthesis (ms)
    pub const MIN_PR_INTERVAL: f32 = 40.0;
    /// Minimum QRS duration used for synthesis (ms)
    pub const MIN_QRS_DURATION: f32 = 40.0;
    /// Minimum QTc interval used for synthesis (ms)
    pub const MIN_QTC_INTERVAL: f32 = 200.0;
    /// Minimum ST level used for synthesis
    pub const MIN_ST_SEGMENT: f32 = 0.04;

    /// Check that every numeric field is usable.
    ///
    /// Heart rate must be strictly positive since it divides the cycle
    /// length; below-floor intervals are accepted and clamped later.
    pub fn validate(&self) -> EcgResult<()> {
        let fields = [
            ("heart_rate", self.heart_rate),
            ("pr_interval", self.pr_interval),
            ("qrs_duration", self.qrs_duration),
            ("st_segment", self.st_segment),
            ("qtc_interval", self.qtc_interval),
            ("electrical_axis", self.electrical_axis),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EcgError::invalid(field, value, "must be a finite number"));
            }
        }

        if self.heart_rate <= 0.0 {
            return Err(EcgError::invalid("heart_rate", self.heart_rate, "must be positive"));
        }

        Ok(())
    }

    /// Copy with every interval raised to its documented floor
    pub fn clamped(&self) -> Self {
        Self {
            pr_interval: self.pr_interval.max(Self::MIN_PR_INTERVAL),
            qrs_duration: self.qrs_duration.max(Self::MIN_QRS_DURATION),
            st_segment: self.st_segment.max(Self::MIN_ST_SEGMENT),
            qtc_interval: self.qtc_interval.max(Self::MIN_QTC_INTERVAL),
            ..*self
        }
    }

    /// Replace rhythm and T-wave with the values implied by rate and QTc
    pub fn with_inferred_morphology(self) -> Self {
        Self {
            rhythm: Rhythm::infer_from_heart_rate(self.heart_rate),
            t_wave: TWaveMorphology::infer_from_qtc(self.qtc_interval),
            ..self
        }
    }

    /// Whether the synthesizer appends a U wave after the T wave
    pub fn has_u_wave(&self) -> bool {
        self.rhythm == Rhythm::Bradycardia || self.qtc_interval > 450.0
    }
}

impl Default for EcgParameters {
    fn default() -> Self {
        EcgParameters {
            heart_rate: 75.0,
            pr_interval: 160.0,
            qrs_duration: 100.0,
            st_segment: 0.1,
            qtc_interval: 400.0,
            electrical_axis: 0.0,
            rhythm: Rhythm::Sinus,
            t_wave: TWaveMorphology::Normal,
        }
    }
}

impl std::fmt::Display for Rhythm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::fmt::Display for TWaveMorphology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::fmt::Display for EcgParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {:.0} bpm (PR {:.0}ms, QRS {:.0}ms, QTc {:.0}ms, ST {:.2}, axis {:.0}°, T {})",
            self.rhythm,
            self.heart_rate,
            self.pr_interval,
            self.qrs_duration,
            self.qtc_interval,
            self.st_segment,
            self.electrical_axis,
            self.t_wave
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(EcgParameters::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_heart_rate_rejected() {
        for hr in [0.0, -60.0] {
            let params = EcgParameters { heart_rate: hr, ..Default::default() };
            match params.validate() {
                Err(EcgError::InvalidParameter { field, .. }) => assert_eq!(field, "heart_rate"),
                other => panic!("expected InvalidParameter, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let params = EcgParameters { qtc_interval: f32::NAN, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(EcgError::InvalidParameter { field: "qtc_interval", .. })
        ));

        let params = EcgParameters { electrical_axis: f32::INFINITY, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_clamping_floors() {
        let params = EcgParameters {
            pr_interval: 10.0,
            qrs_duration: 1.0,
            st_segment: -0.5,
            qtc_interval: 100.0,
            ..Default::default()
        }
        .clamped();

        assert_eq!(params.pr_interval, 40.0);
        assert_eq!(params.qrs_duration, 40.0);
        assert_eq!(params.st_segment, 0.04);
        assert_eq!(params.qtc_interval, 200.0);
        // heart rate is never floored
        assert_eq!(params.heart_rate, 75.0);
    }

    #[test]
    fn test_morphology_inference() {
        assert_eq!(Rhythm::infer_from_heart_rate(45.0), Rhythm::Bradycardia);
        assert_eq!(Rhythm::infer_from_heart_rate(60.0), Rhythm::Sinus);
        assert_eq!(Rhythm::infer_from_heart_rate(130.0), Rhythm::Tachycardia);

        assert_eq!(TWaveMorphology::infer_from_qtc(320.0), TWaveMorphology::Inverted);
        assert_eq!(TWaveMorphology::infer_from_qtc(350.0), TWaveMorphology::Flattened);
        assert_eq!(TWaveMorphology::infer_from_qtc(400.0), TWaveMorphology::Normal);
        assert_eq!(TWaveMorphology::infer_from_qtc(470.0), TWaveMorphology::Peaked);

        let params = EcgParameters { heart_rate: 48.0, qtc_interval: 480.0, ..Default::default() }
            .with_inferred_morphology();
        assert_eq!(params.rhythm, Rhythm::Bradycardia);
        assert_eq!(params.t_wave, TWaveMorphology::Peaked);
    }

    #[test]
    fn test_u_wave_condition() {
        assert!(!EcgParameters::default().has_u_wave());
        assert!(EcgParameters { rhythm: Rhythm::Bradycardia, ..Default::default() }.has_u_wave());
        assert!(EcgParameters { qtc_interval: 460.0, ..Default::default() }.has_u_wave());
    }

    #[test]
    fn test_rhythm_serde_labels() {
        let json = serde_json::to_string(&Rhythm::AtrialFibrillation).unwrap();
        assert_eq!(json, "\"Atrial Fibrillation\"");
        let rhythm: Rhythm = serde_json::from_str("\"Tachycardia\"").unwrap();
        assert_eq!(rhythm, Rhythm::Tachycardia);
    }
}
