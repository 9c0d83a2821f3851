//! Feature vector and class labels exchanged with the on-device inference runtime
//!
//! The runtime itself is an external collaborator: it consumes an 8-element
//! min-max scaled vector and answers with one probability per [`Diagnosis`].

use serde::{Deserialize, Serialize};
use crate::error::{EcgError, EcgResult};
use crate::params::{EcgParameters, Rhythm, TWaveMorphology};

/// Number of model input features
pub const FEATURE_COUNT: usize = 8;

/// Min-max scaled model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Scale raw (unclamped) parameters into model space.
    ///
    /// Order: heart rate, PR, QRS, ST, QTc, axis, rhythm, T wave.
    pub fn from_parameters(params: &EcgParameters) -> Self {
        let rhythm_steps = (Rhythm::ALL.len() - 1) as f32;
        let t_wave_steps = (TWaveMorphology::ALL.len() - 1) as f32;

        FeatureVector([
            (params.heart_rate - 30.0) / (200.0 - 30.0),
            params.pr_interval / 300.0,
            params.qrs_duration / 200.0,
            params.st_segment / 2.0,
            params.qtc_interval / 600.0,
            (params.electrical_axis + 180.0) / 360.0,
            params.rhythm.index() as f32 / rhythm_steps,
            params.t_wave.index() as f32 / t_wave_steps,
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Diagnosis classes, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Normal,
    Bradycardia,
    Tachycardia,
    #[serde(rename = "Atrial Fibrillation")]
    AtrialFibrillation,
    #[serde(rename = "Myocardial Infarction")]
    MyocardialInfarction,
    #[serde(rename = "Heart Block")]
    HeartBlock,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 6] = [
        Diagnosis::Normal,
        Diagnosis::Bradycardia,
        Diagnosis::Tachycardia,
        Diagnosis::AtrialFibrillation,
        Diagnosis::MyocardialInfarction,
        Diagnosis::HeartBlock,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Diagnosis::Normal => "Normal",
            Diagnosis::Bradycardia => "Bradycardia",
            Diagnosis::Tachycardia => "Tachycardia",
            Diagnosis::AtrialFibrillation => "Atrial Fibrillation",
            Diagnosis::MyocardialInfarction => "Myocardial Infarction",
            Diagnosis::HeartBlock => "Heart Block",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Most likely class of a probability vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    pub confidence: f32,
}

impl Prediction {
    /// Pick the arg-max of a 6-class probability vector
    pub fn from_probabilities(probabilities: &[f32]) -> EcgResult<Self> {
        if probabilities.len() != Diagnosis::ALL.len() {
            return Err(EcgError::invalid(
                "probabilities",
                probabilities.len() as f32,
                "expected one probability per diagnosis class",
            ));
        }

        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        if !confidence.is_finite() {
            return Err(EcgError::invalid("probabilities", confidence, "must be finite"));
        }

        Ok(Prediction {
            diagnosis: Diagnosis::ALL[index],
            confidence,
        })
    }

    /// Whether a learner's pick matches the model's answer
    pub fn agrees_with(&self, diagnosis: Diagnosis) -> bool {
        self.diagnosis == diagnosis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_feature_scaling() {
        let params = EcgParameters {
            heart_rate: 115.0,
            pr_interval: 150.0,
            qrs_duration: 100.0,
            st_segment: 1.0,
            qtc_interval: 300.0,
            electrical_axis: 0.0,
            rhythm: Rhythm::AtrialFibrillation,
            t_wave: TWaveMorphology::Inverted,
        };
        let features = FeatureVector::from_parameters(&params);

        assert_relative_eq!(features.0[0], 0.5);
        assert_relative_eq!(features.0[1], 0.5);
        assert_relative_eq!(features.0[2], 0.5);
        assert_relative_eq!(features.0[3], 0.5);
        assert_relative_eq!(features.0[4], 0.5);
        assert_relative_eq!(features.0[5], 0.5);
        assert_relative_eq!(features.0[6], 1.0);
        assert_relative_eq!(features.0[7], 1.0 / 3.0);
        assert_eq!(features.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_prediction_argmax() {
        let prediction = Prediction::from_probabilities(&[0.05, 0.1, 0.6, 0.1, 0.1, 0.05]).unwrap();
        assert_eq!(prediction.diagnosis, Diagnosis::Tachycardia);
        assert_relative_eq!(prediction.confidence, 0.6);
        assert!(prediction.agrees_with(Diagnosis::Tachycardia));
        assert!(!prediction.agrees_with(Diagnosis::Normal));
    }

    #[test]
    fn test_prediction_wrong_length() {
        assert!(Prediction::from_probabilities(&[0.5, 0.5]).is_err());
        assert!(Prediction::from_probabilities(&[]).is_err());
    }
}
