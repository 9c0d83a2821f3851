//! Plaintext parameter payload for the remote prediction service
//!
//! The host encrypts the JSON produced here before sending it; encryption and
//! transport are not part of this crate.

use serde::{Deserialize, Serialize};
use crate::error::{EcgError, EcgResult};
use crate::features::Diagnosis;
use crate::params::{EcgParameters, Rhythm, TWaveMorphology};

/// Raw parameter set under the field names the service expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f32,
    #[serde(rename = "PR_Interval")]
    pub pr_interval: f32,
    #[serde(rename = "QRS_Duration")]
    pub qrs_duration: f32,
    #[serde(rename = "ST_Segment")]
    pub st_segment: f32,
    #[serde(rename = "QTc_Interval")]
    pub qtc_interval: f32,
    #[serde(rename = "Electrical_Axis")]
    pub electrical_axis: f32,
    #[serde(rename = "Rhythm")]
    pub rhythm: Rhythm,
    #[serde(rename = "T_Wave")]
    pub t_wave: TWaveMorphology,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_diagnosis: Option<Diagnosis>,
}

impl PredictionRequest {
    pub fn from_parameters(params: &EcgParameters) -> Self {
        PredictionRequest {
            heart_rate: params.heart_rate,
            pr_interval: params.pr_interval,
            qrs_duration: params.qrs_duration,
            st_segment: params.st_segment,
            qtc_interval: params.qtc_interval,
            electrical_axis: params.electrical_axis,
            rhythm: params.rhythm,
            t_wave: params.t_wave,
            user_diagnosis: None,
        }
    }

    /// Attach the learner's own diagnosis for server-side scoring
    pub fn with_user_diagnosis(mut self, diagnosis: Diagnosis) -> Self {
        self.user_diagnosis = Some(diagnosis);
        self
    }

    pub fn parameters(&self) -> EcgParameters {
        EcgParameters {
            heart_rate: self.heart_rate,
            pr_interval: self.pr_interval,
            qrs_duration: self.qrs_duration,
            st_segment: self.st_segment,
            qtc_interval: self.qtc_interval,
            electrical_axis: self.electrical_axis,
            rhythm: self.rhythm,
            t_wave: self.t_wave,
        }
    }

    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string(self).map_err(|e| EcgError::Serialization {
            reason: format!("Failed to serialize prediction request: {}", e),
        })
    }

    pub fn from_json(json: &str) -> EcgResult<Self> {
        serde_json::from_str(json).map_err(|e| EcgError::Serialization {
            reason: format!("Failed to parse prediction request: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_field_names() {
        let params = EcgParameters {
            rhythm: Rhythm::AtrialFibrillation,
            ..Default::default()
        };
        let json = PredictionRequest::from_parameters(&params).to_json().unwrap();

        for key in [
            "\"Heart_Rate\"",
            "\"PR_Interval\"",
            "\"QRS_Duration\"",
            "\"ST_Segment\"",
            "\"QTc_Interval\"",
            "\"Electrical_Axis\"",
            "\"Rhythm\":\"Atrial Fibrillation\"",
            "\"T_Wave\":\"Normal\"",
        ] {
            assert!(json.contains(key), "missing {} in {}", key, json);
        }
        assert!(!json.contains("user_diagnosis"));
    }

    #[test]
    fn test_user_diagnosis_included() {
        let request = PredictionRequest::from_parameters(&EcgParameters::default())
            .with_user_diagnosis(Diagnosis::HeartBlock);
        let json = request.to_json().unwrap();
        assert!(json.contains("\"user_diagnosis\":\"Heart Block\""));

        let parsed = PredictionRequest::from_json(&json).unwrap();
        assert_eq!(parsed.user_diagnosis, Some(Diagnosis::HeartBlock));
        assert_eq!(parsed.parameters(), EcgParameters::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PredictionRequest::from_json("{\"Heart_Rate\": \"fast\"}"),
            Err(EcgError::Serialization { .. })
        ));
    }
}
