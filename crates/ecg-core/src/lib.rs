//! ECG-Core: Foundation types for ECG waveform simulation
//!
//! Clinical parameter types, the synthesized waveform container and the
//! boundary types handed to prediction and inference collaborators.

pub mod params;
pub mod waveform;
pub mod features;
pub mod payload;
pub mod error;

pub use params::*;
pub use waveform::*;
pub use features::{FeatureVector, Diagnosis, Prediction, FEATURE_COUNT};
pub use payload::PredictionRequest;
pub use error::{EcgError, EcgResult};
