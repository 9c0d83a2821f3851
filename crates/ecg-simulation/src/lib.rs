//! ECG-Simulation: synthetic electrocardiogram generation and sweep display
//!
//! Turns clinical parameters into a sampled multi-cycle trace and reveals it
//! progressively the way a bedside monitor sweeps its screen.

pub mod config;
pub mod cycle;
pub mod normalizer;
pub mod presets;
pub mod reveal;
pub mod sequencer;

pub use config::*;
pub use cycle::*;
pub use normalizer::{normalize, total_samples, SamplingPlan, DEFAULT_SAMPLING_RATE, MAX_TOTAL_SAMPLES};
pub use presets::*;
pub use reveal::*;
pub use sequencer::*;
