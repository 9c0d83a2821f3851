//! Named clinical parameter sets and random example values

use ecg_core::{EcgParameters, Rhythm, TWaveMorphology};
use rand::Rng;

/// Common teaching cases
pub fn presets() -> Vec<(&'static str, EcgParameters)> {
    let normal = EcgParameters::default();

    vec![
        ("Normal Sinus", normal),
        ("Sinus Bradycardia", EcgParameters {
            heart_rate: 48.0, rhythm: Rhythm::Bradycardia, ..normal
        }),
        ("Sinus Tachycardia", EcgParameters {
            heart_rate: 125.0, pr_interval: 130.0, qtc_interval: 420.0,
            rhythm: Rhythm::Tachycardia, ..normal
        }),
        ("Atrial Fibrillation", EcgParameters {
            heart_rate: 110.0, pr_interval: 120.0, rhythm: Rhythm::AtrialFibrillation, ..normal
        }),
        ("Long QT", EcgParameters {
            heart_rate: 65.0, qtc_interval: 500.0, t_wave: TWaveMorphology::Flattened, ..normal
        }),
        ("Hyperkalemia", EcgParameters {
            qrs_duration: 130.0, t_wave: TWaveMorphology::Peaked, ..normal
        }),
        ("Ischemia", EcgParameters {
            st_segment: 1.5, t_wave: TWaveMorphology::Inverted, ..normal
        }),
    ]
}

/// Look up a preset by name, ignoring case
pub fn preset(name: &str) -> Option<EcgParameters> {
    presets()
        .into_iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(name))
        .map(|(_, params)| params)
}

/// Plausible random values for every parameter
pub fn random_example<R: Rng + ?Sized>(rng: &mut R) -> EcgParameters {
    EcgParameters {
        heart_rate: rng.gen_range(60..=120) as f32,
        pr_interval: rng.gen_range(120..=200) as f32,
        qrs_duration: rng.gen_range(80..=120) as f32,
        st_segment: (rng.gen_range(-1.0f32..=2.0) * 10.0).round() / 10.0,
        qtc_interval: rng.gen_range(360..=460) as f32,
        electrical_axis: rng.gen_range(-30..=120) as f32,
        rhythm: Rhythm::ALL[rng.gen_range(0..Rhythm::ALL.len())],
        t_wave: TWaveMorphology::ALL[rng.gen_range(0..TWaveMorphology::ALL.len())],
    }
}
