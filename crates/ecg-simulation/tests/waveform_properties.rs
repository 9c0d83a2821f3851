use approx::assert_abs_diff_eq;
use ecg_core::{EcgParameters, Rhythm, TWaveMorphology};
use ecg_simulation::{
    band_amplitude, classify, generate, generate_with_rng, normalize, CardiacBand, EcgSimulator,
    SimulationConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn reference() -> EcgParameters {
    EcgParameters::default()
}

fn amplitudes(params: &EcgParameters) -> Vec<f32> {
    generate(params, 3.0, 500).unwrap().amplitudes().collect()
}

#[test]
fn length_matches_duration_times_rate() {
    for (duration, rate, expected) in [(3.0, 500, 1500), (1.0, 250, 250), (0.5, 1000, 500), (2.5, 360, 900)] {
        let waveform = generate(&reference(), duration, rate).unwrap();
        assert_eq!(waveform.len(), expected);
    }
}

#[test]
fn timestamps_are_evenly_spaced() {
    let waveform = generate(&reference(), 3.0, 500).unwrap();
    let samples = waveform.samples();

    assert_eq!(samples[0].time, 0.0);
    for (i, pair) in samples.windows(2).enumerate() {
        assert!(pair[1].time > pair[0].time, "time not increasing at {}", i);
        assert_abs_diff_eq!(pair[1].time - pair[0].time, 0.002, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(samples[1499].time, 2.998, epsilon = 1e-4);
}

#[test]
fn non_fibrillation_rhythms_are_deterministic() {
    for rhythm in [Rhythm::Sinus, Rhythm::Bradycardia, Rhythm::Tachycardia] {
        let params = EcgParameters { rhythm, ..reference() };
        assert_eq!(amplitudes(&params), amplitudes(&params));
    }
}

#[test]
fn fibrillation_is_reproducible_with_a_seeded_source() {
    let params = EcgParameters { rhythm: Rhythm::AtrialFibrillation, ..reference() };

    let a = generate_with_rng(&params, 3.0, 500, &mut StdRng::seed_from_u64(11)).unwrap();
    let b = generate_with_rng(&params, 3.0, 500, &mut StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(a.samples(), b.samples());

    // jitter never exceeds its bound relative to the clean sinus trace
    let clean = amplitudes(&reference());
    for (noisy, clean) in a.amplitudes().zip(clean) {
        assert!((noisy - clean).abs() <= 0.75 + 1e-6);
    }
}

#[test]
fn reference_case_has_an_r_peak_every_cycle() {
    let values = amplitudes(&reference());
    let plan = normalize(&reference(), 500).unwrap();
    assert_eq!(plan.cycle_length_samples, 400);

    for cycle in 0..4 {
        let index = cycle * 400 + 95;
        assert!((1.4..=1.6).contains(&values[index]), "cycle {} peak {}", cycle, values[index]);
    }

    let max = values.iter().cloned().fold(f32::MIN, f32::max);
    assert!((1.4..=1.6).contains(&max));
}

#[test]
fn cycles_repeat_exactly() {
    let values = amplitudes(&reference());
    for i in 0..1100 {
        assert_eq!(values[i], values[i + 400]);
    }
}

#[test]
fn axis_shifts_the_whole_trace() {
    let base = amplitudes(&reference());
    let shifted = amplitudes(&EcgParameters { electrical_axis: 180.0, ..reference() });

    for (b, s) in base.iter().zip(&shifted) {
        assert_abs_diff_eq!(s - b, 0.3, epsilon = 1e-5);
    }
}

#[test]
fn bradycardia_scales_sinus_outside_the_u_wave() {
    let sinus = amplitudes(&reference());
    let brady = amplitudes(&EcgParameters { rhythm: Rhythm::Bradycardia, ..reference() });
    let plan = normalize(&EcgParameters { rhythm: Rhythm::Bradycardia, ..reference() }, 500).unwrap();

    let mut u_samples = 0;
    for (i, (s, b)) in sinus.iter().zip(&brady).enumerate() {
        let phase = i % plan.cycle_length_samples;
        if classify(&plan, phase) == CardiacBand::UWave {
            // sinus has no U wave here, so compare against the band itself
            let expected = (band_amplitude(&plan, phase) + plan.baseline_offset) * 0.8;
            assert_abs_diff_eq!(*b, expected, epsilon = 1e-6);
            u_samples += 1;
            continue;
        }
        assert_abs_diff_eq!(*b, s * 0.8, epsilon = 1e-6);
    }
    // four cycles, each with a full U lobe at 210..230
    assert_eq!(u_samples, 4 * plan.u_wave_samples);
}

#[test]
fn qrs_below_floor_matches_floor() {
    let tiny = amplitudes(&EcgParameters { qrs_duration: 1.0, ..reference() });
    let floor = amplitudes(&EcgParameters { qrs_duration: 40.0, ..reference() });
    assert_eq!(tiny, floor);
}

#[test]
fn t_wave_morphology_sets_the_t_apex() {
    let plan = normalize(&reference(), 500).unwrap();
    let apex = plan.t_wave_start() + plan.t_wave_samples / 2;

    for (t_wave, expected) in [
        (TWaveMorphology::Normal, 0.2),
        (TWaveMorphology::Inverted, -0.2),
        (TWaveMorphology::Peaked, 0.35),
        (TWaveMorphology::Flattened, 0.1),
    ] {
        let values = amplitudes(&EcgParameters { t_wave, ..reference() });
        assert_abs_diff_eq!(values[apex], expected, epsilon = 1e-4);
    }
}

#[test]
fn invalid_inputs_produce_no_waveform() {
    assert!(generate(&EcgParameters { heart_rate: 0.0, ..reference() }, 3.0, 500).is_err());
    assert!(generate(&EcgParameters { qtc_interval: f32::INFINITY, ..reference() }, 3.0, 500).is_err());
    assert!(generate(&reference(), 3.0, 0).is_err());
    assert!(EcgSimulator::new(SimulationConfig { duration_seconds: 0.0, ..Default::default() }).is_err());
}

#[test]
fn extreme_heart_rate_still_generates() {
    let waveform = generate(&EcgParameters { heart_rate: 1.0e6, ..reference() }, 1.0, 500).unwrap();
    assert_eq!(waveform.len(), 500);
    assert!(waveform.amplitudes().all(f32::is_finite));
}
