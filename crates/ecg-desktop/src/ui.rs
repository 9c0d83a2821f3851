//! UI components and state management

use ecg_core::{Diagnosis, Rhythm, TWaveMorphology};
use ecg_simulation::{presets, EngineConfig, RevealConfig};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};
use crate::app::EcgApp;

/// Sampling rates offered in the UI
const SAMPLING_RATES: [u32; 4] = [250, 360, 500, 1000];

/// Sweep cadence preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStyle {
    Web,
    Mobile,
}

/// UI state management
#[derive(Debug)]
pub struct UIState {
    // Panel visibility
    pub show_controls: bool,
    pub show_payload: bool,

    pub sweep_style: SweepStyle,
    pub user_diagnosis: Option<Diagnosis>,

    // Plot settings
    pub plot_y_range: [f32; 2],
}

impl UIState {
    pub fn new(config: &EngineConfig) -> Self {
        let sweep_style = if config.reveal == RevealConfig::mobile() {
            SweepStyle::Mobile
        } else {
            SweepStyle::Web
        };

        Self {
            show_controls: true,
            show_payload: false,
            sweep_style,
            user_diagnosis: None,
            plot_y_range: [-1.0, 2.0],
        }
    }
}

/// Control panel UI
pub struct ControlPanel;

impl ControlPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut EcgApp) {
        ui.heading("ECG Parameters");
        ui.separator();

        // Presets and quick actions
        ui.group(|ui| {
            ui.label("Examples");

            let mut chosen = None;
            egui::ComboBox::from_id_source("preset_combo")
                .selected_text("Choose preset")
                .show_ui(ui, |ui| {
                    for (name, params) in presets() {
                        if ui.selectable_label(params == app.params, name).clicked() {
                            chosen = Some(params);
                        }
                    }
                });
            if let Some(params) = chosen {
                app.apply_preset(params);
            }

            ui.horizontal(|ui| {
                if ui.button("🎲 Random example").clicked() {
                    app.randomize();
                }
                if ui.button("Infer rhythm / T wave").clicked() {
                    app.infer_morphology();
                }
            });
        });

        ui.separator();

        let mut changed = false;

        ui.group(|ui| {
            ui.label("Intervals");

            let params = &mut app.params;
            changed |= ui.add(egui::Slider::new(&mut params.heart_rate, 20.0..=250.0)
                .text("Heart rate").suffix(" bpm")).changed();
            changed |= ui.add(egui::Slider::new(&mut params.pr_interval, 40.0..=400.0)
                .text("PR").suffix(" ms")).changed();
            changed |= ui.add(egui::Slider::new(&mut params.qrs_duration, 40.0..=200.0)
                .text("QRS").suffix(" ms")).changed();
            changed |= ui.add(egui::Slider::new(&mut params.qtc_interval, 200.0..=700.0)
                .text("QTc").suffix(" ms")).changed();
            changed |= ui.add(egui::Slider::new(&mut params.st_segment, -1.0..=2.0)
                .text("ST level")).changed();
            changed |= ui.add(egui::Slider::new(&mut params.electrical_axis, -180.0..=180.0)
                .text("Axis").suffix("°")).changed();
        });

        ui.separator();

        ui.group(|ui| {
            ui.label("Morphology");

            egui::ComboBox::from_id_source("rhythm_combo")
                .selected_text(app.params.rhythm.label())
                .show_ui(ui, |ui| {
                    for rhythm in Rhythm::ALL {
                        changed |= ui.selectable_value(&mut app.params.rhythm, rhythm, rhythm.label()).clicked();
                    }
                });

            egui::ComboBox::from_id_source("t_wave_combo")
                .selected_text(app.params.t_wave.label())
                .show_ui(ui, |ui| {
                    for t_wave in TWaveMorphology::ALL {
                        changed |= ui.selectable_value(&mut app.params.t_wave, t_wave, t_wave.label()).clicked();
                    }
                });
        });

        if changed {
            app.regenerate();
        }

        ui.separator();

        // Trace length and sampling
        ui.group(|ui| {
            ui.label("Signal");

            let mut config = app.simulation_config().clone();
            let mut config_changed = ui.add(egui::Slider::new(&mut config.duration_seconds, 1.0..=10.0)
                .text("Duration").suffix("s")).changed();

            egui::ComboBox::from_id_source("sampling_rate_combo")
                .selected_text(format!("{} Hz", config.sampling_rate))
                .show_ui(ui, |ui| {
                    for rate in SAMPLING_RATES {
                        config_changed |= ui.selectable_value(&mut config.sampling_rate, rate, format!("{} Hz", rate)).clicked();
                    }
                });

            if config_changed {
                app.update_simulation(config);
            }
        });

        ui.separator();

        ui.group(|ui| {
            ui.label("Sweep");

            let mut style = app.ui_state.sweep_style;
            ui.radio_value(&mut style, SweepStyle::Web, "Smooth (1 sample / 5 ms)");
            ui.radio_value(&mut style, SweepStyle::Mobile, "Frame (15 samples / 16 ms)");
            if style != app.ui_state.sweep_style {
                app.set_sweep_style(style);
            }

            if ui.button("⟲ Restart sweep").clicked() {
                app.restart_sweep();
            }
        });

        ui.separator();
        ui.collapsing("Help", |ui| {
            ui.label("• Every change regenerates the trace and restarts the sweep");
            ui.label("• Atrial fibrillation adds random spikes, so each trace differs");
            ui.label("• Bradycardia and QTc above 450 ms add a U wave");
            ui.label("• Intervals below their minimum are widened for display");
        });
    }

    /// Model input and service payload for the current parameters
    pub fn show_payload(ui: &mut egui::Ui, app: &mut EcgApp) {
        ui.heading("Prediction Payload");
        ui.separator();

        ui.label("Your diagnosis:");
        let selected = app.ui_state.user_diagnosis.map_or("None", |d| d.label());
        egui::ComboBox::from_id_source("diagnosis_combo")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.ui_state.user_diagnosis, None, "None");
                for diagnosis in Diagnosis::ALL {
                    ui.selectable_value(&mut app.ui_state.user_diagnosis, Some(diagnosis), diagnosis.label());
                }
            });

        ui.separator();
        ui.label("Model features:");
        let features = app.feature_vector();
        let names = ["HR", "PR", "QRS", "ST", "QTc", "Axis", "Rhythm", "T wave"];
        egui::Grid::new("feature_grid").striped(true).show(ui, |ui| {
            for (name, value) in names.iter().zip(features.as_slice()) {
                ui.label(*name);
                ui.monospace(format!("{:.3}", value));
                ui.end_row();
            }
        });

        ui.separator();
        ui.label("Request body:");
        match app.prediction_request().to_json() {
            Ok(json) => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.monospace(json);
                });
            }
            Err(e) => {
                ui.colored_label(egui::Color32::RED, e.to_string());
            }
        }
    }
}

/// Sweep plot over the visible prefix of the current trace
pub struct PlotView;

impl PlotView {
    pub fn show(ui: &mut egui::Ui, app: &EcgApp) {
        ui.heading("ECG Trace");

        let Some(waveform) = app.waveform() else {
            ui.label("No waveform");
            return;
        };

        let visible = app.visible_samples();
        let points: PlotPoints = waveform
            .prefix(visible)
            .iter()
            .map(|s| [s.time, s.amplitude as f64])
            .collect();

        let [y_min, y_max] = app.ui_state.plot_y_range;

        Plot::new("ecg_plot")
            .legend(Legend::default().position(Corner::LeftTop))
            .height(420.0)
            .include_x(0.0)
            .include_x(waveform.duration() as f64)
            .include_y(y_min as f64)
            .include_y(y_max as f64)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(egui::Color32::from_rgb(100, 255, 100))
                        .name("Lead II"),
                );
            });

        ui.separator();
        let stats = waveform.stats();
        ui.horizontal(|ui| {
            ui.label(format!("Samples: {}/{}", visible.min(waveform.len()), waveform.len()));
            ui.separator();
            ui.label(format!("Rate: {} Hz", waveform.sampling_rate()));
            ui.separator();
            ui.label(format!("RMS: {:.3}mV", stats.rms));
            ui.separator();
            ui.label(format!("Peak-to-peak: {:.3}mV", stats.peak_to_peak));
        });
    }
}
