//! Main application state: regenerate on every parameter change, sweep the result

use ecg_core::{EcgParameters, PredictionRequest, FeatureVector, Waveform};
use ecg_simulation::{random_example, EcgSimulator, EngineConfig, RevealConfig, RevealScheduler, SimulationConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ui::{ControlPanel, PlotView, SweepStyle, UIState};

/// Main application state
pub struct EcgApp {
    // Tokio runtime hosting the reveal sweeps
    runtime: tokio::runtime::Runtime,
    ctx: egui::Context,

    simulator: EcgSimulator,
    scheduler: RevealScheduler,

    // Written by the sweep, read by the plot
    visible: Arc<AtomicUsize>,
    waveform: Option<Waveform>,

    pub params: EcgParameters,
    pub ui_state: UIState,
    last_error: Option<String>,
}

impl EcgApp {
    /// Create the app and start sweeping the default parameters
    pub fn new(config: EngineConfig, ctx: egui::Context) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

        let simulator = EcgSimulator::new(config.simulation.clone())?;
        let scheduler = RevealScheduler::new(config.reveal)?;

        let mut app = EcgApp {
            runtime,
            ctx,
            simulator,
            scheduler,
            visible: Arc::new(AtomicUsize::new(0)),
            waveform: None,
            params: EcgParameters::default(),
            ui_state: UIState::new(&config),
            last_error: None,
        };

        app.regenerate();
        Ok(app)
    }

    /// Build a new waveform from the current parameters and restart the sweep.
    ///
    /// Rejected parameters leave the previous trace and its sweep running.
    pub fn regenerate(&mut self) {
        match self.simulator.generate(&self.params) {
            Ok(waveform) => self.submit(waveform),
            Err(e) => {
                warn!(error = %e, "Rejected parameters");
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Restart the sweep over the current trace without regenerating it
    pub fn restart_sweep(&mut self) {
        if let Some(waveform) = self.waveform.clone() {
            self.submit(waveform);
        }
    }

    fn submit(&mut self, waveform: Waveform) {
        let _guard = self.runtime.enter();

        let visible = Arc::clone(&self.visible);
        let ctx = self.ctx.clone();
        let sink = move |n: usize| {
            visible.store(n, Ordering::Relaxed);
            ctx.request_repaint();
        };

        match self.scheduler.submit(&waveform, sink) {
            Ok(generation) => {
                // the sweep has already published frame 0 through the sink
                debug!(generation, samples = waveform.len(), "Sweeping new waveform");
                self.waveform = Some(waveform);
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to start sweep");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn apply_preset(&mut self, params: EcgParameters) {
        self.params = params;
        self.regenerate();
    }

    /// Fill every parameter with plausible random values
    pub fn randomize(&mut self) {
        self.params = random_example(&mut rand::thread_rng());
        info!(params = %self.params, "Random example");
        self.regenerate();
    }

    /// Derive rhythm and T wave from heart rate and QTc
    pub fn infer_morphology(&mut self) {
        self.params = self.params.with_inferred_morphology();
        self.regenerate();
    }

    pub fn set_sweep_style(&mut self, style: SweepStyle) {
        let config = match style {
            SweepStyle::Web => RevealConfig::web(),
            SweepStyle::Mobile => RevealConfig::mobile(),
        };
        if let Err(e) = self.scheduler.set_config(config) {
            self.last_error = Some(e.to_string());
            return;
        }
        self.ui_state.sweep_style = style;
        self.restart_sweep();
    }

    pub fn update_simulation(&mut self, config: SimulationConfig) {
        match self.simulator.update_config(config) {
            Ok(()) => self.regenerate(),
            Err(e) => {
                warn!(error = %e, "Rejected simulation config");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn simulation_config(&self) -> &SimulationConfig {
        self.simulator.config()
    }

    pub fn visible_samples(&self) -> usize {
        self.visible.load(Ordering::Relaxed)
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.waveform.as_ref()
    }

    pub fn generation(&self) -> Option<u64> {
        self.scheduler.generation()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Payload the prediction service would receive for the current parameters
    pub fn prediction_request(&self) -> PredictionRequest {
        let request = PredictionRequest::from_parameters(&self.params);
        match self.ui_state.user_diagnosis {
            Some(diagnosis) => request.with_user_diagnosis(diagnosis),
            None => request,
        }
    }

    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector::from_parameters(&self.params)
    }
}

impl eframe::App for EcgApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.ui_state.show_controls, "Show Controls");
                    ui.checkbox(&mut self.ui_state.show_payload, "Show Prediction Payload");
                });

                ui.separator();
                ui.label(format!("{}", self.params));

                if let Some(generation) = self.generation() {
                    ui.separator();
                    ui.colored_label(egui::Color32::GREEN, format!("● SWEEP #{}", generation));
                }
            });
        });

        if self.ui_state.show_controls {
            egui::SidePanel::left("control_panel")
                .resizable(true)
                .default_width(300.0)
                .show(ctx, |ui| {
                    ControlPanel::show(ui, self);
                });
        }

        if self.ui_state.show_payload {
            egui::SidePanel::right("payload_panel")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| {
                    ControlPanel::show_payload(ui, self);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = self.last_error() {
                ui.colored_label(egui::Color32::RED, error);
            }
            PlotView::show(ui, self);
        });
    }
}

impl Drop for EcgApp {
    fn drop(&mut self) {
        self.scheduler.cancel();
        info!("ECG desktop shut down");
    }
}
