//! Progressive reveal of a materialized waveform, emulating an oscilloscope sweep
//!
//! A sweep exposes a growing prefix of the trace one step per tick, dwells
//! once the whole trace is visible, then starts over with the same trace.
//! Each sweep runs under a generation number; once that generation is
//! retired (cancel, teardown or a newer submission) none of its ticks reach
//! the host again.

use crate::config::RevealConfig;
use async_trait::async_trait;
use ecg_core::{config_error, EcgResult, Waveform};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Sweep lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPhase {
    Idle,
    Revealing,
    Pausing,
}

/// Cursor over one waveform for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    cursor: usize,
    generation: u64,
    phase: RevealPhase,
    len: usize,
    step: usize,
}

impl RevealState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            generation: 0,
            phase: RevealPhase::Idle,
            len: 0,
            step: 1,
        }
    }

    /// Start revealing `len` samples, `step` per tick
    pub fn begin(&mut self, len: usize, step: usize, generation: u64) {
        self.cursor = 0;
        self.generation = generation;
        self.phase = RevealPhase::Revealing;
        self.len = len;
        self.step = step.max(1);
    }

    /// Advance one tick; returns the new visible length while revealing.
    ///
    /// Reaching the end of the trace moves the state to `Pausing`.
    pub fn tick(&mut self) -> Option<usize> {
        if self.phase != RevealPhase::Revealing {
            return None;
        }

        self.cursor = (self.cursor + self.step).min(self.len);
        if self.cursor >= self.len {
            self.phase = RevealPhase::Pausing;
        }
        Some(self.cursor)
    }

    /// Leave the pause and start a new sweep over the same trace
    pub fn resume_sweep(&mut self) -> bool {
        if self.phase != RevealPhase::Pausing {
            return false;
        }
        self.cursor = 0;
        self.phase = RevealPhase::Revealing;
        true
    }

    pub fn stop(&mut self) {
        self.phase = RevealPhase::Idle;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase != RevealPhase::Idle
    }
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives the visible prefix length after every tick.
///
/// Called with the generation gate held: an implementation must not cancel
/// its own sweep from inside `on_frame`.
pub trait FrameSink: Send + 'static {
    fn on_frame(&mut self, visible: usize);
}

impl<F> FrameSink for F
where
    F: FnMut(usize) + Send + 'static,
{
    fn on_frame(&mut self, visible: usize) {
        self(visible)
    }
}

/// Cadence driving a sweep
#[async_trait]
pub trait TickSource: Send + 'static {
    /// Wait for the next tick; `false` once the source is exhausted
    async fn tick(&mut self) -> bool;

    /// Wait out the pause between sweeps
    async fn dwell(&mut self, pause: Duration) {
        tokio::time::sleep(pause).await;
    }
}

/// Fixed-period timer ticks
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// First tick fires one period from now. Must be called inside a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }

    async fn dwell(&mut self, pause: Duration) {
        tokio::time::sleep(pause).await;
        self.interval.reset();
    }
}

/// Host-driven ticks, e.g. one per rendered frame
pub struct ManualTicks {
    receiver: mpsc::UnboundedReceiver<()>,
}

/// Fires ticks into a [`ManualTicks`]
#[derive(Debug, Clone)]
pub struct TickTrigger {
    sender: mpsc::UnboundedSender<()>,
}

impl TickTrigger {
    /// Queue one tick; `false` once the sweep has gone away
    pub fn fire(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

/// Create a connected manual tick source and trigger
pub fn manual_ticks() -> (ManualTicks, TickTrigger) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ManualTicks { receiver }, TickTrigger { sender })
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn tick(&mut self) -> bool {
        self.receiver.recv().await.is_some()
    }
}

#[derive(Debug, Default)]
struct GateState {
    issued: u64,
    live: Option<u64>,
}

/// Shared record of the one generation allowed to emit frames
#[derive(Debug, Clone, Default)]
struct GenerationGate {
    state: Arc<Mutex<GateState>>,
}

impl GenerationGate {
    /// Issue a new generation and make it the live one
    fn advance(&self) -> u64 {
        let mut state = self.state.lock();
        state.issued += 1;
        state.live = Some(state.issued);
        state.issued
    }

    /// Retire `generation` if it is still live
    fn retire(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.live == Some(generation) {
            state.live = None;
        }
    }

    fn live(&self) -> Option<u64> {
        self.state.lock().live
    }

    /// Run `emit` only while `generation` is live, holding the gate throughout
    fn emit_if_live(&self, generation: u64, emit: impl FnOnce()) -> bool {
        let state = self.state.lock();
        if state.live != Some(generation) {
            return false;
        }
        emit();
        true
    }
}

async fn run_sweep<T: TickSource, S: FrameSink>(
    mut state: RevealState,
    pause: Duration,
    gate: GenerationGate,
    mut ticks: T,
    mut sink: S,
) {
    let generation = state.generation();

    loop {
        match state.phase() {
            RevealPhase::Revealing => {
                if !ticks.tick().await {
                    debug!(generation, "Tick source exhausted, ending sweep");
                    break;
                }
                let Some(cursor) = state.tick() else { break };
                if !gate.emit_if_live(generation, || sink.on_frame(cursor)) {
                    trace!(generation, cursor, "Discarding stale reveal tick");
                    return;
                }
            }
            RevealPhase::Pausing => {
                ticks.dwell(pause).await;
                state.resume_sweep();
                if !gate.emit_if_live(generation, || sink.on_frame(0)) {
                    trace!(generation, "Discarding stale sweep restart");
                    return;
                }
            }
            RevealPhase::Idle => break,
        }
    }

    state.stop();
}

/// Cancellation handle for one sweep; dropping it cancels too
#[derive(Debug)]
pub struct RevealHandle {
    generation: u64,
    gate: GenerationGate,
    task: JoinHandle<()>,
}

impl RevealHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this sweep may still emit frames
    pub fn is_live(&self) -> bool {
        self.gate.live() == Some(self.generation)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the sweep. No frame for this generation is emitted after this returns.
    pub fn cancel(&self) {
        self.gate.retire(self.generation);
        self.task.abort();
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Issue a generation, emit its empty first frame and hand the rest to the runtime.
///
/// Frame 0 goes out before this returns, so the host never observes a stale
/// prefix length from the previous trace after submitting a new one.
fn spawn_sweep<T: TickSource, S: FrameSink>(
    runtime: &Handle,
    gate: &GenerationGate,
    len: usize,
    config: &RevealConfig,
    ticks: T,
    mut sink: S,
) -> RevealHandle {
    let generation = gate.advance();
    let mut state = RevealState::new();
    state.begin(len, config.step_size, generation);

    debug!(generation, len, step = config.step_size, "Starting reveal sweep");
    gate.emit_if_live(generation, || sink.on_frame(0));

    let task = runtime.spawn(run_sweep(state, config.pause(), gate.clone(), ticks, sink));

    RevealHandle {
        generation,
        gate: gate.clone(),
        task,
    }
}

fn current_runtime() -> EcgResult<Handle> {
    Handle::try_current().map_err(|e| config_error!("reveal requires a tokio runtime: {}", e))
}

/// Start a timer-driven sweep over `waveform` on the current tokio runtime.
///
/// The sweep gets a gate of its own, so its handle always reports generation 1
/// and cancelling it never affects another standalone sweep. Use
/// [`RevealScheduler`] when resubmissions must supersede each other.
pub fn start_reveal<S: FrameSink>(waveform: &Waveform, sink: S, config: RevealConfig) -> EcgResult<RevealHandle> {
    config.validate()?;
    let runtime = current_runtime()?;
    let ticks = IntervalTicks::new(config.tick_interval());
    Ok(spawn_sweep(&runtime, &GenerationGate::default(), waveform.len(), &config, ticks, sink))
}

/// Start a sweep driven by an explicit tick source, on a private gate like [`start_reveal`]
pub fn start_reveal_with<T: TickSource, S: FrameSink>(
    waveform: &Waveform,
    sink: S,
    ticks: T,
    config: RevealConfig,
) -> EcgResult<RevealHandle> {
    config.validate()?;
    let runtime = current_runtime()?;
    Ok(spawn_sweep(&runtime, &GenerationGate::default(), waveform.len(), &config, ticks, sink))
}

/// Host-owned controller keeping at most one live sweep.
///
/// Every submission draws the next number from one shared gate, which is
/// what makes an older sweep's late ticks recognisably stale.
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    gate: GenerationGate,
    current: Option<RevealHandle>,
}

impl RevealScheduler {
    pub fn new(config: RevealConfig) -> EcgResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            gate: GenerationGate::default(),
            current: None,
        })
    }

    /// Replace the running sweep with a timer-driven one over `waveform`
    pub fn submit<S: FrameSink>(&mut self, waveform: &Waveform, sink: S) -> EcgResult<u64> {
        let runtime = current_runtime()?;
        let ticks = IntervalTicks::new(self.config.tick_interval());
        Ok(self.replace(&runtime, waveform, ticks, sink))
    }

    /// Replace the running sweep with one driven by `ticks`
    pub fn submit_with<T: TickSource, S: FrameSink>(
        &mut self,
        waveform: &Waveform,
        sink: S,
        ticks: T,
    ) -> EcgResult<u64> {
        let runtime = current_runtime()?;
        Ok(self.replace(&runtime, waveform, ticks, sink))
    }

    fn replace<T: TickSource, S: FrameSink>(
        &mut self,
        runtime: &Handle,
        waveform: &Waveform,
        ticks: T,
        sink: S,
    ) -> u64 {
        self.cancel();
        let handle = spawn_sweep(runtime, &self.gate, waveform.len(), &self.config, ticks, sink);
        let generation = handle.generation();
        info!(generation, waveform = %waveform.id, samples = waveform.len(), "Sweep submitted");
        self.current = Some(handle);
        generation
    }

    /// Cancel the live sweep, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
            info!(generation = handle.generation(), "Sweep cancelled");
        }
    }

    /// Generation currently allowed to emit frames
    pub fn generation(&self) -> Option<u64> {
        self.gate.live()
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|h| h.is_live() && !h.is_finished())
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Change cadence; takes effect on the next submission
    pub fn set_config(&mut self, config: RevealConfig) -> EcgResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}
