// Simulation driver - runs controller and model in a loop, recording samples
use crate::domain::controller::{ControllerConfig, ControllerState, compute_dose};
use crate::domain::error::ConfigurationError;
use crate::domain::glucose::{GlucoseStatus, Sample, SampleSeries};
use crate::domain::model::{GlucoseModel, NoiseSource};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// How long a run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "steps", rename_all = "snake_case")]
pub enum Horizon {
    Steps(u64),
    Unbounded,
}

/// Glucose reading the patient starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialGlucose {
    Fixed(f64),
    /// Drawn from `[low, high)` when the run starts.
    Uniform { low: f64, high: f64 },
}

impl InitialGlucose {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            InitialGlucose::Fixed(value) if !value.is_finite() => {
                Err(ConfigurationError::InvalidInitialGlucose(value))
            }
            InitialGlucose::Uniform { low, high }
                if !(low.is_finite() && high.is_finite() && low < high) =>
            {
                Err(ConfigurationError::InvalidInitialRange { low, high })
            }
            _ => Ok(()),
        }
    }

    fn draw<N: NoiseSource + ?Sized>(&self, noise: &mut N) -> f64 {
        match *self {
            InitialGlucose::Fixed(value) => value,
            InitialGlucose::Uniform { low, high } => noise.uniform(low, high),
        }
    }
}

/// Cooperative stop flag for one run. Cloneable and safe to raise from another task.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop. Takes effect at the next step boundary; repeated calls are no-ops.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Horizon,
    Stopped,
}

/// What one step produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepOutcome {
    pub sample: Sample,
    pub status: GlucoseStatus,
}

#[derive(Debug)]
struct ActiveRun {
    config: ControllerConfig,
    horizon: Horizon,
    controller: ControllerState,
    glucose: f64,
    next_time: u64,
    stop: StopHandle,
}

impl ActiveRun {
    fn horizon_reached(&self) -> bool {
        match self.horizon {
            Horizon::Steps(steps) => self.next_time >= steps,
            Horizon::Unbounded => false,
        }
    }
}

/// Idle/Running state machine around one patient.
///
/// All run state (controller history, clock, recorded series) lives here and
/// is owned by whoever owns the `Simulation`. `start` always begins from scratch.
pub struct Simulation<N> {
    model: GlucoseModel,
    noise: N,
    run: Option<ActiveRun>,
    series: SampleSeries,
    stop_reason: Option<StopReason>,
}

impl<N: NoiseSource> Simulation<N> {
    pub fn new(model: GlucoseModel, noise: N) -> Self {
        Self {
            model,
            noise,
            run: None,
            series: SampleSeries::new(),
            stop_reason: None,
        }
    }

    /// Enter Running with fresh controller state and an empty series.
    ///
    /// Any run in progress is discarded, never continued. Invalid settings are
    /// rejected before anything changes.
    pub fn start(
        &mut self,
        config: ControllerConfig,
        horizon: Horizon,
        initial: InitialGlucose,
    ) -> Result<StopHandle, ConfigurationError> {
        initial.validate()?;

        if let Some(previous) = self.run.take() {
            tracing::debug!(
                "Discarding run at t={} to start a new one",
                previous.next_time
            );
        }

        let glucose = initial.draw(&mut self.noise);
        let stop = StopHandle::default();

        tracing::info!(
            "Starting simulation: kp={}, ki={}, kd={}, target={}, initial={:.2}, horizon={:?}",
            config.kp(),
            config.ki(),
            config.kd(),
            config.target_glucose(),
            glucose,
            horizon
        );

        self.series.clear();
        self.stop_reason = None;
        self.run = Some(ActiveRun {
            config,
            horizon,
            controller: ControllerState::default(),
            glucose,
            next_time: 0,
            stop: stop.clone(),
        });

        Ok(stop)
    }

    /// Request a cooperative stop of the current run. Idempotent, no-op when idle.
    pub fn stop(&self) {
        if let Some(run) = &self.run {
            run.stop.stop();
        }
    }

    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.run.as_ref().map(|run| run.stop.clone())
    }

    /// Advance one step.
    ///
    /// Returns `None` (and goes Idle) when idle, when a stop was requested, or
    /// when the horizon has been reached.
    pub fn step(&mut self) -> Option<StepOutcome> {
        let run = self.run.as_mut()?;

        if run.stop.is_stopped() {
            self.finish(StopReason::Stopped);
            return None;
        }
        if run.horizon_reached() {
            self.finish(StopReason::Horizon);
            return None;
        }

        // Dose from the previous measurement, then let the patient respond
        let (insulin, controller) = compute_dose(run.controller, &run.config, run.glucose);
        let glucose = self.model.step(run.glucose, insulin, &mut self.noise);

        let sample = Sample::new(run.next_time, glucose, insulin);
        run.controller = controller;
        run.glucose = glucose;
        run.next_time += 1;
        let done = run.horizon_reached();

        self.series.push(sample);
        tracing::debug!(
            "t={} glucose={:.2} insulin={:.2}",
            sample.time,
            sample.glucose,
            sample.insulin
        );

        if done {
            self.finish(StopReason::Horizon);
        }

        Some(StepOutcome {
            sample,
            status: sample.status(),
        })
    }

    /// Lazy view of the remaining run; ends with the run.
    pub fn samples(&mut self) -> impl Iterator<Item = StepOutcome> + '_ {
        std::iter::from_fn(move || self.step())
    }

    fn finish(&mut self, reason: StopReason) {
        if self.run.take().is_some() {
            tracing::info!(
                "Simulation finished ({:?}) after {} samples",
                reason,
                self.series.len()
            );
            self.stop_reason = Some(reason);
        }
    }

    pub fn phase(&self) -> RunPhase {
        if self.run.is_some() {
            RunPhase::Running
        } else {
            RunPhase::Idle
        }
    }

    /// Latest glucose of the running patient; the initial value right after `start`.
    pub fn current_glucose(&self) -> Option<f64> {
        self.run.as_ref().map(|run| run.glucose)
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn into_series(self) -> SampleSeries {
        self.series
    }
}

/// Result of a fixed-horizon run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub series: SampleSeries,
    /// Classification of the last sample; `None` for an empty run.
    pub final_status: Option<GlucoseStatus>,
}

/// Run `steps` steps to completion and return the whole series at once.
pub fn run_batch<N: NoiseSource>(
    model: GlucoseModel,
    noise: N,
    config: ControllerConfig,
    steps: u64,
    initial: InitialGlucose,
) -> Result<BatchReport, ConfigurationError> {
    let mut simulation = Simulation::new(model, noise);
    simulation.start(config, Horizon::Steps(steps), initial)?;
    while simulation.step().is_some() {}

    let series = simulation.into_series();
    let final_status = series.last().map(Sample::status);
    Ok(BatchReport {
        series,
        final_status,
    })
}
