// Live session service - one paced, stoppable simulation streamed step by step
use crate::application::pacer::Pacer;
use crate::application::run_request::RunRequest;
use crate::domain::controller::ControllerConfig;
use crate::domain::error::ConfigurationError;
use crate::domain::glucose::{GlucoseStatus, Sample, SampleSeries};
use crate::domain::model::{GlucoseModel, RandomNoise};
use crate::domain::simulation::{Horizon, RunPhase, Simulation, StopHandle, StopReason};
use crate::domain::stream::StreamMessage;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, mpsc};

const STREAM_BUFFER: usize = 100;

/// The running simulation is the session's only record; readers share it.
type LiveSimulation = Simulation<RandomNoise<StdRng>>;

struct LiveSession {
    id: u64,
    started_at: DateTime<Utc>,
    config: ControllerConfig,
    horizon: Horizon,
    stop: StopHandle,
    simulation: Arc<RwLock<LiveSimulation>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: u64,
    pub started_at: DateTime<Utc>,
    pub config: ControllerConfig,
    pub horizon: Horizon,
    pub phase: RunPhase,
    pub latest_status: Option<GlucoseStatus>,
    pub stop_reason: Option<StopReason>,
    pub samples: SampleSeries,
}

#[derive(Clone)]
pub struct LiveSessionService {
    model: GlucoseModel,
    pacer: Arc<dyn Pacer>,
    current: Arc<Mutex<Option<LiveSession>>>,
    next_id: Arc<AtomicU64>,
}

impl LiveSessionService {
    pub fn new(model: GlucoseModel, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            model,
            pacer,
            current: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start a new session, stopping any session still running.
    ///
    /// The previous session's history is dropped, never continued. Returns the
    /// receiving end of the session's event stream.
    pub async fn start(
        &self,
        request: RunRequest,
    ) -> Result<mpsc::Receiver<StreamMessage>, ConfigurationError> {
        let mut simulation = Simulation::new(self.model, request.noise());
        let stop = simulation.start(request.config, request.horizon, request.initial)?;
        let initial_glucose = simulation.current_glucose().unwrap_or_default();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let started_at = Utc::now();
        let simulation = Arc::new(RwLock::new(simulation));

        let session = LiveSession {
            id,
            started_at,
            config: request.config,
            horizon: request.horizon,
            stop,
            simulation: simulation.clone(),
        };

        if let Some(previous) = self.current.lock().await.replace(session) {
            previous.stop.stop();
            tracing::info!("Session {} replaced by session {}", previous.id, id);
        }

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let started = StreamMessage::Started {
            session_id: id,
            started_at,
            config: request.config,
            horizon: request.horizon,
            initial_glucose,
        };

        tracing::info!("Live session {} started", id);
        tokio::spawn(drive(simulation, self.pacer.clone(), tx, started, id));

        Ok(rx)
    }

    /// Ask the current session to stop at its next step boundary.
    ///
    /// Returns whether there was a session to signal. Safe to call repeatedly.
    pub async fn stop(&self) -> bool {
        match self.current.lock().await.as_ref() {
            Some(session) => {
                session.stop.stop();
                tracing::info!("Stop requested for session {}", session.id);
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let current = self.current.lock().await;
        let session = current.as_ref()?;
        let simulation = session.simulation.read().await;
        let samples = simulation.series().clone();

        Some(SessionSnapshot {
            session_id: session.id,
            started_at: session.started_at,
            config: session.config,
            horizon: session.horizon,
            phase: simulation.phase(),
            latest_status: samples.last().map(Sample::status),
            stop_reason: simulation.stop_reason(),
            samples,
        })
    }
}

async fn drive(
    simulation: Arc<RwLock<LiveSimulation>>,
    pacer: Arc<dyn Pacer>,
    tx: mpsc::Sender<StreamMessage>,
    started: StreamMessage,
    session_id: u64,
) {
    let mut viewer_connected = tx.send(started).await.is_ok();

    loop {
        let (outcome, running) = {
            let mut simulation = simulation.write().await;
            let outcome = simulation.step();
            (outcome, simulation.phase() == RunPhase::Running)
        };
        let Some(outcome) = outcome else {
            break;
        };

        if viewer_connected && tx.send(StreamMessage::sample(outcome)).await.is_err() {
            tracing::debug!("Viewer of session {} disconnected", session_id);
            viewer_connected = false;
        }

        if !running {
            break;
        }
        pacer.pause().await;
    }

    let (reason, samples) = {
        let simulation = simulation.read().await;
        (
            simulation.stop_reason().unwrap_or(StopReason::Stopped),
            simulation.series().len(),
        )
    };

    tracing::info!(
        "Live session {} ended ({:?}) with {} samples",
        session_id,
        reason,
        samples
    );

    if viewer_connected {
        let _ = tx.send(StreamMessage::Completed { reason, samples }).await;
    }
}
