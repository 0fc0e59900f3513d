// Live session events - what a running session pushes to its viewer
use crate::domain::controller::ControllerConfig;
use crate::domain::simulation::{Horizon, StepOutcome, StopReason};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// First message of every session
    Started {
        session_id: u64,
        started_at: DateTime<Utc>,
        config: ControllerConfig,
        horizon: Horizon,
        initial_glucose: f64,
    },
    Sample {
        #[serde(flatten)]
        outcome: StepOutcome,
        message: &'static str,
    },
    /// Last message; the series recorded so far stays available as a snapshot
    Completed { reason: StopReason, samples: usize },
}

impl StreamMessage {
    pub fn sample(outcome: StepOutcome) -> Self {
        StreamMessage::Sample {
            outcome,
            message: outcome.status.message(),
        }
    }
}
