// Batch service - fixed-horizon runs returned in one piece
use crate::application::run_request::RunRequest;
use crate::domain::error::ConfigurationError;
use crate::domain::model::GlucoseModel;
use crate::domain::simulation::{BatchReport, Horizon, run_batch};

#[derive(Clone)]
pub struct BatchService {
    model: GlucoseModel,
    max_steps: u64,
}

impl BatchService {
    pub fn new(model: GlucoseModel, max_steps: u64) -> Self {
        Self { model, max_steps }
    }

    pub fn run(&self, request: &RunRequest) -> Result<BatchReport, ConfigurationError> {
        let steps = match request.horizon {
            Horizon::Steps(steps) if steps > self.max_steps => {
                return Err(ConfigurationError::HorizonTooLong {
                    steps,
                    max: self.max_steps,
                });
            }
            Horizon::Steps(steps) => steps,
            Horizon::Unbounded => return Err(ConfigurationError::UnboundedBatch),
        };

        let report = run_batch(
            self.model,
            request.noise(),
            request.config,
            steps,
            request.initial,
        )?;

        match report.final_status {
            Some(status) => tracing::info!(
                "Batch run finished: {} samples, final status {}",
                report.series.len(),
                status
            ),
            None => tracing::info!("Batch run finished with no samples"),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::run_request::{RunDefaults, RunOverrides};

    fn request(overrides: RunOverrides) -> RunRequest {
        RunDefaults::default().resolve(&overrides).unwrap()
    }

    #[test]
    fn test_runs_requested_steps() {
        let service = BatchService::new(GlucoseModel::default(), 1_000);
        let report = service
            .run(&request(RunOverrides {
                steps: Some(30),
                seed: Some(1),
                ..Default::default()
            }))
            .unwrap();

        assert_eq!(report.series.len(), 30);
        assert!(report.final_status.is_some());
    }

    #[test]
    fn test_rejects_unbounded() {
        let service = BatchService::new(GlucoseModel::default(), 1_000);
        let err = service
            .run(&request(RunOverrides {
                unbounded: true,
                ..Default::default()
            }))
            .unwrap_err();

        assert_eq!(err, ConfigurationError::UnboundedBatch);
    }

    #[test]
    fn test_rejects_oversized_horizon() {
        let service = BatchService::new(GlucoseModel::default(), 50);
        let err = service
            .run(&request(RunOverrides {
                steps: Some(51),
                ..Default::default()
            }))
            .unwrap_err();

        assert_eq!(err, ConfigurationError::HorizonTooLong { steps: 51, max: 50 });
    }

    #[test]
    fn test_same_seed_same_report() {
        let service = BatchService::new(GlucoseModel::default(), 1_000);
        let req = request(RunOverrides {
            seed: Some(21),
            randomize_initial: true,
            ..Default::default()
        });

        assert_eq!(service.run(&req).unwrap(), service.run(&req).unwrap());
    }
}
