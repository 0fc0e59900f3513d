// Application state for HTTP handlers
use crate::application::batch_service::BatchService;
use crate::application::dataset_service::DatasetService;
use crate::application::live_session_service::LiveSessionService;
use crate::application::pacer::pacer_for;
use crate::application::run_request::RunDefaults;
use crate::infrastructure::config::{AppConfig, ControlsConfig};

#[derive(Clone)]
pub struct AppState {
    pub batch_service: BatchService,
    pub live_sessions: LiveSessionService,
    pub dataset_service: DatasetService,
    pub defaults: RunDefaults,
    pub controls: ControlsConfig,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let model = config.model.to_model();
        let defaults = RunDefaults::from_config(config);

        Self {
            batch_service: BatchService::new(model, config.simulation.max_batch_steps),
            live_sessions: LiveSessionService::new(model, pacer_for(config.simulation.pacing())),
            dataset_service: DatasetService::new(defaults.target_glucose),
            defaults,
            controls: config.controls.clone(),
        }
    }
}
