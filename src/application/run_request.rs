// Run request - validated parameters for one simulation run
use crate::domain::controller::ControllerConfig;
use crate::domain::error::ConfigurationError;
use crate::domain::model::RandomNoise;
use crate::domain::simulation::{Horizon, InitialGlucose};
use crate::infrastructure::config::{AppConfig, ControlsConfig, SimulationSettings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRequest {
    pub config: ControllerConfig,
    pub horizon: Horizon,
    pub initial: InitialGlucose,
    /// Fixed seed for reproducible runs; fresh entropy otherwise
    pub seed: Option<u64>,
}

impl RunRequest {
    pub fn noise(&self) -> RandomNoise<StdRng> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomNoise::new(rng)
    }
}

/// Client-supplied settings; anything absent falls back to [`RunDefaults`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunOverrides {
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
    pub target_glucose: Option<f64>,
    pub steps: Option<u64>,
    /// Run until stopped; ignored by batch runs, which reject it
    pub unbounded: bool,
    pub initial_glucose: Option<f64>,
    /// Draw the initial glucose from the configured range instead of the fixed default
    pub randomize_initial: bool,
    pub seed: Option<u64>,
}

/// Values used for anything a client leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDefaults {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub target_glucose: f64,
    pub steps: u64,
    pub initial_glucose: f64,
    pub initial_range: (f64, f64),
}

impl RunDefaults {
    pub fn from_settings(simulation: &SimulationSettings, controls: &ControlsConfig) -> Self {
        Self {
            kp: controls.kp.default,
            ki: controls.ki.default,
            kd: controls.kd.default,
            target_glucose: controls.target_glucose.default,
            steps: simulation.default_steps,
            initial_glucose: simulation.initial_glucose,
            initial_range: (simulation.initial_range_low, simulation.initial_range_high),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_settings(&config.simulation, &config.controls)
    }

    pub fn resolve(&self, overrides: &RunOverrides) -> Result<RunRequest, ConfigurationError> {
        let config = ControllerConfig::new(
            overrides.kp.unwrap_or(self.kp),
            overrides.ki.unwrap_or(self.ki),
            overrides.kd.unwrap_or(self.kd),
            overrides.target_glucose.unwrap_or(self.target_glucose),
        )?;

        let horizon = if overrides.unbounded {
            Horizon::Unbounded
        } else {
            Horizon::Steps(overrides.steps.unwrap_or(self.steps))
        };

        let initial = match overrides.initial_glucose {
            Some(value) => InitialGlucose::Fixed(value),
            None if overrides.randomize_initial => self.random_initial(),
            None => InitialGlucose::Fixed(self.initial_glucose),
        };
        initial.validate()?;

        Ok(RunRequest {
            config,
            horizon,
            initial,
            seed: overrides.seed,
        })
    }

    pub fn random_initial(&self) -> InitialGlucose {
        InitialGlucose::Uniform {
            low: self.initial_range.0,
            high: self.initial_range.1,
        }
    }
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
