use crate::domain::model::{
    DEFAULT_DECAY_FACTOR, DEFAULT_NOISE_SCALE, DEFAULT_VARIABILITY_SCALE, GlucoseModel,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub controls: ControlsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub default_steps: u64,
    pub max_batch_steps: u64,
    pub initial_glucose: f64,
    pub initial_range_low: f64,
    pub initial_range_high: f64,
    /// Delay between live samples; 0 disables pacing
    pub pacing_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            default_steps: 100,
            max_batch_steps: 10_000,
            initial_glucose: 120.0,
            initial_range_low: 100.0,
            initial_range_high: 140.0,
            pacing_ms: 200,
        }
    }
}

impl SimulationSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelSettings {
    pub variability_scale: f64,
    pub noise_scale: f64,
    pub decay_factor: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            variability_scale: DEFAULT_VARIABILITY_SCALE,
            noise_scale: DEFAULT_NOISE_SCALE,
            decay_factor: DEFAULT_DECAY_FACTOR,
        }
    }
}

impl ModelSettings {
    pub fn to_model(&self) -> GlucoseModel {
        GlucoseModel::new(self.variability_scale, self.noise_scale, self.decay_factor)
    }
}

/// Slider ranges and defaults offered to clients.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub target_glucose: SliderConfig,
    pub kp: SliderConfig,
    pub ki: SliderConfig,
    pub kd: SliderConfig,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            target_glucose: SliderConfig::new("Target Glucose (mg/dL)", 70.0, 180.0, 100.0, 1.0),
            kp: SliderConfig::new("Kp (Proportional Gain)", 0.0, 1.0, 0.5, 0.01),
            ki: SliderConfig::new("Ki (Integral Gain)", 0.0, 0.1, 0.01, 0.001),
            kd: SliderConfig::new("Kd (Derivative Gain)", 0.0, 0.2, 0.1, 0.01),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SliderConfig {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl SliderConfig {
    fn new(label: &str, min: f64, max: f64, default: f64, step: f64) -> Self {
        Self {
            label: label.to_string(),
            min,
            max,
            default,
            step,
        }
    }
}

/// Load `config/simulator.*` (optional) overridden by `GLUCOSIM__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/simulator").required(false))
        .add_source(
            config::Environment::with_prefix("GLUCOSIM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn parse_app_config(toml: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_app_config("").unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.simulation.default_steps, 100);
        assert_eq!(config.simulation.pacing(), Duration::from_millis(200));
        assert_eq!(config.model.to_model(), GlucoseModel::default());
        assert_eq!(config.controls, ControlsConfig::default());
    }

    #[test]
    fn test_partial_sections_override_defaults() {
        let config = parse_app_config(
            r#"
            [simulation]
            default_steps = 30
            pacing_ms = 0

            [model]
            decay_factor = 0.5

            [controls.kd]
            label = "Kd"
            min = 0.0
            max = 0.5
            default = 0.05
            step = 0.01
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.default_steps, 30);
        assert_eq!(config.simulation.initial_glucose, 120.0);
        assert!(config.simulation.pacing().is_zero());
        assert_eq!(config.model.decay_factor, 0.5);
        assert_eq!(config.model.variability_scale, 2.0);
        assert_eq!(config.controls.kd.max, 0.5);
        assert_eq!(config.controls.kp.default, 0.5);
    }
}
