// PID controller - insulin dose from the glucose error and its history
use crate::domain::error::ConfigurationError;
use serde::Serialize;

/// Gains and set point for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerConfig {
    kp: f64,
    ki: f64,
    kd: f64,
    target_glucose: f64,
}

impl ControllerConfig {
    /// Validate and build a configuration.
    ///
    /// Gains must be finite and non-negative; the target only needs to be finite.
    /// The slider ranges shown to users are narrower, but they are a
    /// presentation concern and are not enforced here.
    pub fn new(kp: f64, ki: f64, kd: f64, target_glucose: f64) -> Result<Self, ConfigurationError> {
        check_gain("kp", kp)?;
        check_gain("ki", ki)?;
        check_gain("kd", kd)?;
        if !target_glucose.is_finite() {
            return Err(ConfigurationError::InvalidTarget(target_glucose));
        }

        Ok(Self {
            kp,
            ki,
            kd,
            target_glucose,
        })
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn target_glucose(&self) -> f64 {
        self.target_glucose
    }
}

fn check_gain(gain: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidGain { gain, value })
    }
}

/// History carried between steps. Zeroed when a run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControllerState {
    pub integral: f64,
    pub previous_error: f64,
}

/// One PID update.
///
/// The error is `measured - target`, so a reading above target asks for more
/// insulin. The integral is a plain running sum with no anti-windup; only the
/// output is clamped at zero. Long runs at a sustained offset therefore wind
/// up, which is an accepted limitation of this model.
pub fn compute_dose(
    state: ControllerState,
    config: &ControllerConfig,
    measured_glucose: f64,
) -> (f64, ControllerState) {
    let error = measured_glucose - config.target_glucose;
    let integral = state.integral + error;
    let derivative = error - state.previous_error;

    let raw_dose = config.kp * error + config.ki * integral + config.kd * derivative;
    let dose = if raw_dose > 0.0 { raw_dose } else { 0.0 };

    (
        dose,
        ControllerState {
            integral,
            previous_error: error,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kp: f64, ki: f64, kd: f64, target: f64) -> ControllerConfig {
        ControllerConfig::new(kp, ki, kd, target).unwrap()
    }

    #[test]
    fn test_first_step_matches_hand_calculation() {
        let cfg = config(0.5, 0.01, 0.1, 100.0);
        let (dose, state) = compute_dose(ControllerState::default(), &cfg, 120.0);

        assert!((dose - 12.2).abs() < 1e-9);
        assert_eq!(state.integral, 20.0);
        assert_eq!(state.previous_error, 20.0);
    }

    #[test]
    fn test_dose_is_never_negative() {
        let cfg = config(1.0, 0.1, 0.5, 150.0);
        let mut state = ControllerState::default();

        for glucose in [40.0, 10.0, -30.0, 149.0, 151.0, 300.0, 20.0] {
            let (dose, next) = compute_dose(state, &cfg, glucose);
            assert!(dose >= 0.0, "dose {} for glucose {}", dose, glucose);
            state = next;
        }
    }

    #[test]
    fn test_pure_proportional() {
        let cfg = config(0.7, 0.0, 0.0, 100.0);
        let mut state = ControllerState::default();

        for glucose in [130.0, 112.0, 101.0, 160.0] {
            let (dose, next) = compute_dose(state, &cfg, glucose);
            assert!((dose - 0.7 * (glucose - 100.0)).abs() < 1e-12);
            state = next;
        }
    }

    #[test]
    fn test_integral_accumulates_without_decay() {
        let cfg = config(0.0, 0.01, 0.0, 100.0);
        let mut state = ControllerState::default();

        for _ in 0..50 {
            let (_, next) = compute_dose(state, &cfg, 104.0);
            state = next;
        }

        assert!((state.integral - 50.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_integral_winds_up_below_target() {
        // Output is clamped, the integral is not
        let cfg = config(0.5, 0.01, 0.0, 100.0);
        let mut state = ControllerState::default();

        for _ in 0..10 {
            let (dose, next) = compute_dose(state, &cfg, 80.0);
            assert_eq!(dose, 0.0);
            state = next;
        }

        assert_eq!(state.integral, -200.0);
    }

    #[test]
    fn test_derivative_uses_previous_error() {
        let cfg = config(0.0, 0.0, 1.0, 100.0);
        let state = ControllerState {
            integral: 0.0,
            previous_error: 5.0,
        };

        let (dose, _) = compute_dose(state, &cfg, 112.0);
        assert_eq!(dose, 7.0);
    }

    #[test]
    fn test_rejects_negative_gain() {
        assert_eq!(
            ControllerConfig::new(0.5, -0.01, 0.1, 100.0),
            Err(ConfigurationError::InvalidGain {
                gain: "ki",
                value: -0.01
            })
        );
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(ControllerConfig::new(f64::NAN, 0.0, 0.0, 100.0).is_err());
        assert!(ControllerConfig::new(0.5, 0.0, f64::INFINITY, 100.0).is_err());
        assert!(matches!(
            ControllerConfig::new(0.5, 0.0, 0.0, f64::NAN),
            Err(ConfigurationError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_accepts_gains_outside_slider_ranges() {
        assert!(ControllerConfig::new(5.0, 2.0, 3.0, 250.0).is_ok());
    }
}
