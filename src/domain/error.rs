// Domain errors - detected at the boundary, before a run enters the Running state
use thiserror::Error;

/// A controller, horizon or initial-glucose setting outside its numeric domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{gain} must be finite and non-negative, got {value}")]
    InvalidGain { gain: &'static str, value: f64 },

    #[error("target glucose must be finite, got {0}")]
    InvalidTarget(f64),

    #[error("initial glucose must be finite, got {0}")]
    InvalidInitialGlucose(f64),

    #[error("initial glucose range [{low}, {high}) is empty or not finite")]
    InvalidInitialRange { low: f64, high: f64 },

    #[error("{steps} steps exceeds the batch limit of {max}")]
    HorizonTooLong { steps: u64, max: u64 },

    #[error("a batch run needs a fixed number of steps")]
    UnboundedBatch,
}

/// An uploaded dataset that cannot be displayed.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV must contain a '{0}' column")]
    MissingField(String),

    #[error("row {row}: '{value}' is not a glucose reading")]
    InvalidReading { row: usize, value: String },

    #[error("malformed CSV: {0}")]
    Malformed(String),
}
