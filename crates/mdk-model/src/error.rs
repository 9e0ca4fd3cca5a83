//! Error types for the mdk engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MdkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown interaction kernel `{0}`")]
    UnknownKernel(String),

    #[error("unknown thermostat `{0}`")]
    UnknownThermostat(String),

    #[error("size mismatch for {field}: expected {expected}, got {got}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("allocation overflow sizing {what}")]
    Allocation { what: &'static str },

    #[error(
        "rotational solve for type {type_index} molecule {molecule} \
         did not converge within {max_iterations} iterations"
    )]
    RotationNonConverged {
        type_index: usize,
        molecule: usize,
        max_iterations: usize,
    },

    #[error("correlation buffers already initialized")]
    CorrelationReinit,
}

pub type Result<T> = std::result::Result<T, MdkError>;
