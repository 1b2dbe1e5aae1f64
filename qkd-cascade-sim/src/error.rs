//! Errors raised by the key distribution pipeline.

use thiserror::Error;

/// Terminal failures of a simulation run.
///
/// The two protocol aborts carry the measurement that triggered them. The
/// parameter variants are only produced by [`SimulationConfig::validate`],
/// before any randomness is drawn.
///
/// [`SimulationConfig::validate`]: crate::simulation::SimulationConfig::validate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QkdError {
    #[error("Insufficient matching bases for key establishment: {sifted_length} sifted bits (minimum {minimum})")]
    InsufficientKeyMaterial { sifted_length: usize, minimum: usize },

    #[error("Error rate too high for secure key exchange: {error_rate:.4} exceeds {threshold}")]
    ExcessiveErrorRate { error_rate: f64, threshold: f64 },

    #[error("Invalid noise level: {0}. Must be between 0.0 and 1.0")]
    InvalidNoiseLevel(f64),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, QkdError>;
