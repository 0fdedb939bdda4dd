use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures the engine refuses to paper over with a fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A positive weight (or a market quote) names an instrument the catalogue does not hold.
    #[error("instrument not found in catalogue: {0}")]
    UnknownInstrument(String),

    /// Weights must be finite and non-negative.
    #[error("invalid weight {weight} for instrument {name}")]
    InvalidWeight { name: String, weight: f64 },
}
