//! Core types for PRBS system identification
//!
//! Defines the error enum shared by every pipeline stage and the
//! result/sample aliases used throughout the crate.

/// A floating point sample (for real-valued signals).
pub type Sample = f64;

/// Result type for identification operations.
pub type SysIdResult<T> = Result<T, SysIdError>;

/// Errors that can occur during a measurement.
///
/// All variants are local validation failures detected before or during a
/// pipeline stage. Nothing is retried automatically and no partial results
/// are produced: a stage either completes with a fully populated result or
/// fails with one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SysIdError {
    #[error("unsupported PRBS order: {0}. Supported orders are 7, 9, 15, 20 and 23")]
    UnsupportedOrder(u32),

    #[error("invalid PRBS seed: register state is zero")]
    InvalidSeed,

    #[error("invalid analysis window: {0} samples")]
    InvalidWindow(usize),

    #[error("insufficient data: got {actual} samples, need at least {needed}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("capture too short to align: got {actual} samples, need at least {needed}")]
    InsufficientCaptureLength { needed: usize, actual: usize },

    #[error("degenerate signal: {0}")]
    DegenerateSignal(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
