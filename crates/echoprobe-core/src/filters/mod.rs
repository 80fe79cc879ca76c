//! Reference filter models
//!
//! A known rational transfer function stands in for the unknown system in
//! simulation and validation: it produces the response to the excitation,
//! and independently its own analytic impulse and frequency responses for
//! comparison against the correlation estimate.

mod design;
mod transfer;

pub use design::{butterworth_lowpass, chebyshev1_lowpass};
pub use transfer::TransferFunction;
