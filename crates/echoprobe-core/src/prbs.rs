//! PRBS Source — maximal-length pseudo-random binary excitation
//!
//! Generates deterministic bipolar pseudo-random sequences from a Fibonacci
//! linear-feedback shift register. Each supported register width uses a
//! primitive feedback polynomial, so one period covers all `2^n - 1` nonzero
//! register states before repeating. The near-impulsive autocorrelation of
//! these sequences is what makes cross-correlation identification work.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::prbs::{PrbsGenerator, PrbsOrder};
//!
//! let mut gen = PrbsGenerator::new(PrbsOrder::Order7, 0x01).unwrap();
//! let samples = gen.generate(127);
//! assert_eq!(samples.len(), 127);
//! assert!(samples.iter().all(|&s| s == 1.0 || s == -1.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{SysIdError, SysIdResult};

/// Supported LFSR register widths.
///
/// Each order carries a fixed tap pair chosen so the register cycles through
/// the full `2^n - 1` nonzero states (primitive polynomial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrbsOrder {
    /// x^7 + x^6 + 1, period 127
    Order7,
    /// x^9 + x^5 + 1, period 511
    Order9,
    /// x^15 + x^14 + 1, period 32767
    Order15,
    /// x^20 + x^3 + 1, period 1048575
    Order20,
    /// x^23 + x^18 + 1, period 8388607
    Order23,
}

impl PrbsOrder {
    /// All supported orders, shortest period first.
    pub const ALL: [PrbsOrder; 5] = [
        PrbsOrder::Order7,
        PrbsOrder::Order9,
        PrbsOrder::Order15,
        PrbsOrder::Order20,
        PrbsOrder::Order23,
    ];

    /// Register length in bits.
    pub fn register_bits(self) -> u32 {
        match self {
            PrbsOrder::Order7 => 7,
            PrbsOrder::Order9 => 9,
            PrbsOrder::Order15 => 15,
            PrbsOrder::Order20 => 20,
            PrbsOrder::Order23 => 23,
        }
    }

    /// Feedback tap bit positions, counted from LSB = 0.
    pub fn taps(self) -> (u32, u32) {
        match self {
            PrbsOrder::Order7 => (6, 5),
            PrbsOrder::Order9 => (8, 4),
            PrbsOrder::Order15 => (14, 13),
            PrbsOrder::Order20 => (19, 2),
            PrbsOrder::Order23 => (22, 17),
        }
    }

    /// Sequence period, `2^n - 1`.
    pub fn period(self) -> usize {
        (1usize << self.register_bits()) - 1
    }

    /// Mask covering the valid register bits.
    pub fn mask(self) -> u64 {
        (1u64 << self.register_bits()) - 1
    }
}

impl TryFrom<u32> for PrbsOrder {
    type Error = SysIdError;

    fn try_from(value: u32) -> SysIdResult<Self> {
        match value {
            7 => Ok(PrbsOrder::Order7),
            9 => Ok(PrbsOrder::Order9),
            15 => Ok(PrbsOrder::Order15),
            20 => Ok(PrbsOrder::Order20),
            23 => Ok(PrbsOrder::Order23),
            other => Err(SysIdError::UnsupportedOrder(other)),
        }
    }
}

/// Fibonacci LFSR emitting bipolar NRZ samples.
///
/// Each step XORs the two tap bits into a feedback bit, shifts the register
/// left with the feedback bit entering at position 0, and emits the feedback
/// bit mapped to -1.0 / +1.0. The sequence is a pure function of
/// `(order, seed)`: reseeding reproduces it bit for bit.
#[derive(Debug, Clone)]
pub struct PrbsGenerator {
    order: PrbsOrder,
    /// Current register state.
    state: u64,
    /// Initial state, kept for reset.
    seed: u64,
}

impl PrbsGenerator {
    /// Create a generator.
    ///
    /// The seed is masked to the register width; a masked value of zero is
    /// rejected with `InvalidSeed` (an all-zero register never leaves the
    /// zero state and would emit a constant sequence).
    pub fn new(order: PrbsOrder, seed: u64) -> SysIdResult<Self> {
        let seed = seed & order.mask();
        if seed == 0 {
            return Err(SysIdError::InvalidSeed);
        }
        Ok(Self {
            order,
            state: seed,
            seed,
        })
    }

    /// Clock the register one step and return the feedback bit (0 or 1).
    #[inline]
    pub fn next_bit(&mut self) -> u8 {
        let (t1, t2) = self.order.taps();
        let feedback = ((self.state >> t1) ^ (self.state >> t2)) & 1;
        self.state = ((self.state << 1) | feedback) & self.order.mask();
        feedback as u8
    }

    /// Next bipolar NRZ sample: bit 0 maps to -1.0, bit 1 to +1.0.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        if self.next_bit() != 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Generate `length` bipolar samples.
    ///
    /// Requesting more than one period is legal and yields a periodic
    /// repetition of the maximal-length sequence, used for
    /// averaging-by-repetition in hardware measurements.
    pub fn generate(&mut self, length: usize) -> Vec<f64> {
        (0..length).map(|_| self.next_sample()).collect()
    }

    /// Rewind to the initial seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    /// Current register state.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Register order.
    pub fn order(&self) -> PrbsOrder {
        self.order
    }
}

/// Generate a bipolar PRBS excitation in one call.
///
/// Pure function of `(order, length, seed)`; see [`PrbsGenerator`].
pub fn generate(order: PrbsOrder, length: usize, seed: u64) -> SysIdResult<Vec<f64>> {
    let mut gen = PrbsGenerator::new(order, seed)?;
    Ok(gen.generate(length))
}
