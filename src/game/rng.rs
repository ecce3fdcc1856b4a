//! 32-bit xorshift PRNG for pop targets and inter-pop delays.
//!
//! Marsaglia's xorshift32 with the 13/17/5 shift triple. Statistical
//! quality is irrelevant here; what matters is that the sequence is cheap,
//! never zero, and reproducible from the fixed session seed.

use crate::config::{POP_DELAY_MAX_MS, POP_DELAY_MIN_MS};

#[derive(Debug, Clone, Copy)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Seed must be non-zero; xorshift has a fixed point at zero.
    pub fn new(seed: u32) -> Self {
        debug_assert!(seed != 0, "xorshift32 seed must be non-zero");
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Logical mole index in 0..8.
    pub fn pop_target(&mut self) -> u8 {
        (self.next_u32() % 8) as u8
    }

    /// Delay before the next pop, uniform-ish in [250, 1000] ms.
    pub fn inter_pop_delay_ms(&mut self) -> u32 {
        let span = POP_DELAY_MAX_MS - POP_DELAY_MIN_MS + 1;
        POP_DELAY_MIN_MS + self.next_u32() % span
    }
}
