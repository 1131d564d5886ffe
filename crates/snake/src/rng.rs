//! Deterministic random numbers for food placement.

/// Linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// A zero seed is replaced with 1.
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `[0, max)`. `max` must be non-zero.
    pub fn next_range(&mut self, max: u32) -> u32 {
        // Scale instead of `%`: the low bits of an LCG are weak.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current state; seeding a new generator with it continues the sequence.
    pub fn state(&self) -> u32 {
        self.state
    }
}
