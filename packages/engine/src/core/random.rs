//! Seeded xorshift32 generator.
//!
//! Every world owns its own generator so spawn positions and colours are
//! reproducible for a given seed.

/// Random number generator step (xorshift32). `state` must be non-zero.
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        let state = if seed == 0 { 0x9E37_79B9 } else { seed };
        Self { state }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        xorshift32(&mut self.state)
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    #[inline]
    pub fn coin_flip(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(12345)
    }
}
