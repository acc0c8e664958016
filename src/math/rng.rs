//! Small deterministic RNG used for per-distribution randomness

/// Simple deterministic RNG using a hash output function.
///
/// Same seed, same sequence, on every platform. Baking relies on this for
/// bit-identical attribute arrays.
#[derive(Clone, Debug)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.wrapping_add(1) }
    }

    /// Advance state and return next u32
    pub fn next_u32(&mut self) -> u32 {
        // PCG-like state update
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        // Output function
        let mut h = (self.state >> 32) as u32;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h
    }

    /// Two draws glued into a u64, used for deriving child seeds
    pub fn next_u64(&mut self) -> u64 {
        ((self.next_u32() as u64) << 32) | self.next_u32() as u64
    }

    /// Generate f32 in range [0, 1]
    pub fn next_float(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }

    /// Generate f32 in range [min, max]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_float() * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SimpleRng::new(1);
        let mut b = SimpleRng::new(2);
        let same = (0..32).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..1000 {
            let v = rng.range(-0.3, 0.3);
            assert!((-0.3..=0.3).contains(&v));
        }
    }
}
