//! Mole placement: picks the next hot cell and remembers the previous one so
//! the mole never stays put between two relocations.

// PCG-style LCG constants (same multiplier as Knuth's MMIX generator).
const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1_442_695_040_888_963_407;
const FALLBACK_SEED: u64 = 0x5EED_CAFE_F00D_D00D;

/// Pseudorandom cell picker. Not crypto secure; only has to feel random to a
/// player and be reproducible from a seed in tests.
#[derive(Clone, Debug)]
pub struct MoleSpawner {
    rng_state: u64,
    previous: Option<usize>,
}

impl MoleSpawner {
    pub fn new(seed: u64) -> Self {
        Self { rng_state: seed, previous: None }
    }

    /// Seeds from the platform RNG (`crypto.getRandomValues` in the browser).
    #[cfg(feature = "rng")]
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => Self::new(u64::from_le_bytes(buf)),
            Err(err) => {
                log::warn!("getrandom failed ({err}), using fixed mole seed");
                Self::new(FALLBACK_SEED)
            }
        }
    }

    /// Index of the last spawned mole, if tracking has not been reset since.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// Returns an index in `[0, cell_count)`. With `avoid_repeat` the result
    /// differs from the previous index by choosing among the other
    /// `cell_count - 1` cells. A zero-sized grid yields 0.
    pub fn spawn_mole(&mut self, cell_count: usize, avoid_repeat: bool) -> usize {
        if cell_count == 0 {
            return 0;
        }
        let idx = match self.previous {
            Some(prev) if avoid_repeat && cell_count >= 2 && prev < cell_count => {
                // Skip over `prev` so every other cell stays equally likely.
                let pick = self.rand_index(cell_count - 1);
                if pick >= prev { pick + 1 } else { pick }
            }
            _ => self.rand_index(cell_count),
        };
        self.previous = Some(idx);
        idx
    }

    pub fn reset_mole_position(&mut self) {
        self.previous = None;
    }

    fn next_u32(&mut self) -> u32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        (self.rng_state >> 33) as u32
    }

    fn rand_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_u32() as usize % len
    }
}

impl Default for MoleSpawner {
    #[cfg(feature = "rng")]
    fn default() -> Self {
        Self::from_entropy()
    }

    #[cfg(not(feature = "rng"))]
    fn default() -> Self {
        Self::new(FALLBACK_SEED)
    }
}
