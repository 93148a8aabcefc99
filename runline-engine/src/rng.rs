//! Seeded random sources for season iterations.
//!
//! Every iteration owns a private generator whose seed is derived from the
//! batch master seed and the iteration index. No generator is shared across
//! iterations, so iterations can run in any order (or in parallel) and still
//! reproduce the same batch.

use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

use crate::numbers::unit_interval;

/// Generator type owned by one season iteration.
pub type SimRng = CountingRng<ChaCha8Rng>;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha8Rng> {
    /// Generator for iteration `index` of a batch seeded with `master_seed`.
    #[must_use]
    pub fn for_iteration(master_seed: u64, index: u64) -> Self {
        let seed = derive_iteration_seed(master_seed, index);
        log::debug!("iteration {index}: derived seed {seed:#018x}");
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator seeded directly, bypassing derivation.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> CountingRng<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// One uniform variate in `[0, 1)`.
pub fn unit_draw<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    unit_interval(rng.next_u64())
}

/// Bernoulli trial: true with probability `p`. Always consumes one draw so
/// the stream position does not depend on `p`.
pub fn bernoulli<R: RngCore + ?Sized>(rng: &mut R, p: f64) -> bool {
    unit_draw(rng) < p
}

/// HMAC-SHA256 keyed by the master seed over the iteration index; the first
/// eight digest bytes become the iteration seed.
#[must_use]
pub fn derive_iteration_seed(master_seed: u64, index: u64) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&master_seed.to_le_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(b"season");
    mac.update(&index.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
