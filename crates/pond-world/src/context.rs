//! Per-simulation randomness and identity allocation.

use pond_core::{CreatureId, PoolId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Owns the random source and the identifier counters for one simulation.
///
/// Everything that draws random numbers or mints identifiers takes a
/// `&mut SimContext`, so two simulations never share state and a seed fully
/// determines a run.
#[derive(Debug, Clone)]
pub struct SimContext {
    seed: u64,
    rng: ChaCha8Rng,
    next_creature_id: u64,
    next_pool_id: u64,
}

impl SimContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_creature_id: 1,
            next_pool_id: 1,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn next_creature_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_creature_id);
        self.next_creature_id += 1;
        id
    }

    pub fn next_pool_id(&mut self) -> PoolId {
        let id = PoolId(self.next_pool_id);
        self.next_pool_id += 1;
        id
    }

    /// Number of creature identifiers handed out so far
    pub fn creatures_allocated(&self) -> u64 {
        self.next_creature_id - 1
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new(0)
    }
}
