//! The pool and stream graph.

use crate::pool::Pool;
use crate::stream::Stream;
use pond_core::{PoolId, PoolStats, StreamSelection};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Counts from one ecosystem-wide crowding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrowdingOutcome {
    /// Creatures evicted from any pool
    pub crowded_out: usize,
    /// Evicted creatures that died travelling down a stream
    pub transit_deaths: usize,
    /// Evicted creatures whose pool had no outgoing stream
    pub stranded_deaths: usize,
}

impl CrowdingOutcome {
    pub fn deaths(&self) -> usize {
        self.transit_deaths + self.stranded_deaths
    }
}

/// Pools in topology order plus the streams linking them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ecosystem {
    pools: Vec<Pool>,
    streams: Vec<Stream>,
}

impl Ecosystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pool, linking it from the previous last pool.
    pub fn add_pool(&mut self, pool: Pool) {
        if let Some(previous) = self.pools.last() {
            self.streams.push(Stream::new(previous, &pool));
        }
        self.pools.push(pool);
    }

    pub fn add_stream(&mut self, stream: Stream) {
        self.streams.push(stream);
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut [Pool] {
        &mut self.pools
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn pool(&self, id: PoolId) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id() == id)
    }

    pub fn pool_mut(&mut self, id: PoolId) -> Option<&mut Pool> {
        self.pools.iter_mut().find(|p| p.id() == id)
    }

    pub fn pool_by_name(&self, name: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.name() == name)
    }

    fn pool_index(&self, id: PoolId) -> Option<usize> {
        self.pools.iter().position(|p| p.id() == id)
    }

    /// Pick one of the streams leaving `source`, or `None` when there are none.
    pub fn random_stream<R: Rng + ?Sized>(
        &self,
        source: PoolId,
        rng: &mut R,
        selection: StreamSelection,
    ) -> Option<&Stream> {
        self.random_stream_index(source, rng, selection)
            .map(|index| &self.streams[index])
    }

    fn random_stream_index<R: Rng + ?Sized>(
        &self,
        source: PoolId,
        rng: &mut R,
        selection: StreamSelection,
    ) -> Option<usize> {
        let candidates: Vec<usize> = self
            .streams
            .iter()
            .enumerate()
            .filter(|(_, stream)| stream.source() == source)
            .map(|(index, _)| index)
            .collect();

        let pick = match (candidates.len(), selection) {
            (0, _) => return None,
            (1, _) => 0,
            (count, StreamSelection::Legacy) => rng.gen_range(0..count - 1),
            (count, StreamSelection::Uniform) => rng.gen_range(0..count),
        };
        Some(candidates[pick])
    }

    /// Evict the weakest creatures from every overcrowded pool and send them
    /// downstream. Pools without a usable outgoing stream keep their evicted
    /// creatures, marked dead, until the next sweep.
    pub fn adjust_for_crowding<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        selection: StreamSelection,
    ) -> CrowdingOutcome {
        let mut outcome = CrowdingOutcome::default();

        for index in 0..self.pools.len() {
            let removed = self.pools[index].adjust_for_crowding();
            if removed.is_empty() {
                continue;
            }
            outcome.crowded_out += removed.len();

            let source = self.pools[index].id();
            let route = self
                .random_stream_index(source, rng, selection)
                .and_then(|s| self.pool_index(self.streams[s].destination()).map(|d| (s, d)));

            match route {
                Some((stream_index, destination_index)) => {
                    let stream = &self.streams[stream_index];
                    let died = stream.transport_creatures(
                        removed,
                        &mut self.pools[destination_index],
                        rng,
                    );
                    debug!(
                        source = %source,
                        destination = %stream.destination(),
                        died,
                        "Crowded creatures sent downstream"
                    );
                    outcome.transit_deaths += died;
                }
                None => {
                    let stranded = removed.len();
                    let pool = &mut self.pools[index];
                    for mut creature in removed {
                        creature.kill();
                        pool.add_creature(Some(creature));
                    }
                    debug!(source = %source, stranded, "Crowded creatures had nowhere to go");
                    outcome.stranded_deaths += stranded;
                }
            }
        }

        outcome
    }

    /// Raw creature count across pools, including dead creatures not yet swept
    pub fn creature_population(&self) -> usize {
        self.pools.iter().map(Pool::population).sum()
    }

    pub fn living_population(&self) -> usize {
        self.pools.iter().map(Pool::living_population).sum()
    }

    pub fn remove_dead_creatures(&mut self) -> usize {
        self.pools.iter_mut().map(Pool::remove_dead_creatures).sum()
    }

    pub fn stats(&self) -> Vec<PoolStats> {
        self.pools.iter().map(Pool::stats).collect()
    }
}
