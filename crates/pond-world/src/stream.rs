//! Streams: one-way, lossy links between pools.

use crate::creature::Creature;
use crate::pool::Pool;
use pond_core::PoolId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Directed edge from a source pool to a destination pool.
///
/// The stream's water chemistry is copied from the source pool when the
/// source is assigned; later changes to the pool are not reflected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    source: PoolId,
    destination: PoolId,
    ph: f64,
    temperature: f64,
}

impl Stream {
    pub fn new(source: &Pool, destination: &Pool) -> Self {
        Self {
            source: source.id(),
            destination: destination.id(),
            ph: source.ph(),
            temperature: source.temperature(),
        }
    }

    pub fn source(&self) -> PoolId {
        self.source
    }

    pub fn destination(&self) -> PoolId {
        self.destination
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_source(&mut self, pool: &Pool) {
        self.source = pool.id();
        self.ph = pool.ph();
        self.temperature = pool.temperature();
    }

    pub fn set_destination(&mut self, pool: &Pool) {
        self.destination = pool.id();
    }

    /// Move creatures into `destination`. A creature survives the trip when
    /// its draw falls below its health coefficient; the rest arrive dead and
    /// wait for the destination's next sweep. Returns the transit deaths.
    pub fn transport_creatures<R: Rng + ?Sized>(
        &self,
        creatures: Vec<Creature>,
        destination: &mut Pool,
        rng: &mut R,
    ) -> usize {
        debug_assert_eq!(destination.id(), self.destination);

        let mut died = 0;
        let mut arrivals = Vec::with_capacity(creatures.len());
        for mut creature in creatures {
            if rng.gen::<f64>() >= creature.coefficient() {
                creature.kill();
                died += 1;
            }
            arrivals.push(creature);
        }

        trace!(
            source = %self.source,
            destination = %self.destination,
            arrivals = arrivals.len(),
            died,
            "Transported creatures"
        );
        destination.add_creatures(Some(arrivals));
        died
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::guppy::Guppy;
    use crate::taxonomy::{Classification, Identification};
    use pond_core::{CreatureId, Sex};

    fn guppy(id: u64, coefficient: f64) -> Creature {
        let identification = Identification::new(
            Classification::new("Poecilia", "reticulata").unwrap(),
            CreatureId(id),
            0,
        );
        Guppy::new(identification, Sex::Male, 0, coefficient).into()
    }

    #[test]
    fn test_new_stream_copies_source_chemistry() {
        let mut ctx = SimContext::new(1);
        let upper = Pool::with_params(&mut ctx, "Upper", 10.0, 22.0, 6.5, 0.5);
        let mut lower = Pool::with_params(&mut ctx, "Lower", 10.0, 30.0, 8.0, 0.5);
        let mut stream = Stream::new(&upper, &lower);
        assert_eq!(stream.source(), upper.id());
        assert_eq!(stream.destination(), lower.id());
        assert_eq!(stream.ph(), 6.5);
        assert_eq!(stream.temperature(), 22.0);

        stream.set_source(&lower);
        assert_eq!(stream.ph(), 8.0);
        assert_eq!(stream.temperature(), 30.0);

        // One-time copy, not a live binding.
        lower.set_ph(9.0);
        assert_eq!(stream.ph(), 8.0);

        stream.set_destination(&upper);
        assert_eq!(stream.destination(), upper.id());
        assert_eq!(stream.ph(), 8.0);
    }

    #[test]
    fn test_transit_survival_extremes() {
        let mut ctx = SimContext::new(5);
        let source = Pool::new(&mut ctx);
        let mut destination = Pool::new(&mut ctx);
        let stream = Stream::new(&source, &destination);

        for _ in 0..100 {
            let died = stream.transport_creatures(vec![guppy(1, 1.0)], &mut destination, ctx.rng());
            assert_eq!(died, 0);
        }
        assert_eq!(destination.living_population(), 100);

        let doomed: Vec<Creature> = (0..100).map(|id| guppy(id, 0.0)).collect();
        let died = stream.transport_creatures(doomed, &mut destination, ctx.rng());
        assert_eq!(died, 100);
        // Dead arrivals are still delivered until the next sweep.
        assert_eq!(destination.population(), 200);
        assert_eq!(destination.remove_dead_creatures(), 100);
    }

    #[test]
    fn test_transit_mortality_tracks_health() {
        let mut ctx = SimContext::new(8);
        let source = Pool::new(&mut ctx);
        let mut destination = Pool::new(&mut ctx);
        let stream = Stream::new(&source, &destination);

        let travellers: Vec<Creature> = (0..1000).map(|id| guppy(id, 0.5)).collect();
        let died = stream.transport_creatures(travellers, &mut destination, ctx.rng());
        assert!(died > 400 && died < 600, "unexpected transit deaths {}", died);
    }
}
