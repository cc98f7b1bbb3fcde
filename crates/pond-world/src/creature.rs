//! Creature capability and its variants.

use crate::context::SimContext;
use crate::guppy::Guppy;
use crate::health::Health;
use crate::taxonomy::Identification;
use pond_core::{CreatureId, Sex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An individual organism living in a pool.
///
/// `Clone` is the deep copy used for history snapshots; it keeps the
/// identifier rather than allocating a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Creature {
    Guppy(Guppy),
}

/// Outcome of asking a creature to reproduce
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    /// The creature cannot reproduce (wrong sex, too young, or dead)
    Ineligible,
    /// The creature could reproduce; the litter may be empty
    Litter(Vec<Creature>),
}

impl Spawn {
    pub fn is_ineligible(&self) -> bool {
        matches!(self, Spawn::Ineligible)
    }

    pub fn len(&self) -> usize {
        match self {
            Spawn::Ineligible => 0,
            Spawn::Litter(litter) => litter.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_offspring(self) -> Vec<Creature> {
        match self {
            Spawn::Ineligible => Vec::new(),
            Spawn::Litter(litter) => litter,
        }
    }
}

impl Creature {
    pub fn identification(&self) -> &Identification {
        match self {
            Creature::Guppy(guppy) => guppy.identification(),
        }
    }

    pub fn health(&self) -> &Health {
        match self {
            Creature::Guppy(guppy) => guppy.health(),
        }
    }

    pub fn health_mut(&mut self) -> &mut Health {
        match self {
            Creature::Guppy(guppy) => guppy.health_mut(),
        }
    }

    pub fn sex(&self) -> Sex {
        match self {
            Creature::Guppy(guppy) => guppy.sex(),
        }
    }

    pub fn volume_needed_ml(&self) -> f64 {
        match self {
            Creature::Guppy(guppy) => guppy.volume_needed_ml(),
        }
    }

    pub fn spawn(&self, ctx: &mut SimContext) -> Spawn {
        match self {
            Creature::Guppy(guppy) => guppy.spawn(ctx),
        }
    }

    pub fn id(&self) -> CreatureId {
        self.identification().identifier()
    }

    pub fn is_female(&self) -> bool {
        self.sex().is_female()
    }

    pub fn is_alive(&self) -> bool {
        self.health().is_alive()
    }

    pub fn age(&self) -> u32 {
        self.health().age()
    }

    pub fn coefficient(&self) -> f64 {
        self.health().coefficient()
    }

    pub fn kill(&mut self) {
        self.health_mut().kill();
    }

    pub fn adjust_health(&mut self, delta: f64) {
        self.health_mut().change_coefficient(delta);
    }

    /// Total order by health coefficient, weakest first. Equal coefficients
    /// fall back to the lower identifier.
    pub fn cmp_by_health(&self, other: &Creature) -> Ordering {
        self.coefficient()
            .total_cmp(&other.coefficient())
            .then_with(|| self.id().cmp(&other.id()))
    }
}

impl From<Guppy> for Creature {
    fn from(guppy: Guppy) -> Self {
        Creature::Guppy(guppy)
    }
}
