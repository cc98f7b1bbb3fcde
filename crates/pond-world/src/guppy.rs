//! The guppy, currently the only creature variant.

use crate::context::SimContext;
use crate::creature::{Creature, Spawn};
use crate::health::Health;
use crate::taxonomy::Identification;
use pond_core::Sex;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guppy {
    identification: Identification,
    health: Health,
    sex: Sex,
}

impl Guppy {
    /// Weeks before a guppy starts growing
    pub const YOUNG_AGE: u32 = 10;
    /// Weeks before a guppy reaches full size
    pub const MATURE_AGE: u32 = 30;
    pub const MAX_AGE: u32 = 50;
    /// Water needed by a young guppy, in millilitres
    pub const BASE_VOLUME_ML: f64 = 250.0;
    pub const MIN_SPAWN_AGE: u32 = 10;
    pub const SPAWN_PROBABILITY: f64 = 0.25;
    pub const MAX_LITTER: u32 = 100;

    pub fn new(identification: Identification, sex: Sex, age: u32, coefficient: f64) -> Self {
        Self {
            identification,
            health: Health::with_state(Self::MAX_AGE, age, coefficient),
            sex,
        }
    }

    pub fn identification(&self) -> &Identification {
        &self.identification
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn volume_needed_ml(&self) -> f64 {
        if !self.health.is_alive() {
            return 0.0;
        }
        let age = self.health.age();
        if age < Self::YOUNG_AGE {
            Self::BASE_VOLUME_ML
        } else if age < Self::MATURE_AGE {
            Self::BASE_VOLUME_ML * age as f64 / Self::YOUNG_AGE as f64
        } else if age < Self::MAX_AGE {
            Self::BASE_VOLUME_ML * 1.5
        } else {
            0.0
        }
    }

    pub fn can_spawn(&self) -> bool {
        self.health.is_alive() && self.sex.is_female() && self.health.age() >= Self::MIN_SPAWN_AGE
    }

    pub fn spawn(&self, ctx: &mut SimContext) -> Spawn {
        if !self.can_spawn() {
            return Spawn::Ineligible;
        }
        if !ctx.rng().gen_bool(Self::SPAWN_PROBABILITY) {
            return Spawn::Litter(Vec::new());
        }

        let litter_size = ctx.rng().gen_range(0..=Self::MAX_LITTER);
        let coefficient = (1.0 + self.health.coefficient()) / 2.0;
        let litter = (0..litter_size)
            .map(|_| {
                let identification = self.identification.offspring(ctx.next_creature_id());
                let sex = Sex::from_female(ctx.rng().gen_bool(0.5));
                Creature::Guppy(Guppy::new(identification, sex, 0, coefficient))
            })
            .collect();

        Spawn::Litter(litter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Classification;
    use pond_core::CreatureId;

    fn guppy(sex: Sex, age: u32, coefficient: f64) -> Guppy {
        let identification = Identification::new(
            Classification::new("Poecilia", "reticulata").unwrap(),
            CreatureId(1),
            0,
        );
        Guppy::new(identification, sex, age, coefficient)
    }

    #[test]
    fn test_volume_needed_by_age() {
        assert_eq!(guppy(Sex::Male, 0, 1.0).volume_needed_ml(), 250.0);
        assert_eq!(guppy(Sex::Male, 9, 1.0).volume_needed_ml(), 250.0);
        assert_eq!(guppy(Sex::Male, 10, 1.0).volume_needed_ml(), 250.0);
        assert_eq!(guppy(Sex::Male, 20, 1.0).volume_needed_ml(), 500.0);
        assert_eq!(guppy(Sex::Male, 29, 1.0).volume_needed_ml(), 725.0);
        assert_eq!(guppy(Sex::Male, 30, 1.0).volume_needed_ml(), 375.0);
        assert_eq!(guppy(Sex::Male, 49, 1.0).volume_needed_ml(), 375.0);

        let mut dead = guppy(Sex::Male, 20, 1.0);
        dead.health_mut().kill();
        assert_eq!(dead.volume_needed_ml(), 0.0);
    }

    #[test]
    fn test_ineligible_spawners() {
        let mut ctx = SimContext::new(3);
        assert!(guppy(Sex::Male, 20, 1.0).spawn(&mut ctx).is_ineligible());
        assert!(guppy(Sex::Female, 9, 1.0).spawn(&mut ctx).is_ineligible());

        let mut dead = guppy(Sex::Female, 20, 1.0);
        dead.health_mut().kill();
        assert!(dead.spawn(&mut ctx).is_ineligible());
    }

    #[test]
    fn test_litter_inherits_from_parent() {
        let mut ctx = SimContext::new(11);
        let parent = guppy(Sex::Female, 12, 0.5);

        let mut litters = 0;
        for _ in 0..200 {
            let spawn = parent.spawn(&mut ctx);
            assert!(!spawn.is_ineligible());
            let offspring = spawn.into_offspring();
            if !offspring.is_empty() {
                litters += 1;
            }
            assert!(offspring.len() <= Guppy::MAX_LITTER as usize);
            for child in offspring {
                assert_eq!(child.age(), 0);
                assert!(child.is_alive());
                assert_eq!(child.coefficient(), 0.75);
                assert_eq!(child.identification().generation(), 1);
                assert_eq!(child.identification().classification().genus(), "Poecilia");
                assert_ne!(child.id(), CreatureId(1));
            }
        }
        // A quarter of attempts produce a draw; nearly all of those are non-empty.
        assert!(litters > 20 && litters < 90, "unexpected litter count {}", litters);
    }
}
