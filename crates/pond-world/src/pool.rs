//! Pools: bounded bodies of water and the weekly rules applied to them.

use crate::context::SimContext;
use crate::creature::Creature;
use crate::guppy::Guppy;
use crate::taxonomy::{Classification, Identification};
use pond_core::{PoolId, PoolStats, Result, Sex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub const DEFAULT_NAME: &str = "Unnamed";
pub const DEFAULT_TEMPERATURE: f64 = 40.0;
pub const DEFAULT_PH: f64 = 7.0;
pub const DEFAULT_NUTRIENT_COEFFICIENT: f64 = 0.5;

/// Parameters for seeding a pool with creatures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSpec {
    pub count: usize,
    pub genus: String,
    pub species: String,
    pub min_age: u32,
    pub max_age: u32,
    pub female_chance: f64,
    pub min_health: f64,
    pub max_health: f64,
}

/// A body of water holding an ordered collection of creatures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    id: PoolId,
    name: String,
    volume_litres: f64,
    temperature: f64,
    ph: f64,
    nutrient_coefficient: f64,
    creatures: Vec<Creature>,
}

impl Pool {
    pub fn new(ctx: &mut SimContext) -> Self {
        Self {
            id: ctx.next_pool_id(),
            name: DEFAULT_NAME.to_string(),
            volume_litres: 0.0,
            temperature: DEFAULT_TEMPERATURE,
            ph: DEFAULT_PH,
            nutrient_coefficient: DEFAULT_NUTRIENT_COEFFICIENT,
            creatures: Vec::new(),
        }
    }

    pub fn with_params(
        ctx: &mut SimContext,
        name: &str,
        volume_litres: f64,
        temperature: f64,
        ph: f64,
        nutrient_coefficient: f64,
    ) -> Self {
        let mut pool = Self::new(ctx);
        pool.set_name(name);
        pool.set_volume_litres(volume_litres);
        pool.set_temperature(temperature);
        pool.set_ph(ph);
        pool.set_nutrient_coefficient(nutrient_coefficient);
        pool
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume_litres(&self) -> f64 {
        self.volume_litres
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    pub fn nutrient_coefficient(&self) -> f64 {
        self.nutrient_coefficient
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creatures_mut(&mut self) -> &mut [Creature] {
        &mut self.creatures
    }

    pub fn set_name(&mut self, name: &str) {
        let name = name.trim();
        self.name = if name.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            name.to_string()
        };
    }

    /// Negative volumes clamp to zero.
    pub fn set_volume_litres(&mut self, volume_litres: f64) {
        self.volume_litres = if volume_litres >= 0.0 { volume_litres } else { 0.0 };
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = within(temperature, 0.0, 100.0).unwrap_or(DEFAULT_TEMPERATURE);
    }

    pub fn set_ph(&mut self, ph: f64) {
        self.ph = within(ph, 0.0, 14.0).unwrap_or(DEFAULT_PH);
    }

    pub fn set_nutrient_coefficient(&mut self, nutrient_coefficient: f64) {
        self.nutrient_coefficient =
            within(nutrient_coefficient, 0.0, 1.0).unwrap_or(DEFAULT_NUTRIENT_COEFFICIENT);
    }

    /// Returns false, leaving the pool untouched, when there is nothing to add.
    pub fn add_creature(&mut self, creature: Option<Creature>) -> bool {
        match creature {
            Some(creature) => {
                self.creatures.push(creature);
                true
            }
            None => false,
        }
    }

    pub fn add_creatures(&mut self, creatures: Option<Vec<Creature>>) -> bool {
        match creatures {
            Some(creatures) => {
                self.creatures.extend(creatures);
                true
            }
            None => false,
        }
    }

    /// Seed the pool with guppies drawn from the given ranges. Reversed
    /// ranges are swapped before drawing.
    pub fn populate(&mut self, ctx: &mut SimContext, spec: &PopulationSpec) -> Result<usize> {
        let classification = Classification::new(&spec.genus, &spec.species)?;
        let (min_age, max_age) = ordered(spec.min_age, spec.max_age);
        let (min_health, max_health) = ordered(unit(spec.min_health), unit(spec.max_health));
        let female_chance = if spec.female_chance.is_nan() {
            0.0
        } else {
            spec.female_chance.clamp(0.0, 1.0)
        };

        for _ in 0..spec.count {
            let identification =
                Identification::new(classification.clone(), ctx.next_creature_id(), 0);
            let rng = ctx.rng();
            let age = rng.gen_range(min_age..=max_age);
            let sex = Sex::from_female(rng.gen_bool(female_chance));
            let coefficient = if min_health < max_health {
                rng.gen_range(min_health..=max_health)
            } else {
                min_health
            };
            self.creatures
                .push(Guppy::new(identification, sex, age, coefficient).into());
        }

        debug!(
            pool = %self.name,
            count = spec.count,
            classification = %classification,
            "Populated pool"
        );
        Ok(spec.count)
    }

    /// Every living creature starves with probability `1 - nutrient_coefficient`.
    /// Returns the number marked dead; they stay in the pool until swept.
    pub fn apply_nutrient_coefficient<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut starved = 0;
        for creature in self.creatures.iter_mut().filter(|c| c.is_alive()) {
            if rng.gen::<f64>() > self.nutrient_coefficient {
                creature.kill();
                starved += 1;
            }
        }
        trace!(pool = %self.name, starved, "Applied nutrient coefficient");
        starved
    }

    pub fn remove_dead_creatures(&mut self) -> usize {
        let before = self.creatures.len();
        self.creatures.retain(Creature::is_alive);
        before - self.creatures.len()
    }

    /// Returns the number that died of old age in this call.
    pub fn increment_ages(&mut self) -> usize {
        let mut died = 0;
        for creature in self.creatures.iter_mut().filter(|c| c.is_alive()) {
            creature.health_mut().increment_age();
            if !creature.is_alive() {
                died += 1;
            }
        }
        died
    }

    /// Offspring of every living creature are appended; returns how many.
    pub fn spawn(&mut self, ctx: &mut SimContext) -> usize {
        let mut offspring = Vec::new();
        for creature in self.creatures.iter().filter(|c| c.is_alive()) {
            offspring.extend(creature.spawn(ctx).into_offspring());
        }
        let births = offspring.len();
        self.creatures.extend(offspring);
        births
    }

    /// Evict the weakest living creatures until the rest fit in the pool.
    /// Evicted creatures are returned weakest first.
    pub fn adjust_for_crowding(&mut self) -> Vec<Creature> {
        let capacity_ml = self.volume_litres * 1000.0;
        let mut required_ml = self.volume_requirement_ml();
        if capacity_ml >= required_ml {
            return Vec::new();
        }

        let mut candidates: Vec<usize> = (0..self.creatures.len())
            .filter(|&i| self.creatures[i].is_alive())
            .collect();
        candidates.sort_by(|&a, &b| self.creatures[a].cmp_by_health(&self.creatures[b]));

        let mut evicted = Vec::new();
        for index in candidates {
            if capacity_ml >= required_ml {
                break;
            }
            required_ml -= self.creatures[index].volume_needed_ml();
            evicted.push(index);
        }

        let mut slots: Vec<Option<Creature>> =
            std::mem::take(&mut self.creatures).into_iter().map(Some).collect();
        let removed: Vec<Creature> = evicted.iter().filter_map(|&i| slots[i].take()).collect();
        self.creatures = slots.into_iter().flatten().collect();

        debug!(
            pool = %self.name,
            evicted = removed.len(),
            remaining = self.creatures.len(),
            volume_litres = self.volume_litres,
            "Pool overcrowded"
        );
        removed
    }

    /// Raw number of creatures, including dead ones not yet swept
    pub fn population(&self) -> usize {
        self.creatures.len()
    }

    pub fn living_population(&self) -> usize {
        self.living().count()
    }

    pub fn average_age_weeks(&self) -> f64 {
        mean(self.living().map(|c| c.age() as f64))
    }

    pub fn average_health_coefficient(&self) -> f64 {
        mean(self.living().map(Creature::coefficient))
    }

    pub fn female_proportion(&self) -> f64 {
        mean(self.living().map(|c| if c.is_female() { 1.0 } else { 0.0 }))
    }

    pub fn median_age(&self) -> f64 {
        let mut ages: Vec<u32> = self.living().map(Creature::age).collect();
        if ages.is_empty() {
            return 0.0;
        }
        ages.sort_unstable();
        let mid = ages.len() / 2;
        if ages.len() % 2 == 0 {
            (ages[mid - 1] as f64 + ages[mid] as f64) / 2.0
        } else {
            ages[mid] as f64
        }
    }

    pub fn creature_volume_requirement_litres(&self) -> f64 {
        self.volume_requirement_ml() / 1000.0
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            pool_id: self.id,
            name: self.name.clone(),
            population: self.population(),
            living_population: self.living_population(),
            average_age_weeks: self.average_age_weeks(),
            median_age: self.median_age(),
            average_health_coefficient: self.average_health_coefficient(),
            female_proportion: self.female_proportion(),
            volume_requirement_litres: self.creature_volume_requirement_litres(),
            volume_litres: self.volume_litres,
        }
    }

    fn living(&self) -> impl Iterator<Item = &Creature> + '_ {
        self.creatures.iter().filter(|c| c.is_alive())
    }

    fn volume_requirement_ml(&self) -> f64 {
        self.living().map(Creature::volume_needed_ml).sum()
    }
}

fn within(value: f64, min: f64, max: f64) -> Option<f64> {
    (min..=max).contains(&value).then_some(value)
}

/// Clamp into `[0, 1]`; NaN becomes 0.
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
