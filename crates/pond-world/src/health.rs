//! Vital state shared by every kind of creature.

use serde::{Deserialize, Serialize};

/// Alive flag, age in weeks and health coefficient of one creature.
///
/// Writers sanitize instead of failing: an age outside `[0, max_age)` or a
/// coefficient outside `[0, 1]` is ignored and the previous value kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    max_age: u32,
    alive: bool,
    age: u32,
    coefficient: f64,
}

impl Health {
    pub fn new(max_age: u32) -> Self {
        Self {
            max_age: max_age.max(1),
            alive: true,
            age: 0,
            coefficient: 1.0,
        }
    }

    /// Health with an initial age and coefficient, each subject to the
    /// setter rules.
    pub fn with_state(max_age: u32, age: u32, coefficient: f64) -> Self {
        let mut health = Self::new(max_age);
        health.set_age(age);
        health.set_coefficient(coefficient);
        health
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Returns false when the write was ignored.
    pub fn set_age(&mut self, age: u32) -> bool {
        if age < self.max_age {
            self.age = age;
            true
        } else {
            false
        }
    }

    /// Returns false when the write was ignored.
    pub fn set_coefficient(&mut self, coefficient: f64) -> bool {
        if (0.0..=1.0).contains(&coefficient) {
            self.coefficient = coefficient;
            true
        } else {
            false
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Age one week. Reaching `max_age` kills; the stored age stays at its
    /// last valid value.
    pub fn increment_age(&mut self) {
        if !self.alive {
            return;
        }
        if !self.set_age(self.age + 1) {
            self.alive = false;
        }
    }

    pub fn change_coefficient(&mut self, delta: f64) {
        let next = self.coefficient + delta;
        if next.is_nan() {
            return;
        }
        if next <= 0.0 {
            self.alive = false;
            self.coefficient = 0.0;
        } else if next >= 1.0 {
            self.coefficient = 1.0;
        } else {
            self.coefficient = next;
        }
    }
}
