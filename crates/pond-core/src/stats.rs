//! Weekly statistics and reports.

use crate::{Error, PoolId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Population statistics for one pool, computed over living creatures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub pool_id: PoolId,
    pub name: String,
    /// Raw creature count, including creatures not yet swept
    pub population: usize,
    pub living_population: usize,
    pub average_age_weeks: f64,
    pub median_age: f64,
    pub average_health_coefficient: f64,
    pub female_proportion: f64,
    pub volume_requirement_litres: f64,
    pub volume_litres: f64,
}

impl PoolStats {
    /// Fraction of the pool volume claimed by its living creatures
    pub fn occupancy(&self) -> f64 {
        if self.volume_litres > 0.0 {
            self.volume_requirement_litres / self.volume_litres
        } else if self.volume_requirement_litres > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Everything that happened during one simulated week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week: usize,
    pub old_age_deaths: usize,
    pub starvation_deaths: usize,
    pub births: usize,
    /// Creatures evicted from their pool by overcrowding
    pub crowded_out: usize,
    /// Evicted creatures that died in transit or had nowhere to go
    pub crowding_deaths: usize,
    /// Dead creatures swept from pools during the week
    pub total_removed: usize,
    pub pools: Vec<PoolStats>,
    pub total_population: usize,
}

impl WeekReport {
    /// Build a report with no events, describing a freshly loaded ecosystem.
    pub fn census(week: usize, pools: Vec<PoolStats>) -> Self {
        let total_population = pools.iter().map(|p| p.population).sum();
        Self {
            week,
            pools,
            total_population,
            ..Default::default()
        }
    }

    pub fn total_deaths(&self) -> usize {
        self.old_age_deaths + self.starvation_deaths + self.crowding_deaths
    }

    /// Every death counted during the week must have been swept exactly once.
    pub fn check_bookkeeping(&self) -> Result<()> {
        if self.total_deaths() == self.total_removed {
            Ok(())
        } else {
            Err(Error::Bookkeeping {
                old_age: self.old_age_deaths,
                starvation: self.starvation_deaths,
                crowding: self.crowding_deaths,
                removed: self.total_removed,
            })
        }
    }

    /// Net change in population over the week
    pub fn net_change(&self) -> i64 {
        self.births as i64 - self.total_deaths() as i64
    }
}

impl fmt::Display for WeekReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Week {}", self.week)?;
        writeln!(f, "  old age deaths:    {}", self.old_age_deaths)?;
        writeln!(f, "  starvation deaths: {}", self.starvation_deaths)?;
        writeln!(f, "  births:            {}", self.births)?;
        writeln!(
            f,
            "  crowded out:       {} ({} died)",
            self.crowded_out, self.crowding_deaths
        )?;
        for pool in &self.pools {
            writeln!(
                f,
                "  {:<20} population {:>6}  avg age {:>5.1}  median age {:>5.1}  health {:.3}  female {:.2}  volume {:.2}/{:.2} L",
                pool.name,
                pool.population,
                pool.average_age_weeks,
                pool.median_age,
                pool.average_health_coefficient,
                pool.female_proportion,
                pool.volume_requirement_litres,
                pool.volume_litres,
            )?;
        }
        write!(f, "  total population:  {}", self.total_population)
    }
}
