//! Parser for the line-oriented ecosystem description format.
//!
//! ```text
//! <title>
//! <pool name>
//! <volume litres>
//! <temperature>
//! <pH>
//! <nutrient coefficient>
//! <population count>
//! <genus>
//! <species>
//! <min age>
//! <max age>
//! <female chance>
//! <min health coefficient>
//! <max health coefficient>
//! ... further 13-line pool blocks until the end of input
//! ```

use crate::context::SimContext;
use crate::ecosystem::Ecosystem;
use crate::pool::{Pool, PopulationSpec};
use pond_core::{Error, Result};
use std::str::FromStr;
use tracing::debug;

/// A parsed description, ready to become week 0 of a simulation
#[derive(Debug, Clone)]
pub struct LoadedEcosystem {
    pub title: String,
    pub ecosystem: Ecosystem,
}

struct Lines<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> Lines<'a> {
    fn new(raw: &'a str) -> Self {
        let mut lines: Vec<&str> = raw.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self { lines, next: 0 }
    }

    fn exhausted(&self) -> bool {
        self.next >= self.lines.len()
    }

    /// 1-based number of the line `take` would return next
    fn line_number(&self) -> usize {
        self.next + 1
    }

    fn take(&mut self, expected: &str) -> Result<(usize, &'a str)> {
        let number = self.line_number();
        let line = self
            .lines
            .get(self.next)
            .copied()
            .ok_or_else(|| Error::eof(number, expected))?;
        self.next += 1;
        Ok((number, line))
    }

    fn parse<T>(&mut self, expected: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let (number, line) = self.take(expected)?;
        line.trim().parse::<T>().map_err(|e| {
            Error::parse(number, format!("invalid {} '{}': {}", expected, line.trim(), e))
        })
    }
}

/// Parse `raw` into an ecosystem, drawing identifiers and random values from
/// `ctx`.
pub fn parse_ecosystem(raw: &str, ctx: &mut SimContext) -> Result<LoadedEcosystem> {
    let mut lines = Lines::new(raw);
    let (_, title) = lines.take("title")?;
    let title = title.trim().to_string();

    let mut ecosystem = Ecosystem::new();
    while !lines.exhausted() {
        let pool = parse_pool(&mut lines, ctx)?;
        ecosystem.add_pool(pool);
    }

    debug!(
        title = %title,
        pools = ecosystem.pools().len(),
        population = ecosystem.creature_population(),
        "Parsed ecosystem"
    );
    Ok(LoadedEcosystem { title, ecosystem })
}

fn parse_pool(lines: &mut Lines<'_>, ctx: &mut SimContext) -> Result<Pool> {
    let (_, name) = lines.take("pool name")?;
    let volume_litres: f64 = lines.parse("volume")?;
    let temperature: f64 = lines.parse("temperature")?;
    let ph: f64 = lines.parse("pH")?;
    let nutrient_coefficient: f64 = lines.parse("nutrient coefficient")?;
    let count: u32 = lines.parse("population count")?;
    let genus_line = lines.line_number();
    let (_, genus) = lines.take("genus")?;
    let (_, species) = lines.take("species")?;
    let min_age: u32 = lines.parse("minimum age")?;
    let max_age: u32 = lines.parse("maximum age")?;
    let female_chance: f64 = lines.parse("female chance")?;
    let min_health: f64 = lines.parse("minimum health coefficient")?;
    let max_health: f64 = lines.parse("maximum health coefficient")?;

    let mut pool =
        Pool::with_params(ctx, name, volume_litres, temperature, ph, nutrient_coefficient);
    let spec = PopulationSpec {
        count: count as usize,
        genus: genus.to_string(),
        species: species.to_string(),
        min_age,
        max_age,
        female_chance,
        min_health,
        max_health,
    };
    pool.populate(ctx, &spec).map_err(|e| match e {
        Error::InvalidArgument(message) => Error::parse(genus_line, message),
        other => other,
    })?;

    Ok(pool)
}
