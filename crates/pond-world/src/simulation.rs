//! Week-by-week simulation with a navigable history of snapshots.

use crate::context::SimContext;
use crate::ecosystem::Ecosystem;
use crate::loader::{self, LoadedEcosystem};
use pond_core::{Error, Result, SimulationConfig, WeekReport};
use std::path::Path;
use tracing::{debug, event, info, instrument, warn, Level};

/// Where the simulation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Nothing loaded yet
    Unloaded,
    /// Showing the initial ecosystem (week 0)
    Loaded,
    /// Showing a week after the initial one
    Advanced,
}

pub struct Simulation {
    config: SimulationConfig,
    ctx: SimContext,
    title: String,
    week: Option<usize>,
    // history[i] is the ecosystem after week i; history[0] is the loaded state.
    history: Vec<Ecosystem>,
    reports: Vec<WeekReport>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let ctx = SimContext::new(config.seed);
        Self {
            config,
            ctx,
            title: String::new(),
            week: None,
            history: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Parse an ecosystem description and make it week 0. On failure the
    /// previous state, loaded or not, is left untouched.
    pub fn load(&mut self, raw: &str) -> Result<()> {
        let mut ctx = SimContext::new(self.config.seed);
        let loaded = loader::parse_ecosystem(raw, &mut ctx).map_err(|e| {
            warn!(error = %e, "Failed to load ecosystem");
            e
        })?;

        self.ctx = ctx;
        self.install(loaded);
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to read ecosystem file");
            e
        })?;
        self.load(&raw)
    }

    /// Install an ecosystem built by hand. Identifiers and randomness keep
    /// coming from this simulation's context, so build the pools with
    /// [`Simulation::context_mut`].
    pub fn load_ecosystem(&mut self, title: &str, mut ecosystem: Ecosystem) {
        let swept = ecosystem.remove_dead_creatures();
        if swept > 0 {
            debug!(swept, "Dropped dead creatures from loaded ecosystem");
        }
        self.install(LoadedEcosystem {
            title: title.trim().to_string(),
            ecosystem,
        });
    }

    fn install(&mut self, loaded: LoadedEcosystem) {
        let report = WeekReport::census(0, loaded.ecosystem.stats());
        info!(
            event = "ecosystem_loaded",
            title = %loaded.title,
            pools = loaded.ecosystem.pools().len(),
            streams = loaded.ecosystem.streams().len(),
            population = report.total_population,
            seed = self.ctx.seed(),
            "Ecosystem loaded"
        );

        self.title = loaded.title;
        self.history = vec![loaded.ecosystem];
        self.reports = vec![report];
        self.week = Some(0);
    }

    /// Advance one week: simulate at the end of history, replay otherwise.
    pub fn next_week(&mut self) -> Result<&WeekReport> {
        let week = self.loaded_week("advance")?;
        let next = week + 1;

        if next == self.history.len() {
            let (ecosystem, report, ctx) = self.tick()?;
            self.ctx = ctx;
            self.history.push(ecosystem);
            self.reports.push(report);
            self.emit_week_metrics(next);
        } else {
            debug!(week = next, "Replaying stored week");
        }

        self.week = Some(next);
        Ok(&self.reports[next])
    }

    /// Step back one week without recomputing anything.
    pub fn previous_week(&mut self) -> Result<()> {
        let week = self.loaded_week("step back")?;
        if week == 0 {
            warn!("Already at week 0, cannot step back");
            return Err(Error::InvalidState("already at week 0".to_string()));
        }
        self.week = Some(week - 1);
        debug!(week = week - 1, "Stepped back");
        Ok(())
    }

    /// Jump to any week already in the history.
    pub fn go_to_week(&mut self, week: usize) -> Result<()> {
        self.loaded_week("jump")?;
        if week >= self.history.len() {
            warn!(week, available = self.history.len(), "Week not simulated yet");
            return Err(Error::InvalidState(format!(
                "week {} has not been simulated (latest is {})",
                week,
                self.history.len() - 1
            )));
        }
        self.week = Some(week);
        Ok(())
    }

    /// Advance `weeks` times, stopping at the first error.
    pub fn simulate(&mut self, weeks: usize) -> Result<()> {
        for _ in 0..weeks {
            self.next_week()?;
        }
        Ok(())
    }

    fn loaded_week(&self, action: &str) -> Result<usize> {
        self.week.ok_or_else(|| {
            warn!(action, "No ecosystem loaded");
            Error::InvalidState(format!("cannot {} before an ecosystem is loaded", action))
        })
    }

    /// Run one week on copies of the latest snapshot and of the context.
    /// Nothing is committed here, so a failed week leaves no trace.
    #[instrument(skip(self), fields(week = self.history.len()))]
    fn tick(&self) -> Result<(Ecosystem, WeekReport, SimContext)> {
        let week = self.history.len();
        let mut ctx = self.ctx.clone();
        let mut ecosystem = match self.history.last() {
            Some(latest) => latest.clone(),
            None => return Err(Error::InvalidState("history is empty".to_string())),
        };
        let mut report = WeekReport {
            week,
            ..Default::default()
        };

        for pool in ecosystem.pools_mut() {
            report.old_age_deaths += pool.increment_ages();
            report.total_removed += pool.remove_dead_creatures();
        }

        for pool in ecosystem.pools_mut() {
            report.starvation_deaths += pool.apply_nutrient_coefficient(ctx.rng());
            report.total_removed += pool.remove_dead_creatures();
        }

        for pool in ecosystem.pools_mut() {
            report.births += pool.spawn(&mut ctx);
            report.total_removed += pool.remove_dead_creatures();
        }

        let crowding = ecosystem.adjust_for_crowding(ctx.rng(), self.config.stream_selection);
        report.crowded_out = crowding.crowded_out;
        report.crowding_deaths = crowding.deaths();

        report.total_removed += ecosystem.remove_dead_creatures();

        report.pools = ecosystem.stats();
        report.total_population = ecosystem.creature_population();

        if let Err(e) = report.check_bookkeeping() {
            event!(
                Level::ERROR,
                week,
                old_age_deaths = report.old_age_deaths,
                starvation_deaths = report.starvation_deaths,
                crowding_deaths = report.crowding_deaths,
                total_removed = report.total_removed,
                "Death counts do not match removals"
            );
            return Err(e);
        }

        Ok((ecosystem, report, ctx))
    }

    fn emit_week_metrics(&self, week: usize) {
        let report = &self.reports[week];
        debug!(
            event = "week_complete",
            week,
            old_age_deaths = report.old_age_deaths,
            starvation_deaths = report.starvation_deaths,
            births = report.births,
            crowded_out = report.crowded_out,
            crowding_deaths = report.crowding_deaths,
            total_population = report.total_population,
            "Week simulated"
        );

        let interval = self.config.report_interval;
        if interval > 0 && week % interval == 0 {
            info!(
                event = "population_metrics",
                week,
                total_population = report.total_population,
                pools = report.pools.len(),
                net_change = report.net_change(),
                "Population metrics snapshot"
            );
            for pool in &report.pools {
                debug!(
                    pool = %pool.name,
                    population = pool.population,
                    average_age_weeks = pool.average_age_weeks,
                    average_health = pool.average_health_coefficient,
                    occupancy = pool.occupancy(),
                    "Pool snapshot"
                );
            }
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current week, or `None` before anything is loaded
    pub fn week(&self) -> Option<usize> {
        self.week
    }

    pub fn state(&self) -> SimulationState {
        match self.week {
            None => SimulationState::Unloaded,
            Some(0) => SimulationState::Loaded,
            Some(_) => SimulationState::Advanced,
        }
    }

    /// Number of weeks stored, including week 0
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn ecosystem(&self, week: usize) -> Option<&Ecosystem> {
        self.history.get(week)
    }

    /// Snapshot for the week currently shown
    pub fn current(&self) -> Option<&Ecosystem> {
        self.week.and_then(|w| self.history.get(w))
    }

    pub fn report(&self, week: usize) -> Option<&WeekReport> {
        self.reports.get(week)
    }

    pub fn current_report(&self) -> Option<&WeekReport> {
        self.week.and_then(|w| self.reports.get(w))
    }

    pub fn reports(&self) -> &[WeekReport] {
        &self.reports
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Creature;
    use crate::pool::{Pool, PopulationSpec};

    const PONDS: &str = "Garden
Headwater
30
24
7
0.85
40
Poecilia
reticulata
0
30
0.5
0.5
1.0
Basin
60
26
7.4
0.9
20
Poecilia
reticulata
5
25
0.6
0.4
0.9
";

    fn loaded(seed: u64) -> Simulation {
        let mut sim = Simulation::new(SimulationConfig {
            seed,
            ..Default::default()
        });
        sim.load(PONDS).unwrap();
        sim
    }

    #[test]
    fn test_unloaded_transitions_are_rejected() {
        let mut sim = Simulation::default();
        assert_eq!(sim.state(), SimulationState::Unloaded);
        assert_eq!(sim.week(), None);
        assert!(matches!(sim.next_week(), Err(Error::InvalidState(_))));
        assert!(matches!(sim.previous_week(), Err(Error::InvalidState(_))));
        assert!(sim.simulate(3).is_err());
        assert_eq!(sim.history_len(), 0);
        assert!(sim.current().is_none());
    }

    #[test]
    fn test_load_starts_at_week_zero() {
        let sim = loaded(1);
        assert_eq!(sim.state(), SimulationState::Loaded);
        assert_eq!(sim.week(), Some(0));
        assert_eq!(sim.title(), "Garden");
        assert_eq!(sim.history_len(), 1);

        let report = sim.report(0).unwrap();
        assert_eq!(report.total_population, 60);
        assert_eq!(report.pools.len(), 2);
        assert_eq!(sim.current().unwrap().streams().len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let mut sim = loaded(1);
        sim.simulate(2).unwrap();
        let before = sim.current_report().cloned();

        let err = sim.load("Broken\nPool\nnot a number\n").unwrap_err();
        assert!(err.is_load_error());
        assert_eq!(sim.week(), Some(2));
        assert_eq!(sim.history_len(), 3);
        assert_eq!(sim.current_report().cloned(), before);

        let mut fresh = Simulation::default();
        assert!(fresh.load("").is_err());
        assert_eq!(fresh.state(), SimulationState::Unloaded);
    }

    #[test]
    fn test_history_grows_one_snapshot_per_week() {
        let mut sim = loaded(2);
        for week in 1..=12 {
            let report = sim.next_week().unwrap();
            assert_eq!(report.week, week);
            assert_eq!(sim.week(), Some(week));
            assert_eq!(sim.history_len(), week + 1);
        }
        assert_eq!(sim.state(), SimulationState::Advanced);
    }

    #[test]
    fn test_undo_and_redo_replay_snapshots() {
        let mut sim = loaded(3);
        sim.simulate(5).unwrap();
        let week_five = sim.current_report().cloned().unwrap();
        let week_three_population = sim.ecosystem(3).unwrap().creature_population();

        sim.previous_week().unwrap();
        sim.previous_week().unwrap();
        assert_eq!(sim.week(), Some(3));
        assert_eq!(sim.history_len(), 6);
        assert_eq!(sim.current().unwrap().creature_population(), week_three_population);

        sim.next_week().unwrap();
        let replayed = sim.next_week().unwrap().clone();
        assert_eq!(replayed, week_five);
        assert_eq!(sim.history_len(), 6);

        // Past the end of history a new week is simulated.
        sim.next_week().unwrap();
        assert_eq!(sim.history_len(), 7);
    }

    #[test]
    fn test_previous_week_at_zero_is_noop() {
        let mut sim = loaded(3);
        assert!(matches!(sim.previous_week(), Err(Error::InvalidState(_))));
        assert_eq!(sim.week(), Some(0));
    }

    #[test]
    fn test_go_to_week() {
        let mut sim = loaded(4);
        sim.simulate(4).unwrap();
        sim.go_to_week(1).unwrap();
        assert_eq!(sim.week(), Some(1));
        assert!(sim.go_to_week(5).is_err());
        assert_eq!(sim.week(), Some(1));
    }

    #[test]
    fn test_snapshots_are_not_mutated_by_later_weeks() {
        let mut sim = loaded(5);
        let initial = sim.ecosystem(0).unwrap().clone();
        sim.simulate(6).unwrap();

        let stored = sim.ecosystem(0).unwrap();
        assert_eq!(stored.creature_population(), initial.creature_population());
        let ages: Vec<u32> = stored.pools()[0].creatures().iter().map(Creature::age).collect();
        let initial_ages: Vec<u32> =
            initial.pools()[0].creatures().iter().map(Creature::age).collect();
        assert_eq!(ages, initial_ages);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = loaded(77);
        let mut b = loaded(77);
        a.simulate(15).unwrap();
        b.simulate(15).unwrap();
        assert_eq!(a.reports(), b.reports());

        let mut c = loaded(78);
        c.simulate(15).unwrap();
        assert_ne!(a.reports(), c.reports());
    }

    #[test]
    fn test_bookkeeping_and_invariants_hold_over_many_weeks() {
        let mut sim = loaded(6);
        for _ in 0..40 {
            let report = sim.next_week().unwrap().clone();
            assert_eq!(report.total_deaths(), report.total_removed);

            let ecosystem = sim.current().unwrap();
            assert_eq!(ecosystem.creature_population(), ecosystem.living_population());
            assert_eq!(report.total_population, ecosystem.creature_population());
            for pool in ecosystem.pools() {
                // Pools form a chain, so each one is settled after its upstream pool.
                assert!(pool.creature_volume_requirement_litres() <= pool.volume_litres() + 1e-9);
                for creature in pool.creatures() {
                    assert!(creature.is_alive());
                    assert!(creature.age() < 50);
                    let c = creature.coefficient();
                    assert!((0.0..=1.0).contains(&c));
                }
            }
        }
    }

    #[test]
    fn test_everything_dies_without_food() {
        let mut sim = Simulation::default();
        let mut ecosystem = Ecosystem::new();
        let ctx = sim.context_mut();
        let mut pool = Pool::with_params(ctx, "Barren", 100.0, 20.0, 7.0, 0.0);
        pool.populate(
            ctx,
            &PopulationSpec {
                count: 30,
                genus: "Poecilia".to_string(),
                species: "reticulata".to_string(),
                min_age: 0,
                max_age: 5,
                female_chance: 0.5,
                min_health: 1.0,
                max_health: 1.0,
            },
        )
        .unwrap();
        ecosystem.add_pool(pool);
        sim.load_ecosystem("Barren", ecosystem);

        let report = sim.next_week().unwrap();
        assert_eq!(report.starvation_deaths, 30);
        assert_eq!(report.births, 0);
        assert_eq!(report.total_population, 0);
    }

    #[test]
    fn test_old_creatures_die_of_age() {
        let mut sim = Simulation::default();
        let mut ecosystem = Ecosystem::new();
        let ctx = sim.context_mut();
        let mut pool = Pool::with_params(ctx, "Retirement", 100.0, 20.0, 7.0, 1.0);
        pool.populate(
            ctx,
            &PopulationSpec {
                count: 12,
                genus: "Poecilia".to_string(),
                species: "reticulata".to_string(),
                min_age: 49,
                max_age: 49,
                female_chance: 0.0,
                min_health: 1.0,
                max_health: 1.0,
            },
        )
        .unwrap();
        ecosystem.add_pool(pool);
        sim.load_ecosystem("Retirement", ecosystem);

        let report = sim.next_week().unwrap();
        assert_eq!(report.old_age_deaths, 12);
        assert_eq!(report.total_removed, 12);
        assert_eq!(report.total_population, 0);
        assert_eq!(sim.ecosystem(0).unwrap().creature_population(), 12);
    }

    #[test]
    fn test_tick_does_not_touch_committed_state() {
        let mut sim = loaded(9);
        sim.simulate(3).unwrap();
        let allocated = sim.ctx.creatures_allocated();

        let (first, first_report, _) = sim.tick().unwrap();
        let (second, second_report, _) = sim.tick().unwrap();
        assert_eq!(first_report, second_report);
        assert_eq!(first.creature_population(), second.creature_population());
        assert_eq!(sim.ctx.creatures_allocated(), allocated);
        assert_eq!(sim.history_len(), 4);

        // The committed week matches the uncommitted trial run.
        assert_eq!(sim.next_week().unwrap(), &first_report);
    }

    #[test]
    fn test_unbounded_health_bounds_load() {
        let mut sim = Simulation::default();
        sim.load("T\nP\n10\n20\n7\n0.9\n3\nPoecilia\nreticulata\n0\n5\n0.5\n0\ninf\n")
            .unwrap();
        assert_eq!(sim.report(0).unwrap().total_population, 3);
        sim.simulate(2).unwrap();

        let huge_count = "T\nP\n10\n20\n7\n0.9\n18446744073709551615\n\
                          Poecilia\nreticulata\n0\n5\n0.5\n0\n1\n";
        assert!(matches!(sim.load(huge_count), Err(Error::Parse { line: 7, .. })));
        assert_eq!(sim.week(), Some(2));
    }

    #[test]
    fn test_report_serializes() {
        let mut sim = loaded(8);
        let report = sim.next_week().unwrap();
        let json = serde_json::to_string(report).unwrap();
        assert!(json.contains("\"starvation_deaths\""));
        assert!(json.contains("\"Headwater\""));
    }
}
