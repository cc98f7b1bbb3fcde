//! World simulation engine.
//!
//! Pools of guppies linked by streams, advanced one week at a time with a
//! navigable history of past weeks.

pub mod context;
pub mod creature;
pub mod ecosystem;
pub mod guppy;
pub mod health;
pub mod loader;
pub mod pool;
pub mod simulation;
pub mod stream;
pub mod taxonomy;

pub use context::SimContext;
pub use creature::{Creature, Spawn};
pub use ecosystem::{CrowdingOutcome, Ecosystem};
pub use guppy::Guppy;
pub use health::Health;
pub use loader::{parse_ecosystem, LoadedEcosystem};
pub use pool::{Pool, PopulationSpec};
pub use simulation::{Simulation, SimulationState};
pub use stream::Stream;
pub use taxonomy::{Classification, Identification};
