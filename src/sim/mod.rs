//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (queue arrival order)
//! - No rendering, audio or platform dependencies

pub mod brewing;
pub mod chaos;
pub mod customer;
pub mod quirks;
pub mod round;
pub mod state;
pub mod timebase;

pub use brewing::{BrewingStation, MatchResult, StationConfig, is_exact_match};
pub use chaos::{ChaosConfig, ChaosEvent, ChaosKind, ChaosStatus};
pub use customer::{CustomerId, CustomerInstance, CustomerQueue, CustomerStatus};
pub use quirks::QuirkState;
pub use round::{CustomerView, RoundConfig, RoundInput, RoundSnapshot, ServiceRound, SpawnPolicy};
pub use state::{ChaosOutcome, GameEvent, RoundState, RoundSummary};
pub use timebase::{Tick, Ticks, Timebase};
