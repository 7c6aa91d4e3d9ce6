//! Eldritch Espresso - a cosmic coffee shop under a countdown
//!
//! Core modules:
//! - `sim`: Deterministic service-loop simulation (timebase, queue, brewing, chaos, round)
//! - `game`: Top-level screen state machine and frame driver
//! - `content`: Recipe/customer catalogs loaded once at startup
//! - `upgrades`: Between-round upgrade shop and multipliers
//! - `dialogue`: Intro/results dialogue scenes
//! - `autopilot`: Demo player that drives `Game` through inputs
//! - `audio`: Sound trigger interface (silent fallback)
//! - `settings`: Data-driven configuration

pub mod audio;
pub mod autopilot;
pub mod content;
pub mod dialogue;
pub mod error;
pub mod game;
pub mod settings;
pub mod sim;
pub mod upgrades;

pub use content::{Catalog, ContentProvider, JsonContent};
pub use error::{ContentLoadError, GameError};
pub use game::{Game, GameSnapshot, InputEvent, ScreenId};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Length of one service round in seconds of tick time
    pub const ROUND_DURATION_SECS: f32 = 90.0;
    /// Customers that fit in the queue at once
    pub const QUEUE_CAPACITY: usize = 5;

    /// How long a bell keeps ghosts visible
    pub const GHOST_REVEAL_SECS: f32 = 2.0;

    /// Ice drinks spoil after this long at the station (before upgrades/heat)
    pub const ICE_SPOIL_SECS: f32 = 10.0;
    /// Spoilage clock speed while a fire elemental is heating the shop
    pub const HEAT_SPOIL_RATE: f32 = 2.0;
    /// Seconds each ingredient takes to brew at `brew_speed` 1.0
    pub const BREW_STEP_SECS: f32 = 1.2;

    /// Portal progress per second while a chaos event is active (full in 20s)
    pub const PORTAL_DRAIN_RATE: f32 = 0.05;
    /// A pastry floats into the portal this often
    pub const PASTRY_LOSS_INTERVAL_SECS: f32 = 2.0;
}

/// Convert a duration in seconds to a whole number of simulation ticks
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs.max(0.0) * consts::TICK_RATE as f32).round() as u64
}

/// Convert a tick count to seconds of simulation time
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * consts::SIM_DT
}
