//! Round state and core simulation types
//!
//! Everything the round owns that is shared between the queue, the chaos
//! event and the scorekeeping lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chaos::{ChaosEvent, ChaosKind, ChaosStatus};
use super::customer::{CustomerId, CustomerQueue};
use crate::ticks_to_secs;

/// Something that happened during a tick, for audio/UI feedback
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CustomerArrived { id: CustomerId, name: String },
    CustomerServed { id: CustomerId, tip: u32 },
    WrongDrink { id: CustomerId },
    CustomerLeft { id: CustomerId },
    BellRung { revealed: usize },
    ChaosStarted { kind: ChaosKind },
    ChaosResolved { bonus: u32 },
    ChaosFailed,
    RoundEnded(RoundSummary),
}

/// How the day's chaos event went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosOutcome {
    /// No chaos recipe in the catalog, so no event this round
    NoEvent,
    /// The round ended before the trigger point
    NotTriggered,
    /// Still active when the round ended
    Unresolved,
    Resolved,
    Failed,
}

/// Terminal result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub tips_earned: u32,
    pub customers_served: u32,
    pub customers_lost: u32,
    /// Drinks confirmed for the wrong order (no penalty, just a tally)
    pub wrong_drinks: u32,
    pub chaos_resolved: bool,
    pub chaos: ChaosOutcome,
    pub chaos_bonus: u32,
    pub chaos_penalty: u32,
    pub pastries_lost: u32,
}

impl RoundSummary {
    /// Coins the day adds to the purse
    pub fn coins_earned(&self) -> u32 {
        (self.tips_earned + self.chaos_bonus).saturating_sub(self.chaos_penalty)
    }
}

/// RNG state wrapper for reproducible rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Live state of one service round
#[derive(Debug, Clone)]
pub struct RoundState {
    pub rng_state: RngState,
    /// Simulation ticks elapsed
    pub elapsed_ticks: u64,
    /// Round length in ticks
    pub duration_ticks: u64,
    /// Customers in arrival order
    pub queue: CustomerQueue,
    pub tips: u32,
    pub served: u32,
    pub wrong_drinks: u32,
    pub chaos: Option<ChaosEvent>,
}

impl RoundState {
    pub fn new(seed: u64, duration_ticks: u64, queue_capacity: usize) -> Self {
        Self {
            rng_state: RngState::new(seed),
            elapsed_ticks: 0,
            duration_ticks,
            queue: CustomerQueue::new(queue_capacity),
            tips: 0,
            served: 0,
            wrong_drinks: 0,
            chaos: None,
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.elapsed_ticks)
    }

    pub fn remaining_secs(&self) -> f32 {
        ticks_to_secs(self.duration_ticks.saturating_sub(self.elapsed_ticks))
    }

    pub fn is_over(&self) -> bool {
        self.elapsed_ticks >= self.duration_ticks
    }

    pub fn lost(&self) -> u32 {
        self.queue.lost()
    }

    pub fn chaos_active(&self) -> bool {
        self.chaos.as_ref().is_some_and(ChaosEvent::is_active)
    }

    /// Score so far (valid at any point; final once the round is over)
    pub fn summary(&self) -> RoundSummary {
        let (chaos, bonus, penalty, pastries) = match &self.chaos {
            None => (ChaosOutcome::NoEvent, 0, 0, 0),
            Some(event) => {
                let outcome = match event.status {
                    ChaosStatus::Inactive => ChaosOutcome::NotTriggered,
                    ChaosStatus::Active => ChaosOutcome::Unresolved,
                    ChaosStatus::Resolved => ChaosOutcome::Resolved,
                    ChaosStatus::Failed => ChaosOutcome::Failed,
                };
                (outcome, event.bonus(), event.penalty(), event.pastries_lost)
            }
        };
        RoundSummary {
            tips_earned: self.tips,
            customers_served: self.served,
            customers_lost: self.lost(),
            wrong_drinks: self.wrong_drinks,
            chaos_resolved: chaos == ChaosOutcome::Resolved,
            chaos,
            chaos_bonus: bonus,
            chaos_penalty: penalty,
            pastries_lost: pastries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_earned_saturates() {
        let summary = RoundSummary {
            tips_earned: 3,
            customers_served: 1,
            customers_lost: 4,
            wrong_drinks: 2,
            chaos_resolved: false,
            chaos: ChaosOutcome::Failed,
            chaos_bonus: 0,
            chaos_penalty: 5,
            pastries_lost: 10,
        };
        assert_eq!(summary.coins_earned(), 0);

        let good = RoundSummary {
            tips_earned: 12,
            chaos_resolved: true,
            chaos: ChaosOutcome::Resolved,
            chaos_bonus: 6,
            chaos_penalty: 0,
            ..summary
        };
        assert_eq!(good.coins_earned(), 18);
    }

    #[test]
    fn test_fresh_round_clock() {
        let state = RoundState::new(7, 5400, 5);
        assert_eq!(state.elapsed_secs(), 0.0);
        assert!((state.remaining_secs() - 90.0).abs() < 1e-3);
        assert!(!state.is_over());
        assert_eq!(state.summary().chaos, ChaosOutcome::NoEvent);
    }
}
