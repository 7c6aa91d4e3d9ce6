//! Chaos events
//!
//! Halfway through the day something goes wrong. While an event is active a
//! progress meter fills; brewing the event's resolution recipe before it
//! fills closes the event, otherwise it fails and the day's earnings take a
//! hit. Either way the round carries on.

use serde::{Deserialize, Serialize};

use crate::consts::{PASTRY_LOSS_INTERVAL_SECS, PORTAL_DRAIN_RATE};
use crate::content::RecipeId;

/// Kinds of chaos event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosKind {
    /// A portal opens in the pastry case and starts eating the shop
    Portal,
}

impl ChaosKind {
    pub fn announcement(&self) -> &'static str {
        match self {
            ChaosKind::Portal => "A portal tears open behind the counter!",
        }
    }
}

/// Chaos event lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosStatus {
    Inactive,
    Active,
    Resolved,
    Failed,
}

/// Chaos tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Trigger point as a fraction of the round duration
    pub trigger_fraction: f32,
    /// Progress gained per second while active (1.0 == consumed)
    pub drain_rate: f32,
    /// Coins lost at the end of the day if the event fails
    pub failure_penalty: u32,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            trigger_fraction: 0.5,
            drain_rate: PORTAL_DRAIN_RATE,
            failure_penalty: 5,
        }
    }
}

/// Something that happened to the chaos event this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosTransition {
    Activated,
    Failed,
}

/// The round's single chaos event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosEvent {
    pub kind: ChaosKind,
    /// Round time (seconds) at which the event starts
    pub trigger_at: f32,
    pub resolution_recipe: RecipeId,
    pub status: ChaosStatus,
    /// Consumption progress in `[0, 1]`
    pub progress: f32,
    pub pastries_lost: u32,
    drain_rate: f32,
    failure_penalty: u32,
    pastry_timer: f32,
}

impl ChaosEvent {
    pub fn new(
        kind: ChaosKind,
        trigger_at: f32,
        resolution_recipe: RecipeId,
        config: &ChaosConfig,
    ) -> Self {
        Self {
            kind,
            trigger_at,
            resolution_recipe,
            status: ChaosStatus::Inactive,
            progress: 0.0,
            pastries_lost: 0,
            drain_rate: config.drain_rate.max(0.0),
            failure_penalty: config.failure_penalty,
            pastry_timer: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ChaosStatus::Active
    }

    /// Advance by one tick at round time `elapsed` (seconds, before this tick)
    pub fn tick(&mut self, dt: f32, elapsed: f32) -> Option<ChaosTransition> {
        match self.status {
            ChaosStatus::Inactive => {
                if elapsed >= self.trigger_at {
                    self.status = ChaosStatus::Active;
                    log::info!("Chaos event {:?} started at {:.2}s", self.kind, elapsed);
                    Some(ChaosTransition::Activated)
                } else {
                    None
                }
            }
            ChaosStatus::Active => {
                self.progress = (self.progress + self.drain_rate * dt).min(1.0);

                self.pastry_timer += dt;
                if self.pastry_timer >= PASTRY_LOSS_INTERVAL_SECS {
                    self.pastry_timer -= PASTRY_LOSS_INTERVAL_SECS;
                    self.pastries_lost += 1;
                }

                if self.progress >= 1.0 {
                    self.status = ChaosStatus::Failed;
                    log::info!(
                        "Chaos event {:?} failed ({} pastries lost)",
                        self.kind,
                        self.pastries_lost
                    );
                    Some(ChaosTransition::Failed)
                } else {
                    None
                }
            }
            ChaosStatus::Resolved | ChaosStatus::Failed => None,
        }
    }

    /// Close the event. Only an active event can be resolved.
    pub fn resolve(&mut self) -> bool {
        if self.status != ChaosStatus::Active {
            return false;
        }
        self.status = ChaosStatus::Resolved;
        log::info!(
            "Chaos event {:?} resolved at {:.0}% progress",
            self.kind,
            self.progress * 100.0
        );
        true
    }

    /// Coins awarded for resolving: more the sooner it was closed
    pub fn bonus(&self) -> u32 {
        if self.status == ChaosStatus::Resolved {
            ((1.0 - self.progress) * 10.0).floor() as u32
        } else {
            0
        }
    }

    /// Coins deducted for failing
    pub fn penalty(&self) -> u32 {
        if self.status == ChaosStatus::Failed {
            self.failure_penalty
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn portal(trigger_at: f32) -> ChaosEvent {
        ChaosEvent::new(
            ChaosKind::Portal,
            trigger_at,
            "banishing_espresso".into(),
            &ChaosConfig::default(),
        )
    }

    /// Run ticks the way a round does; returns the tick index of each transition
    fn run(event: &mut ChaosEvent, ticks: u64) -> Vec<(u64, ChaosTransition)> {
        let mut seen = Vec::new();
        for t in 0..ticks {
            if let Some(tr) = event.tick(SIM_DT, t as f32 * SIM_DT) {
                seen.push((t, tr));
            }
        }
        seen
    }

    #[test]
    fn test_activates_at_trigger_time() {
        let mut event = portal(45.0);
        let seen = run(&mut event, 45 * 60 + 2);
        assert_eq!(seen.len(), 1);
        let (tick, tr) = seen[0];
        assert_eq!(tr, ChaosTransition::Activated);
        assert!((tick as i64 - 45 * 60).abs() <= 1);
        assert!(event.is_active());
    }

    #[test]
    fn test_fails_when_progress_caps() {
        let mut event = portal(0.0);
        let seen = run(&mut event, 60 * 21);
        assert_eq!(event.status, ChaosStatus::Failed);
        assert_eq!(event.progress, 1.0);
        assert_eq!(seen.last().map(|s| s.1), Some(ChaosTransition::Failed));
        assert_eq!(event.penalty(), 5);
        assert_eq!(event.bonus(), 0);
        assert!(event.pastries_lost >= 9);
        // Terminal: a late banishing does nothing
        assert!(!event.resolve());
        assert_eq!(event.status, ChaosStatus::Failed);
    }

    #[test]
    fn test_resolve_halts_progress() {
        let mut event = portal(0.0);
        run(&mut event, 60 * 5);
        assert!(event.resolve());
        let frozen = event.progress;
        assert!(frozen > 0.2 && frozen < 0.3);
        assert_eq!(event.bonus(), 7);

        run(&mut event, 60 * 30);
        assert_eq!(event.status, ChaosStatus::Resolved);
        assert_eq!(event.progress, frozen);
        assert_eq!(event.penalty(), 0);
    }

    #[test]
    fn test_cannot_resolve_before_activation() {
        let mut event = portal(10.0);
        assert!(!event.resolve());
        assert_eq!(event.status, ChaosStatus::Inactive);
    }
}
