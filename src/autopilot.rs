//! Autopilot - a simple AI that plays the game
//!
//! Drives a `Game` purely through `InputEvent`s, reading nothing but the
//! public snapshot. Used by the headless binary as an idle/demo player and by
//! the day-cycle integration tests.
//!
//! Priorities while a round is running:
//! 1. Brew the chaos recipe when a portal is open
//! 2. Ring the bell when a ghost is lurking unseen
//! 3. Finish the drink for the selected customer
//! 4. Otherwise pick the most impatient visible customer

use std::sync::Arc;

use crate::content::{Catalog, IngredientId, RecipeId};
use crate::game::{GameSnapshot, InputEvent, ScreenId};
use crate::sim::{RoundSnapshot, is_exact_match};
use crate::upgrades::UPGRADES;

/// Reacts to snapshots with one action per reaction window
#[derive(Debug, Clone)]
pub struct Autopilot {
    catalog: Arc<Catalog>,
    /// Seconds between actions
    reaction_secs: f32,
    cooldown: f32,
    /// Don't spam the bell
    bell_cooldown: f32,
    /// Stop after this many days (the shop loops forever otherwise)
    max_days: u32,
}

impl Autopilot {
    pub fn new(catalog: Arc<Catalog>, reaction_secs: f32, max_days: u32) -> Self {
        Self {
            catalog,
            reaction_secs: reaction_secs.max(0.0),
            cooldown: 0.0,
            bell_cooldown: 0.0,
            max_days,
        }
    }

    /// Decide what to press this tick
    pub fn decide(&mut self, snapshot: &GameSnapshot, dt: f32) -> Option<InputEvent> {
        self.cooldown -= dt;
        self.bell_cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }

        let action = match snapshot.screen {
            ScreenId::MainMenu => Some(InputEvent::NavigateTo(ScreenId::DayIntro)),
            ScreenId::DayIntro => Some(InputEvent::NavigateTo(ScreenId::Service)),
            ScreenId::Service | ScreenId::ChaosOverlay => {
                snapshot.round.as_ref().and_then(|round| self.serve(round))
            }
            ScreenId::DayResults => Some(InputEvent::NavigateTo(ScreenId::UpgradeShop)),
            ScreenId::UpgradeShop if self.is_done(snapshot) => None,
            ScreenId::UpgradeShop => Some(self.shop(snapshot)),
            ScreenId::Paused => Some(InputEvent::TogglePause),
            ScreenId::Dialogue => Some(InputEvent::Confirm),
        };

        if action.is_some() {
            self.cooldown = self.reaction_secs;
        }
        action
    }

    fn serve(&mut self, round: &RoundSnapshot) -> Option<InputEvent> {
        // Portal first
        if let Some(chaos) = round.chaos.as_ref().filter(|c| c.is_active()) {
            return self.brew_toward(&chaos.resolution_recipe, &round.brewing);
        }

        if self.bell_cooldown <= 0.0 && round.customers.iter().any(|c| !c.visible) {
            self.bell_cooldown = 3.0;
            return Some(InputEvent::RingBell);
        }

        if let Some(selected) = round.selected {
            if let Some(customer) = round.customers.iter().find(|c| c.id == selected) {
                return self.brew_toward(&customer.order, &round.brewing);
            }
        }

        round
            .customers
            .iter()
            .filter(|c| c.selectable)
            .min_by(|a, b| a.patience.total_cmp(&b.patience))
            .map(|c| InputEvent::SelectCustomer(c.id))
    }

    /// Next step toward `recipe` given what is already at the station
    fn brew_toward(&self, recipe: &RecipeId, brewing: &[IngredientId]) -> Option<InputEvent> {
        let recipe = self.catalog.recipe(recipe)?;
        if is_exact_match(brewing, &recipe.ingredients) {
            return Some(InputEvent::Confirm);
        }

        // What's still missing, counting duplicates
        let mut missing: Vec<&IngredientId> = recipe.ingredients.iter().collect();
        for have in brewing {
            match missing.iter().position(|&need| need == have) {
                Some(i) => {
                    missing.remove(i);
                }
                // Something stray is in the cup; start over
                None => return Some(InputEvent::CancelBrew),
            }
        }
        missing
            .first()
            .map(|&next| InputEvent::AddIngredient(next.clone()))
    }

    fn shop(&self, snapshot: &GameSnapshot) -> InputEvent {
        let affordable = UPGRADES.iter().find(|u| {
            u.cost <= snapshot.coins
                && !snapshot.owned_upgrades.iter().any(|owned| *owned == u.id)
        });
        match affordable {
            Some(upgrade) => InputEvent::Purchase(upgrade.id.to_string()),
            None => InputEvent::NavigateTo(ScreenId::DayIntro),
        }
    }

    /// Has the autopilot played all the days it was asked to?
    pub fn is_done(&self, snapshot: &GameSnapshot) -> bool {
        snapshot.screen == ScreenId::UpgradeShop && snapshot.day >= self.max_days
    }
}
