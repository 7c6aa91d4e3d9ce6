//! Brewing station and order matching
//!
//! The station holds the ingredients picked for the selected customer. A
//! drink matches a recipe when the ingredients are the same multiset: order
//! does not matter, counts do.

use serde::{Deserialize, Serialize};

use super::customer::CustomerId;
use crate::consts::{BREW_STEP_SECS, HEAT_SPOIL_RATE, ICE_SPOIL_SECS};
use crate::content::{IngredientId, RecipeDefinition};

/// Outcome of serving the drink at the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// The selected customer got exactly what they ordered
    ExactMatch,
    /// Wrong, incomplete, overfilled or spoiled drink
    WrongRecipe,
    /// Nobody to serve and no chaos recipe on the counter
    NoCustomerSelected,
    /// The drink was the chaos resolution recipe and closed the event
    ChaosResolved,
}

/// Station tuning: brew steps and ice drink spoilage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Seconds one ingredient takes to brew
    pub brew_step_secs: f32,
    /// Seconds an ice drink survives at the station
    pub ice_spoil_secs: f32,
    /// Spoilage clock speed while the shop is hot
    pub heat_spoil_rate: f32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            brew_step_secs: BREW_STEP_SECS,
            ice_spoil_secs: ICE_SPOIL_SECS,
            heat_spoil_rate: HEAT_SPOIL_RATE,
        }
    }
}

/// Multiset equality between picked ingredients and a recipe
pub fn is_exact_match(selected: &[IngredientId], required: &[IngredientId]) -> bool {
    if selected.len() != required.len() {
        return false;
    }
    let mut a: Vec<&IngredientId> = selected.iter().collect();
    let mut b: Vec<&IngredientId> = required.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// In-progress drink for the selected customer
#[derive(Debug, Clone, Default)]
pub struct BrewingStation {
    selected: Option<CustomerId>,
    buffer: Vec<IngredientId>,
    /// Brew-speed-weighted seconds since the last ingredient went in
    step_time: f32,
    /// Heat-weighted seconds since the first ingredient went in
    spoilage: f32,
    config: StationConfig,
}

impl BrewingStation {
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Target a customer. Switching customers throws out the current drink.
    pub fn select(&mut self, id: CustomerId) {
        if self.selected != Some(id) {
            self.clear_buffer();
            self.selected = Some(id);
        }
    }

    /// Drop the selection and the drink
    pub fn cancel(&mut self) {
        self.selected = None;
        self.clear_buffer();
    }

    pub fn selected(&self) -> Option<CustomerId> {
        self.selected
    }

    /// Add an ingredient and start brewing it
    pub fn add_ingredient(&mut self, id: IngredientId) {
        self.buffer.push(id);
        self.step_time = 0.0;
    }

    pub fn ingredients(&self) -> &[IngredientId] {
        &self.buffer
    }

    /// Progress of the latest ingredient's brew step in `[0, 1]`
    pub fn brew_progress(&self) -> f32 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        if self.config.brew_step_secs <= 0.0 {
            return 1.0;
        }
        (self.step_time / self.config.brew_step_secs).min(1.0)
    }

    /// Advance brewing clocks. `brew_speed` scales the brew step, `heat`
    /// speeds up spoilage.
    pub fn tick(&mut self, dt: f32, brew_speed: f32, heat: bool) {
        if self.buffer.is_empty() {
            return;
        }
        self.step_time += dt * brew_speed.max(0.0);
        let rate = if heat { self.config.heat_spoil_rate } else { 1.0 };
        self.spoilage += dt * rate;
    }

    /// Has an ice drink for `recipe` sat too long? `brew_speed` stretches the window.
    pub fn is_spoiled(&self, recipe: &RecipeDefinition, brew_speed: f32) -> bool {
        recipe.is_ice() && self.spoilage > self.config.ice_spoil_secs * brew_speed.max(0.0)
    }

    /// Does the current drink match `recipe` exactly?
    pub fn matches(&self, recipe: &RecipeDefinition) -> bool {
        is_exact_match(&self.buffer, &recipe.ingredients)
    }

    /// Serve the drink to the selected customer's order. The drink is always used up.
    pub fn confirm(&mut self, target: Option<&RecipeDefinition>, brew_speed: f32) -> MatchResult {
        let result = match target {
            None => MatchResult::NoCustomerSelected,
            Some(recipe) if self.matches(recipe) && !self.is_spoiled(recipe, brew_speed) => {
                MatchResult::ExactMatch
            }
            Some(_) => MatchResult::WrongRecipe,
        };
        if result == MatchResult::ExactMatch {
            self.selected = None;
        }
        self.clear_buffer();
        result
    }

    /// Hand the drink to something other than the selected customer
    pub fn consume(&mut self) {
        self.clear_buffer();
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.step_time = 0.0;
        self.spoilage = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RecipeTag;
    use crate::sim::customer::tests::recipe;
    use proptest::prelude::*;

    fn add_all(station: &mut BrewingStation, ingredients: &[&str]) {
        for &i in ingredients {
            station.add_ingredient(i.into());
        }
    }

    #[test]
    fn test_exact_match_any_order() {
        let latte = recipe("latte", &["beans", "milk", "stardust"], &[]);
        let mut station = BrewingStation::default();
        station.select(CustomerId(1));
        add_all(&mut station, &["stardust", "beans", "milk"]);
        assert_eq!(station.confirm(Some(&latte), 1.0), MatchResult::ExactMatch);
        assert_eq!(station.selected(), None);
        assert!(station.ingredients().is_empty());
    }

    #[test]
    fn test_duplicates_matter() {
        let nebula = recipe("nebula", &["milk", "stardust", "stardust"], &[]);
        let mut station = BrewingStation::default();
        station.select(CustomerId(1));
        add_all(&mut station, &["milk", "milk", "stardust"]);
        assert_eq!(station.confirm(Some(&nebula), 1.0), MatchResult::WrongRecipe);
        // Wrong drink keeps the customer selected
        assert_eq!(station.selected(), Some(CustomerId(1)));
        assert!(station.ingredients().is_empty());
    }

    #[test]
    fn test_no_target() {
        let mut station = BrewingStation::default();
        add_all(&mut station, &["beans"]);
        assert_eq!(station.confirm(None, 1.0), MatchResult::NoCustomerSelected);
        assert!(station.ingredients().is_empty());
    }

    #[test]
    fn test_switching_customer_clears_drink() {
        let mut station = BrewingStation::default();
        station.select(CustomerId(1));
        add_all(&mut station, &["beans", "milk"]);
        station.select(CustomerId(1));
        assert_eq!(station.ingredients().len(), 2);
        station.select(CustomerId(2));
        assert!(station.ingredients().is_empty());
        assert_eq!(station.selected(), Some(CustomerId(2)));
    }

    #[test]
    fn test_ice_drink_spoils_faster_in_heat() {
        let cold_brew = recipe("cold", &["beans", "moonlight", "milk"], &[RecipeTag::Ice]);
        let config = StationConfig {
            ice_spoil_secs: 10.0,
            heat_spoil_rate: 2.0,
            ..StationConfig::default()
        };

        let mut cool = BrewingStation::new(config);
        cool.select(CustomerId(1));
        add_all(&mut cool, &["beans", "moonlight", "milk"]);
        cool.tick(6.0, 1.0, false);
        assert!(!cool.is_spoiled(&cold_brew, 1.0));
        assert_eq!(cool.confirm(Some(&cold_brew), 1.0), MatchResult::ExactMatch);

        let mut hot = BrewingStation::new(config);
        hot.select(CustomerId(1));
        add_all(&mut hot, &["beans", "moonlight", "milk"]);
        hot.tick(6.0, 1.0, true);
        assert!(hot.is_spoiled(&cold_brew, 1.0));
        assert_eq!(hot.confirm(Some(&cold_brew), 1.0), MatchResult::WrongRecipe);
    }

    #[test]
    fn test_brew_speed_stretches_spoil_window() {
        let cold_brew = recipe("cold", &["beans"], &[RecipeTag::Ice]);
        let mut station = BrewingStation::default();
        station.add_ingredient("beans".into());
        station.tick(ICE_SPOIL_SECS + 1.0, 1.0, false);
        assert!(station.is_spoiled(&cold_brew, 1.0));
        assert!(!station.is_spoiled(&cold_brew, 1.2));
    }

    #[test]
    fn test_hot_drinks_never_spoil() {
        let latte = recipe("latte", &["beans"], &[]);
        let mut station = BrewingStation::default();
        station.add_ingredient("beans".into());
        station.tick(1000.0, 1.0, true);
        assert!(!station.is_spoiled(&latte, 1.0));
    }

    #[test]
    fn test_brew_step_scales_with_brew_speed() {
        let mut plain = BrewingStation::default();
        let mut ground = BrewingStation::new(StationConfig::default());
        assert_eq!(ground.brew_progress(), 0.0);

        plain.add_ingredient("beans".into());
        ground.add_ingredient("beans".into());
        for _ in 0..60 {
            plain.tick(1.0 / 60.0, 1.0, false);
            ground.tick(1.0 / 60.0, 1.2, false);
        }
        // 1s of a 1.2s step
        assert!((plain.brew_progress() - 1.0 / 1.2).abs() < 1e-3);
        assert!((ground.brew_progress() - 1.0).abs() < 1e-3);

        // Each ingredient starts a fresh step
        ground.add_ingredient("milk".into());
        assert_eq!(ground.brew_progress(), 0.0);
        ground.tick(5.0, 1.2, false);
        assert_eq!(ground.brew_progress(), 1.0);
    }

    fn pool() -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec(
            prop::sample::select(vec!["beans", "milk", "stardust", "moonlight", "sigil"]),
            1..6,
        )
    }

    proptest! {
        #[test]
        fn prop_any_permutation_matches(ingredients in pool(), seed in any::<u64>()) {
            let required: Vec<IngredientId> = ingredients.iter().map(|&i| i.into()).collect();
            let mut shuffled = required.clone();
            // Deterministic rotate + reverse stands in for a shuffle
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
            prop_assert!(is_exact_match(&shuffled, &required));
        }

        #[test]
        fn prop_extra_or_missing_never_matches(ingredients in pool(), extra in pool()) {
            let required: Vec<IngredientId> = ingredients.iter().map(|&i| i.into()).collect();

            let mut more = required.clone();
            more.extend(extra.iter().map(|&i| IngredientId::from(i)));
            prop_assert!(!is_exact_match(&more, &required));

            let mut fewer = required.clone();
            fewer.pop();
            prop_assert!(!is_exact_match(&fewer, &required));
        }
    }
}
