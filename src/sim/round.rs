//! Service round controller
//!
//! One 90 second day behind the counter. The round owns the customer queue,
//! the brewing station and the chaos event, and advances them together one
//! fixed tick at a time.

use std::sync::Arc;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::brewing::{BrewingStation, MatchResult, StationConfig};
use super::chaos::{ChaosConfig, ChaosEvent, ChaosKind, ChaosTransition};
use super::customer::CustomerId;
use super::state::{GameEvent, RoundState, RoundSummary};
use crate::consts::{GHOST_REVEAL_SECS, QUEUE_CAPACITY, ROUND_DURATION_SECS, SIM_DT};
use crate::content::{
    ArchetypeId, Catalog, CustomerArchetype, IngredientId, QuirkKind, RecipeDefinition, RecipeId,
};
use crate::error::{GameError, Missing};
use crate::secs_to_ticks;
use crate::upgrades::Multipliers;

/// When new customers walk in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Only scripted arrivals
    Manual,
    /// A customer every `interval_secs`
    Constant { interval_secs: f32 },
    /// Interval shrinks linearly over the round
    Accelerating {
        start_interval_secs: f32,
        end_interval_secs: f32,
    },
}

impl SpawnPolicy {
    /// Seconds until the next arrival at round progress `[0, 1]`
    pub fn interval_at(&self, progress: f32) -> Option<f32> {
        match *self {
            SpawnPolicy::Manual => None,
            SpawnPolicy::Constant { interval_secs } => Some(interval_secs),
            SpawnPolicy::Accelerating {
                start_interval_secs,
                end_interval_secs,
            } => {
                let t = progress.clamp(0.0, 1.0);
                Some(start_interval_secs + (end_interval_secs - start_interval_secs) * t)
            }
        }
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        SpawnPolicy::Constant { interval_secs: 12.0 }
    }
}

/// Round tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub duration_secs: f32,
    pub queue_capacity: usize,
    pub spawn: SpawnPolicy,
    /// Seat a customer the moment the round opens
    pub spawn_on_start: bool,
    pub first_spawn_delay_secs: f32,
    /// Each automatic interval is nudged by up to this many seconds either way
    pub spawn_jitter_secs: f32,
    /// Automatic arrivals per round
    pub max_customers: u32,
    pub chaos: ChaosConfig,
    /// Ghost reveal window opened by the bell
    pub reveal_secs: f32,
    pub station: StationConfig,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: ROUND_DURATION_SECS,
            queue_capacity: QUEUE_CAPACITY,
            spawn: SpawnPolicy::default(),
            spawn_on_start: true,
            first_spawn_delay_secs: 2.0,
            spawn_jitter_secs: 2.0,
            max_customers: 12,
            chaos: ChaosConfig::default(),
            reveal_secs: GHOST_REVEAL_SECS,
            station: StationConfig::default(),
        }
    }
}

/// Player actions the round understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundInput {
    Select(CustomerId),
    AddIngredient(IngredientId),
    Confirm,
    RingBell,
    Cancel,
}

/// A customer as the UI sees it
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerView {
    pub id: CustomerId,
    pub name: String,
    pub quirk: QuirkKind,
    pub order: RecipeId,
    pub order_name: String,
    /// Remaining patience in `[0, 1]`
    pub patience: f32,
    pub visible: bool,
    pub selectable: bool,
    pub greeting: Option<String>,
}

/// Read-only view of a round for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub elapsed_secs: f32,
    pub remaining_secs: f32,
    /// Arrival order, hidden ghosts included (check `visible`)
    pub customers: Vec<CustomerView>,
    pub selected: Option<CustomerId>,
    pub brewing: Vec<IngredientId>,
    /// Latest ingredient's brew step in `[0, 1]`
    pub brew_progress: f32,
    pub tips: u32,
    pub served: u32,
    pub lost: u32,
    pub wrong_drinks: u32,
    pub chaos: Option<ChaosEvent>,
    pub heat: bool,
    pub finished: bool,
}

/// A running service round
#[derive(Debug, Clone)]
pub struct ServiceRound {
    catalog: Arc<Catalog>,
    config: RoundConfig,
    multipliers: Multipliers,
    state: RoundState,
    station: BrewingStation,
    rng: Pcg32,
    /// Tick of the next automatic arrival
    next_spawn_tick: Option<u64>,
    spawned: u32,
    events: Vec<GameEvent>,
    finished: bool,
}

impl ServiceRound {
    pub fn new(
        catalog: Arc<Catalog>,
        config: RoundConfig,
        multipliers: Multipliers,
        seed: u64,
    ) -> Self {
        let duration_ticks = secs_to_ticks(config.duration_secs);
        let mut state = RoundState::new(seed, duration_ticks, config.queue_capacity);

        state.chaos = match catalog.chaos_recipe() {
            Some(recipe) => Some(ChaosEvent::new(
                ChaosKind::Portal,
                config.duration_secs * config.chaos.trigger_fraction,
                recipe.id.clone(),
                &config.chaos,
            )),
            None => {
                log::warn!("No chaos-tagged recipe in the catalog; running the day without chaos");
                None
            }
        };

        let next_spawn_tick = config
            .spawn
            .interval_at(0.0)
            .map(|_| secs_to_ticks(config.first_spawn_delay_secs));

        let rng = state.rng_state.to_rng();
        let station = BrewingStation::new(config.station);

        log::info!(
            "Round opened: {:.0}s, seed {}, brew x{:.2}, patience decay x{:.2}",
            config.duration_secs,
            seed,
            multipliers.brew_speed,
            multipliers.patience_decay
        );

        let mut round = Self {
            catalog,
            config,
            multipliers,
            state,
            station,
            rng,
            next_spawn_tick,
            spawned: 0,
            events: Vec::new(),
            finished: false,
        };
        if round.config.spawn_on_start && round.config.max_customers > 0 {
            round.spawn_random();
        }
        round
    }

    /// Advance one fixed tick. Returns the summary on the tick the round ends.
    pub fn tick(&mut self) -> Option<RoundSummary> {
        if self.finished {
            return None;
        }
        let dt = SIM_DT;

        // Brewing clocks see the heat from before anyone leaves this tick
        let heat = self.state.queue.heat_active();
        self.station.tick(dt, self.multipliers.brew_speed, heat);

        // Patience
        for customer in self.state.queue.tick(dt, self.multipliers.patience_decay) {
            if self.station.selected() == Some(customer.id) {
                self.station.cancel();
            }
            self.events.push(GameEvent::CustomerLeft { id: customer.id });
        }

        self.tick_spawns();

        // Chaos
        let elapsed = self.state.elapsed_secs();
        if let Some(chaos) = self.state.chaos.as_mut() {
            match chaos.tick(dt, elapsed) {
                Some(ChaosTransition::Activated) => {
                    self.events.push(GameEvent::ChaosStarted { kind: chaos.kind });
                }
                Some(ChaosTransition::Failed) => self.events.push(GameEvent::ChaosFailed),
                None => {}
            }
        }

        self.state.elapsed_ticks += 1;

        if self.state.is_over() {
            self.finished = true;
            let summary = self.state.summary();
            log::info!(
                "Round over: {} served, {} lost, {} tips, chaos {:?}",
                summary.customers_served,
                summary.customers_lost,
                summary.tips_earned,
                summary.chaos
            );
            self.events.push(GameEvent::RoundEnded(summary));
            return Some(summary);
        }
        None
    }

    fn tick_spawns(&mut self) {
        let Some(at) = self.next_spawn_tick else {
            return;
        };
        if self.state.elapsed_ticks < at {
            return;
        }
        if self.spawned >= self.config.max_customers {
            self.next_spawn_tick = None;
            return;
        }
        // Full queue: try again next tick
        if self.state.queue.is_full() {
            return;
        }

        self.spawn_random();

        let progress = if self.state.duration_ticks == 0 {
            1.0
        } else {
            self.state.elapsed_ticks as f32 / self.state.duration_ticks as f32
        };
        let Some(interval) = self.config.spawn.interval_at(progress) else {
            self.next_spawn_tick = None;
            return;
        };
        let jitter = self.config.spawn_jitter_secs.max(0.0);
        let interval = if jitter > 0.0 {
            interval + self.rng.random_range(-jitter..=jitter)
        } else {
            interval
        };
        self.next_spawn_tick = Some(self.state.elapsed_ticks + secs_to_ticks(interval).max(1));
    }

    fn spawn_random(&mut self) -> Option<CustomerId> {
        if self.state.queue.is_full() {
            return None;
        }
        let catalog = Arc::clone(&self.catalog);

        let archetypes = catalog.archetypes();
        let regular: Vec<&Arc<RecipeDefinition>> = catalog.regular_recipes().collect();
        if archetypes.is_empty() || regular.is_empty() {
            return None;
        }

        let archetype = Arc::clone(&archetypes[self.rng.random_range(0..archetypes.len())]);
        let order = Arc::clone(regular[self.rng.random_range(0..regular.len())]);
        let line = if archetype.dialogue.is_empty() {
            0
        } else {
            self.rng.random_range(0..archetype.dialogue.len())
        };
        self.seat(archetype, order, line)
    }

    fn seat(
        &mut self,
        archetype: Arc<CustomerArchetype>,
        order: Arc<RecipeDefinition>,
        line: usize,
    ) -> Option<CustomerId> {
        let name = archetype.name.clone();
        let id = self.state.queue.spawn(archetype, order, line)?;
        self.spawned += 1;
        self.events.push(GameEvent::CustomerArrived { id, name });
        Some(id)
    }

    /// Seat a specific customer with a specific order. Ignores the spawn
    /// policy but not the queue capacity.
    pub fn spawn_customer(
        &mut self,
        archetype: &ArchetypeId,
        recipe: &RecipeId,
    ) -> Result<Option<CustomerId>, GameError> {
        let archetype = self
            .catalog
            .archetype(archetype)
            .cloned()
            .ok_or_else(|| GameError::NotFound(Missing::Archetype(archetype.to_string())))?;
        let order = self
            .catalog
            .recipe(recipe)
            .cloned()
            .ok_or_else(|| GameError::NotFound(Missing::Recipe(recipe.to_string())))?;
        Ok(self.seat(archetype, order, 0))
    }

    /// Apply one player action. Rejected input leaves the round untouched.
    pub fn apply_input(&mut self, input: RoundInput) -> Result<Option<MatchResult>, GameError> {
        if self.finished {
            log::debug!("Round already over, dropping {:?}", input);
            return Ok(None);
        }
        match input {
            RoundInput::Select(id) => self.select(id).map(|_| None),
            RoundInput::AddIngredient(id) => self.add_ingredient(id).map(|_| None),
            RoundInput::Confirm => Ok(Some(self.confirm())),
            RoundInput::RingBell => {
                self.ring_bell();
                Ok(None)
            }
            RoundInput::Cancel => {
                self.station.cancel();
                Ok(None)
            }
        }
    }

    pub fn select(&mut self, id: CustomerId) -> Result<(), GameError> {
        self.state.queue.select(id)?;
        self.station.select(id);
        Ok(())
    }

    pub fn add_ingredient(&mut self, id: IngredientId) -> Result<(), GameError> {
        if !self.catalog.has_ingredient(&id) {
            return Err(GameError::NotFound(Missing::Ingredient(id.to_string())));
        }
        self.station.add_ingredient(id);
        Ok(())
    }

    /// Serve what is on the counter. The chaos recipe wins over the order.
    pub fn confirm(&mut self) -> MatchResult {
        let resolves_chaos = self
            .state
            .chaos
            .as_ref()
            .filter(|chaos| chaos.is_active())
            .and_then(|chaos| self.catalog.recipe(&chaos.resolution_recipe))
            .is_some_and(|recipe| self.station.matches(recipe));

        if resolves_chaos {
            if let Some(chaos) = self.state.chaos.as_mut() {
                chaos.resolve();
                let bonus = chaos.bonus();
                self.events.push(GameEvent::ChaosResolved { bonus });
            }
            self.station.consume();
            return MatchResult::ChaosResolved;
        }

        let selected = self.station.selected();
        let order = selected
            .and_then(|id| self.state.queue.get(id))
            .map(|customer| Arc::clone(&customer.order));
        let result = self
            .station
            .confirm(order.as_deref(), self.multipliers.brew_speed);

        match (result, selected) {
            (MatchResult::ExactMatch, Some(id)) => {
                if let Some(customer) = self.state.queue.serve(id) {
                    let tip = customer.tip();
                    self.state.tips += tip;
                    self.state.served += 1;
                    log::debug!("Served {} {} (+{} tip)", customer.archetype.name, id, tip);
                    self.events.push(GameEvent::CustomerServed { id, tip });
                }
            }
            (MatchResult::WrongRecipe, Some(id)) => {
                self.state.wrong_drinks += 1;
                log::debug!("Wrong drink for {}", id);
                self.events.push(GameEvent::WrongDrink { id });
            }
            _ => log::debug!("Confirm with nobody to serve"),
        }
        result
    }

    /// Ring the service bell; returns how many ghosts showed themselves
    pub fn ring_bell(&mut self) -> usize {
        let revealed = self.state.queue.ring_bell(self.config.reveal_secs);
        self.events.push(GameEvent::BellRung { revealed });
        revealed
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RoundSummary {
        self.state.summary()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn station(&self) -> &BrewingStation {
        &self.station
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn multipliers(&self) -> Multipliers {
        self.multipliers
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let customers = self
            .state
            .queue
            .customers()
            .iter()
            .map(|c| CustomerView {
                id: c.id,
                name: c.archetype.name.clone(),
                quirk: c.quirk(),
                order: c.order.id.clone(),
                order_name: c.order.name.clone(),
                patience: c.patience_fraction(),
                visible: c.is_visible(),
                selectable: c.is_selectable(),
                greeting: c.greeting().map(str::to_owned),
            })
            .collect();

        RoundSnapshot {
            elapsed_secs: self.state.elapsed_secs(),
            remaining_secs: self.state.remaining_secs(),
            customers,
            selected: self.station.selected(),
            brewing: self.station.ingredients().to_vec(),
            brew_progress: self.station.brew_progress(),
            tips: self.state.tips,
            served: self.state.served,
            lost: self.state.lost(),
            wrong_drinks: self.state.wrong_drinks,
            chaos: self.state.chaos.clone(),
            heat: self.state.queue.heat_active(),
            finished: self.finished,
        }
    }
}
