//! Screen state machine and frame driver
//!
//! `Game` owns the timebase, the active screen and everything that outlives a
//! single day (coins, day number, upgrades). The UI pushes `InputEvent`s and
//! reads `GameSnapshot`s; nothing else crosses the boundary.
//!
//! Screens are a closed enum carrying their own data. Every change of screen
//! goes through `transition`, which checks the `TRANSITIONS` table, runs the
//! exit hook of the old screen and the enter hook of the new one.

use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, SilentAudio, SoundEffect};
use crate::content::{Catalog, IngredientId};
use crate::dialogue::{self, DialogueCursor, DialogueLine, SceneContext};
use crate::error::GameError;
use crate::settings::Settings;
use crate::sim::{
    CustomerId, GameEvent, RoundInput, RoundSnapshot, RoundSummary, ServiceRound, Timebase,
};
use crate::upgrades::{Multipliers, UpgradeShop, UpgradeStore};

/// Screen identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenId {
    MainMenu,
    DayIntro,
    Service,
    ChaosOverlay,
    DayResults,
    UpgradeShop,
    Dialogue,
    Paused,
}

/// Why a transition happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Player,
    TimerExpired,
    ChaosActivated,
    RoundEnded,
    PauseToggle,
    DialogueFinished,
}

/// Every legal `(from, to, trigger)` edge
pub const TRANSITIONS: &[(ScreenId, ScreenId, Trigger)] = &[
    (ScreenId::MainMenu, ScreenId::DayIntro, Trigger::Player),
    (ScreenId::MainMenu, ScreenId::Dialogue, Trigger::Player),
    (ScreenId::DayIntro, ScreenId::Service, Trigger::Player),
    (ScreenId::DayIntro, ScreenId::Service, Trigger::TimerExpired),
    (ScreenId::Service, ScreenId::ChaosOverlay, Trigger::ChaosActivated),
    (ScreenId::Service, ScreenId::DayResults, Trigger::RoundEnded),
    (ScreenId::Service, ScreenId::Paused, Trigger::PauseToggle),
    (ScreenId::ChaosOverlay, ScreenId::Service, Trigger::TimerExpired),
    (ScreenId::ChaosOverlay, ScreenId::Service, Trigger::Player),
    (ScreenId::ChaosOverlay, ScreenId::DayResults, Trigger::RoundEnded),
    (ScreenId::ChaosOverlay, ScreenId::Paused, Trigger::PauseToggle),
    (ScreenId::Paused, ScreenId::Service, Trigger::PauseToggle),
    (ScreenId::Paused, ScreenId::ChaosOverlay, Trigger::PauseToggle),
    (ScreenId::Paused, ScreenId::MainMenu, Trigger::Player),
    (ScreenId::DayResults, ScreenId::UpgradeShop, Trigger::Player),
    (ScreenId::DayResults, ScreenId::Dialogue, Trigger::Player),
    (ScreenId::Dialogue, ScreenId::MainMenu, Trigger::DialogueFinished),
    (ScreenId::Dialogue, ScreenId::DayResults, Trigger::DialogueFinished),
    (ScreenId::UpgradeShop, ScreenId::DayIntro, Trigger::Player),
];

pub fn is_allowed(from: ScreenId, to: ScreenId, trigger: Trigger) -> bool {
    TRANSITIONS
        .iter()
        .any(|&(f, t, tr)| f == from && t == to && tr == trigger)
}

/// The active screen and its data
#[derive(Debug)]
pub enum Screen {
    MainMenu,
    DayIntro {
        cursor: Option<DialogueCursor>,
        /// Seconds until the intro skips itself
        timer: f32,
    },
    Service {
        round: Box<ServiceRound>,
    },
    ChaosOverlay {
        round: Box<ServiceRound>,
        /// Seconds of banner left
        timer: f32,
    },
    DayResults {
        summary: RoundSummary,
    },
    UpgradeShop,
    Dialogue {
        cursor: DialogueCursor,
        return_to: Box<Screen>,
    },
    Paused {
        suspended: Box<Screen>,
    },
}

impl Screen {
    pub fn id(&self) -> ScreenId {
        match self {
            Screen::MainMenu => ScreenId::MainMenu,
            Screen::DayIntro { .. } => ScreenId::DayIntro,
            Screen::Service { .. } => ScreenId::Service,
            Screen::ChaosOverlay { .. } => ScreenId::ChaosOverlay,
            Screen::DayResults { .. } => ScreenId::DayResults,
            Screen::UpgradeShop => ScreenId::UpgradeShop,
            Screen::Dialogue { .. } => ScreenId::Dialogue,
            Screen::Paused { .. } => ScreenId::Paused,
        }
    }

    /// The round this screen is running or holding
    pub fn round(&self) -> Option<&ServiceRound> {
        match self {
            Screen::Service { round } | Screen::ChaosOverlay { round, .. } => Some(&**round),
            Screen::Paused { suspended } => suspended.round(),
            _ => None,
        }
    }
}

/// Player/UI input, queued until the next tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    SelectCustomer(CustomerId),
    AddIngredient(IngredientId),
    Confirm,
    RingBell,
    TogglePause,
    NavigateTo(ScreenId),
    CancelBrew,
    Purchase(String),
    Quit,
}

/// Run-wide progress, in memory only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub day: u32,
    pub coins: u32,
}

/// What happened during one `frame`
#[derive(Debug, Default)]
pub struct FrameOutput {
    pub ticks: usize,
    /// Rejected inputs, for UI feedback
    pub feedback: Vec<GameError>,
    pub events: Vec<GameEvent>,
}

/// Read-only view for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub screen: ScreenId,
    /// Screen under the pause menu or dialogue
    pub suspended: Option<ScreenId>,
    pub day: u32,
    pub coins: u32,
    pub round: Option<RoundSnapshot>,
    pub results: Option<RoundSummary>,
    pub dialogue: Option<DialogueLine>,
    pub banner: Option<&'static str>,
    pub multipliers: Multipliers,
    pub owned_upgrades: Vec<&'static str>,
    pub running: bool,
}

pub struct Game {
    catalog: Arc<Catalog>,
    settings: Settings,
    timebase: Timebase,
    screen: Screen,
    progress: Progress,
    shop: UpgradeShop,
    pending: VecDeque<InputEvent>,
    audio: Box<dyn AudioSink>,
    running: bool,
    frame_events: Vec<GameEvent>,
}

impl Game {
    pub fn new(catalog: Arc<Catalog>, settings: Settings) -> Self {
        let progress = Progress {
            day: 1,
            coins: settings.game.starting_coins,
        };
        Self {
            catalog,
            settings,
            timebase: Timebase::default(),
            screen: Screen::MainMenu,
            progress,
            shop: UpgradeShop::new(),
            pending: VecDeque::new(),
            audio: Box::new(SilentAudio),
            running: true,
            frame_events: Vec::new(),
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn screen_id(&self) -> ScreenId {
        self.screen.id()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn shop(&self) -> &UpgradeShop {
        &self.shop
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Queue input for the next tick
    pub fn push_input(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Advance by real elapsed time
    pub fn frame(&mut self, real_delta: Duration) -> FrameOutput {
        let mut out = FrameOutput::default();
        for (i, tick) in self.timebase.advance(real_delta).enumerate() {
            if i == 0 {
                self.apply_pending(&mut out);
            }
            self.run_tick(tick.dt);
            out.ticks += 1;
        }
        out.events = mem::take(&mut self.frame_events);
        out
    }

    /// Advance exactly one tick, ignoring real time
    pub fn step(&mut self) -> FrameOutput {
        let mut out = FrameOutput::default();
        self.apply_pending(&mut out);
        self.run_tick(crate::consts::SIM_DT);
        out.ticks = 1;
        out.events = mem::take(&mut self.frame_events);
        out
    }

    /// Render interpolation factor
    pub fn pending_fraction(&self) -> f32 {
        self.timebase.pending_fraction()
    }

    fn apply_pending(&mut self, out: &mut FrameOutput) {
        while let Some(event) = self.pending.pop_front() {
            if let Err(e) = self.on_input(event) {
                log::debug!("Input rejected: {}", e);
                out.feedback.push(e);
            }
        }
    }

    fn run_tick(&mut self, dt: f32) {
        if let Some((to, trigger)) = self.on_tick(dt) {
            if let Err(e) = self.transition(to, trigger) {
                log::warn!("Tick requested an illegal transition: {}", e);
            }
        }
    }

    /// Change screen along a table edge
    pub fn transition(&mut self, to: ScreenId, trigger: Trigger) -> Result<(), GameError> {
        let from = self.screen.id();
        if !is_allowed(from, to, trigger) {
            return Err(GameError::InvalidTransition { from, to });
        }

        let old = mem::replace(&mut self.screen, Screen::MainMenu);
        match self.build(old, to) {
            Ok(next) => {
                self.on_exit(from, to, trigger);
                self.screen = next;
                self.on_enter(from, trigger);
                Ok(())
            }
            Err(old) => {
                self.screen = old;
                Err(GameError::InvalidTransition { from, to })
            }
        }
    }

    /// Construct the next screen, moving state out of the old one. Hands the
    /// old screen back when the edge doesn't fit its data.
    fn build(&mut self, old: Screen, to: ScreenId) -> Result<Screen, Screen> {
        match (old, to) {
            (Screen::MainMenu, ScreenId::DayIntro) => {
                self.progress = Progress {
                    day: 1,
                    coins: self.settings.game.starting_coins,
                };
                self.shop.reset();
                Ok(self.day_intro())
            }
            (old @ Screen::MainMenu, ScreenId::Dialogue) => {
                Ok(self.dialogue(SceneContext::Lore, old))
            }
            (Screen::DayIntro { .. }, ScreenId::Service) => Ok(Screen::Service {
                round: Box::new(self.new_round()),
            }),
            (Screen::Service { round }, ScreenId::ChaosOverlay) => Ok(Screen::ChaosOverlay {
                round,
                timer: self.settings.game.chaos_banner_secs,
            }),
            (Screen::ChaosOverlay { round, .. }, ScreenId::Service) => {
                Ok(Screen::Service { round })
            }
            (
                Screen::Service { round } | Screen::ChaosOverlay { round, .. },
                ScreenId::DayResults,
            ) => Ok(Screen::DayResults {
                summary: round.summary(),
            }),
            (old @ (Screen::Service { .. } | Screen::ChaosOverlay { .. }), ScreenId::Paused) => {
                Ok(Screen::Paused {
                    suspended: Box::new(old),
                })
            }
            (Screen::Paused { .. }, ScreenId::MainMenu) => Ok(Screen::MainMenu),
            (Screen::Paused { suspended }, to) if suspended.id() == to => Ok(*suspended),
            (Screen::DayResults { .. }, ScreenId::UpgradeShop) => Ok(Screen::UpgradeShop),
            (old @ Screen::DayResults { .. }, ScreenId::Dialogue) => {
                Ok(self.dialogue(SceneContext::DayResults, old))
            }
            (Screen::Dialogue { return_to, .. }, to) if return_to.id() == to => Ok(*return_to),
            (Screen::UpgradeShop, ScreenId::DayIntro) => {
                self.progress.day += 1;
                Ok(self.day_intro())
            }
            (old, _) => Err(old),
        }
    }

    fn day_intro(&self) -> Screen {
        Screen::DayIntro {
            cursor: dialogue::scene_for(SceneContext::DayIntro, self.progress.day)
                .map(DialogueCursor::new),
            timer: self.settings.game.intro_secs,
        }
    }

    fn dialogue(&self, context: SceneContext, return_to: Screen) -> Screen {
        match dialogue::scene_for(context, self.progress.day) {
            Some(scene) => Screen::Dialogue {
                cursor: DialogueCursor::new(scene),
                return_to: Box::new(return_to),
            },
            // No scene: nothing to show, stay where we were
            None => return_to,
        }
    }

    fn new_round(&self) -> ServiceRound {
        let seed = self.settings.seed.wrapping_add(u64::from(self.progress.day));
        ServiceRound::new(
            Arc::clone(&self.catalog),
            self.settings.round.clone(),
            self.shop.multipliers(),
            seed,
        )
    }

    fn on_exit(&mut self, from: ScreenId, to: ScreenId, trigger: Trigger) {
        log::debug!("Leaving {:?} for {:?} ({:?})", from, to, trigger);
        if trigger == Trigger::Player {
            self.audio.play(SoundEffect::UiClick);
        }
    }

    fn on_enter(&mut self, from: ScreenId, trigger: Trigger) {
        match &self.screen {
            Screen::DayIntro { .. } => {
                log::info!("Day {} begins ({} coins)", self.progress.day, self.progress.coins);
            }
            Screen::DayResults { summary } if trigger == Trigger::RoundEnded => {
                let earned = summary.coins_earned();
                self.progress.coins = self.progress.coins.saturating_add(earned);
                log::info!(
                    "Day {} closed: +{} coins ({} total)",
                    self.progress.day,
                    earned,
                    self.progress.coins
                );
            }
            Screen::Paused { .. } => log::info!("Paused during {:?}", from),
            Screen::MainMenu if from == ScreenId::Paused => {
                log::info!("Day {} abandoned", self.progress.day);
            }
            _ => {}
        }
    }

    /// Per-tick work of the active screen; may ask for a transition
    fn on_tick(&mut self, dt: f32) -> Option<(ScreenId, Trigger)> {
        match &mut self.screen {
            Screen::DayIntro { timer, .. } => {
                *timer -= dt;
                (*timer <= 0.0).then_some((ScreenId::Service, Trigger::TimerExpired))
            }
            Screen::Service { round } => {
                let ended = round.tick().is_some();
                let events = round.drain_events();
                let chaos = events
                    .iter()
                    .any(|e| matches!(e, GameEvent::ChaosStarted { .. }));
                self.publish(events);
                if ended {
                    Some((ScreenId::DayResults, Trigger::RoundEnded))
                } else if chaos {
                    Some((ScreenId::ChaosOverlay, Trigger::ChaosActivated))
                } else {
                    None
                }
            }
            Screen::ChaosOverlay { round, timer } => {
                let ended = round.tick().is_some();
                let events = round.drain_events();
                *timer -= dt;
                let banner_done = *timer <= 0.0;
                self.publish(events);
                if ended {
                    Some((ScreenId::DayResults, Trigger::RoundEnded))
                } else if banner_done {
                    Some((ScreenId::Service, Trigger::TimerExpired))
                } else {
                    None
                }
            }
            // Paused: nothing moves
            _ => None,
        }
    }

    fn publish(&mut self, events: Vec<GameEvent>) {
        for event in &events {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
        }
        self.frame_events.extend(events);
    }

    fn on_input(&mut self, event: InputEvent) -> Result<(), GameError> {
        let screen = self.screen.id();
        let ignored = GameError::InputIgnored { screen };

        match event {
            InputEvent::Quit => {
                if screen != ScreenId::MainMenu {
                    return Err(ignored);
                }
                log::info!("Quit from the main menu");
                self.running = false;
                Ok(())
            }
            InputEvent::TogglePause => match &self.screen {
                Screen::Service { .. } | Screen::ChaosOverlay { .. } => {
                    self.transition(ScreenId::Paused, Trigger::PauseToggle)
                }
                Screen::Paused { suspended } => {
                    let back = suspended.id();
                    self.transition(back, Trigger::PauseToggle)
                }
                _ => Err(ignored),
            },
            InputEvent::NavigateTo(to) => self.transition(to, Trigger::Player),
            InputEvent::Purchase(id) => {
                if screen != ScreenId::UpgradeShop {
                    return Err(ignored);
                }
                self.progress.coins = self.shop.purchase(&id, self.progress.coins)?;
                self.audio.play(SoundEffect::Purchase);
                Ok(())
            }
            InputEvent::Confirm if screen == ScreenId::DayIntro => self.advance_intro(),
            InputEvent::Confirm if screen == ScreenId::Dialogue => self.advance_dialogue(),
            InputEvent::SelectCustomer(_)
            | InputEvent::AddIngredient(_)
            | InputEvent::Confirm
            | InputEvent::RingBell
            | InputEvent::CancelBrew => {
                let input = match event {
                    InputEvent::SelectCustomer(id) => RoundInput::Select(id),
                    InputEvent::AddIngredient(id) => RoundInput::AddIngredient(id),
                    InputEvent::Confirm => RoundInput::Confirm,
                    InputEvent::RingBell => RoundInput::RingBell,
                    _ => RoundInput::Cancel,
                };
                match &mut self.screen {
                    Screen::Service { round } | Screen::ChaosOverlay { round, .. } => {
                        round.apply_input(input).map(|_| ())
                    }
                    _ => Err(ignored),
                }
            }
        }
    }

    fn advance_intro(&mut self) -> Result<(), GameError> {
        let finished = match &mut self.screen {
            Screen::DayIntro {
                cursor: Some(cursor),
                ..
            } => !cursor.advance(),
            _ => true,
        };
        if finished {
            self.transition(ScreenId::Service, Trigger::Player)
        } else {
            Ok(())
        }
    }

    fn advance_dialogue(&mut self) -> Result<(), GameError> {
        let screen = self.screen.id();
        let back = match &mut self.screen {
            Screen::Dialogue { cursor, return_to } => {
                if cursor.advance() {
                    return Ok(());
                }
                return_to.id()
            }
            _ => return Err(GameError::InputIgnored { screen }),
        };
        self.transition(back, Trigger::DialogueFinished)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let (suspended, dialogue, banner, results) = match &self.screen {
            Screen::Paused { suspended } => (Some(suspended.id()), None, None, None),
            Screen::Dialogue { cursor, return_to } => {
                (Some(return_to.id()), cursor.current().copied(), None, None)
            }
            Screen::DayIntro { cursor, .. } => (
                None,
                cursor.as_ref().and_then(DialogueCursor::current).copied(),
                None,
                None,
            ),
            Screen::ChaosOverlay { round, .. } => (
                None,
                None,
                round.state().chaos.as_ref().map(|c| c.kind.announcement()),
                None,
            ),
            Screen::DayResults { summary } => (None, None, None, Some(*summary)),
            _ => (None, None, None, None),
        };

        GameSnapshot {
            screen: self.screen.id(),
            suspended,
            day: self.progress.day,
            coins: self.progress.coins,
            round: self.screen.round().map(ServiceRound::snapshot),
            results,
            dialogue,
            banner,
            multipliers: self.shop.multipliers(),
            owned_upgrades: self.shop.owned().to_vec(),
            running: self.running,
        }
    }
}
