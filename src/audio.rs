//! Audio trigger interface
//!
//! The game only says *which* sound should play. Synthesis and playback
//! belong to whatever sink the front end plugs in; without one the game is
//! silent and otherwise unchanged.

use crate::settings::AudioSettings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Door chime as a customer walks in
    CustomerArrive,
    /// Perfect drink handed over
    OrderServed,
    /// Customer pulls a face
    WrongDrink,
    /// Customer storms out
    CustomerLeave,
    /// Service bell
    Bell,
    /// Portal tears open
    PortalOpen,
    /// Portal sealed
    PortalClosed,
    /// Portal swallowed the pastry case
    PortalFailed,
    /// Closing time
    RoundEnd,
    /// Coins spent in the shop
    Purchase,
    /// Menu click
    UiClick,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CustomerArrived { .. } => Some(SoundEffect::CustomerArrive),
            GameEvent::CustomerServed { .. } => Some(SoundEffect::OrderServed),
            GameEvent::WrongDrink { .. } => Some(SoundEffect::WrongDrink),
            GameEvent::CustomerLeft { .. } => Some(SoundEffect::CustomerLeave),
            GameEvent::BellRung { .. } => Some(SoundEffect::Bell),
            GameEvent::ChaosStarted { .. } => Some(SoundEffect::PortalOpen),
            GameEvent::ChaosResolved { .. } => Some(SoundEffect::PortalClosed),
            GameEvent::ChaosFailed => Some(SoundEffect::PortalFailed),
            GameEvent::RoundEnded(_) => Some(SoundEffect::RoundEnd),
        }
    }
}

/// Something that can play sound effects
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, _effect: SoundEffect) {}
}

/// Headless sink that logs each trigger at its effective volume
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new(&AudioSettings::default())
    }
}

impl LogAudio {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            muted: settings.muted,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::trace!("sfx {:?} @ {:.2}", effect, vol);
    }
}
