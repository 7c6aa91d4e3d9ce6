//! Customer quirk rules
//!
//! Quirks are plain data on the archetype. Everything a quirk changes about a
//! customer is answered by one of these small functions, so the queue never
//! branches on customer kinds itself.

use serde::{Deserialize, Serialize};

use crate::content::QuirkKind;

/// Per-customer transient quirk state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuirkState {
    /// Seconds left in a bell reveal window (ghosts only)
    pub reveal_remaining: f32,
    /// Seconds of paused patience left; only the first reveal grants any
    pub pause_remaining: f32,
    /// Has the bell ever revealed this customer?
    pub revealed_once: bool,
}

impl QuirkState {
    pub fn is_revealed(&self) -> bool {
        self.reveal_remaining > 0.0
    }
}

/// Is the customer drawn on screen?
pub fn is_visible(quirk: QuirkKind, state: &QuirkState) -> bool {
    match quirk {
        QuirkKind::Ghost => state.is_revealed(),
        QuirkKind::None | QuirkKind::FireElemental => true,
    }
}

/// May the player target this customer?
pub fn is_selectable(quirk: QuirkKind, state: &QuirkState) -> bool {
    is_visible(quirk, state)
}

/// Does patience drain this tick? A ghost waits attentively through its
/// first reveal only.
pub fn decays_patience(quirk: QuirkKind, state: &QuirkState) -> bool {
    match quirk {
        QuirkKind::Ghost => state.pause_remaining <= 0.0,
        QuirkKind::None | QuirkKind::FireElemental => true,
    }
}

/// Does this customer heat up the shop while waiting?
pub fn emits_heat(quirk: QuirkKind) -> bool {
    quirk == QuirkKind::FireElemental
}

/// React to the service bell; returns true if the customer is revealed.
/// An open window is not re-armed.
pub fn on_bell(quirk: QuirkKind, state: &mut QuirkState, reveal_secs: f32) -> bool {
    match quirk {
        QuirkKind::Ghost => {
            if !state.is_revealed() {
                state.reveal_remaining = reveal_secs;
                if !state.revealed_once {
                    state.revealed_once = true;
                    state.pause_remaining = reveal_secs;
                }
            }
            true
        }
        QuirkKind::None | QuirkKind::FireElemental => false,
    }
}

/// Advance quirk timers
pub fn tick(quirk: QuirkKind, state: &mut QuirkState, dt: f32) {
    if quirk == QuirkKind::Ghost {
        state.reveal_remaining = (state.reveal_remaining - dt).max(0.0);
        state.pause_remaining = (state.pause_remaining - dt).max(0.0);
    }
}
