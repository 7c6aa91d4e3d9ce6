//! Dialogue scenes
//!
//! Short scripted exchanges shown before and after a day, plus a lore scene
//! reachable from the main menu. Displaying them is the UI's job; this module
//! only keeps track of which line is current.

use serde::{Deserialize, Serialize};

/// Where a scene may be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneContext {
    DayIntro,
    DayResults,
    Lore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueScene {
    pub id: &'static str,
    pub context: SceneContext,
    pub lines: &'static [DialogueLine],
}

const fn line(speaker: &'static str, text: &'static str) -> DialogueLine {
    DialogueLine { speaker, text }
}

/// Builtin scenes
pub const SCENES: &[DialogueScene] = &[
    DialogueScene {
        id: "intro_veil",
        context: SceneContext::DayIntro,
        lines: &[
            line("Mysterious Voice", "The veil between worlds is thin this morning."),
            line("You", "Perfect weather for espresso."),
            line("Mysterious Voice", "Then let the coffee flow."),
        ],
    },
    DialogueScene {
        id: "intro_stars",
        context: SceneContext::DayIntro,
        lines: &[
            line("Azzu", "The stars favour lattes today."),
            line("You", "I'll stock up on stardust."),
        ],
    },
    DialogueScene {
        id: "intro_flames",
        context: SceneContext::DayIntro,
        lines: &[
            line("Ignis", "The flames whisper of a busy shift."),
            line("You", "Please don't stand next to the ice."),
            line("Ignis", "*crackles apologetically*"),
        ],
    },
    DialogueScene {
        id: "results_balanced",
        context: SceneContext::DayResults,
        lines: &[
            line("Whim", "The ethereal beans were perfectly balanced."),
            line("You", "I've been practising."),
            line("Whim", "*drifts through the wall, content*"),
        ],
    },
    DialogueScene {
        id: "results_elder",
        context: SceneContext::DayResults,
        lines: &[
            line("Elder Thing", "Ph'nglui mglw'nafh Caffeine R'lyeh fhtagn!"),
            line("You", "...I'll take that as a compliment."),
        ],
    },
    DialogueScene {
        id: "lore_founding",
        context: SceneContext::Lore,
        lines: &[
            line("Cosmic Barista", "This shop sits where three dimensions meet."),
            line("Cosmic Barista", "Every customer has travelled further than you'd think."),
            line("Cosmic Barista", "Keep the sigils dry. You'll understand at noon."),
        ],
    },
];

/// Pick the scene for a context on a given day, cycling through the book
pub fn scene_for(context: SceneContext, day: u32) -> Option<&'static DialogueScene> {
    let matching: Vec<&'static DialogueScene> =
        SCENES.iter().filter(|s| s.context == context).collect();
    if matching.is_empty() {
        return None;
    }
    let index = (day.saturating_sub(1) as usize) % matching.len();
    Some(matching[index])
}

/// Position within a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueCursor {
    scene: &'static DialogueScene,
    index: usize,
}

impl DialogueCursor {
    pub fn new(scene: &'static DialogueScene) -> Self {
        Self { scene, index: 0 }
    }

    /// Line on screen, `None` once the scene is over
    pub fn current(&self) -> Option<&'static DialogueLine> {
        self.scene.lines.get(self.index)
    }

    /// Move to the next line; returns false when the scene just finished
    pub fn advance(&mut self) -> bool {
        if self.index < self.scene.lines.len() {
            self.index += 1;
        }
        !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.scene.lines.len()
    }
}
