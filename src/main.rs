//! Eldritch Espresso entry point
//!
//! Headless driver: loads content and settings, then lets the autopilot play
//! a few days at full speed while logging what happens.
//!
//! Usage: `eldritch-espresso [settings.json] [content_dir]`

use std::sync::Arc;
use std::time::Duration;

use eldritch_espresso::audio::LogAudio;
use eldritch_espresso::autopilot::Autopilot;
use eldritch_espresso::content::{Catalog, JsonContent};
use eldritch_espresso::sim::GameEvent;
use eldritch_espresso::{ContentLoadError, Game, Settings};

/// Days the autopilot plays before closing up
const DAYS: u32 = 3;
/// Safety net against a stuck screen (an hour of game time)
const MAX_TICKS: u64 = 60 * 60 * 60;

fn load_catalog(dir: Option<&str>) -> Result<Catalog, ContentLoadError> {
    match dir {
        Some(dir) => Catalog::load(&JsonContent::from_dir(dir)?),
        None => Catalog::builtin(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Eldritch Espresso (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let catalog = match load_catalog(args.get(1).map(String::as_str)) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            log::error!("Failed to load content: {}", e);
            std::process::exit(1);
        }
    };

    let audio = LogAudio::new(&settings.audio);
    let mut game = Game::new(Arc::clone(&catalog), settings).with_audio(Box::new(audio));
    let mut pilot = Autopilot::new(catalog, 0.4, DAYS);

    // One tick's worth of real time per frame
    let frame = Duration::from_nanos(16_666_667);
    let dt = eldritch_espresso::consts::SIM_DT;
    let mut ticks = 0u64;

    while game.is_running() && ticks < MAX_TICKS {
        let snapshot = game.snapshot();
        if pilot.is_done(&snapshot) {
            break;
        }
        if let Some(input) = pilot.decide(&snapshot, dt) {
            game.push_input(input);
        }

        let out = game.frame(frame);
        ticks += out.ticks as u64;
        for error in &out.feedback {
            log::debug!("Autopilot input refused: {}", error);
        }
        for event in &out.events {
            if let GameEvent::RoundEnded(summary) = event {
                log::info!(
                    "Day {}: served {}, lost {}, tips {}, chaos {:?} (+{} / -{}), {} pastries lost",
                    game.progress().day,
                    summary.customers_served,
                    summary.customers_lost,
                    summary.tips_earned,
                    summary.chaos,
                    summary.chaos_bonus,
                    summary.chaos_penalty,
                    summary.pastries_lost
                );
            }
        }
    }

    let progress = game.progress();
    log::info!(
        "Closed after day {} with {} coins ({} ticks)",
        progress.day,
        progress.coins,
        ticks
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web front end drives `Game` directly; nothing to do here
}
