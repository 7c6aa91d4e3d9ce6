//! End-to-end days driven through the public API

use std::sync::Arc;
use std::time::Duration;

use eldritch_espresso::autopilot::Autopilot;
use eldritch_espresso::content::Catalog;
use eldritch_espresso::sim::{
    ChaosOutcome, GameEvent, MatchResult, RoundConfig, RoundInput, ServiceRound, SpawnPolicy,
};
use eldritch_espresso::upgrades::Multipliers;
use eldritch_espresso::{Game, GameError, InputEvent, ScreenId, Settings};

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().expect("builtin content loads"))
}

fn scripted_round() -> ServiceRound {
    let config = RoundConfig {
        spawn: SpawnPolicy::Manual,
        spawn_on_start: false,
        ..RoundConfig::default()
    };
    ServiceRound::new(catalog(), config, Multipliers::default(), 1)
}

fn tick_secs(round: &mut ServiceRound, secs: u64) {
    for _ in 0..secs * 60 {
        round.tick();
    }
}

#[test]
fn serve_then_lose_then_banish() {
    let mut round = scripted_round();
    let happy = round
        .spawn_customer(&"glorp".into(), &"meteor_mocha".into())
        .unwrap()
        .unwrap();
    let grumpy = round
        .spawn_customer(&"azzu".into(), &"void_espresso".into())
        .unwrap()
        .unwrap();

    tick_secs(&mut round, 5);
    round.apply_input(RoundInput::Select(happy)).unwrap();
    for i in ["milk", "meteor_shot", "beans"] {
        round.apply_input(RoundInput::AddIngredient(i.into())).unwrap();
    }
    assert_eq!(
        round.apply_input(RoundInput::Confirm),
        Ok(Some(MatchResult::ExactMatch))
    );

    // Azzu has 20s of patience and nobody serves them
    tick_secs(&mut round, 20);
    let events = round.drain_events();
    assert!(events.contains(&GameEvent::CustomerLeft { id: grumpy }));

    tick_secs(&mut round, 21);
    assert!(round.state().chaos_active());
    for i in ["beans", "sigil", "moonlight"] {
        round.apply_input(RoundInput::AddIngredient(i.into())).unwrap();
    }
    assert_eq!(
        round.apply_input(RoundInput::Confirm),
        Ok(Some(MatchResult::ChaosResolved))
    );

    tick_secs(&mut round, 45);
    assert!(round.is_finished());
    let summary = round.summary();
    assert_eq!(summary.customers_served, 1);
    assert_eq!(summary.customers_lost, 1);
    assert_eq!(summary.chaos, ChaosOutcome::Resolved);
    assert!(summary.tips_earned > 0);
    assert!(summary.coins_earned() > summary.tips_earned);
}

#[test]
fn ice_drink_spoils_next_to_a_fire_elemental() {
    let mut round = scripted_round();
    let ignis = round
        .spawn_customer(&"ignis".into(), &"moonlit_cold_brew".into())
        .unwrap()
        .unwrap();
    round.select(ignis).unwrap();
    for i in ["beans", "moonlight", "milk"] {
        round.add_ingredient(i.into()).unwrap();
    }
    // 6s of heat burns 12s of the 10s window
    tick_secs(&mut round, 6);
    assert_eq!(round.confirm(), MatchResult::WrongRecipe);
    assert_eq!(round.summary().customers_served, 0);

    for i in ["beans", "moonlight", "milk"] {
        round.add_ingredient(i.into()).unwrap();
    }
    tick_secs(&mut round, 2);
    assert_eq!(round.confirm(), MatchResult::ExactMatch);
}

#[test]
fn ghost_only_answers_the_bell() {
    let mut round = scripted_round();
    let ghost = round
        .spawn_customer(&"whim".into(), &"frozen_nebula".into())
        .unwrap()
        .unwrap();
    assert_eq!(
        round.apply_input(RoundInput::Select(ghost)),
        Err(GameError::NotSelectable(ghost))
    );
    round.apply_input(RoundInput::RingBell).unwrap();
    assert!(round.apply_input(RoundInput::Select(ghost)).is_ok());
}

#[test]
fn ringing_nonstop_does_not_keep_a_ghost_waiting() {
    let mut round = scripted_round();
    let ghost = round
        .spawn_customer(&"whim".into(), &"frozen_nebula".into())
        .unwrap()
        .unwrap();

    let mut ticks = 0;
    while !round.is_finished() {
        if ticks % 100 == 0 {
            round.apply_input(RoundInput::RingBell).unwrap();
        }
        round.tick();
        ticks += 1;
    }
    assert!(
        round
            .drain_events()
            .contains(&GameEvent::CustomerLeft { id: ghost })
    );
    assert_eq!(round.summary().customers_lost, 1);
}

#[test]
fn autopilot_plays_two_days() {
    let catalog = catalog();
    let mut game = Game::new(Arc::clone(&catalog), Settings::default());
    let mut pilot = Autopilot::new(Arc::clone(&catalog), 0.2, 2);
    let frame = Duration::from_nanos(16_666_667);

    let mut summaries = Vec::new();
    for _ in 0..60 * 60 * 10 {
        let snapshot = game.snapshot();
        if pilot.is_done(&snapshot) {
            break;
        }
        if let Some(input) = pilot.decide(&snapshot, 1.0 / 60.0) {
            game.push_input(input);
        }
        for event in game.frame(frame).events {
            if let GameEvent::RoundEnded(summary) = event {
                summaries.push(summary);
            }
        }
    }

    assert_eq!(game.progress().day, 2);
    assert_eq!(game.screen_id(), ScreenId::UpgradeShop);
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().any(|s| s.customers_served > 0));
    assert!(game.is_running());
}

#[test]
fn quit_only_from_the_menu() {
    let mut game = Game::new(catalog(), Settings::default());
    game.push_input(InputEvent::NavigateTo(ScreenId::Dialogue));
    game.step();
    assert_eq!(game.screen_id(), ScreenId::Dialogue);

    let out = {
        game.push_input(InputEvent::Quit);
        game.step()
    };
    assert_eq!(
        out.feedback,
        vec![GameError::InputIgnored {
            screen: ScreenId::Dialogue
        }]
    );

    while game.screen_id() == ScreenId::Dialogue {
        game.push_input(InputEvent::Confirm);
        game.step();
    }
    assert_eq!(game.screen_id(), ScreenId::MainMenu);
    game.push_input(InputEvent::Quit);
    game.step();
    assert!(!game.is_running());
}
