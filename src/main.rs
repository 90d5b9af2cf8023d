//! Bubble Pop entry point
//!
//! Runs one headless demo round with a synthetic popper standing in for
//! player taps, then prints the leaderboard. Pass a seed as the first
//! argument to reproduce a run exactly.

use std::path::{Path, PathBuf};

use bubble_pop::consts::*;
use bubble_pop::sim::{Rect, Round, RoundEvent, RoundPhase, advance};
use bubble_pop::{RoundSettings, ScoreBoard};

/// Ticks between synthetic pops while playing
const POP_INTERVAL_TICKS: u32 = 20;

fn main() {
    env_logger::init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(rand::random);
    log::info!("demo seed: {seed}");

    let settings_path = Path::new("settings.json");
    let mut settings = RoundSettings::load(settings_path);
    if !settings.is_valid() {
        settings = RoundSettings {
            player_name: "demo".into(),
            round_secs: 15,
            max_bubbles: 10,
        };
        settings.save(settings_path);
    }
    let board = ScoreBoard::load(PathBuf::from("highscores.json"));

    let mut round = Round::new(settings, Box::new(board), seed);
    round.update_bounds(Rect::new(0.0, 0.0, 390.0, 700.0));
    if !round.start() {
        log::error!("demo settings rejected");
        return;
    }

    let mut ticks = 0u32;
    let tick_budget = (COUNTDOWN_SECS + round.settings.round_secs + 2) * TICKS_PER_SECOND;
    while round.phase != RoundPhase::Finished && ticks < tick_budget {
        advance(&mut round, SIM_DT);
        ticks += 1;

        if round.phase == RoundPhase::Playing && ticks % POP_INTERVAL_TICKS == 0 {
            if let Some(id) = round.bubbles.iter().find(|b| b.is_active()).map(|b| b.id) {
                round.pop(id);
            }
        }

        for event in round.drain_events() {
            match event {
                RoundEvent::Countdown(n) if n > 0 => println!("starting in {n}..."),
                RoundEvent::Popped {
                    tier,
                    awarded,
                    combo,
                    ..
                } => {
                    println!("popped {tier:?} for {awarded} (combo x{combo})");
                }
                RoundEvent::SecondElapsed { .. } => {
                    println!(
                        "{}  score {}  bubbles {}",
                        round.formatted_time(),
                        round.score,
                        round.bubbles.len()
                    );
                }
                RoundEvent::Finished { score } => println!("time! final score {score}"),
                _ => {}
            }
        }
    }

    println!("\nbest: {}", round.highest_score);
    for (rank, record) in round.scores().all().iter().enumerate() {
        println!("{:>2}. {:<12} {}", rank + 1, record.player_name, record.score);
    }
}
