/// Entry point: configuration, logging, score board, then the session loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::io;

use tracing::{error, info, warn};

use config::GameConfig;
use sim::playfield::Playfield;
use sim::scoreboard::{ScoreBoard, ScoreError};
use sim::session::Orchestrator;
use ui::input::{InputRouter, TerminalEvents};
use ui::menu::SessionMenu;
use ui::renderer::TerminalRenderer;

fn main() {
    let (config, warnings) = GameConfig::load();

    // stdout belongs to the menu; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(config.log_level)
        .with_target(false)
        .without_time()
        .init();
    for w in &warnings {
        warn!("{w}");
    }

    let mut board = ScoreBoard::create(config.scores_file.clone());
    match board.load() {
        Ok(n) => info!(entries = n, path = %board.path().display(), "scores loaded"),
        Err(e @ ScoreError::Unavailable { .. }) => warn!(error = %e, "starting with an empty score board"),
        Err(e) => error!(error = %e, entries = board.len(), "skipped malformed score records"),
    }

    let display = &config.display;
    let renderer = TerminalRenderer::new(
        display.screen_width, display.screen_height,
        display.grid_width, display.grid_height,
    );
    let game = Playfield::new(&config.display, &config.snake);
    let router = InputRouter::new(TerminalEvents::new());
    let menu = SessionMenu::new(io::stdin().lock(), io::stdout());

    let mut session = Orchestrator::new(game, router, renderer, menu, board, config.frame.budget());

    if let Err(e) = session.run() {
        error!(error = %e, "console error");
    }

    println!("Session closed. Thanks for playing!");
}
