/// Session lifecycle: explicit states, a pure transition function, and the
/// orchestrator that drives them.
///
/// ```text
///   Prompt ──Play──────────▶ Playing ──finished──▶ Recording ──recorded──┐
///     │ ▲                       │ aborted                                │
///     │ └───────────────────────┴────────────────────────────────────────┘
///     ├──ShowRankings──▶ ShowingRankings ──shown──▶ Prompt
///     └──Quit──────────▶ Exited
/// ```

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::{error, info};

use crate::sim::playfield::Game;
use crate::sim::scoreboard::ScoreBoard;
use crate::ui::input::{EventSource, InputRouter, MenuActions};
use crate::ui::menu::{MenuOption, SessionMenu};
use crate::ui::renderer::Renderer;

// ══════════════════════════════════════════════════════════════
// Loop control
// ══════════════════════════════════════════════════════════════

/// What one routed input batch asks of the enclosing loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    Continue,
    Terminate,
}

/// Run state of an inner loop (a play session, the rankings view).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoopState {
    Running,
    Stopped,
}

impl LoopState {
    /// Stopped is absorbing.
    pub fn step(self, signal: Signal) -> LoopState {
        match (self, signal) {
            (LoopState::Running, Signal::Continue) => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }

    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

// ══════════════════════════════════════════════════════════════
// Session state machine
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Prompt,
    Playing,
    ShowingRankings,
    Recording { score: i32 },
    Exited,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionEvent {
    Chose(MenuOption),
    PlayFinished { score: i32 },
    /// The play session failed before producing a result.
    PlayAborted,
    Recorded,
    RankingsShown,
}

/// Pairs not listed leave the state unchanged.
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Exited, _) => S::Exited,
        (S::Prompt, E::Chose(MenuOption::Play)) => S::Playing,
        (S::Prompt, E::Chose(MenuOption::ShowRankings)) => S::ShowingRankings,
        (S::Prompt, E::Chose(MenuOption::Quit)) => S::Exited,
        (S::Playing, E::PlayFinished { score }) => S::Recording { score },
        (S::Playing, E::PlayAborted) => S::Prompt,
        (S::Recording { .. }, E::Recorded) => S::Prompt,
        (S::ShowingRankings, E::RankingsShown) => S::Prompt,
        (s, _) => s,
    }
}

// ══════════════════════════════════════════════════════════════
// Orchestrator
// ══════════════════════════════════════════════════════════════

pub struct Orchestrator<G, S, R, I, O> {
    pub game: G,
    pub router: InputRouter<S>,
    pub renderer: R,
    pub menu: SessionMenu<I, O>,
    pub board: ScoreBoard,
    pub frame_budget: Duration,
    /// After printing the rankings, wait for `1`/`3` (back) or `2` (again)
    /// on the key source instead of returning straight to the prompt.
    /// Off by default. The key source must be readable without Enter, so
    /// only turn this on when something else owns the console lines.
    pub rankings_keys: bool,
    state: SessionState,
}

impl<G, S, R, I, O> Orchestrator<G, S, R, I, O>
where
    G: Game,
    S: EventSource,
    R: Renderer,
    I: BufRead,
    O: Write,
{
    pub fn new(
        game: G,
        router: InputRouter<S>,
        renderer: R,
        menu: SessionMenu<I, O>,
        board: ScoreBoard,
        frame_budget: Duration,
    ) -> Self {
        Orchestrator {
            game,
            router,
            renderer,
            menu,
            board,
            frame_budget,
            rankings_keys: false,
            state: SessionState::Prompt,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the menu loop until the user quits.
    /// Only console I/O failures end it early.
    pub fn run(&mut self) -> io::Result<()> {
        while self.state != SessionState::Exited {
            let event = self.step()?;
            self.state = transition(self.state, event);
        }
        info!("session loop exited");
        Ok(())
    }

    fn step(&mut self) -> io::Result<SessionEvent> {
        match self.state {
            SessionState::Prompt => Ok(SessionEvent::Chose(self.menu.show_menu()?)),
            SessionState::Playing => Ok(self.play()),
            SessionState::Recording { score } => {
                self.record(score)?;
                Ok(SessionEvent::Recorded)
            }
            SessionState::ShowingRankings => {
                self.menu.show_high_scores(&self.board)?;
                if self.rankings_keys {
                    self.rankings_view()?;
                }
                Ok(SessionEvent::RankingsShown)
            }
            // run() never steps an exited session
            SessionState::Exited => Ok(SessionEvent::Chose(MenuOption::Quit)),
        }
    }

    fn play(&mut self) -> SessionEvent {
        info!(frame_budget_ms = self.frame_budget.as_millis() as u64, "play session starting");
        match self.game.run(&mut self.router, &mut self.renderer, self.frame_budget) {
            Ok(()) => {
                let score = self.game.score();
                info!(score, "play session finished");
                SessionEvent::PlayFinished { score }
            }
            Err(e) => {
                error!(error = %e, "play session aborted");
                SessionEvent::PlayAborted
            }
        }
    }

    fn record(&mut self, score: i32) -> io::Result<()> {
        let name = self.menu.player_name()?;
        self.board.add(name, score);
        if let Err(e) = self.board.save() {
            error!(error = %e, "score not saved");
        }
        Ok(())
    }

    fn rankings_view(&mut self) -> io::Result<()> {
        self.menu.rankings_hint()?;
        self.router.discard_pending();

        let mut actions = RankingsActions { menu: &mut self.menu, board: &self.board };
        let mut view = LoopState::Running;
        while view.is_running() {
            view = view.step(self.router.route_menu(&mut actions)?);
            if view.is_running() {
                std::thread::sleep(self.frame_budget);
            }
        }
        Ok(())
    }
}

struct RankingsActions<'a, I, O> {
    menu: &'a mut SessionMenu<I, O>,
    board: &'a ScoreBoard,
}

impl<I: BufRead, O: Write> MenuActions for RankingsActions<'_, I, O> {
    fn show_rankings(&mut self) -> io::Result<()> {
        self.menu.show_high_scores(self.board)
    }
}
