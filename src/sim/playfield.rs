/// Play session: the `Game` seam the orchestrator runs, and the stand-in
/// playfield that fills it.
///
/// The stand-in keeps the rules deliberately thin:
///   - the body has a fixed length and moves one cell every
///     `frames_per_move` frames
///   - leaving the grid ends the session
///   - the score is the number of cells travelled
///
/// ## Frame order
///   1. route input (exactly once per frame)
///   2. apply queued turns, advance
///   3. render, sleep out the rest of the frame budget

use std::io;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{DisplayConfig, SnakeConfig};
use crate::domain::direction::Direction;
use crate::domain::entity::{Cell, Snake, Steerable};
use crate::sim::session::LoopState;
use crate::ui::input::{EventSource, InputRouter};
use crate::ui::renderer::Renderer;

/// A complete play session, run synchronously.
pub trait Game {
    fn run<S: EventSource, R: Renderer>(
        &mut self,
        router: &mut InputRouter<S>,
        renderer: &mut R,
        frame_budget: Duration,
    ) -> io::Result<()>;

    /// Score of the session that just finished.
    fn score(&self) -> i32;
}

/// What the renderer gets each frame.
#[derive(Clone, Debug)]
pub struct FrameView {
    pub grid_width: u16,
    pub grid_height: u16,
    pub body: Vec<Cell>,  // head first
    pub heading: Direction,
    pub score: i32,
    pub over: bool,
}

pub struct Playfield {
    grid_width: u16,
    grid_height: u16,
    length: usize,
    frames_per_move: u32,
    snake: Snake,
    frame: u32,
    score: i32,
    alive: bool,
}

impl Playfield {
    pub fn new(display: &DisplayConfig, snake: &SnakeConfig) -> Self {
        let mut pf = Playfield {
            grid_width: display.grid_width,
            grid_height: display.grid_height,
            length: snake.length,
            frames_per_move: snake.frames_per_move.max(1),
            snake: Snake::new((0, 0), Direction::Right, 1),
            frame: 0,
            score: 0,
            alive: true,
        };
        pf.reset();
        pf
    }

    /// Fresh body in the middle of the grid, heading right.
    pub fn reset(&mut self) {
        let head = (i32::from(self.grid_width) / 2, i32::from(self.grid_height) / 2);
        self.snake = Snake::new(head, Direction::Right, self.length);
        self.frame = 0;
        self.score = 0;
        self.alive = true;
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// One frame of simulation. Input for this frame must already be routed.
    pub fn update(&mut self) {
        if !self.alive {
            return;
        }
        self.frame += 1;
        if self.frame < self.frames_per_move {
            return;
        }
        self.frame = 0;

        self.snake.apply_requests();
        self.snake.advance();
        if self.in_bounds(self.snake.head()) {
            self.score += 1;
        } else {
            debug!(head = ?self.snake.head(), "left the grid");
            self.alive = false;
        }
    }

    pub fn view(&self) -> FrameView {
        FrameView {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            body: self.snake.body().collect(),
            heading: self.snake.direction(),
            score: self.score,
            over: !self.alive,
        }
    }

    fn in_bounds(&self, (x, y): Cell) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.grid_width) && y < i32::from(self.grid_height)
    }

    fn play_frames<S: EventSource, R: Renderer>(
        &mut self,
        router: &mut InputRouter<S>,
        renderer: &mut R,
        frame_budget: Duration,
    ) -> io::Result<()> {
        let mut state = LoopState::Running;
        while state.is_running() {
            let frame_start = Instant::now();

            state = state.step(router.route_directional(&mut self.snake));
            if !state.is_running() {
                break;
            }

            self.update();
            renderer.render(&self.view())?;
            if !self.alive {
                break;
            }

            if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(())
    }
}

impl Game for Playfield {
    fn run<S: EventSource, R: Renderer>(
        &mut self,
        router: &mut InputRouter<S>,
        renderer: &mut R,
        frame_budget: Duration,
    ) -> io::Result<()> {
        self.reset();
        renderer.begin()?;
        router.discard_pending();
        let result = self.play_frames(router, renderer, frame_budget);
        // restore the terminal even if a frame failed
        let ended = renderer.end();
        result.and(ended)
    }

    fn score(&self) -> i32 {
        self.score
    }
}
