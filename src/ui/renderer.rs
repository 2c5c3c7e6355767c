/// Presentation layer for the play session.
///
/// `TerminalRenderer` draws into the alternate screen. Every frame is queued
/// with `queue!` and flushed once. A logical grid cell covers
/// `screen / grid` terminal cells in each axis (at least one).

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::direction::Direction;
use crate::sim::playfield::FrameView;

pub trait Renderer {
    /// Take over the display for a play session.
    fn begin(&mut self) -> io::Result<()>;
    fn render(&mut self, frame: &FrameView) -> io::Result<()>;
    /// Hand the display back. Called on every exit path of a session.
    fn end(&mut self) -> io::Result<()>;
}

pub struct TerminalRenderer {
    out: BufWriter<Stdout>,
    cell_w: u16,
    cell_h: u16,
    active: bool,
}

impl TerminalRenderer {
    pub fn new(screen_width: u16, screen_height: u16, grid_width: u16, grid_height: u16) -> Self {
        let (cell_w, cell_h) = cell_size(screen_width, screen_height, grid_width, grid_height);
        TerminalRenderer {
            out: BufWriter::with_capacity(16 * 1024, io::stdout()),
            cell_w,
            cell_h,
            active: false,
        }
    }
}

/// Terminal cells per logical grid cell.
pub fn cell_size(screen_width: u16, screen_height: u16, grid_width: u16, grid_height: u16) -> (u16, u16) {
    (
        (screen_width / grid_width.max(1)).max(1),
        (screen_height / grid_height.max(1)).max(1),
    )
}

/// Terminal extent of the grid interior. Every position derived from it
/// saturates, so an oversized screen clips at the last row/column.
fn grid_extent(grid_width: u16, grid_height: u16, cell_w: u16, cell_h: u16) -> (u16, u16) {
    (grid_width.saturating_mul(cell_w), grid_height.saturating_mul(cell_h))
}

/// Top-left terminal position of logical cell `(x, y)`, inside the border.
fn cell_origin(x: u16, y: u16, cell_w: u16, cell_h: u16) -> (u16, u16) {
    (
        x.saturating_mul(cell_w).saturating_add(1),
        y.saturating_mul(cell_h).saturating_add(1),
    )
}

fn head_glyph(heading: Direction) -> &'static str {
    match heading {
        Direction::Up => "^",
        Direction::Down => "v",
        Direction::Left => "<",
        Direction::Right => ">",
    }
}

impl Renderer for TerminalRenderer {
    fn begin(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        self.active = true;
        Ok(())
    }

    fn render(&mut self, frame: &FrameView) -> io::Result<()> {
        let (cw, ch) = (self.cell_w, self.cell_h);
        let (inner_w, inner_h) = grid_extent(frame.grid_width, frame.grid_height, cw, ch);

        queue!(self.out, Clear(ClearType::All), SetForegroundColor(Color::DarkGrey))?;

        // Border, one terminal cell thick, around the grid
        let horizontal = "-".repeat(usize::from(inner_w) + 2);
        queue!(self.out, MoveTo(0, 0), Print(&horizontal))?;
        queue!(self.out, MoveTo(0, inner_h.saturating_add(1)), Print(&horizontal))?;
        for row in 1..=inner_h {
            queue!(self.out, MoveTo(0, row), Print("|"), MoveTo(inner_w.saturating_add(1), row), Print("|"))?;
        }

        let body_color = if frame.over { Color::Red } else { Color::Green };
        for (i, &(x, y)) in frame.body.iter().enumerate() {
            if x < 0 || y < 0 || x >= i32::from(frame.grid_width) || y >= i32::from(frame.grid_height) {
                continue;
            }
            let glyph = if i == 0 { head_glyph(frame.heading) } else { "o" };
            let fg = if i == 0 { Color::Yellow } else { body_color };
            queue!(self.out, SetForegroundColor(fg))?;
            let (sx, sy) = cell_origin(x as u16, y as u16, cw, ch);
            for dy in 0..ch {
                queue!(self.out, MoveTo(sx, sy.saturating_add(dy)), Print(glyph.repeat(usize::from(cw))))?;
            }
        }

        let status = if frame.over {
            format!("Score: {}  GAME OVER", frame.score)
        } else {
            format!("Score: {}  [arrows] steer  [Esc] quit", frame.score)
        };
        queue!(self.out, ResetColor, MoveTo(0, inner_h.saturating_add(2)), Print(status))?;
        self.out.flush()
    }

    fn end(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_scale_with_screen() {
        assert_eq!(cell_size(64, 24, 32, 24), (2, 1));
        assert_eq!(cell_size(96, 48, 32, 24), (3, 2));
    }

    #[test]
    fn positions_inside_border() {
        assert_eq!(grid_extent(32, 24, 2, 1), (64, 24));
        assert_eq!(cell_origin(0, 0, 2, 1), (1, 1));
        assert_eq!(cell_origin(31, 23, 2, 1), (63, 24));
    }

    #[test]
    fn huge_screen_saturates_instead_of_overflowing() {
        let (cw, ch) = cell_size(u16::MAX, u16::MAX, 2, 2);
        assert_eq!((cw, ch), (u16::MAX / 2, u16::MAX / 2));
        let (w, h) = grid_extent(2, 2, cw, ch);
        assert_eq!((w, h), (u16::MAX - 1, u16::MAX - 1));
        assert_eq!(w.saturating_add(2), u16::MAX);
        assert_eq!(grid_extent(3, 3, cw, ch), (u16::MAX, u16::MAX));
        assert_eq!(cell_origin(2, 2, cw, ch), (u16::MAX, u16::MAX));
        assert_eq!(cell_origin(1, 1, cw, ch), (u16::MAX / 2 + 1, u16::MAX / 2 + 1));
    }

    #[test]
    fn small_screen_still_gets_one_cell() {
        assert_eq!(cell_size(10, 10, 32, 24), (1, 1));
        assert_eq!(cell_size(10, 10, 0, 0), (10, 10));
    }
}
