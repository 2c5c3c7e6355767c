/// Movement entity: the snake body and its queue of requested turns.
///
/// Input routing never writes the heading directly. It calls
/// `request_direction`, and the entity applies the queued requests itself at
/// the start of its own update, so the heading has exactly one writer.

use std::collections::VecDeque;

use crate::domain::direction::Direction;

/// Seam between input routing and whatever owns a heading.
pub trait Steerable {
    /// Queue a turn. Applied (or rejected) at the entity's next update.
    fn request_direction(&mut self, direction: Direction);
    fn direction(&self) -> Direction;
    fn body_len(&self) -> usize;
}

/// Grid cell, may lie outside the playfield after a move.
pub type Cell = (i32, i32);

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,  // head first
    direction: Direction,
    requested: VecDeque<Direction>,
}

impl Snake {
    /// Body of `len` cells laid out behind `head`, opposite to `direction`.
    pub fn new(head: Cell, direction: Direction, len: usize) -> Self {
        let len = len.max(1);
        let (dx, dy) = direction.delta();
        let body = (0..len as i32)
            .map(|i| (head.0 - dx * i, head.1 - dy * i))
            .collect();
        Snake {
            body,
            direction,
            requested: VecDeque::with_capacity(4),
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn pending_requests(&self) -> usize {
        self.requested.len()
    }

    /// Apply every queued turn in arrival order, each one checked against the
    /// heading left by the previous.
    pub fn apply_requests(&mut self) {
        let len = self.body.len();
        while let Some(requested) = self.requested.pop_front() {
            self.direction = self.direction.turn(requested, len);
        }
    }

    /// Move one cell along the heading. Length is constant.
    pub fn advance(&mut self) {
        let (dx, dy) = self.direction.delta();
        let (hx, hy) = self.head();
        self.body.push_front((hx + dx, hy + dy));
        self.body.pop_back();
    }
}

impl Steerable for Snake {
    fn request_direction(&mut self, direction: Direction) {
        self.requested.push_back(direction);
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn body_len(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_trails_behind_head() {
        let s = Snake::new((5, 5), Direction::Right, 3);
        let cells: Vec<Cell> = s.body().collect();
        assert_eq!(cells, vec![(5, 5), (4, 5), (3, 5)]);
        assert_eq!(s.body_len(), 3);
    }

    #[test]
    fn zero_length_is_clamped_to_one() {
        let s = Snake::new((0, 0), Direction::Up, 0);
        assert_eq!(s.body_len(), 1);
    }

    #[test]
    fn request_is_deferred_until_applied() {
        let mut s = Snake::new((5, 5), Direction::Right, 3);
        s.request_direction(Direction::Up);
        assert_eq!(s.direction(), Direction::Right);
        assert_eq!(s.pending_requests(), 1);

        s.apply_requests();
        assert_eq!(s.direction(), Direction::Up);
        assert_eq!(s.pending_requests(), 0);
    }

    #[test]
    fn reversal_rejected_for_long_body() {
        let mut s = Snake::new((5, 5), Direction::Right, 2);
        s.request_direction(Direction::Left);
        s.apply_requests();
        assert_eq!(s.direction(), Direction::Right);
    }

    #[test]
    fn reversal_allowed_for_single_segment() {
        let mut s = Snake::new((5, 5), Direction::Right, 1);
        s.request_direction(Direction::Left);
        s.apply_requests();
        assert_eq!(s.direction(), Direction::Left);
    }

    #[test]
    fn queued_requests_chain_in_order() {
        // Up is legal from Right, and Left is legal from Up.
        let mut s = Snake::new((5, 5), Direction::Right, 4);
        s.request_direction(Direction::Up);
        s.request_direction(Direction::Left);
        s.apply_requests();
        assert_eq!(s.direction(), Direction::Left);
    }

    #[test]
    fn advance_keeps_length() {
        let mut s = Snake::new((5, 5), Direction::Right, 3);
        s.advance();
        assert_eq!(s.head(), (6, 5));
        assert_eq!(s.body_len(), 3);
        assert_eq!(s.body().last(), Some((4, 5)));
    }
}
