/// Four-way heading and the reversal-prevention rule.
///
/// A body longer than one segment may never be turned straight back into
/// itself. A single-segment body turns freely.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Heading after a turn to `requested` is asked for.
    /// Keeps `self` when the request would reverse a multi-segment body.
    pub fn turn(self, requested: Direction, body_len: usize) -> Direction {
        if requested != self.opposite() || body_len == 1 {
            requested
        } else {
            self
        }
    }

    /// Grid delta (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for d in Direction::ALL {
            assert_ne!(d.opposite(), d);
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }

    #[test]
    fn long_body_changes_iff_not_reversing() {
        for current in Direction::ALL {
            for requested in Direction::ALL {
                for len in [2, 3, 10] {
                    let next = current.turn(requested, len);
                    if requested == current.opposite() {
                        assert_eq!(next, current, "{current:?} -> {requested:?} len {len}");
                    } else {
                        assert_eq!(next, requested, "{current:?} -> {requested:?} len {len}");
                    }
                }
            }
        }
    }

    #[test]
    fn single_segment_always_turns() {
        for current in Direction::ALL {
            for requested in Direction::ALL {
                assert_eq!(current.turn(requested, 1), requested);
            }
        }
    }

    #[test]
    fn deltas_are_unit_steps() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
            let (ox, oy) = d.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }
}
