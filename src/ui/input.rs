/// Input routing.
///
/// Each call drains every terminal event queued since the previous call
/// (non-blocking) and routes the batch. Nothing carries over to the next call.
///
///   - Play context: arrow keys become turn requests on the movement entity.
///     The entity decides whether a turn is legal when it applies them.
///   - Rankings context: `1` / `3` leave, `2` shows the rankings again.
///
/// Ctrl+C and Esc are the quit signal in both contexts. Once a batch has
/// produced a quit, the rest of that batch is consumed but ignored.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};
use tracing::warn;

use crate::domain::direction::Direction;
use crate::domain::entity::Steerable;
use crate::sim::session::Signal;

/// The fixed event vocabulary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Quit,
    Direction(Direction),
    /// Menu-choice key `1`, `2` or `3`.
    MenuKey(u8),
    Other,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    Terminate,
    ShowRankings,
}

/// Something that can hand over the events queued so far.
pub trait EventSource {
    fn drain(&mut self) -> Vec<InputEvent>;
}

/// Side of the rankings context that input can trigger.
pub trait MenuActions {
    fn show_rankings(&mut self) -> io::Result<()>;
}

// ── Terminal source ──

/// Reads crossterm events from the controlling terminal.
/// A terminal that can't be polled or read reports the quit signal.
pub struct TerminalEvents {
    batch: Vec<InputEvent>,
}

impl TerminalEvents {
    pub fn new() -> Self {
        TerminalEvents { batch: Vec::with_capacity(8) }
    }
}

impl EventSource for TerminalEvents {
    fn drain(&mut self) -> Vec<InputEvent> {
        self.batch.clear();
        loop {
            match poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(ev) => self.batch.push(classify(&ev)),
                    Err(e) => {
                        warn!(error = %e, "terminal event read failed");
                        self.batch.push(InputEvent::Quit);
                        break;
                    }
                },
                Ok(false) => break,
                Err(e) => {
                    warn!(error = %e, "terminal event poll failed");
                    self.batch.push(InputEvent::Quit);
                    break;
                }
            }
        }
        std::mem::take(&mut self.batch)
    }
}

/// Map a raw terminal event onto the fixed vocabulary.
pub fn classify(ev: &Event) -> InputEvent {
    match ev {
        Event::Key(key) => classify_key(key),
        _ => InputEvent::Other,
    }
}

fn classify_key(key: &KeyEvent) -> InputEvent {
    if key.kind == KeyEventKind::Release {
        return InputEvent::Other;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return InputEvent::Quit;
    }
    match key.code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Up => InputEvent::Direction(Direction::Up),
        KeyCode::Down => InputEvent::Direction(Direction::Down),
        KeyCode::Left => InputEvent::Direction(Direction::Left),
        KeyCode::Right => InputEvent::Direction(Direction::Right),
        KeyCode::Char(c @ '1'..='3') => InputEvent::MenuKey(c as u8 - b'0'),
        _ => InputEvent::Other,
    }
}

/// Rankings-context key map.
///
/// `1` and `3` both terminate. This duplicates the top-level menu numbering
/// without a "resume" path and is kept as-is.
pub fn menu_action(ev: InputEvent) -> Option<MenuAction> {
    match ev {
        InputEvent::Quit => Some(MenuAction::Terminate),
        InputEvent::MenuKey(1) => Some(MenuAction::Terminate),
        InputEvent::MenuKey(2) => Some(MenuAction::ShowRankings),
        InputEvent::MenuKey(3) => Some(MenuAction::Terminate),
        _ => None,
    }
}

// ── Routing over an explicit batch ──

/// Play context. Directional events become turn requests.
pub fn route_directional_events<I>(events: I, entity: &mut impl Steerable) -> Signal
where
    I: IntoIterator<Item = InputEvent>,
{
    let mut signal = Signal::Continue;
    for ev in events {
        if signal == Signal::Terminate {
            continue;
        }
        match ev {
            InputEvent::Quit => signal = Signal::Terminate,
            InputEvent::Direction(d) => entity.request_direction(d),
            _ => {}
        }
    }
    signal
}

/// Rankings context.
pub fn route_menu_events<I>(events: I, actions: &mut impl MenuActions) -> io::Result<Signal>
where
    I: IntoIterator<Item = InputEvent>,
{
    let mut signal = Signal::Continue;
    for ev in events {
        if signal == Signal::Terminate {
            continue;
        }
        match menu_action(ev) {
            Some(MenuAction::Terminate) => signal = Signal::Terminate,
            Some(MenuAction::ShowRankings) => actions.show_rankings()?,
            None => {}
        }
    }
    Ok(signal)
}

// ── Router ──

pub struct InputRouter<S> {
    source: S,
}

impl<S: EventSource> InputRouter<S> {
    pub fn new(source: S) -> Self {
        InputRouter { source }
    }

    /// Call once per frame, before the entity's update.
    pub fn route_directional(&mut self, entity: &mut impl Steerable) -> Signal {
        route_directional_events(self.source.drain(), entity)
    }

    pub fn route_menu(&mut self, actions: &mut impl MenuActions) -> io::Result<Signal> {
        route_menu_events(self.source.drain(), actions)
    }

    /// Throw away anything queued, e.g. keys typed before a context starts.
    pub fn discard_pending(&mut self) {
        self.source.drain();
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use super::{EventSource, InputEvent};

    /// Hands out one prepared batch per drain, then empty batches.
    pub struct ScriptedEvents {
        batches: VecDeque<Vec<InputEvent>>,
        pub drains: usize,
    }

    impl ScriptedEvents {
        pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
            ScriptedEvents { batches: batches.into(), drains: 0 }
        }
    }

    impl EventSource for ScriptedEvents {
        fn drain(&mut self) -> Vec<InputEvent> {
            self.drains += 1;
            self.batches.pop_front().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedEvents;
    use super::*;
    use crate::domain::entity::Snake;

    struct CountingActions {
        shown: usize,
    }

    impl MenuActions for CountingActions {
        fn show_rankings(&mut self) -> io::Result<()> {
            self.shown += 1;
            Ok(())
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    // ── classify ──

    #[test]
    fn arrow_keys_map_to_directions() {
        assert_eq!(classify(&key(KeyCode::Up)), InputEvent::Direction(Direction::Up));
        assert_eq!(classify(&key(KeyCode::Down)), InputEvent::Direction(Direction::Down));
        assert_eq!(classify(&key(KeyCode::Left)), InputEvent::Direction(Direction::Left));
        assert_eq!(classify(&key(KeyCode::Right)), InputEvent::Direction(Direction::Right));
    }

    #[test]
    fn quit_signals() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(classify(&ctrl_c), InputEvent::Quit);
        assert_eq!(classify(&key(KeyCode::Esc)), InputEvent::Quit);
        assert_eq!(classify(&key(KeyCode::Char('c'))), InputEvent::Other);
    }

    #[test]
    fn digit_keys_map_to_menu_keys() {
        assert_eq!(classify(&key(KeyCode::Char('1'))), InputEvent::MenuKey(1));
        assert_eq!(classify(&key(KeyCode::Char('3'))), InputEvent::MenuKey(3));
        assert_eq!(classify(&key(KeyCode::Char('4'))), InputEvent::Other);
    }

    #[test]
    fn releases_and_non_keys_are_other() {
        let mut release = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(classify(&Event::Key(release)), InputEvent::Other);
        assert_eq!(classify(&Event::Resize(80, 24)), InputEvent::Other);
        assert_eq!(classify(&Event::FocusLost), InputEvent::Other);
    }

    // ── play context ──

    #[test]
    fn directional_events_become_requests() {
        let mut snake = Snake::new((5, 5), Direction::Right, 3);
        let signal = route_directional_events(
            [InputEvent::Other, InputEvent::Direction(Direction::Up)],
            &mut snake,
        );
        assert_eq!(signal, Signal::Continue);
        assert_eq!(snake.pending_requests(), 1);
        assert_eq!(snake.direction(), Direction::Right);
        snake.apply_requests();
        assert_eq!(snake.direction(), Direction::Up);
    }

    #[test]
    fn quit_terminates_and_drops_rest_of_batch() {
        let mut snake = Snake::new((5, 5), Direction::Right, 3);
        let signal = route_directional_events(
            [
                InputEvent::Direction(Direction::Up),
                InputEvent::Quit,
                InputEvent::Direction(Direction::Down),
            ],
            &mut snake,
        );
        assert_eq!(signal, Signal::Terminate);
        assert_eq!(snake.pending_requests(), 1);
    }

    #[test]
    fn menu_keys_ignored_while_playing() {
        let mut snake = Snake::new((5, 5), Direction::Right, 3);
        let signal = route_directional_events([InputEvent::MenuKey(3)], &mut snake);
        assert_eq!(signal, Signal::Continue);
        assert_eq!(snake.pending_requests(), 0);
    }

    #[test]
    fn router_drains_once_per_call() {
        let source = ScriptedEvents::new(vec![
            vec![InputEvent::Direction(Direction::Down)],
            vec![],
        ]);
        let mut router = InputRouter::new(source);
        let mut snake = Snake::new((5, 5), Direction::Right, 3);
        router.route_directional(&mut snake);
        router.route_directional(&mut snake);
        assert_eq!(router.source.drains, 2);
        assert_eq!(snake.pending_requests(), 1);
    }

    // ── rankings context ──

    #[test]
    fn rankings_key_map() {
        assert_eq!(menu_action(InputEvent::MenuKey(1)), Some(MenuAction::Terminate));
        assert_eq!(menu_action(InputEvent::MenuKey(2)), Some(MenuAction::ShowRankings));
        assert_eq!(menu_action(InputEvent::MenuKey(3)), Some(MenuAction::Terminate));
        assert_eq!(menu_action(InputEvent::Quit), Some(MenuAction::Terminate));
        assert_eq!(menu_action(InputEvent::Direction(Direction::Up)), None);
    }

    #[test]
    fn show_rankings_runs_until_terminate() {
        let mut actions = CountingActions { shown: 0 };
        let signal = route_menu_events(
            [InputEvent::MenuKey(2), InputEvent::MenuKey(2)],
            &mut actions,
        ).unwrap();
        assert_eq!(signal, Signal::Continue);
        assert_eq!(actions.shown, 2);

        let signal = route_menu_events(
            [InputEvent::MenuKey(3), InputEvent::MenuKey(2)],
            &mut actions,
        ).unwrap();
        assert_eq!(signal, Signal::Terminate);
        assert_eq!(actions.shown, 2);
    }
}
