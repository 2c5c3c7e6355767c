/// Line-oriented console menu.
///
/// Blocking reads, one line at a time. Generic over its input and output so
/// the binary can hand it stdin/stdout and tests can hand it buffers.

use std::io::{self, BufRead, Write};

use crate::sim::scoreboard::ScoreBoard;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuOption {
    Play,
    ShowRankings,
    Quit,
}

impl MenuOption {
    /// 1 → Play, 2 → ShowRankings, 3 → Quit.
    pub fn from_choice(choice: i64) -> Option<MenuOption> {
        match choice {
            1 => Some(MenuOption::Play),
            2 => Some(MenuOption::ShowRankings),
            3 => Some(MenuOption::Quit),
            _ => None,
        }
    }
}

pub struct SessionMenu<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> SessionMenu<I, O> {
    pub fn new(input: I, output: O) -> Self {
        SessionMenu { input, output }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Print the menu and read one choice. Anything that is not 1-3,
    /// end of input included, quits after a notice.
    pub fn show_menu(&mut self) -> io::Result<MenuOption> {
        writeln!(self.output, "Welcome to Snake!")?;
        writeln!(self.output, "1. Play")?;
        writeln!(self.output, "2. Rankings")?;
        writeln!(self.output, "3. Quit")?;
        write!(self.output, "Enter your choice (1-3): ")?;
        self.output.flush()?;

        let option = self
            .read_line()?
            .as_deref()
            .and_then(leading_integer)
            .and_then(MenuOption::from_choice);

        match option {
            Some(option) => Ok(option),
            None => {
                writeln!(self.output, "Invalid choice. Exiting.")?;
                Ok(MenuOption::Quit)
            }
        }
    }

    /// One full line, verbatim apart from its terminator. May be empty.
    pub fn player_name(&mut self) -> io::Result<String> {
        write!(self.output, "Enter your name: ")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    pub fn show_high_scores(&mut self, board: &ScoreBoard) -> io::Result<()> {
        writeln!(self.output, "== Rankings ==")?;
        board.display(&mut self.output)?;
        self.output.flush()
    }

    /// Key help for the rankings view.
    pub fn rankings_hint(&mut self) -> io::Result<()> {
        writeln!(self.output, "[1] back  [2] show again  [3] back")?;
        self.output.flush()
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Leading integer of a line: whitespace skipped, optional sign, digits.
/// Whatever follows the digits is ignored.
fn leading_integer(line: &str) -> Option<i64> {
    let s = line.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
