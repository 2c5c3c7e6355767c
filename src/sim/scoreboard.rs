/// Ranked high-score table, persisted as a flat text file.
///
/// ## File format:
///   One entry per line: `<name> <score>`. Names are single tokens (no
///   whitespace, no quoting). An empty name is written as ` <score>`.
///   Anything after the score token is ignored. Lines are decoded one at a
///   time, so a damaged line costs only that record.
///   Saving always rewrites the whole file.
///
/// ## Ordering:
///   Entries are kept score-descending. Sorting is stable, so equal scores
///   keep the order they already had: an entry that was on the board first
///   stays above a newcomer with the same score.
///
/// Construction does no I/O. Call `load()` explicitly and decide what to do
/// with its error.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum number of entries kept on the board.
pub const CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score file {} unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: malformed score record {content:?}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

#[derive(Clone, Debug)]
pub struct ScoreBoard {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    /// Empty board bound to `path`. Nothing is read yet.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        ScoreBoard {
            path: path.into(),
            entries: Vec::with_capacity(CAPACITY + 1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the in-memory list with the file's contents.
    ///
    /// If the file can't be read the list is left untouched. Malformed lines,
    /// including lines that are not valid UTF-8, are skipped and the first one is reported as `MalformedRecord`; the
    /// list still holds every well-formed record in that case, so a later
    /// `save()` does not drop them. Returns the number of entries kept.
    pub fn load(&mut self) -> Result<usize, ScoreError> {
        let bytes = fs::read(&self.path).map_err(|source| {
            ScoreError::Unavailable { path: self.path.clone(), source }
        })?;

        self.entries.clear();
        let mut first_bad = None;
        for (idx, raw) in bytes.split(|&b| b == b'\n').enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let parsed = std::str::from_utf8(raw).ok().map(|line| (line, parse_record(line)));
            match parsed {
                Some((line, _)) if line.trim().is_empty() => {}
                Some((_, Some(entry))) => self.entries.push(entry),
                _ if first_bad.is_none() => {
                    first_bad = Some((idx + 1, String::from_utf8_lossy(raw).into_owned()));
                }
                _ => {}
            }
        }
        self.rank();

        match first_bad {
            Some((line, content)) => Err(ScoreError::MalformedRecord {
                path: self.path.clone(),
                line,
                content,
            }),
            None => Ok(self.entries.len()),
        }
    }

    /// Overwrite the file with the current list, best first.
    pub fn save(&self) -> Result<(), ScoreError> {
        fs::write(&self.path, serialize(&self.entries)).map_err(|source| {
            ScoreError::Unavailable { path: self.path.clone(), source }
        })
    }

    /// Insert a result, re-rank, and evict from the bottom past capacity.
    pub fn add(&mut self, name: impl Into<String>, score: i32) {
        self.entries.push(ScoreEntry { name: name.into(), score });
        self.rank();
    }

    /// Header, then one `name: score` line per entry.
    pub fn display(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "High Scores:")?;
        for entry in &self.entries {
            writeln!(out, "{}: {}", entry.name, entry.score)?;
        }
        writeln!(out)
    }

    fn rank(&mut self) {
        // sort_by is stable
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(CAPACITY);
    }
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize(entries: &[ScoreEntry]) -> String {
    let mut out = String::with_capacity(entries.len() * 16);
    for entry in entries {
        out.push_str(&format!("{} {}\n", entry.name, entry.score));
    }
    out
}

/// Name token, then score token. Extra tokens are ignored.
/// A single leading space before the score is an empty name, as `serialize`
/// writes it.
fn parse_record(line: &str) -> Option<ScoreEntry> {
    if let Some(rest) = line.strip_prefix(' ') {
        if let Some(Ok(score)) = rest.split_whitespace().next().map(str::parse::<i32>) {
            if !rest.starts_with(char::is_whitespace) {
                return Some(ScoreEntry { name: String::new(), score });
            }
        }
    }
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let score = tokens.next()?.parse().ok()?;
    Some(ScoreEntry { name: name.to_string(), score })
}
