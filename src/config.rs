/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the built-in defaults if the file is missing or incomplete.
/// Without a config file the program behaves exactly like the fixed-constant
/// build: 60 fps, 32x24 grid, `highscores.txt` in the working directory.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub frame: FrameConfig,
    pub display: DisplayConfig,
    pub snake: SnakeConfig,
    pub scores_file: PathBuf,
    pub log_level: tracing::Level,
}

#[derive(Clone, Debug)]
pub struct FrameConfig {
    pub fps: u32,
}

impl FrameConfig {
    /// Fixed time slice for one iteration of the play loop.
    pub fn budget(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub screen_width: u16,   // terminal columns
    pub screen_height: u16,  // terminal rows
    pub grid_width: u16,     // logical cells
    pub grid_height: u16,
}

#[derive(Clone, Debug)]
pub struct SnakeConfig {
    pub length: usize,
    pub frames_per_move: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    frame: TomlFrame,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    snake: TomlSnake,
    #[serde(default)]
    scores: TomlScores,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlFrame {
    #[serde(default = "default_fps")]
    fps: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_screen_width")]
    screen_width: u16,
    #[serde(default = "default_screen_height")]
    screen_height: u16,
    #[serde(default = "default_grid_width")]
    grid_width: u16,
    #[serde(default = "default_grid_height")]
    grid_height: u16,
}

#[derive(Deserialize, Debug)]
struct TomlSnake {
    #[serde(default = "default_length")]
    length: usize,
    #[serde(default = "default_frames_per_move")]
    frames_per_move: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScores {
    #[serde(default = "default_scores_file")]
    file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_fps() -> u32 { 60 }
fn default_screen_width() -> u16 { 64 }
fn default_screen_height() -> u16 { 24 }
fn default_grid_width() -> u16 { 32 }
fn default_grid_height() -> u16 { 24 }
fn default_length() -> usize { 4 }
fn default_frames_per_move() -> u32 { 6 }  // 10 moves/s at 60 fps
fn default_scores_file() -> String { "highscores.txt".into() }
fn default_log_level() -> String { "warn".into() }

impl Default for TomlFrame {
    fn default() -> Self {
        TomlFrame { fps: default_fps() }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            grid_width: default_grid_width(),
            grid_height: default_grid_height(),
        }
    }
}

impl Default for TomlSnake {
    fn default() -> Self {
        TomlSnake {
            length: default_length(),
            frames_per_move: default_frames_per_move(),
        }
    }
}

impl Default for TomlScores {
    fn default() -> Self {
        TomlScores { file: default_scores_file() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_level: default_log_level() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut warnings = vec![];
        resolve(TomlConfig::default(), &mut warnings)
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    ///
    /// Logging is not initialised yet when this runs, so problems are
    /// returned as warning lines for the caller to emit once it is.
    pub fn load() -> (Self, Vec<String>) {
        let mut warnings = vec![];
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        let config = resolve(toml_cfg, &mut warnings);
        (config, warnings)
    }

    /// Parse a config document directly. Unknown keys are ignored,
    /// missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        let mut warnings = vec![];
        let config = resolve(toml_cfg, &mut warnings);
        Ok((config, warnings))
    }
}

fn resolve(cfg: TomlConfig, warnings: &mut Vec<String>) -> GameConfig {
    let log_level = cfg.general.log_level.parse().unwrap_or_else(|_| {
        warnings.push(format!(
            "unknown log_level {:?}, using \"warn\"", cfg.general.log_level
        ));
        tracing::Level::WARN
    });

    if cfg.frame.fps == 0 {
        warnings.push("frame.fps must be positive, using 1".into());
    }
    if cfg.snake.length == 0 {
        warnings.push("snake.length must be at least 1, using 1".into());
    }

    GameConfig {
        frame: FrameConfig { fps: cfg.frame.fps.max(1) },
        display: DisplayConfig {
            screen_width: cfg.display.screen_width.max(1),
            screen_height: cfg.display.screen_height.max(1),
            grid_width: cfg.display.grid_width.max(1),
            grid_height: cfg.display.grid_height.max(1),
        },
        snake: SnakeConfig {
            length: cfg.snake.length.max(1),
            frames_per_move: cfg.snake.frames_per_move.max(1),
        },
        scores_file: PathBuf::from(cfg.scores.file),
        log_level,
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("config.toml parse error: {e}"));
                        warnings.push("Using default settings.".into());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.frame.fps, 60);
        assert_eq!(cfg.frame.budget(), Duration::from_millis(16));
        assert_eq!(cfg.display.grid_width, 32);
        assert_eq!(cfg.scores_file, PathBuf::from("highscores.txt"));
        assert_eq!(cfg.log_level, tracing::Level::WARN);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[frame]\nfps = 30\n[scores]\nfile = \"scores.txt\"\n",
        ).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(cfg.frame.budget(), Duration::from_millis(33));
        assert_eq!(cfg.scores_file, PathBuf::from("scores.txt"));
        assert_eq!(cfg.snake.length, 4);
    }

    #[test]
    fn bad_values_are_clamped_with_warnings() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[frame]\nfps = 0\n[snake]\nlength = 0\n[general]\nlog_level = \"loud\"\n",
        ).unwrap();
        assert_eq!(cfg.frame.fps, 1);
        assert_eq!(cfg.snake.length, 1);
        assert_eq!(cfg.log_level, tracing::Level::WARN);
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[frame\nfps = ").is_err());
    }
}
