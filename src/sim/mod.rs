pub mod playfield;
pub mod scoreboard;
pub mod session;
