//! Whack-a-Mole core crate.
//!
//! A grid of squares lights up one cell at a time; the player clicks it before
//! the mole moves on. The crate splits into:
//! - `difficulty`: static per-difficulty tables and the pure pacing / scoring rules
//! - `mole`: hot-cell selection that never repeats the previous cell
//! - `game`: the round state machine with its spawn and countdown timers
//! - `storage`: key-value persistence seam for high scores and the chosen difficulty
//! - `web`: browser adapter (DOM, `setInterval`, `localStorage`, audio, log export)
//!
//! Everything except `web` runs headless on the host, which is how the test
//! suite drives full rounds on a virtual clock.

use wasm_bindgen::prelude::*;

pub mod difficulty;
pub mod error;
pub mod game;
pub mod mole;
pub mod storage;
pub mod web;

pub use difficulty::{Difficulty, DifficultyLevel, ScoreRule, SpeedStage};
pub use error::GameError;
pub use game::{Game, GameConfig, GameEvent, GameSnapshot, Phase};
pub use mole::MoleSpawner;
pub use storage::{MemoryStorage, Storage};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second instantiation finds the logger already installed; keep the first.
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// JS entry points
// -----------------------------------------------------------------------------

/// Looks up the board on the current page and wires it to a fresh game.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start_whack_a_mole()
}

#[wasm_bindgen]
pub fn is_valid_difficulty(name: &str) -> bool {
    difficulty::is_valid_difficulty(name)
}

/// Current board state as JSON, `undefined` before `start_game`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_snapshot_json() -> Option<String> {
    web::snapshot_json()
}
