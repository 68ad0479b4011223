//! Difficulty table and the pure pacing / scoring rules derived from it.
//!
//! Every difficulty lives in its own file (`difficulty_easy.rs`, ...) as a
//! static `DifficultyLevel`, so tuning a level never touches rule code. The
//! rules below only read those tables:
//! - spawn interval for the current remaining time (speeds up as time runs out)
//! - whether the interval changed since the previous second
//! - points awarded for a hit
//!
//! Identifiers coming from the page or from storage are parsed with
//! `Difficulty::from_str`; an unknown identifier is an `InvalidDifficulty`
//! error and never reaches the rule functions.

use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

mod difficulty_easy;
mod difficulty_hard;
mod difficulty_medium;

pub use difficulty_easy::EASY;
pub use difficulty_hard::HARD;
pub use difficulty_medium::MEDIUM;

/// Named difficulty identifier. Serialized in lower case (`"easy"` ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Static configuration backing this difficulty.
    pub fn level(self) -> &'static DifficultyLevel {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == name)
            .ok_or_else(|| GameError::InvalidDifficulty(name.to_owned()))
    }
}

/// One step of a speed schedule: applies while `time_remaining <= at_or_below`
/// until a later stage with a lower threshold takes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedStage {
    pub at_or_below: u32,
    pub interval_ms: u32,
}

/// Points for a hit: `base_points`, plus `rush_bonus` once the countdown is
/// inside the final `rush_window` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreRule {
    pub base_points: u32,
    pub rush_window: u32,
    pub rush_bonus: u32,
}

impl ScoreRule {
    pub fn points(&self, time_remaining: u32) -> u32 {
        if time_remaining <= self.rush_window {
            self.base_points + self.rush_bonus
        } else {
            self.base_points
        }
    }
}

/// Difficulty descriptor (immutable). Stages are ordered by descending threshold.
#[derive(Debug)]
pub struct DifficultyLevel {
    pub name: &'static str,
    pub initial_time: u32,
    pub speed_schedule: &'static [SpeedStage],
    pub score_rule: ScoreRule,
}

/// Interval used when a level has an empty schedule.
pub const FALLBACK_INTERVAL_MS: u32 = 1000;

impl DifficultyLevel {
    /// Spawn interval for the given remaining time. Above the first threshold the
    /// first stage still applies.
    pub fn speed_at(&self, time_remaining: u32) -> u32 {
        let mut interval = self
            .speed_schedule
            .first()
            .map(|stage| stage.interval_ms)
            .unwrap_or(FALLBACK_INTERVAL_MS);
        for stage in self.speed_schedule {
            if time_remaining <= stage.at_or_below {
                interval = stage.interval_ms;
            }
        }
        interval
    }
}

pub fn is_valid_difficulty(name: &str) -> bool {
    name.parse::<Difficulty>().is_ok()
}

pub fn initial_time(difficulty: Difficulty) -> u32 {
    difficulty.level().initial_time
}

pub fn current_speed(time_remaining: u32, difficulty: Difficulty) -> u32 {
    difficulty.level().speed_at(time_remaining)
}

/// True exactly when the interval for `time_remaining` differs from the one a
/// second earlier, i.e. the running spawn timer must be replaced.
pub fn should_change_speed(time_remaining: u32, difficulty: Difficulty) -> bool {
    current_speed(time_remaining, difficulty)
        != current_speed(time_remaining.saturating_add(1), difficulty)
}

pub fn increase_score(current_score: u32, difficulty: Difficulty, time_remaining: u32) -> u32 {
    let points = difficulty.level().score_rule.points(time_remaining).max(1);
    current_score.saturating_add(points)
}
