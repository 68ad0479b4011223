// Hard difficulty definition
// Shorter round, four speed steps; the final stretch pays double the base.
use super::{DifficultyLevel, ScoreRule, SpeedStage};

pub static HARD: DifficultyLevel = DifficultyLevel {
    name: "hard",
    initial_time: 20,
    speed_schedule: &[
        SpeedStage { at_or_below: 20, interval_ms: 600 },
        SpeedStage { at_or_below: 15, interval_ms: 450 },
        SpeedStage { at_or_below: 10, interval_ms: 350 },
        SpeedStage { at_or_below: 5, interval_ms: 300 },
    ],
    score_rule: ScoreRule { base_points: 3, rush_window: 5, rush_bonus: 2 },
};
