// Easy difficulty: a long round with a gentle speed-up and flat scoring.
use super::{DifficultyLevel, ScoreRule, SpeedStage};

pub static EASY: DifficultyLevel = DifficultyLevel {
    name: "easy",
    initial_time: 30,
    speed_schedule: &[
        SpeedStage { at_or_below: 30, interval_ms: 1000 },
        SpeedStage { at_or_below: 20, interval_ms: 850 },
        SpeedStage { at_or_below: 10, interval_ms: 700 },
    ],
    score_rule: ScoreRule { base_points: 1, rush_window: 0, rush_bonus: 0 },
};
