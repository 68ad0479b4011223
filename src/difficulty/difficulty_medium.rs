// Medium difficulty definition
use super::{DifficultyLevel, ScoreRule, SpeedStage};

pub static MEDIUM: DifficultyLevel = DifficultyLevel {
    name: "medium",
    initial_time: 30,
    speed_schedule: &[
        SpeedStage { at_or_below: 30, interval_ms: 800 },
        SpeedStage { at_or_below: 20, interval_ms: 650 },
        SpeedStage { at_or_below: 10, interval_ms: 500 },
    ],
    // Last five seconds are worth an extra point per hit.
    score_rule: ScoreRule { base_points: 2, rush_window: 5, rush_bonus: 1 },
};
