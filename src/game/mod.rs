//! Round state machine: Idle → Running ⇄ Paused → Ended → Idle.
//!
//! `Game` owns the whole mutable state of one board (phase, score, countdown,
//! hot cell, difficulty) plus the handles of its two repeating timers:
//! - spawn timer: relocates the mole at the difficulty's current interval
//! - countdown timer: takes one second off the clock
//!
//! Collaborators are injected: a `Scheduler` that runs the timers and a
//! `Storage` that persists high scores and the chosen difficulty. The game
//! never renders; it queues `GameEvent`s and exposes `snapshot()` for whoever
//! draws the page.
//!
//! Transitions requested from the wrong phase (a click while paused, start
//! while running, ...) are expected UI races and are silently ignored.

use crate::difficulty::{self, Difficulty};
use crate::error::GameError;
use crate::mole::MoleSpawner;
use crate::storage::{self, Storage};

pub mod session_log;
pub mod timers;

pub use session_log::{LOG_FILE_NAME, SessionLog};
pub use timers::{Scheduler, Timer, TimerHandle, VirtualScheduler};

/// Board / pacing parameters that are not per difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub cell_count: usize,
    pub countdown_interval_ms: u32,
    /// Forbid the mole from reappearing in the cell it just left.
    pub avoid_repeat: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { cell_count: 9, countdown_interval_ms: 1000, avoid_repeat: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Notifications for the presentation layer, drained with `drain_events`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started { difficulty: Difficulty, time_remaining: u32 },
    MoleMoved { cell: usize },
    Hit { cell: usize, score: u32 },
    Tick { time_remaining: u32 },
    SpeedChanged { interval_ms: u32 },
    Paused,
    Resumed,
    Ended { final_score: u32, high_score: u32, new_high_score: bool },
    DifficultyChanged { difficulty: Difficulty },
    Reset,
    HighScoreReset { difficulty: Difficulty },
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameSnapshot {
    pub phase: Phase,
    pub score: u32,
    pub time_remaining: u32,
    pub active_cell: Option<usize>,
    pub difficulty: Difficulty,
    pub high_score: u32,
    pub cell_count: usize,
    pub spawn_interval_ms: u32,
}

pub struct Game<S: Scheduler, K: Storage> {
    config: GameConfig,
    scheduler: S,
    store: K,
    spawner: MoleSpawner,
    phase: Phase,
    score: u32,
    time_remaining: u32,
    active_cell: Option<usize>,
    difficulty: Difficulty,
    spawn_timer: Option<TimerHandle>,
    countdown_timer: Option<TimerHandle>,
    events: Vec<GameEvent>,
    log: SessionLog,
}

impl<S: Scheduler, K: Storage> Game<S, K> {
    /// Builds an idle game on the stored difficulty. A missing or unknown stored
    /// value falls back to the default difficulty, which is written back.
    pub fn new(config: GameConfig, scheduler: S, mut store: K, spawner: MoleSpawner) -> Self {
        let difficulty = match storage::load_current_difficulty(&store) {
            Some(d) => d,
            None => {
                let d = Difficulty::default();
                storage::save_current_difficulty(&mut store, d);
                d
            }
        };
        let mut config = config;
        if config.cell_count == 0 {
            log::warn!("grid needs at least one cell, using 1");
            config.cell_count = 1;
        }
        Self {
            config,
            scheduler,
            store,
            spawner,
            phase: Phase::Idle,
            score: 0,
            time_remaining: difficulty::initial_time(difficulty),
            active_cell: None,
            difficulty,
            spawn_timer: None,
            countdown_timer: None,
            events: Vec::new(),
            log: SessionLog::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn active_cell(&self) -> Option<usize> {
        self.active_cell
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Stored best score for the current difficulty.
    pub fn high_score(&self) -> u32 {
        storage::load_high_score(&self.store, self.difficulty)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.log
    }

    /// True while either timer handle is held.
    pub fn has_live_timers(&self) -> bool {
        self.spawn_timer.is_some() || self.countdown_timer.is_some()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            score: self.score,
            time_remaining: self.time_remaining,
            active_cell: self.active_cell,
            difficulty: self.difficulty,
            high_score: self.high_score(),
            cell_count: self.config.cell_count,
            spawn_interval_ms: difficulty::current_speed(self.time_remaining, self.difficulty),
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Transitions -------------------------------------------------------

    /// Begins a round from Idle or Ended.
    pub fn start(&mut self) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::Ended) {
            log::debug!("start ignored while {:?}", self.phase);
            return false;
        }
        self.stop_all_timers();
        self.score = 0;
        self.time_remaining = difficulty::initial_time(self.difficulty);
        self.active_cell = None;
        self.spawner.reset_mole_position();
        self.phase = Phase::Running;
        self.note(format!(
            "Game started on {} with {}s",
            self.difficulty, self.time_remaining
        ));
        self.events.push(GameEvent::Started {
            difficulty: self.difficulty,
            time_remaining: self.time_remaining,
        });
        self.place_mole();
        self.start_spawn_cycle();
        self.start_countdown_cycle();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Running {
            log::debug!("pause ignored while {:?}", self.phase);
            return false;
        }
        self.stop_all_timers();
        self.phase = Phase::Paused;
        self.note(format!("Paused at {}s, score {}", self.time_remaining, self.score));
        self.events.push(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            log::debug!("resume ignored while {:?}", self.phase);
            return false;
        }
        self.phase = Phase::Running;
        self.note(format!("Resumed at {}s", self.time_remaining));
        self.events.push(GameEvent::Resumed);
        self.start_spawn_cycle();
        self.start_countdown_cycle();
        true
    }

    /// Single pause/resume control.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Player clicked `cell`. Counts only on the hot cell of a running round;
    /// the cell cools down so a second click before the next relocation misses.
    pub fn hit(&mut self, cell: usize) -> bool {
        if self.phase != Phase::Running || self.active_cell != Some(cell) {
            return false;
        }
        self.score = difficulty::increase_score(self.score, self.difficulty, self.time_remaining);
        self.active_cell = None;
        self.note(format!("Hit cell {cell}, score {}", self.score));
        self.events.push(GameEvent::Hit { cell, score: self.score });
        true
    }

    /// Countdown step. Ends the round at zero, otherwise swaps the spawn timer
    /// when the schedule moves to a new interval.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        log::trace!("tick: {}s left", self.time_remaining);
        self.events.push(GameEvent::Tick { time_remaining: self.time_remaining });
        if self.time_remaining == 0 {
            self.end();
        } else if difficulty::should_change_speed(self.time_remaining, self.difficulty) {
            self.start_spawn_cycle();
            let interval_ms = difficulty::current_speed(self.time_remaining, self.difficulty);
            self.note(format!("Speed changed to {interval_ms}ms at {}s", self.time_remaining));
            self.events.push(GameEvent::SpeedChanged { interval_ms });
        }
        true
    }

    /// Spawn step: moves the mole to a different cell.
    pub fn relocate(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.place_mole();
        true
    }

    /// Switches difficulty by identifier. Unknown identifiers are an error and
    /// leave the game untouched; a valid one during a round is ignored.
    pub fn change_difficulty(&mut self, name: &str) -> Result<bool, GameError> {
        let difficulty: Difficulty = name.parse()?;
        Ok(self.set_difficulty(difficulty))
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::Ended) {
            log::debug!("difficulty change to {difficulty} ignored while {:?}", self.phase);
            return false;
        }
        self.difficulty = difficulty;
        storage::save_current_difficulty(&mut self.store, difficulty);
        self.note(format!("Difficulty set to {difficulty}"));
        self.events.push(GameEvent::DifficultyChanged { difficulty });
        self.reset();
        true
    }

    /// Back to Idle from any phase with a fresh clock for the current difficulty.
    pub fn reset(&mut self) {
        self.stop_all_timers();
        self.score = 0;
        self.active_cell = None;
        self.spawner.reset_mole_position();
        self.phase = Phase::Idle;
        self.time_remaining = difficulty::initial_time(self.difficulty);
        self.events.push(GameEvent::Reset);
    }

    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    pub fn reset_high_score(&mut self) {
        storage::save_high_score(&mut self.store, self.difficulty, 0);
        self.note(format!("High score reset for {}", self.difficulty));
        self.events.push(GameEvent::HighScoreReset { difficulty: self.difficulty });
    }

    /// Dispatches a fired timer. Fires from handles the game no longer holds
    /// (already cancelled, superseded) are dropped.
    pub fn on_timer(&mut self, handle: TimerHandle, timer: Timer) {
        let current = match timer {
            Timer::Spawn => self.spawn_timer,
            Timer::Countdown => self.countdown_timer,
        };
        if current != Some(handle) {
            log::debug!("stale {timer:?} timer {handle:?} ignored");
            return;
        }
        match timer {
            Timer::Spawn => self.relocate(),
            Timer::Countdown => self.tick(),
        };
    }

    // --- Internals ---------------------------------------------------------

    fn end(&mut self) {
        self.stop_all_timers();
        self.active_cell = None;
        self.phase = Phase::Ended;
        let previous_best = self.high_score();
        let new_high_score = self.score > previous_best;
        if new_high_score {
            storage::save_high_score(&mut self.store, self.difficulty, self.score);
        }
        let high_score = previous_best.max(self.score);
        self.note(format!("Your final score: {}", self.score));
        if new_high_score {
            self.note(format!("New high score on {}: {}", self.difficulty, self.score));
        }
        self.events.push(GameEvent::Ended {
            final_score: self.score,
            high_score,
            new_high_score,
        });
    }

    fn place_mole(&mut self) {
        let cell = self.spawner.spawn_mole(self.config.cell_count, self.config.avoid_repeat);
        self.active_cell = Some(cell);
        log::debug!("mole moved to cell {cell}");
        self.events.push(GameEvent::MoleMoved { cell });
    }

    /// (Re)starts relocation at the interval for the current clock; at most one
    /// spawn timer is ever live.
    fn start_spawn_cycle(&mut self) {
        if let Some(handle) = self.spawn_timer.take() {
            self.scheduler.cancel(handle);
        }
        let interval_ms = difficulty::current_speed(self.time_remaining, self.difficulty);
        self.spawn_timer = self.scheduler.start(Timer::Spawn, interval_ms);
    }

    fn start_countdown_cycle(&mut self) {
        if let Some(handle) = self.countdown_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.countdown_timer = self
            .scheduler
            .start(Timer::Countdown, self.config.countdown_interval_ms);
    }

    /// The only cancellation path for both timers.
    fn stop_all_timers(&mut self) {
        if let Some(handle) = self.spawn_timer.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.countdown_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn note(&mut self, line: String) {
        log::info!("{line}");
        self.log.record(line);
    }
}

impl<K: Storage> Game<VirtualScheduler, K> {
    /// Runs the virtual clock forward, firing every timer that falls due.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now_ms() + ms;
        while let Some((handle, timer)) = self.scheduler.pop_due(until) {
            self.on_timer(handle, timer);
        }
        self.scheduler.settle(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    type TestGame = Game<VirtualScheduler, MemoryStorage>;

    fn new_game() -> TestGame {
        Game::new(
            GameConfig::default(),
            VirtualScheduler::new(),
            MemoryStorage::new(),
            MoleSpawner::new(11),
        )
    }

    #[test]
    fn test_new_game_is_idle_on_default_difficulty() {
        let game = new_game();
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.time_remaining(), 30);
        assert_eq!(game.active_cell(), None);
        assert!(!game.has_live_timers());
        assert_eq!(
            game.store().get_item("whackAMoleCurrentDifficulty").as_deref(),
            Some("easy")
        );
    }

    #[test]
    fn test_stored_difficulty_is_restored() {
        let mut store = MemoryStorage::new();
        storage::save_current_difficulty(&mut store, Difficulty::Hard);
        let game = Game::new(GameConfig::default(), VirtualScheduler::new(), store, MoleSpawner::new(1));
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(game.time_remaining(), 20);
    }

    #[test]
    fn test_start_places_mole_and_starts_both_timers() {
        let mut game = new_game();
        assert!(game.start());
        assert_eq!(game.phase(), Phase::Running);
        assert!(game.active_cell().is_some());
        assert_eq!(game.scheduler().interval_of(Timer::Spawn), Some(1000));
        assert_eq!(game.scheduler().interval_of(Timer::Countdown), Some(1000));
        assert_eq!(game.scheduler().live_count(), 2);
        let events = game.drain_events();
        assert!(matches!(events[0], GameEvent::Started { difficulty: Difficulty::Easy, time_remaining: 30 }));
        assert!(matches!(events[1], GameEvent::MoleMoved { .. }));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let mut game = new_game();
        game.start();
        game.advance(3_000);
        let score_before = game.score();
        assert!(!game.start());
        assert_eq!(game.time_remaining(), 27);
        assert_eq!(game.score(), score_before);
        assert_eq!(game.scheduler().live_count(), 2);
    }

    #[test]
    fn test_relocation_moves_to_a_different_cell() {
        let mut game = new_game();
        game.start();
        let mut last = game.active_cell().unwrap();
        for _ in 0..20 {
            assert!(game.relocate());
            let next = game.active_cell().unwrap();
            assert_ne!(next, last);
            last = next;
        }
    }

    #[test]
    fn test_double_hit_counts_once() {
        let mut game = new_game();
        game.start();
        let cell = game.active_cell().unwrap();
        assert!(game.hit(cell));
        assert_eq!(game.score(), 1);
        assert_eq!(game.active_cell(), None);
        assert!(!game.hit(cell));
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_missed_click_is_a_no_op() {
        let mut game = new_game();
        game.start();
        let cell = game.active_cell().unwrap();
        let other = (cell + 1) % 9;
        assert!(!game.hit(other));
        assert!(!game.hit(99));
        assert_eq!(game.score(), 0);
        assert_eq!(game.active_cell(), Some(cell));
    }

    #[test]
    fn test_hit_while_idle_or_paused_is_ignored() {
        let mut game = new_game();
        assert!(!game.hit(0));
        game.start();
        let cell = game.active_cell().unwrap();
        game.pause();
        assert!(!game.hit(cell));
        assert_eq!(game.score(), 0);
        assert_eq!(game.active_cell(), Some(cell));
    }

    #[test]
    fn test_tick_swaps_spawn_timer_at_speed_boundary() {
        let mut game = new_game();
        game.start();
        game.advance(9_000);
        assert_eq!(game.time_remaining(), 21);
        assert_eq!(game.scheduler().interval_of(Timer::Spawn), Some(1000));
        game.advance(1_000);
        assert_eq!(game.time_remaining(), 20);
        assert_eq!(game.scheduler().interval_of(Timer::Spawn), Some(850));
        assert_eq!(game.scheduler().live_count(), 2);
        assert!(game
            .drain_events()
            .contains(&GameEvent::SpeedChanged { interval_ms: 850 }));
        game.advance(10_000);
        assert_eq!(game.scheduler().interval_of(Timer::Spawn), Some(700));
    }

    #[test]
    fn test_round_ends_after_initial_time() {
        let mut game = new_game();
        game.start();
        game.advance(29_999);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.time_remaining(), 1);
        game.advance(1);
        assert_eq!(game.phase(), Phase::Ended);
        assert_eq!(game.time_remaining(), 0);
        assert_eq!(game.active_cell(), None);
        assert!(!game.has_live_timers());
        assert_eq!(game.scheduler().live_count(), 0);
        // Nothing fires after the end.
        game.advance(60_000);
        assert_eq!(game.time_remaining(), 0);
        assert_eq!(game.active_cell(), None);
    }

    #[test]
    fn test_manual_ticks_end_round() {
        let mut game = new_game();
        game.start();
        for _ in 0..30 {
            assert!(game.tick());
        }
        assert_eq!(game.phase(), Phase::Ended);
        assert!(!game.tick());
        assert_eq!(game.time_remaining(), 0);
    }

    #[test]
    fn test_pause_freezes_state_and_resume_continues() {
        let mut game = new_game();
        game.start();
        game.advance(2_500);
        let cell = game.active_cell();
        assert!(game.pause());
        assert_eq!(game.scheduler().live_count(), 0);
        game.advance(10_000);
        assert_eq!(game.time_remaining(), 28);
        assert_eq!(game.active_cell(), cell);
        assert!(!game.pause());
        assert!(game.resume());
        assert_eq!(game.scheduler().interval_of(Timer::Spawn), Some(1000));
        game.advance(1_000);
        assert_eq!(game.time_remaining(), 27);
        assert_ne!(game.active_cell(), None);
    }

    #[test]
    fn test_toggle_pause() {
        let mut game = new_game();
        assert!(!game.toggle_pause());
        game.start();
        assert!(game.toggle_pause());
        assert_eq!(game.phase(), Phase::Paused);
        assert!(game.toggle_pause());
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn test_change_difficulty_rules() {
        let mut game = new_game();
        assert_eq!(
            game.change_difficulty("insane"),
            Err(GameError::InvalidDifficulty("insane".into()))
        );
        assert_eq!(game.difficulty(), Difficulty::Easy);

        assert_eq!(game.change_difficulty("hard"), Ok(true));
        assert_eq!(game.time_remaining(), 20);
        assert_eq!(
            game.store().get_item("whackAMoleCurrentDifficulty").as_deref(),
            Some("hard")
        );

        game.start();
        game.advance(3_000);
        assert_eq!(game.change_difficulty("easy"), Ok(false));
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(game.time_remaining(), 17);
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn test_high_score_updates_only_when_beaten() {
        let mut store = MemoryStorage::new();
        storage::save_high_score(&mut store, Difficulty::Easy, 2);
        let mut game = Game::new(GameConfig::default(), VirtualScheduler::new(), store, MoleSpawner::new(5));
        game.start();
        for _ in 0..3 {
            let cell = game.active_cell().unwrap();
            game.hit(cell);
            game.relocate();
        }
        game.advance(30_000);
        assert_eq!(game.high_score(), 3);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Ended { final_score: 3, high_score: 3, new_high_score: true }));

        game.start();
        game.advance(30_000);
        assert_eq!(game.high_score(), 3);
        assert!(game
            .drain_events()
            .contains(&GameEvent::Ended { final_score: 0, high_score: 3, new_high_score: false }));
    }

    #[test]
    fn test_restart_begins_fresh_round_from_any_phase() {
        let mut game = new_game();
        game.start();
        let cell = game.active_cell().unwrap();
        game.hit(cell);
        game.advance(5_000);
        game.pause();
        game.restart();
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.score(), 0);
        assert_eq!(game.time_remaining(), 30);
        assert_eq!(game.scheduler().live_count(), 2);
    }

    #[test]
    fn test_stale_timer_fire_is_ignored() {
        let mut game = new_game();
        game.start();
        game.pause();
        game.on_timer(TimerHandle(1), Timer::Spawn);
        game.on_timer(TimerHandle(2), Timer::Countdown);
        assert_eq!(game.time_remaining(), 30);
    }

    #[test]
    fn test_reset_high_score() {
        let mut game = new_game();
        storage::save_high_score(&mut game.store, Difficulty::Easy, 9);
        game.reset_high_score();
        assert_eq!(game.high_score(), 0);
        assert!(game
            .drain_events()
            .contains(&GameEvent::HighScoreReset { difficulty: Difficulty::Easy }));
    }

    #[test]
    fn test_session_log_records_round() {
        let mut game = new_game();
        game.start();
        let cell = game.active_cell().unwrap();
        game.hit(cell);
        game.advance(30_000);
        let text = game.session_log().contents();
        assert!(text.starts_with("Game started on easy with 30s\n"));
        assert!(text.contains("Hit cell"));
        assert!(text.contains("Your final score: 1\n"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = new_game();
        game.start();
        let snap = game.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.cell_count, 9);
        assert_eq!(snap.active_cell, game.active_cell());
        assert_eq!(snap.spawn_interval_ms, 1000);
        assert_eq!(snap.high_score, 0);
    }
}
