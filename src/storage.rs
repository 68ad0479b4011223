//! Persistence seam. The game only sees a string key-value store; the browser
//! binds it to `localStorage`, tests and headless runs use `MemoryStorage`.

use std::collections::HashMap;

use crate::difficulty::Difficulty;

const HIGH_SCORE_PREFIX: &str = "whackAMoleHighScore_";
const CURRENT_DIFFICULTY_KEY: &str = "whackAMoleCurrentDifficulty";

/// Minimal key-value store. Writes are best effort: a store that cannot
/// persist simply drops the value.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
}

/// Typed (difficulty, metric) keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKey {
    HighScore(Difficulty),
    CurrentDifficulty,
}

impl StorageKey {
    pub fn key(&self) -> String {
        match self {
            StorageKey::HighScore(d) => format!("{HIGH_SCORE_PREFIX}{d}"),
            StorageKey::CurrentDifficulty => CURRENT_DIFFICULTY_KEY.to_owned(),
        }
    }
}

/// Best score for `difficulty`; missing or unparsable values read as 0.
pub fn load_high_score<K: Storage + ?Sized>(store: &K, difficulty: Difficulty) -> u32 {
    store
        .get_item(&StorageKey::HighScore(difficulty).key())
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_high_score<K: Storage + ?Sized>(store: &mut K, difficulty: Difficulty, score: u32) {
    store.set_item(&StorageKey::HighScore(difficulty).key(), &score.to_string());
}

/// Stored difficulty, `None` when absent or not a known identifier.
pub fn load_current_difficulty<K: Storage + ?Sized>(store: &K) -> Option<Difficulty> {
    let raw = store.get_item(&StorageKey::CurrentDifficulty.key())?;
    match raw.parse() {
        Ok(d) => Some(d),
        Err(err) => {
            log::warn!("ignoring stored difficulty: {err}");
            None
        }
    }
}

pub fn save_current_difficulty<K: Storage + ?Sized>(store: &mut K, difficulty: Difficulty) {
    store.set_item(&StorageKey::CurrentDifficulty.key(), difficulty.as_str());
}

/// In-process store; also the fallback when the browser denies `localStorage`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_owned(), value.to_owned());
    }
}

impl<K: Storage + ?Sized> Storage for Box<K> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_page_layout() {
        assert_eq!(StorageKey::HighScore(Difficulty::Hard).key(), "whackAMoleHighScore_hard");
        assert_eq!(StorageKey::CurrentDifficulty.key(), "whackAMoleCurrentDifficulty");
    }

    #[test]
    fn test_high_scores_are_tracked_per_difficulty() {
        let mut store = MemoryStorage::new();
        assert_eq!(load_high_score(&store, Difficulty::Easy), 0);
        save_high_score(&mut store, Difficulty::Easy, 12);
        save_high_score(&mut store, Difficulty::Hard, 40);
        assert_eq!(load_high_score(&store, Difficulty::Easy), 12);
        assert_eq!(load_high_score(&store, Difficulty::Medium), 0);
        assert_eq!(load_high_score(&store, Difficulty::Hard), 40);
    }

    #[test]
    fn test_garbage_high_score_reads_as_zero() {
        let mut store = MemoryStorage::new();
        store.set_item("whackAMoleHighScore_easy", "NaN");
        assert_eq!(load_high_score(&store, Difficulty::Easy), 0);
        store.set_item("whackAMoleHighScore_easy", "-3");
        assert_eq!(load_high_score(&store, Difficulty::Easy), 0);
    }

    #[test]
    fn test_current_difficulty_round_trip_and_invalid() {
        let mut store = MemoryStorage::new();
        assert_eq!(load_current_difficulty(&store), None);
        save_current_difficulty(&mut store, Difficulty::Medium);
        assert_eq!(load_current_difficulty(&store), Some(Difficulty::Medium));
        store.set_item("whackAMoleCurrentDifficulty", "nightmare");
        assert_eq!(load_current_difficulty(&store), None);
    }
}
