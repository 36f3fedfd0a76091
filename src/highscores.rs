//! Best-score persistence
//!
//! One integer per game, stored as a plain decimal string under a fixed
//! key. Read once at startup and written only when a run beats it.

use crate::error::Result;
use crate::platform::KeyValueStore;

/// Storage key for Vibe Runner
pub const RUNNER_KEY: &str = "vibeRunnerHighScore";
/// Storage key for Vibe Survivor
pub const SURVIVOR_KEY: &str = "vibeSurvivorHighScore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    key: String,
    best: u64,
}

impl HighScore {
    /// Read the stored best. Missing or unreadable values count as zero.
    pub fn load(key: &str, store: &dyn KeyValueStore) -> Self {
        let best = match store.get(key) {
            Ok(Some(raw)) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => v as u64,
                Ok(_) => 0,
                Err(_) => {
                    log::warn!("Ignoring malformed high score {raw:?} under {key}");
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Failed to read high score: {e}");
                0
            }
        };
        log::info!("High score for {key}: {best}");
        Self {
            key: key.to_string(),
            best,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record a finished run. Returns true when `score` set a new best.
    /// The store is written only in that case.
    pub fn submit(&mut self, score: u64, store: &mut dyn KeyValueStore) -> Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;
        store.set(&self.key, &score.to_string())?;
        log::info!("New high score {score} saved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::platform::MemoryStore;

    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(Some("120".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(GameError::Storage("quota exceeded".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_written_only_when_exceeded() {
        let mut store = MemoryStore::default();
        let mut hs = HighScore::load(RUNNER_KEY, &store);
        assert_eq!(hs.best(), 0);

        assert!(hs.submit(250, &mut store).unwrap());
        assert_eq!(store.get(RUNNER_KEY).unwrap().as_deref(), Some("250"));

        assert!(!hs.submit(250, &mut store).unwrap());
        assert!(!hs.submit(100, &mut store).unwrap());
        assert_eq!(store.get(RUNNER_KEY).unwrap().as_deref(), Some("250"));

        let reloaded = HighScore::load(RUNNER_KEY, &store);
        assert_eq!(reloaded.best(), 250);
    }

    #[test]
    fn test_malformed_value_reads_as_zero() {
        let mut store = MemoryStore::default();
        store.set(SURVIVOR_KEY, "not a number").unwrap();
        assert_eq!(HighScore::load(SURVIVOR_KEY, &store).best(), 0);
        store.set(SURVIVOR_KEY, "1234.7").unwrap();
        assert_eq!(HighScore::load(SURVIVOR_KEY, &store).best(), 1234);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut store = ReadOnly;
        let mut hs = HighScore::load("k", &store);
        assert_eq!(hs.best(), 120);
        assert!(hs.submit(50, &mut store).is_ok());
        assert!(hs.submit(500, &mut store).is_err());
    }
}
