//! Flat-file persistence for paper tests.
//!
//! `tests.json` is the system of record; the in-memory copy is written back
//! after every mutation. All read-modify-write cycles go through one
//! `RwLock`, so duplicate-check-then-insert and transition-then-write are
//! atomic with respect to other writers in this process. A second process
//! writing the same file could still race; that narrow window is accepted.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::lifecycle;
use crate::types::{
    Direction, IndicatorSnapshot, PaperTest, SignalRecord, TestStats, TestStatus,
    DEFAULT_POSITION_SIZE,
};

/// Entry-price proximity that makes a recent test count as a duplicate.
const DUPLICATE_PRICE_TOLERANCE: f64 = 0.01;

/// Payload for creating a test from a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTest {
    pub symbol: String,
    pub timeframe: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub entry_price: f64,
    pub tp: f64,
    pub sl: f64,
    #[serde(default)]
    pub strength: f64,
    #[serde(default)]
    pub auto_tested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSnapshot>,
}

impl NewTest {
    pub fn from_signal(signal: &SignalRecord, auto_tested: bool) -> Self {
        Self {
            symbol: signal.symbol.clone(),
            timeframe: signal.timeframe.clone(),
            direction: signal.direction,
            entry_price: signal.price,
            tp: signal.tp,
            sl: signal.sl,
            strength: signal.strength,
            auto_tested,
            indicators: Some(signal.indicators.clone()),
        }
    }
}

/// Outcome of a create attempt. Duplicates are a reported condition, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Duplicate,
}

/// Flat-file JSON store of paper tests.
pub struct TestStore {
    path: PathBuf,
    tests: RwLock<Vec<PaperTest>>,
}

impl TestStore {
    /// Open (or initialize) the store at `path`.
    ///
    /// A missing, empty or corrupt backing file resets to an empty
    /// collection with a warning; it never fails the caller.
    pub fn open(path: PathBuf) -> Self {
        let tests = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(tests) => tests,
                Err(e) => {
                    warn!("Resetting corrupt test store {:?}: {}", path, e);
                    let _ = fs::write(&path, "[]");
                    Vec::new()
                }
            },
            Err(_) => {
                if let Err(e) = fs::write(&path, "[]") {
                    warn!("Failed to initialize test store {:?}: {}", path, e);
                }
                Vec::new()
            }
        };

        Self {
            path,
            tests: RwLock::new(tests),
        }
    }

    /// All tests, newest first.
    pub fn all(&self) -> Vec<PaperTest> {
        let mut tests = self.tests.read().unwrap().clone();
        tests.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        tests
    }

    /// Look up a test by id.
    pub fn get(&self, id: &str) -> Option<PaperTest> {
        self.tests
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Create a test unless the duplicate rules say otherwise.
    ///
    /// A candidate is a duplicate of an existing test for the same
    /// (symbol, type) when that test is still active, or when it started
    /// within the trailing `window_mins` and its entry price is within 1% of
    /// the candidate's.
    pub fn create(&self, new: NewTest, window_mins: i64, now_secs: i64) -> Result<SaveOutcome> {
        let mut tests = self.tests.write().unwrap();

        if is_duplicate(&tests, &new, window_mins, now_secs) {
            return Ok(SaveOutcome::Duplicate);
        }

        let test = PaperTest {
            id: Uuid::new_v4().simple().to_string(),
            symbol: new.symbol,
            timeframe: new.timeframe,
            direction: new.direction,
            entry_price: new.entry_price,
            current_price: new.entry_price,
            tp: new.tp,
            sl: new.sl,
            start_time: now_secs,
            status: TestStatus::Active,
            position_size: DEFAULT_POSITION_SIZE,
            strength: new.strength,
            auto_tested: new.auto_tested,
            indicators: new.indicators,
            final_price: None,
            end_time: None,
            final_pnl: None,
        };
        let id = test.id.clone();
        info!(
            "Created {} {} test {} at {}",
            test.symbol,
            test.direction.label(),
            id,
            test.entry_price
        );

        tests.push(test);
        self.persist(&tests)?;
        Ok(SaveOutcome::Created(id))
    }

    /// Replace a test by id and write back.
    pub fn update(&self, updated: PaperTest) -> Result<()> {
        let mut tests = self.tests.write().unwrap();
        let Some(slot) = tests.iter_mut().find(|t| t.id == updated.id) else {
            return Err(AppError::NotFound(format!("test {}", updated.id)));
        };
        *slot = updated;
        self.persist(&tests)
    }

    /// Delete a test by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut tests = self.tests.write().unwrap();
        let before = tests.len();
        tests.retain(|t| t.id != id);
        let removed = tests.len() != before;
        if removed {
            self.persist(&tests)?;
        }
        Ok(removed)
    }

    /// Aggregate statistics over the collection. Terminal tests contribute
    /// win/loss counts; active tests contribute unrealized P&L.
    pub fn stats(&self) -> TestStats {
        let tests = self.tests.read().unwrap();
        let mut stats = TestStats {
            total: tests.len(),
            ..TestStats::default()
        };

        for test in tests.iter() {
            match test.status {
                TestStatus::Active => stats.active += 1,
                TestStatus::Completed => stats.completed += 1,
                TestStatus::Stopped => stats.stopped += 1,
            }

            let pnl = lifecycle::dollar_pnl(test);
            stats.total_pnl += pnl;
            if test.status.is_terminal() {
                if pnl > 0.0 {
                    stats.win_count += 1;
                } else if pnl < 0.0 {
                    stats.loss_count += 1;
                }
            }
        }

        stats
    }

    fn persist(&self, tests: &[PaperTest]) -> Result<()> {
        let content = serde_json::to_string(tests)?;
        fs::write(&self.path, content)
            .map_err(|e| AppError::Internal(format!("failed to write test store: {e}")))
    }
}

fn is_duplicate(tests: &[PaperTest], candidate: &NewTest, window_mins: i64, now_secs: i64) -> bool {
    let window_start = now_secs - window_mins * 60;
    tests.iter().any(|test| {
        if test.symbol != candidate.symbol || test.direction != candidate.direction {
            return false;
        }
        if test.status == TestStatus::Active {
            return true;
        }
        let recent = test.start_time > window_start;
        let price_close = candidate.entry_price != 0.0
            && ((test.entry_price - candidate.entry_price) / candidate.entry_price).abs()
                < DUPLICATE_PRICE_TOLERANCE;
        recent && price_close
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(".vigil_test_store_{name}"));
        let _ = fs::remove_dir_all(&dir);
        let _ = fs::create_dir_all(&dir);
        dir.join("tests.json")
    }

    fn cleanup(path: &PathBuf) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    fn new_test(symbol: &str, direction: Direction, entry: f64) -> NewTest {
        NewTest {
            symbol: symbol.to_string(),
            timeframe: "1h".to_string(),
            direction,
            entry_price: entry,
            tp: entry * 1.03,
            sl: entry * 0.98,
            strength: 82.0,
            auto_tested: true,
            indicators: None,
        }
    }

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_create_and_reload() {
        let path = test_path("create_reload");
        let store = TestStore::open(path.clone());

        let outcome = store
            .create(new_test("BTCUSDT", Direction::Long, 100.0), 5, NOW)
            .unwrap();
        let id = match outcome {
            SaveOutcome::Created(id) => id,
            SaveOutcome::Duplicate => panic!("unexpected duplicate"),
        };

        // A fresh store over the same file sees the record.
        let reloaded = TestStore::open(path.clone());
        let test = reloaded.get(&id).expect("test should persist");
        assert_eq!(test.symbol, "BTCUSDT");
        assert_eq!(test.status, TestStatus::Active);
        assert_eq!(test.position_size, DEFAULT_POSITION_SIZE);
        assert_eq!(test.current_price, 100.0);

        cleanup(&path);
    }

    #[test]
    fn test_duplicate_while_active() {
        let path = test_path("dup_active");
        let store = TestStore::open(path.clone());

        store
            .create(new_test("ETHUSDT", Direction::Long, 2000.0), 5, NOW)
            .unwrap();
        // Different price, far outside the window, but the first test is
        // still active.
        let outcome = store
            .create(
                new_test("ETHUSDT", Direction::Long, 2500.0),
                5,
                NOW + 100_000,
            )
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Duplicate);
        assert_eq!(store.all().len(), 1);

        cleanup(&path);
    }

    #[test]
    fn test_duplicate_recent_and_price_close() {
        let path = test_path("dup_recent");
        let store = TestStore::open(path.clone());

        let outcome = store
            .create(new_test("SOLUSDT", Direction::Short, 100.0), 240, NOW)
            .unwrap();
        let SaveOutcome::Created(id) = outcome else {
            panic!("expected creation");
        };

        // Terminal test, still inside the window, entry within 1%.
        let mut test = store.get(&id).unwrap();
        test.status = TestStatus::Stopped;
        store.update(test).unwrap();

        let outcome = store
            .create(
                new_test("SOLUSDT", Direction::Short, 100.5),
                240,
                NOW + 600,
            )
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Duplicate);

        // Same pair but the other direction is allowed through.
        let outcome = store
            .create(new_test("SOLUSDT", Direction::Long, 100.5), 240, NOW + 600)
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));

        cleanup(&path);
    }

    #[test]
    fn test_duplicate_window_expires() {
        let path = test_path("dup_expired");
        let store = TestStore::open(path.clone());

        let SaveOutcome::Created(id) = store
            .create(new_test("ADAUSDT", Direction::Long, 1.0), 5, NOW)
            .unwrap()
        else {
            panic!("expected creation");
        };
        let mut test = store.get(&id).unwrap();
        test.status = TestStatus::Completed;
        store.update(test).unwrap();

        // Six minutes later the 5-minute window no longer blocks.
        let outcome = store
            .create(new_test("ADAUSDT", Direction::Long, 1.0), 5, NOW + 360)
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));

        cleanup(&path);
    }

    #[test]
    fn test_corrupt_file_resets_empty() {
        let path = test_path("corrupt");
        fs::write(&path, "{not json[").unwrap();

        let store = TestStore::open(path.clone());
        assert!(store.all().is_empty());
        // The backing file was reset, so a reopen stays clean.
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        cleanup(&path);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let path = test_path("update_missing");
        let store = TestStore::open(path.clone());

        let SaveOutcome::Created(id) = store
            .create(new_test("XRPUSDT", Direction::Long, 0.5), 5, NOW)
            .unwrap()
        else {
            panic!("expected creation");
        };
        let mut test = store.get(&id).unwrap();
        test.id = "missing".to_string();
        assert!(store.update(test).is_err());

        cleanup(&path);
    }

    #[test]
    fn test_delete() {
        let path = test_path("delete");
        let store = TestStore::open(path.clone());

        let SaveOutcome::Created(id) = store
            .create(new_test("BNBUSDT", Direction::Long, 300.0), 5, NOW)
            .unwrap()
        else {
            panic!("expected creation");
        };
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.all().is_empty());

        cleanup(&path);
    }

    #[test]
    fn test_stats_counts_and_pnl() {
        let path = test_path("stats");
        let store = TestStore::open(path.clone());

        let SaveOutcome::Created(win_id) = store
            .create(new_test("BTCUSDT", Direction::Long, 100.0), 5, NOW)
            .unwrap()
        else {
            panic!("expected creation");
        };
        let mut winner = store.get(&win_id).unwrap();
        winner.status = TestStatus::Completed;
        winner.final_price = Some(103.0);
        store.update(winner).unwrap();

        store
            .create(new_test("ETHUSDT", Direction::Short, 2000.0), 5, NOW)
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.win_count, 1);
        assert_eq!(stats.loss_count, 0);
        // Winner: 10 / 100 * (103 - 100) = 0.3; active test is flat.
        assert!((stats.total_pnl - 0.3).abs() < 1e-9);

        cleanup(&path);
    }
}
