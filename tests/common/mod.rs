#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, TimeZone, Utc};
use fina_core::{
    config::Config,
    core::{FinanceTracker, FixedClock},
    notifications::RecordingScheduler,
    storage::JsonFileStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Keeps TempDir guards alive so temporary folders outlive each test body.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub tracker: FinanceTracker,
    pub clock: Arc<FixedClock>,
    pub scheduler: Arc<RecordingScheduler>,
    pub base: PathBuf,
}

impl TestEnv {
    pub fn data_file(&self) -> PathBuf {
        self.base.join("fina.json")
    }

    /// Opens a second tracker over the same data file, as a restarted process would.
    pub fn reopen(&self) -> FinanceTracker {
        open_tracker(&self.data_file(), self.clock.clone(), self.scheduler.clone())
    }
}

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Creates an isolated tracker backed by a JSON file in a unique directory.
pub fn setup_test_env(now: DateTime<Utc>) -> TestEnv {
    let base = temp_dir();
    let clock = Arc::new(FixedClock::new(now));
    let scheduler = Arc::new(RecordingScheduler::new());
    let tracker = open_tracker(&base.join("fina.json"), clock.clone(), scheduler.clone());
    TestEnv {
        tracker,
        clock,
        scheduler,
        base,
    }
}

pub fn open_tracker(
    path: &Path,
    clock: Arc<FixedClock>,
    scheduler: Arc<RecordingScheduler>,
) -> FinanceTracker {
    let store = JsonFileStore::new(path).expect("create json store");
    FinanceTracker::open(Arc::new(store), clock, scheduler, Config::default())
        .expect("open tracker")
}
