//! Pacing re-fetches after a move.
//!
//! GitHub's issue list can lag a label change by a few seconds. After a
//! successful move the time is written to a small JSON log keyed by
//! repository, and the next board fetch sleeps out whatever is left of the
//! delay. The log is shared by every process without locking; a lost write
//! only costs a redundant wait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::types::RepoRef;

/// Entries older than this are dropped the next time the log is read for a fetch.
const STALE_AFTER_MS: i64 = 15_000;

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct SyncLog {
    #[serde(default)]
    last_move: HashMap<String, i64>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SyncLog {
    pub fn load() -> Self {
        match Self::log_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let mut log = std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str::<SyncLog>(&contents).ok())
            .unwrap_or_default();
        log.path = Some(path.to_path_buf());
        log
    }

    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match serde_json::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(path, contents) {
                    tracing::debug!(path = %path.display(), error = %e, "could not write sync log");
                }
            }
            Err(e) => tracing::debug!(error = %e, "could not encode sync log"),
        }
    }

    fn log_path() -> Option<PathBuf> {
        Config::config_path()
            .ok()
            .map(|p| p.with_file_name("sync.json"))
    }

    pub fn last_move(&self, repo: &RepoRef) -> Option<i64> {
        self.last_move.get(&repo.to_string()).copied()
    }

    pub fn record_move(&mut self, repo: &RepoRef, at_ms: i64) {
        self.last_move.insert(repo.to_string(), at_ms);
    }

    /// Drop entries old enough that no fetch will wait on them. Returns whether anything changed.
    pub fn prune(&mut self, now_ms: i64) -> bool {
        let before = self.last_move.len();
        self.last_move.retain(|_, at| now_ms - *at <= STALE_AFTER_MS);
        self.last_move.len() != before
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// How much of `delay` is left since a move at `last_ms`.
pub fn remaining_wait(last_ms: i64, now_ms: i64, delay: Duration) -> Option<Duration> {
    if last_ms <= 0 {
        return None;
    }
    let elapsed = now_ms.saturating_sub(last_ms).max(0) as u128;
    let delay_ms = delay.as_millis();
    (elapsed < delay_ms).then(|| Duration::from_millis((delay_ms - elapsed) as u64))
}

/// Record a successful move so the next fetch knows to wait.
pub fn record_move_in(mut log: SyncLog, repo: &RepoRef) {
    log.record_move(repo, now_millis());
    log.save();
}

/// Sleep out the remainder of the delay after this repository's last move.
pub async fn wait_for_consistency(repo: &RepoRef, delay: Duration) -> Option<Duration> {
    wait_for_consistency_in(SyncLog::load(), repo, delay).await
}

pub async fn wait_for_consistency_in(
    mut log: SyncLog,
    repo: &RepoRef,
    delay: Duration,
) -> Option<Duration> {
    let wait = log
        .last_move(repo)
        .and_then(|last| remaining_wait(last, now_millis(), delay));

    if let Some(wait) = wait {
        tracing::info!(repo = %repo, wait_ms = wait.as_millis() as u64, "waiting for GitHub to catch up");
        tokio::time::sleep(wait).await;
    }

    if log.prune(now_millis()) {
        log.save();
    }
    wait
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[test]
    fn test_remaining_wait_inside_window() {
        assert_eq!(
            remaining_wait(10_000, 12_000, DELAY),
            Some(Duration::from_millis(3_000))
        );
    }

    #[test]
    fn test_remaining_wait_after_window() {
        assert_eq!(remaining_wait(10_000, 15_000, DELAY), None);
        assert_eq!(remaining_wait(10_000, 40_000, DELAY), None);
    }

    #[test]
    fn test_remaining_wait_no_move_recorded() {
        assert_eq!(remaining_wait(0, 12_000, DELAY), None);
    }

    #[test]
    fn test_remaining_wait_clock_skew() {
        // A timestamp from the future waits the full delay.
        assert_eq!(remaining_wait(20_000, 10_000, DELAY), Some(DELAY));
    }

    #[test]
    fn test_log_roundtrip_per_repo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        let widgets = RepoRef::new("acme", "widgets");
        let gadgets = RepoRef::new("acme", "gadgets");

        let mut log = SyncLog::load_from(&path);
        assert_eq!(log.last_move(&widgets), None);
        log.record_move(&widgets, 1_000);
        log.save();

        let reloaded = SyncLog::load_from(&path);
        assert_eq!(reloaded.last_move(&widgets), Some(1_000));
        assert_eq!(reloaded.last_move(&gadgets), None);
    }

    #[test]
    fn test_prune_drops_stale_entries() {
        let mut log = SyncLog::default();
        let fresh = RepoRef::new("a", "fresh");
        let stale = RepoRef::new("a", "stale");
        log.record_move(&fresh, 95_000);
        log.record_move(&stale, 50_000);

        assert!(log.prune(100_000));
        assert_eq!(log.last_move(&fresh), Some(95_000));
        assert_eq!(log.last_move(&stale), None);
        assert!(!log.prune(100_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_remainder_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        let widgets = RepoRef::new("acme", "widgets");
        let old = RepoRef::new("acme", "old");

        let mut log = SyncLog::load_from(&path);
        log.record_move(&widgets, now_millis() - 1_000);
        log.record_move(&old, now_millis() - 20_000);
        log.save();

        let started = tokio::time::Instant::now();
        let waited = wait_for_consistency_in(SyncLog::load_from(&path), &widgets, DELAY)
            .await
            .unwrap();

        assert!(waited <= Duration::from_millis(4_000));
        assert!(waited > Duration::from_millis(3_500));
        assert!(started.elapsed() >= waited);

        let reloaded = SyncLog::load_from(&path);
        assert!(reloaded.last_move(&widgets).is_some());
        assert_eq!(reloaded.last_move(&old), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_without_recent_move() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");

        let started = tokio::time::Instant::now();
        let waited =
            wait_for_consistency_in(SyncLog::load_from(&path), &RepoRef::new("a", "b"), DELAY).await;

        assert_eq!(waited, None);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!path.exists());
    }

    #[test]
    fn test_record_move_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        let repo = RepoRef::new("acme", "widgets");

        let before = now_millis();
        record_move_in(SyncLog::load_from(&path), &repo);

        let at = SyncLog::load_from(&path).last_move(&repo).unwrap();
        assert!(at >= before && at <= now_millis());
    }

    #[test]
    fn test_corrupt_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, "not json").unwrap();

        let log = SyncLog::load_from(&path);
        assert_eq!(log.last_move(&RepoRef::new("a", "b")), None);
    }
}
