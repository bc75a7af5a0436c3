//! Waiting for triggered downloads to land.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ClosingError;
use crate::reconcile::{PARTIAL_SUFFIX, scan_downloads};

/// Waits until `dir` holds at least `expected` report files and no download
/// is still in progress, or until `timeout` elapses.
///
/// Returns the number of report files seen last. Reaching the timeout is not
/// an error here; reconciliation reports the shortfall.
///
/// # Errors
///
/// Returns [`ClosingError::SourceMissing`] if `dir` does not exist.
pub async fn wait_for_downloads(
    dir: &Path,
    expected: usize,
    extension: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<usize, ClosingError> {
    if !dir.is_dir() {
        return Err(ClosingError::SourceMissing {
            path: dir.to_path_buf(),
        });
    }

    let deadline = Instant::now() + timeout;
    loop {
        let scan = scan_downloads(dir, extension).map_err(ClosingError::io(dir))?;
        if scan.reports.len() >= expected && scan.partial == 0 {
            debug!(files = scan.reports.len(), "downloads settled");
            return Ok(scan.reports.len());
        }

        if Instant::now() >= deadline {
            warn!(
                expected,
                found = scan.reports.len(),
                partial = scan.partial,
                "timed out waiting for downloads"
            );
            return Ok(scan.reports.len());
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Removes report files and in-progress downloads left in `dir`.
///
/// Returns the number of files removed. Other files are kept, and a missing
/// directory holds nothing to remove.
///
/// # Errors
///
/// Returns [`ClosingError::Io`] if `dir` cannot be listed or a file cannot be
/// removed.
pub fn discard_downloads(dir: &Path, extension: &str) -> Result<usize, ClosingError> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let suffix = format!(".{extension}");
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(ClosingError::io(dir))? {
        let entry = entry.map_err(ClosingError::io(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(&suffix) || name.ends_with(PARTIAL_SUFFIX) {
            fs::remove_file(&path).map_err(ClosingError::io(&path))?;
            removed += 1;
        }
    }

    if removed > 0 {
        debug!(dir = %dir.display(), removed, "discarded downloads");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_returns_when_all_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("bb.csv"), "x").unwrap();

        let found = wait_for_downloads(dir.path(), 2, "csv", Duration::from_secs(5), POLL)
            .await
            .unwrap();
        assert_eq!(found, 2);
    }

    #[tokio::test]
    async fn test_times_out_short() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();

        let found = wait_for_downloads(dir.path(), 3, "csv", Duration::from_millis(50), POLL)
            .await
            .unwrap();
        assert_eq!(found, 1);
    }

    #[tokio::test]
    async fn test_waits_for_partial_downloads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("bb.csv.part"), "x").unwrap();

        let path = dir.path().to_path_buf();
        let finisher = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            fs::rename(path.join("bb.csv.part"), path.join("bb.csv")).unwrap();
        });

        let found = wait_for_downloads(dir.path(), 1, "csv", Duration::from_secs(5), POLL)
            .await
            .unwrap();
        finisher.await.unwrap();
        assert_eq!(found, 2);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = wait_for_downloads(&dir.path().join("nope"), 1, "csv", POLL, POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, ClosingError::SourceMissing { .. }));
    }

    #[test]
    fn test_discard_downloads_keeps_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("bb.csv.part"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let removed = discard_downloads(dir.path(), "csv").unwrap();

        assert_eq!(removed, 2);
        assert!(!dir.path().join("a.csv").exists());
        assert!(!dir.path().join("bb.csv.part").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_discard_downloads_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discard_downloads(&dir.path().join("nope"), "csv").unwrap(), 0);
    }
}
