//! Pairing of downloaded report files with report labels.
//!
//! Browser downloads complete in no particular order, so files cannot be
//! matched to labels by arrival time. The download names are assigned in an
//! order that agrees with sorting them by length and then lexicographically
//! (`file.csv`, `file(1).csv`, ..., `file(10).csv`); after that sort the
//! `i`-th file belongs to the `i`-th label.

use bolsar_types::Label;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ClosingError;

/// Suffix of downloads that are still being written.
pub(crate) const PARTIAL_SUFFIX: &str = ".part";

/// One report file moved into its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledFile {
    /// Label the file was paired with.
    pub label: Label,
    /// Download path before the move.
    pub source: PathBuf,
    /// Final path, `<destination>/<label>.<extension>`.
    pub destination: PathBuf,
}

/// Orders file names by character count, then lexicographically.
#[must_use]
pub fn reconciliation_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .count()
        .cmp(&b.chars().count())
        .then_with(|| a.cmp(b))
}

/// Contents of a download directory.
#[derive(Debug, Default)]
pub(crate) struct DownloadScan {
    /// Completed report files, in reconciliation order.
    pub(crate) reports: Vec<String>,
    /// Downloads still in progress.
    pub(crate) partial: usize,
}

/// Lists the report files and in-progress downloads in `dir`.
pub(crate) fn scan_downloads(dir: &Path, extension: &str) -> io::Result<DownloadScan> {
    let suffix = format!(".{extension}");
    let mut scan = DownloadScan::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        // Names that are not valid UTF-8 cannot be browser report downloads
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(PARTIAL_SUFFIX) {
            scan.partial += 1;
        } else if name.ends_with(&suffix) {
            scan.reports.push(name);
        }
    }

    scan.reports.sort_by(|a, b| reconciliation_order(a, b));
    Ok(scan)
}

/// Moves every downloaded report in `source` into `destination`, renamed
/// after the label at the same position.
///
/// Files without the report extension are left in place. The destination is
/// created when absent. Nothing is moved unless the number of report files
/// equals the number of labels.
///
/// # Errors
///
/// Returns [`ClosingError::SourceMissing`] if `source` does not exist and
/// [`ClosingError::Reconciliation`] if the counts differ.
pub fn reconcile(
    source: &Path,
    destination: &Path,
    labels: &[Label],
    extension: &str,
) -> Result<Vec<ReconciledFile>, ClosingError> {
    if !source.is_dir() {
        return Err(ClosingError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let scan = scan_downloads(source, extension).map_err(ClosingError::io(source))?;
    if scan.reports.len() != labels.len() {
        return Err(ClosingError::Reconciliation {
            labels: labels.len(),
            files: scan.reports.len(),
        });
    }

    fs::create_dir_all(destination).map_err(ClosingError::io(destination))?;

    let mut reconciled = Vec::with_capacity(labels.len());
    for (label, name) in labels.iter().zip(scan.reports) {
        let from = source.join(&name);
        let to = destination.join(label.file_name(extension));
        move_file(&from, &to)?;
        debug!(from = %from.display(), to = %to.display(), "reconciled report");
        reconciled.push(ReconciledFile {
            label: label.clone(),
            source: from,
            destination: to,
        });
    }

    info!(
        files = reconciled.len(),
        destination = %destination.display(),
        "reconciled downloads"
    );
    Ok(reconciled)
}

/// Renames `from` to `to`, copying across filesystems when needed.
fn move_file(from: &Path, to: &Path) -> Result<(), ClosingError> {
    let move_error = |source: io::Error| ClosingError::MoveFile {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).map_err(move_error)?;
            fs::remove_file(from).map_err(move_error)
        }
        Err(e) => Err(move_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().copied().map(Label::normalize).collect()
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_reconciliation_order() {
        let mut names = vec!["file(10).csv", "b.csv", "file(2).csv", "aa.csv", "file.csv"];
        names.sort_by(|a, b| reconciliation_order(a, b));
        assert_eq!(
            names,
            vec!["b.csv", "aa.csv", "file.csv", "file(2).csv", "file(10).csv"]
        );
    }

    #[test]
    fn test_reconcile_pairs_by_length_then_name() {
        let source = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let destination = root.path().join("2023-07-14");
        touch(source.path(), &["bb.csv", "a.csv"]);

        let files = reconcile(
            source.path(),
            &destination,
            &labels(&["bonos", "acciones"]),
            "csv",
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(fs::read_to_string(destination.join("bonos.csv")).unwrap(), "a.csv");
        assert_eq!(
            fs::read_to_string(destination.join("acciones.csv")).unwrap(),
            "bb.csv"
        );
        assert!(!source.path().join("a.csv").exists());
        assert!(!source.path().join("bb.csv").exists());
    }

    #[test]
    fn test_reconcile_length_beats_lexicographic() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        touch(source.path(), &["file(10).csv", "file(2).csv", "file.csv"]);

        reconcile(
            source.path(),
            destination.path(),
            &labels(&["first", "second", "third"]),
            "csv",
        )
        .unwrap();

        let read = |name: &str| fs::read_to_string(destination.path().join(name)).unwrap();
        assert_eq!(read("first.csv"), "file.csv");
        assert_eq!(read("second.csv"), "file(2).csv");
        assert_eq!(read("third.csv"), "file(10).csv");
    }

    #[test]
    fn test_reconcile_ignores_other_files() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        touch(source.path(), &["a.csv", "z.txt", "bb.csv", "notes.json"]);

        let files = reconcile(
            source.path(),
            destination.path(),
            &labels(&["bonos", "acciones"]),
            "csv",
        )
        .unwrap();

        assert_eq!(files[0].label.as_str(), "bonos");
        assert_eq!(files[0].source, source.path().join("a.csv"));
        assert!(source.path().join("z.txt").exists());
        assert!(source.path().join("notes.json").exists());
    }

    #[test]
    fn test_reconcile_too_few_files() {
        let source = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let destination = root.path().join("2023-07-14");
        touch(source.path(), &["a.csv"]);

        let err = reconcile(
            source.path(),
            &destination,
            &labels(&["bonos", "acciones"]),
            "csv",
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ClosingError::Reconciliation { labels: 2, files: 1 }
        ));
        assert!(source.path().join("a.csv").exists());
        assert!(!destination.exists());
    }

    #[test]
    fn test_reconcile_too_many_reports() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        touch(source.path(), &["a.csv", "b.csv", "c.csv"]);

        let err = reconcile(source.path(), destination.path(), &labels(&["bonos"]), "csv")
            .unwrap_err();
        assert!(matches!(
            err,
            ClosingError::Reconciliation { labels: 1, files: 3 }
        ));
    }

    #[test]
    fn test_reconcile_missing_source() {
        let root = tempfile::tempdir().unwrap();
        let err = reconcile(
            &root.path().join("missing"),
            &root.path().join("out"),
            &labels(&["bonos"]),
            "csv",
        )
        .unwrap_err();
        assert!(matches!(err, ClosingError::SourceMissing { .. }));
    }

    #[test]
    fn test_scan_counts_partial_downloads() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.csv", "b.csv.part", "readme.txt"]);
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let scan = scan_downloads(dir.path(), "csv").unwrap();
        assert_eq!(scan.reports, vec!["a.csv".to_string()]);
        assert_eq!(scan.partial, 1);
    }
}
