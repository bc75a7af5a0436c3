//! Progress bars and result printing.

use anyhow::Result;
use bolsar_lib::{DateOutcome, IssuerSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over `len` items, hidden in quiet mode.
pub(crate) fn progress_bar(len: u64, unit: &str, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} {{msg}}"
            ))?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Spinner for a single long-running step, hidden in quiet mode.
pub(crate) fn spinner(message: &str, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// One-line description of a date's outcome.
pub(crate) fn describe_outcome(outcome: &DateOutcome) -> String {
    match outcome {
        DateOutcome::Completed(report) => {
            let mut line = format!(
                "{}: {} reports written to {}",
                report.date,
                report.files.len(),
                report.directory.display()
            );
            if report.negotiated_amounts.is_some() {
                line.push_str(" (with negotiated amounts)");
            }
            line
        }
        DateOutcome::Skipped { date, path } => {
            format!("{date}: skipped, {} already exists", path.display())
        }
        DateOutcome::Failed { date, error } => {
            format!("{date}: failed [{}] {error}", error.kind())
        }
    }
}

/// Tab-separated issuer summary line.
pub(crate) fn describe_issuer(summary: &IssuerSummary) -> String {
    format!(
        "{}\t{}\t{}",
        summary.symbol, summary.issuer, summary.nominal_value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolsar_lib::{ClosingError, DateKey};
    use std::path::PathBuf;

    #[test]
    fn test_describe_skipped() {
        let date = DateKey::parse("2023-07-14").unwrap();
        let line = describe_outcome(&DateOutcome::Skipped {
            date,
            path: PathBuf::from("data/2023-07-14"),
        });
        assert_eq!(line, "2023-07-14: skipped, data/2023-07-14 already exists");
    }

    #[test]
    fn test_describe_failed_has_kind() {
        let date = DateKey::parse("2023-07-15").unwrap();
        let line = describe_outcome(&DateOutcome::Failed {
            date,
            error: ClosingError::Reconciliation { labels: 3, files: 2 },
        });
        assert!(line.starts_with("2023-07-15: failed [reconciliation]"));
    }

    #[test]
    fn test_describe_issuer() {
        let summary = IssuerSummary {
            symbol: "GGAL".to_string(),
            issuer: "GRUPO FINANCIERO GALICIA S.A.".to_string(),
            nominal_value: 1.0,
        };
        assert_eq!(describe_issuer(&summary), "GGAL\tGRUPO FINANCIERO GALICIA S.A.\t1");
    }
}
