//! Closing command implementation.
//!
//! Acquires the closing reports of each requested date into
//! `<directory>/<YYYY-MM-DD>/`, reporting every date's outcome and carrying
//! on past failures.

use anyhow::{Context, Result, bail};
use bolsar_lib::prelude::*;
use std::path::Path;
use std::time::Duration;

use crate::browser::{self, BrowserOptions};
use crate::display::{describe_outcome, progress_bar};

/// Parses the requested dates, defaulting to today.
fn parse_dates(dates: &[String]) -> Result<Vec<DateKey>> {
    if dates.is_empty() {
        return Ok(vec![DateKey::today()]);
    }
    dates
        .iter()
        .map(|s| DateKey::parse(s).with_context(|| format!("Invalid date: {s}")))
        .collect()
}

/// Download the closing data of every requested date.
pub(crate) async fn closing(
    options: &BrowserOptions,
    directory: &Path,
    dates: &[String],
    negotiated_amounts: bool,
    download_timeout: u64,
    quiet: bool,
) -> Result<()> {
    let dates = parse_dates(dates)?;
    let destination = browser::working_directory(directory)?;

    // Fresh download directory so only this run's files get reconciled
    let downloads = tempfile::Builder::new()
        .prefix("bolsar-downloads-")
        .tempdir()
        .context("Failed to create download directory")?;

    let browser = options.launch(Some(downloads.path())).await?;
    let config = ClosingConfig::new(downloads.path(), &destination)
        .with_negotiated_amounts(negotiated_amounts)
        .with_download_timeout(Duration::from_secs(download_timeout));
    let acquirer = ClosingAcquirer::new(&browser, PortalConfig::default(), config);

    let progress = progress_bar(dates.len() as u64, "dates", quiet)?;
    let mut failed = 0usize;
    for &date in &dates {
        progress.set_message(date.to_string());
        let outcome = acquirer.run(date).await;
        let line = describe_outcome(&outcome);
        if matches!(outcome, DateOutcome::Failed { .. }) {
            failed += 1;
            progress.suspend(|| eprintln!("{line}"));
        } else if !quiet {
            progress.suspend(|| println!("{line}"));
        }
        progress.inc(1);
    }
    progress.finish_with_message(format!("{} dates processed", dates.len()));

    browser::close(browser).await;

    if failed > 0 {
        bail!("{failed} of {} dates failed", dates.len());
    }
    Ok(())
}
