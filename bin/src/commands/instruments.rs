//! Instruments command implementation.
//!
//! Fetches reference metadata for the given symbols and writes the records
//! as a JSON array.

use anyhow::{Context, Result};
use bolsar_lib::prelude::*;
use std::path::PathBuf;

use crate::browser::{self, BrowserOptions};
use crate::display::spinner;

/// Fetch metadata records for instrument symbols.
pub(crate) async fn instruments(
    options: &BrowserOptions,
    symbols: &[String],
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let config = MetadataConfig::default();
    let factory =
        HttpSessionFactory::new(config.clone()).context("Failed to prepare the metadata client")?;
    let fetcher = MetadataFetcher::new(factory, config);

    let browser = options.launch(None).await?;
    let progress = spinner(
        &format!("Fetching metadata for {} instruments", symbols.len()),
        quiet,
    )?;
    let result = fetcher.fetch_with_browser(&browser, symbols).await;
    browser::close(browser).await;

    let report = result.context("Failed to fetch instrument metadata")?;
    progress.finish_with_message(format!(
        "Fetched {} records ({} session recreations)",
        report.records.len(),
        report.session_recreations
    ));

    let json = serde_json::to_string_pretty(&report.records)?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                println!("Output written to: {}", path.display());
            }
        }
        None => println!("{json}"),
    }

    Ok(())
}
