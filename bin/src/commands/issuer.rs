//! Issuer command implementation.

use anyhow::Result;
use bolsar_lib::prelude::*;

use crate::browser::{self, BrowserOptions};
use crate::display::describe_issuer;

/// Print the issuer and nominal value of each symbol.
pub(crate) async fn issuer(options: &BrowserOptions, symbols: &[String]) -> Result<()> {
    let browser = options.launch(None).await?;
    let portal = PortalConfig::default();

    for symbol in symbols {
        match fetch_issuer_summary(&browser, &portal, symbol).await {
            Ok(summary) => println!("{}", describe_issuer(&summary)),
            Err(e) => eprintln!("{symbol}: {e}"),
        }
    }

    browser::close(browser).await;
    Ok(())
}
