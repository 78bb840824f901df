/*
[INPUT]:  OANDA_TOKEN (optional; sandbox when unset), OANDA_INSTRUMENTS, RUST_LOG
[OUTPUT]: Price snapshots printed whenever they change
[POS]:    Examples - conditional polling of the rates endpoint
[UPDATE]: When client construction or polling API changes
*/

use std::time::Duration;

use oanda_adapter::*;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Prices {
    #[serde(flatten)]
    error: ApiError,
    #[serde(default)]
    prices: Vec<serde_json::Value>,
}

impl ApiResponse for Prices {
    fn api_error(&self) -> &ApiError {
        &self.error
    }
}

/// Example: poll prices, printing only when the server reports a change
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = match std::env::var("OANDA_TOKEN") {
        Ok(token) => Client::fx_practice(&token)?,
        Err(_) => {
            info!("OANDA_TOKEN not set; creating a sandbox user");
            Client::sandbox().await?
        }
    };
    info!(environment = %client.environment(), "client ready");

    let instruments =
        std::env::var("OANDA_INSTRUMENTS").unwrap_or_else(|_| "EUR_USD,USD_JPY".to_string());
    let mut poller = client.poll_request(&format!("/v1/prices?instruments={instruments}"))?;

    for _ in 0..10 {
        match poller.poll_json::<Prices>().await {
            Ok(Some(prices)) => {
                for price in &prices.prices {
                    println!("{price}");
                }
            }
            Ok(None) => info!(etag = ?poller.etag(), "prices unchanged"),
            Err(err) => warn!(error = %err, "poll failed; retrying"),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}
