/// Reference fee feed: advisory market fee guidance polled on an interval
///
/// The feed is never required for correctness. The poller keeps the last good
/// value on failure and starts from `ReferenceFees::default()` so fee
/// resolution always has something to work with.

use crate::api::ReferenceFeeSource;
use crate::errors::SwapletError;
use crate::logger::{self, LogTag};
use crate::types::ReferenceFees;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReferenceFeeResponse {
    jup: JupLevels,
    #[serde(rename = "swapFee")]
    swap_fee: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JupLevels {
    m: u64,
    h: u64,
    vh: u64,
}

impl ReferenceFeeResponse {
    fn into_fees(self) -> ReferenceFees {
        ReferenceFees {
            medium_lamports: self.jup.m,
            high_lamports: self.jup.h,
            very_high_lamports: self.jup.vh,
            swap_fee_lamports: self.swap_fee.unwrap_or(0),
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ReferenceFeeClient {
    client: Client,
    url: String,
}

impl ReferenceFeeClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReferenceFeeSource for ReferenceFeeClient {
    async fn fetch_reference_fees(&self) -> Result<ReferenceFees, SwapletError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            SwapletError::network_error(format!("Reference fee request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(SwapletError::api_error(format!(
                "Reference fee request failed ({})",
                response.status()
            )));
        }

        let parsed: ReferenceFeeResponse = response.json().await.map_err(|e| {
            SwapletError::parse_error(format!("Reference fee response parse failed: {}", e))
        })?;

        Ok(parsed.into_fees())
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Spawn the background poller. The returned receiver always holds the most
/// recent good value (or the defaults before the first successful poll); the
/// handle is aborted when the engine unmounts.
pub fn spawn_reference_fee_poller(
    source: Arc<dyn ReferenceFeeSource>,
    interval: Duration,
) -> (watch::Receiver<ReferenceFees>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(ReferenceFees::default());

    let handle = tokio::spawn(async move {
        loop {
            match source.fetch_reference_fees().await {
                Ok(fees) => {
                    logger::debug(
                        LogTag::Fees,
                        &format!(
                            "Reference fees updated: m={}, h={}, vh={} lamports",
                            fees.medium_lamports, fees.high_lamports, fees.very_high_lamports
                        ),
                    );
                    let _ = tx.send(fees);
                }
                Err(e) => {
                    // Advisory data: keep the last good value and try again next tick
                    logger::warning(
                        LogTag::Fees,
                        &format!("Reference fee poll failed, keeping last value: {}", e),
                    );
                }
            }
            tokio::time::sleep(interval).await;
        }
    });

    (rx, handle)
}
