/// HTTP client for the hosted aggregator (order + execute endpoints)
///
/// Responses are validated against a strict schema at this boundary and
/// turned into typed, immutable snapshots. Anything the schema rejects is a
/// parse error, never partially-typed data leaking upward.

use crate::api::{
    deserialize_string_or_number, ExecutionEndpoint, QuoteSource, SlippageParam, SwapMode,
};
use crate::errors::SwapletError;
use crate::logger::{self, LogTag};
use crate::types::{QuoteSnapshot, RouteStep};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempts per order fetch (one retry pass, never unbounded)
const ORDER_FETCH_ATTEMPTS: u32 = 2;

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

/// Parameters for one `GET /order` request. The tuple
/// (input_mint, output_mint, amount_raw, taker) is the fetch key the engine
/// uses for supersession.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_raw: u64,
    pub taker: Option<String>,
    pub swap_mode: SwapMode,
    pub slippage: SlippageParam,
    /// Resolved priority fee forwarded so the pre-built transaction carries it
    pub priority_fee_micro_lamports: Option<u64>,
}

impl OrderRequest {
    /// Query pairs in wire form
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount_raw.to_string()),
            ("swapMode", self.swap_mode.as_str().to_string()),
        ];
        if let Some(taker) = &self.taker {
            query.push(("taker", taker.clone()));
        }
        match self.slippage {
            SlippageParam::FixedBps(bps) => {
                query.push(("slippageBps", bps.to_string()));
            }
            SlippageParam::DynamicCapBps(bps) => {
                query.push(("dynamicSlippage", "true".to_string()));
                query.push(("maxDynamicSlippageBps", bps.to_string()));
            }
        }
        if let Some(fee) = self.priority_fee_micro_lamports {
            query.push(("priorityFeeMicroLamports", fee.to_string()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "otherAmountThreshold")]
    pub other_amount_threshold: String,
    #[serde(rename = "priceImpactPct", deserialize_with = "deserialize_string_or_number")]
    pub price_impact_pct: String,
    #[serde(rename = "routePlan")]
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(rename = "feeBps")]
    pub fee_bps: Option<u16>,
    /// Pre-built transaction, present when a taker was supplied
    pub transaction: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RoutePlanStep {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
}

#[derive(Debug, Deserialize)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: String,
    pub label: Option<String>,
}

impl OrderResponse {
    /// Parse-don't-validate: convert the wire response into a typed snapshot,
    /// rejecting anything the schema can't account for
    pub fn into_snapshot(self) -> Result<QuoteSnapshot, SwapletError> {
        let in_amount_raw = self
            .in_amount
            .parse::<u64>()
            .map_err(|e| SwapletError::parse_error(format!("Invalid inAmount: {}", e)))?;
        let out_amount_raw = self
            .out_amount
            .parse::<u64>()
            .map_err(|e| SwapletError::parse_error(format!("Invalid outAmount: {}", e)))?;
        let other_amount_threshold = self.other_amount_threshold.parse::<u64>().map_err(|e| {
            SwapletError::parse_error(format!("Invalid otherAmountThreshold: {}", e))
        })?;
        let price_impact_pct = self
            .price_impact_pct
            .parse::<f64>()
            .map_err(|e| SwapletError::parse_error(format!("Invalid priceImpactPct: {}", e)))?;

        if let Some(tx) = &self.transaction {
            BASE64
                .decode(tx)
                .map_err(|e| SwapletError::parse_error(format!("Invalid transaction blob: {}", e)))?;
        }

        let route = self
            .route_plan
            .into_iter()
            .map(|step| RouteStep {
                label: step.swap_info.label.unwrap_or_else(|| "Unknown".to_string()),
                amm_key: step.swap_info.amm_key,
            })
            .collect();

        Ok(QuoteSnapshot {
            input_mint: self.input_mint,
            output_mint: self.output_mint,
            in_amount_raw,
            out_amount_raw,
            other_amount_threshold,
            price_impact_pct,
            route,
            fee_bps: self.fee_bps.unwrap_or(0),
            request_id: self.request_id,
            transaction: self.transaction,
            fetched_at: tokio::time::Instant::now(),
            fetched_at_utc: chrono::Utc::now(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ExecuteRequest {
    #[serde(rename = "signedTransaction")]
    pub signed_transaction: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteResponse {
    pub signature: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub code: Option<i64>,
}

impl ExecuteResponse {
    pub fn is_success(&self) -> bool {
        self.status == "Success"
    }
}

// =============================================================================
// AGGREGATOR CLIENT
// =============================================================================

pub struct AggregatorClient {
    client: Client,
    base_url: String,
    retry_delay: Duration,
}

impl AggregatorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry_delay: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
            retry_delay,
        }
    }

    async fn fetch_order_once(&self, request: &OrderRequest) -> Result<OrderResponse, SwapletError> {
        let url = format!("{}/order", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&request.query())
            .send()
            .await
            .map_err(|e| SwapletError::network_error(format!("Order request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(SwapletError::api_error(format!(
                "Order request failed ({}): {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SwapletError::network_error(format!("Failed to read order body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| SwapletError::parse_error(format!("Order response parse failed: {}", e)))
    }
}

#[async_trait]
impl QuoteSource for AggregatorClient {
    async fn fetch_order(&self, request: &OrderRequest) -> Result<OrderResponse, SwapletError> {
        let mut last_error = None;

        for attempt in 1..=ORDER_FETCH_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
                logger::debug(
                    LogTag::Api,
                    &format!("Order fetch attempt {}/{}", attempt, ORDER_FETCH_ATTEMPTS),
                );
            }

            match self.fetch_order_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    logger::warning(
                        LogTag::Api,
                        &format!(
                            "Order fetch failed ({} -> {}, attempt {}/{}): {}",
                            request.input_mint,
                            request.output_mint,
                            attempt,
                            ORDER_FETCH_ATTEMPTS,
                            e
                        ),
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SwapletError::internal_error("order fetch produced no result")))
    }
}

#[async_trait]
impl ExecutionEndpoint for AggregatorClient {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, SwapletError> {
        let url = format!("{}/execute", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SwapletError::network_error(format!("Execute request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(SwapletError::api_error(format!(
                "Execute request failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SwapletError::parse_error(format!("Execute response parse failed: {}", e)))
    }
}
