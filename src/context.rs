/// Engine context: explicit, constructed dependencies
///
/// One context per widget mount. Everything the engine needs (endpoints,
/// settings, host collaborators, timing knobs) is built here and injected,
/// so two engines embedded on the same host never share mutable state.

use crate::api::{
    AggregatorClient, BalanceProvider, ExecutionEndpoint, QuoteSource, ReferenceFeeClient,
    ReferenceFeeSource,
};
use crate::settings::UserSettings;
use crate::types::{
    DEBOUNCE_MS, FRESHNESS_TICK_MS, QUOTE_RETRY_DELAY_MS, QUOTE_VALIDITY_MS, REFERENCE_FEE_POLL_MS,
};
use std::sync::Arc;
use std::time::Duration;

/// Timing and endpoint configuration. Defaults match the hosted service;
/// tests shrink the durations to run on real timers.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub aggregator_base_url: String,
    pub reference_fee_url: String,
    pub http_timeout: Duration,
    pub debounce: Duration,
    pub quote_validity: Duration,
    pub freshness_tick: Duration,
    pub quote_retry_delay: Duration,
    pub reference_fee_poll: Duration,
    /// Synchronous ceiling on the typed input amount (UI units)
    pub max_input_amount_ui: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aggregator_base_url: "https://lite-api.jup.ag/ultra/v1".to_string(),
            reference_fee_url: "https://lite-api.jup.ag/ultra/v1/reference-fees".to_string(),
            http_timeout: Duration::from_secs(15),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            quote_validity: Duration::from_millis(QUOTE_VALIDITY_MS),
            freshness_tick: Duration::from_millis(FRESHNESS_TICK_MS),
            quote_retry_delay: Duration::from_millis(QUOTE_RETRY_DELAY_MS),
            reference_fee_poll: Duration::from_millis(REFERENCE_FEE_POLL_MS),
            max_input_amount_ui: 100_000_000.0,
        }
    }
}

/// Injected dependency bundle, created on mount and dropped on unmount
pub struct EngineContext {
    pub config: EngineConfig,
    pub quotes: Arc<dyn QuoteSource>,
    pub execution: Arc<dyn ExecutionEndpoint>,
    pub reference_fees: Arc<dyn ReferenceFeeSource>,
    pub settings: UserSettings,
    /// Optional: without one, balance checks and post-swap refresh are skipped
    pub balances: Option<Arc<dyn BalanceProvider>>,
}

impl EngineContext {
    /// Production wiring: HTTP clients against the configured endpoints
    pub fn new(config: EngineConfig, settings: UserSettings) -> Self {
        let aggregator = Arc::new(AggregatorClient::new(
            config.aggregator_base_url.clone(),
            config.http_timeout,
            config.quote_retry_delay,
        ));
        let reference_fees = Arc::new(ReferenceFeeClient::new(
            config.reference_fee_url.clone(),
            config.http_timeout,
        ));

        Self {
            config,
            quotes: aggregator.clone(),
            execution: aggregator,
            reference_fees,
            settings,
            balances: None,
        }
    }

    /// Custom wiring for tests or alternate transports
    pub fn with_sources(
        config: EngineConfig,
        settings: UserSettings,
        quotes: Arc<dyn QuoteSource>,
        execution: Arc<dyn ExecutionEndpoint>,
        reference_fees: Arc<dyn ReferenceFeeSource>,
    ) -> Self {
        Self {
            config,
            quotes,
            execution,
            reference_fees,
            settings,
            balances: None,
        }
    }

    pub fn with_balances(mut self, balances: Arc<dyn BalanceProvider>) -> Self {
        self.balances = Some(balances);
        self
    }
}
