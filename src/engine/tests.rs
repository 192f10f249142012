/// Engine scenario tests
///
/// Everything runs against fake collaborators on shortened real timers, so
/// the suite exercises the actual debounce/supersession/attempt machinery
/// without touching the network.

use crate::api::{
    ExecuteRequest, ExecuteResponse, ExecutionEndpoint, OrderRequest, OrderResponse, QuoteSource,
    ReferenceFeeSource, RoutePlanStep, SwapInfo, WalletSigner,
};
use crate::context::{EngineConfig, EngineContext};
use crate::engine::view::QuotePhase;
use crate::engine::SwapEngine;
use crate::errors::{SwapFlowError, SwapletError};
use crate::settings::UserSettings;
use crate::types::{
    FeeSettings, LastSwapResult, PriorityLevel, PriorityMode, ReferenceFees, SwapStatus, TokenInfo,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn sol() -> TokenInfo {
    TokenInfo::new(SOL_MINT, "SOL", 9)
}

fn usdc() -> TokenInfo {
    TokenInfo::new(USDC_MINT, "USDC", 6)
}

// =============================================================================
// FAKE COLLABORATORS
// =============================================================================

/// Quotes out 95% of the input, scaled from 9 to 6 decimals, so 1.0 SOL in
/// shows as 0.95 out
struct FakeQuoteSource {
    requests: Mutex<Vec<OrderRequest>>,
    /// Per-amount artificial latency, for racing fetches against each other
    delays: Mutex<HashMap<u64, Duration>>,
    fail: AtomicBool,
    next_request_id: AtomicU64,
}

impl FakeQuoteSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
            next_request_id: AtomicU64::new(1),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn set_delay(&self, amount_raw: u64, delay: Duration) {
        self.delays.lock().insert(amount_raw, delay);
    }
}

#[async_trait]
impl QuoteSource for FakeQuoteSource {
    async fn fetch_order(&self, request: &OrderRequest) -> Result<OrderResponse, SwapletError> {
        self.requests.lock().push(request.clone());

        let delay = self.delays.lock().get(&request.amount_raw).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(SwapletError::api_error("no route found"));
        }

        let out_amount = request.amount_raw * 95 / 100 / 1000;
        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        Ok(OrderResponse {
            input_mint: request.input_mint.clone(),
            in_amount: request.amount_raw.to_string(),
            output_mint: request.output_mint.clone(),
            out_amount: out_amount.to_string(),
            other_amount_threshold: (out_amount * 99 / 100).to_string(),
            price_impact_pct: "0.01".to_string(),
            route_plan: vec![RoutePlanStep {
                swap_info: SwapInfo {
                    amm_key: "amm1".to_string(),
                    label: Some("Orca".to_string()),
                },
            }],
            fee_bps: Some(5),
            transaction: Some("AQID".to_string()),
            request_id: format!("req-{}", id),
        })
    }
}

enum ExecuteScript {
    Success,
    Failed(&'static str),
    NetworkError,
}

struct FakeExecutionEndpoint {
    script: ExecuteScript,
    calls: AtomicUsize,
}

impl FakeExecutionEndpoint {
    fn new(script: ExecuteScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ExecutionEndpoint for FakeExecutionEndpoint {
    async fn execute(&self, _request: &ExecuteRequest) -> Result<ExecuteResponse, SwapletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            ExecuteScript::Success => Ok(ExecuteResponse {
                signature: Some("sig123".to_string()),
                status: "Success".to_string(),
                error: None,
                code: None,
            }),
            ExecuteScript::Failed(message) => Ok(ExecuteResponse {
                signature: Some("sig456".to_string()),
                status: "Failed".to_string(),
                error: Some(message.to_string()),
                code: Some(-1),
            }),
            ExecuteScript::NetworkError => Err(SwapletError::network_error("connection reset")),
        }
    }
}

struct FakeFeeSource;

#[async_trait]
impl ReferenceFeeSource for FakeFeeSource {
    async fn fetch_reference_fees(&self) -> Result<ReferenceFees, SwapletError> {
        Ok(ReferenceFees::default())
    }
}

enum SignerScript {
    Sign,
    Reject,
    /// Sign after holding the prompt open for a while
    SignAfter(Duration),
}

struct FakeSigner {
    script: SignerScript,
}

impl FakeSigner {
    fn new(script: SignerScript) -> Arc<Self> {
        Arc::new(Self { script })
    }
}

#[async_trait]
impl WalletSigner for FakeSigner {
    fn address(&self) -> String {
        "taker1111111111111111111111111111111111111111".to_string()
    }

    async fn sign_transaction(&self, transaction_base64: &str) -> Result<String, SwapletError> {
        match &self.script {
            SignerScript::Sign => Ok(format!("signed:{}", transaction_base64)),
            SignerScript::Reject => Err(SwapletError::wallet_error("user declined the request")),
            SignerScript::SignAfter(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(format!("signed:{}", transaction_base64))
            }
        }
    }
}

struct FakeBalances {
    balance_raw: u64,
    refreshed: AtomicBool,
}

impl FakeBalances {
    fn new(balance_raw: u64) -> Arc<Self> {
        Arc::new(Self {
            balance_raw,
            refreshed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl crate::api::BalanceProvider for FakeBalances {
    async fn balance_raw(&self, _owner: &str, _mint: &str) -> Result<u64, SwapletError> {
        Ok(self.balance_raw)
    }

    async fn refresh(&self, _owner: &str) {
        self.refreshed.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// HARNESS
// =============================================================================

fn test_config(validity_ms: u64) -> EngineConfig {
    EngineConfig {
        debounce: Duration::from_millis(40),
        quote_validity: Duration::from_millis(validity_ms),
        freshness_tick: Duration::from_millis(25),
        quote_retry_delay: Duration::from_millis(10),
        reference_fee_poll: Duration::from_secs(60),
        ..EngineConfig::default()
    }
}

fn mount_engine(
    validity_ms: u64,
    quotes: Arc<FakeQuoteSource>,
    execution: Arc<FakeExecutionEndpoint>,
) -> SwapEngine {
    let ctx = EngineContext::with_sources(
        test_config(validity_ms),
        UserSettings::in_memory(),
        quotes,
        execution,
        Arc::new(FakeFeeSource),
    );
    SwapEngine::mount(ctx)
}

/// Poll the view until a predicate holds, or panic after the timeout
async fn wait_for<F>(engine: &SwapEngine, timeout: Duration, predicate: F) -> crate::SwapView
where
    F: Fn(&crate::SwapView) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let view = engine.view();
        if predicate(&view) {
            return view;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within {:?}: {:?}", timeout, view.phase);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Engine with tokens set and a quote already landed for `amount`
async fn engine_with_quote(
    validity_ms: u64,
    quotes: Arc<FakeQuoteSource>,
    execution: Arc<FakeExecutionEndpoint>,
    amount: &str,
) -> SwapEngine {
    let engine = mount_engine(validity_ms, quotes, execution);
    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount(amount);
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    engine
}

// =============================================================================
// DEBOUNCE & INPUT
// =============================================================================

#[tokio::test]
async fn rapid_input_coalesces_to_one_fetch() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(10_000, quotes.clone(), execution);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("1");
    engine.set_amount("1.5");
    engine.set_amount("2");

    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    assert_eq!(quotes.request_count(), 1);
    let request = quotes.requests.lock()[0].clone();
    assert_eq!(request.amount_raw, 2_000_000_000);
}

#[tokio::test]
async fn no_fetch_before_the_quiet_interval() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(10_000, quotes.clone(), execution);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("1");

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(quotes.request_count(), 0);
    assert_eq!(engine.view().phase, QuotePhase::Debouncing);
}

#[tokio::test]
async fn non_numeric_input_is_ignored_and_quote_retained() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes.clone(), execution, "1.5").await;

    engine.set_amount("abc");
    engine.set_amount("1.2.3");

    let view = engine.view();
    assert_eq!(view.form.input_amount, "1.5");
    // Rejected keystrokes never invalidate the current quote
    assert!(view.quote.is_some());
    assert_eq!(quotes.request_count(), 1);
}

#[tokio::test]
async fn amount_over_ceiling_is_rejected_synchronously() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(10_000, quotes.clone(), execution);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("999999999999");

    let view = engine.view();
    assert!(matches!(
        view.error,
        Some(SwapFlowError::AmountExceedsCeiling { .. })
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(quotes.request_count(), 0);
}

// =============================================================================
// SUPERSESSION & INVALIDATION
// =============================================================================

#[tokio::test]
async fn last_request_wins_even_when_the_old_one_resolves_late() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    // First amount answers slowly, second answers fast
    quotes.set_delay(1_000_000_000, Duration::from_millis(200));
    quotes.set_delay(2_000_000_000, Duration::from_millis(5));

    let engine = mount_engine(10_000, quotes.clone(), execution);
    engine.set_input_token(sol());
    engine.set_output_token(usdc());

    engine.set_amount("1");
    // Let the debounce elapse so the slow fetch is in flight
    tokio::time::sleep(Duration::from_millis(80)).await;
    engine.set_amount("2");

    let view = wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    let expected_out = 2_000_000_000u64 * 95 / 100 / 1000;
    assert_eq!(view.quote.as_ref().unwrap().in_amount_raw, 2_000_000_000);
    assert_eq!(view.quote.as_ref().unwrap().out_amount_raw, expected_out);

    // Even after the slow response's latency has fully elapsed, the newer
    // quote must still be current
    tokio::time::sleep(Duration::from_millis(250)).await;
    let view = engine.view();
    assert_eq!(view.quote.as_ref().unwrap().in_amount_raw, 2_000_000_000);
}

#[tokio::test]
async fn mint_change_invalidates_the_quote_before_a_new_one_arrives() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution, "1").await;

    engine.set_output_token(TokenInfo::new("NewMint1111", "NEW", 6));

    // Synchronously gone, the UI never sees a quote for a stale pair
    let view = engine.view();
    assert!(view.quote.is_none());
    assert!(view.form.output_amount.is_empty());
}

#[tokio::test]
async fn fetch_failure_surfaces_as_route_error() {
    let quotes = FakeQuoteSource::new();
    quotes.fail.store(true, Ordering::SeqCst);
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(10_000, quotes.clone(), execution);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("1");

    let view = wait_for(&engine, Duration::from_secs(2), |v| {
        v.phase == QuotePhase::Errored
    })
    .await;
    assert_eq!(view.error, Some(SwapFlowError::CouldNotFindAnyRoute));
    assert!(view.quote.is_none());
    assert!(view.errored_at.is_some());

    // A working fetch clears the failure timestamp along with the error
    quotes.fail.store(false, Ordering::SeqCst);
    engine.refresh_quote();
    let view = wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    assert!(view.errored_at.is_none());
}

// =============================================================================
// FRESHNESS
// =============================================================================

#[tokio::test]
async fn quote_expires_after_the_validity_window() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(150, quotes, execution, "1").await;

    let view = engine.view();
    assert!(!view.freshness.unwrap().has_expired);

    let view = wait_for(&engine, Duration::from_secs(2), |v| {
        v.freshness.map(|f| f.has_expired).unwrap_or(false)
    })
    .await;
    assert_eq!(view.error, Some(SwapFlowError::QuoteExpired));
    assert!(!view.can_submit());
}

#[tokio::test]
async fn refresh_quote_recovers_from_expiry() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(150, quotes.clone(), execution, "1").await;

    wait_for(&engine, Duration::from_secs(2), |v| {
        v.error == Some(SwapFlowError::QuoteExpired)
    })
    .await;

    engine.refresh_quote();
    let view = wait_for(&engine, Duration::from_secs(2), |v| {
        v.error.is_none() && v.quote.is_some()
    })
    .await;
    assert!(!view.freshness.unwrap().has_expired);
    assert_eq!(quotes.request_count(), 2);
}

// =============================================================================
// EXECUTION
// =============================================================================

#[tokio::test]
async fn happy_path_records_success_and_refreshes_balances() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let balances = FakeBalances::new(u64::MAX);

    let ctx = EngineContext::with_sources(
        test_config(10_000),
        UserSettings::in_memory(),
        quotes,
        execution.clone(),
        Arc::new(FakeFeeSource),
    )
    .with_balances(balances.clone());
    let engine = SwapEngine::mount(ctx);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    engine.set_amount("1");
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let result = engine.execute().await.expect("preflight must pass");
    match &result {
        LastSwapResult::Success { txid, in_amount_raw, .. } => {
            assert_eq!(txid, "sig123");
            assert_eq!(*in_amount_raw, 1_000_000_000);
        }
        other => panic!("expected success, got {:?}", other),
    }

    let view = engine.view();
    assert_eq!(view.attempt.status, SwapStatus::Success);
    assert_eq!(view.attempt.txid.as_deref(), Some("sig123"));
    assert_eq!(execution.calls.load(Ordering::SeqCst), 1);

    // Fire-and-forget refresh lands shortly after
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(balances.refreshed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn wallet_rejection_fails_the_attempt_without_submitting() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution.clone(), "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Reject) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let result = engine.execute().await.expect("rejection is a terminal outcome");
    assert!(matches!(
        result,
        LastSwapResult::Error(SwapFlowError::WalletRejected { .. })
    ));
    assert_eq!(engine.view().attempt.status, SwapStatus::Fail);
    // Nothing ever reached the execution endpoint
    assert_eq!(execution.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_execute_is_rejected_while_pending_approval() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution.clone(), "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::SignAfter(
        Duration::from_millis(150),
    )) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let (first, second) = tokio::join!(engine.execute(), async {
        tokio::time::sleep(Duration::from_millis(40)).await;
        engine.execute().await
    });

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), SwapFlowError::SwapInProgress);
    // Exactly one submission despite two calls
    assert_eq!(execution.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn execute_without_wallet_fails_fast() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution.clone(), "1").await;

    let err = engine.execute().await.unwrap_err();
    assert_eq!(err, SwapFlowError::MissingWallet);
    assert_eq!(execution.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_quote_blocks_submission() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(150, quotes, execution.clone(), "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    wait_for(&engine, Duration::from_secs(2), |v| {
        v.freshness.map(|f| f.has_expired).unwrap_or(false)
    })
    .await;

    let err = engine.execute().await.unwrap_err();
    assert_eq!(err, SwapFlowError::QuoteExpired);
    assert_eq!(execution.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn insufficient_balance_blocks_before_any_network_call() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let balances = FakeBalances::new(10);

    let ctx = EngineContext::with_sources(
        test_config(10_000),
        UserSettings::in_memory(),
        quotes,
        execution.clone(),
        Arc::new(FakeFeeSource),
    )
    .with_balances(balances);
    let engine = SwapEngine::mount(ctx);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    engine.set_amount("1");
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let err = engine.execute().await.unwrap_err();
    assert!(matches!(err, SwapFlowError::InsufficientBalance { .. }));
    assert_eq!(engine.view().attempt.status, SwapStatus::Idle);
    assert_eq!(execution.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expiry_class_endpoint_failure_becomes_timeout() {
    let quotes = FakeQuoteSource::new();
    let execution =
        FakeExecutionEndpoint::new(ExecuteScript::Failed("transaction expired: block height exceeded"));
    let engine = engine_with_quote(10_000, quotes, execution, "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let result = engine.execute().await.expect("terminal outcome");
    assert!(matches!(
        result,
        LastSwapResult::Error(SwapFlowError::TransactionExpired { .. })
    ));
    let view = engine.view();
    assert_eq!(view.attempt.status, SwapStatus::Timeout);
    // Endpoint signature preserved for user-side lookup
    assert_eq!(view.attempt.txid.as_deref(), Some("sig456"));
}

#[tokio::test]
async fn plain_endpoint_failure_preserves_message_and_signature() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Failed("slippage tolerance exceeded"));
    let engine = engine_with_quote(10_000, quotes, execution, "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let result = engine.execute().await.expect("terminal outcome");
    match result {
        LastSwapResult::Error(SwapFlowError::SubmissionFailed { message, signature }) => {
            assert_eq!(message, "slippage tolerance exceeded");
            assert_eq!(signature.as_deref(), Some("sig456"));
        }
        other => panic!("expected submission failure, got {:?}", other),
    }
    assert_eq!(engine.view().attempt.status, SwapStatus::Fail);
}

#[tokio::test]
async fn last_result_survives_starting_a_new_attempt() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution, "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    engine.execute().await.expect("first swap succeeds");
    assert!(matches!(
        engine.view().last_result,
        Some(LastSwapResult::Success { .. })
    ));

    // Second attempt holds the wallet prompt open; the prior outcome must
    // stay visible the whole time it is pending
    engine.set_wallet(Some(FakeSigner::new(SignerScript::SignAfter(
        Duration::from_millis(200),
    )) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;

    let (second, pending_view) = tokio::join!(engine.execute(), async {
        wait_for(&engine, Duration::from_secs(2), |v| {
            v.attempt.status == SwapStatus::PendingApproval
        })
        .await
    });
    assert!(matches!(
        pending_view.last_result,
        Some(LastSwapResult::Success { .. })
    ));
    second.expect("second swap succeeds");
}

#[tokio::test]
async fn zero_priority_fee_is_flagged_in_the_view() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(10_000, quotes, execution);

    engine.save_fee_settings(&FeeSettings {
        priority_mode: PriorityMode::Exact,
        priority_level: PriorityLevel::High,
        priority_fee_sol: 0.0,
    });
    assert!(engine.view().zero_fee_warning);

    // The flag sticks through the fetch path
    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("1");
    let view = wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    assert!(view.zero_fee_warning);

    // A non-zero fee clears it
    engine.save_fee_settings(&FeeSettings::default());
    assert!(!engine.view().zero_fee_warning);
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn one_sol_in_displays_095_out_then_expires() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = mount_engine(200, quotes, execution);

    engine.set_input_token(sol());
    engine.set_output_token(usdc());
    engine.set_amount("1.0");

    let view = wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    // 1.0 SOL in, outAmount 950000 at 6 decimals
    assert_eq!(view.quote.as_ref().unwrap().out_amount_raw, 950_000);
    assert_eq!(view.form.output_amount, "0.95");
    assert!(view.can_submit() || view.freshness.is_some());

    // After the validity window the expired scenario activates
    let view = wait_for(&engine, Duration::from_secs(2), |v| {
        v.error == Some(SwapFlowError::QuoteExpired)
    })
    .await;
    assert!(!view.can_submit());
}

#[tokio::test]
async fn reset_recreates_the_form_and_clears_results() {
    let quotes = FakeQuoteSource::new();
    let execution = FakeExecutionEndpoint::new(ExecuteScript::Success);
    let engine = engine_with_quote(10_000, quotes, execution, "1").await;
    engine.set_wallet(Some(FakeSigner::new(SignerScript::Sign) as Arc<dyn WalletSigner>));
    wait_for(&engine, Duration::from_secs(2), |v| v.quote.is_some()).await;
    engine.execute().await.expect("swap succeeds");

    engine.reset();

    let view = engine.view();
    assert!(view.form.input_token.is_none());
    assert!(view.form.input_amount.is_empty());
    assert!(view.quote.is_none());
    assert!(view.last_result.is_none());
    assert_eq!(view.attempt.status, SwapStatus::Idle);
}
