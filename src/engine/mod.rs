/// Swap engine: the single source of truth for the widget
///
/// Composes the debounced input tracker, quote fetcher, fee resolver,
/// freshness timer and swap executor into one consistent, observable state
/// object. All mutation goes through the setters here; the UI consumes
/// `SwapView` snapshots from a watch channel.
///
/// Concurrency model: one supervisor task owns the debounce timer and the
/// freshness tick and serializes every state transition through an event
/// channel. Quote fetches run as aborted-on-supersede tasks tagged with a
/// generation counter, so a late result for an abandoned key can never
/// overwrite newer state.

pub mod executor;
pub mod fetcher;
pub mod freshness;
pub mod input;
pub mod view;

#[cfg(test)]
mod tests;

use crate::api::{OrderRequest, SwapMode, WalletSigner};
use crate::context::EngineContext;
use crate::errors::{SwapFlowError, SwapletError};
use crate::fees;
use crate::logger::{self, LogTag};
use crate::settings::UserSettings;
use crate::types::{
    FeeSettings, LastSwapResult, QuoteSnapshot, ReferenceFees, SlippageMode, SwapAttempt, SwapForm,
    TokenInfo,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use view::{QuotePhase, SwapView};

// =============================================================================
// EVENTS & STATE
// =============================================================================

/// Discrete events driving the supervisor's state machine
#[derive(Debug)]
pub(crate) enum EngineEvent {
    /// Form mutated; re-arm (or disarm) the debounce timer
    FormChanged,
    /// Skip the debounce and fetch immediately (manual refresh)
    RefreshNow,
    /// A fetch task finished; applied only if the generation is current
    QuoteResult {
        generation: u64,
        result: Result<QuoteSnapshot, SwapletError>,
    },
}

pub(crate) struct EngineState {
    pub form: SwapForm,
    pub phase: QuotePhase,
    pub quote: Option<QuoteSnapshot>,
    pub error: Option<SwapFlowError>,
    /// Recency of the last failed fetch, kept separately from `fetched_at`
    pub errored_at: Option<Instant>,
    /// Current fee settings resolve to a zero priority fee
    pub zero_fee_warning: bool,
    pub attempt: SwapAttempt,
    pub last_result: Option<LastSwapResult>,
    pub wallet: Option<Arc<dyn WalletSigner>>,
    pub in_flight: Option<JoinHandle<()>>,
}

pub(crate) struct Shared {
    pub ctx: EngineContext,
    pub state: Mutex<EngineState>,
    pub view_tx: watch::Sender<SwapView>,
    pub events: mpsc::UnboundedSender<EngineEvent>,
    /// Bumped on every form change; the key supersession mechanism
    pub generation: AtomicU64,
    pub attempt_seq: AtomicU64,
    pub reference_fees: watch::Receiver<ReferenceFees>,
}

impl Shared {
    pub fn reference_fees_now(&self) -> ReferenceFees {
        self.reference_fees.borrow().clone()
    }

    fn build_view(&self, state: &EngineState) -> SwapView {
        let freshness = state.quote.as_ref().map(|quote| {
            freshness::evaluate(quote.fetched_at, Instant::now(), self.ctx.config.quote_validity)
        });
        SwapView {
            form: state.form.clone(),
            phase: state.phase,
            quote: state.quote.clone(),
            error: state.error.clone(),
            freshness,
            errored_at: state.errored_at,
            zero_fee_warning: state.zero_fee_warning,
            attempt: state.attempt.clone(),
            last_result: state.last_result.clone(),
        }
    }

    /// Publish the current state to all view subscribers
    pub fn publish(&self) {
        let view = {
            let state = self.state.lock();
            self.build_view(&state)
        };
        let _ = self.view_tx.send(view);
    }
}

// =============================================================================
// SUPERVISOR
// =============================================================================

async fn supervise(shared: Arc<Shared>, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
    let mut tick = tokio::time::interval(shared.ctx.config.freshness_tick);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The single owned debounce timer: armed by FormChanged, disarmed when
    // it fires or when the form stops being fetchable
    let mut debounce_deadline: Option<Instant> = None;

    loop {
        // Copies the Option<Instant>, so the arms below can re-arm it freely
        let debounce_wait = async move {
            match debounce_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tick.tick() => {
                on_tick(&shared);
            }
            _ = debounce_wait => {
                debounce_deadline = None;
                begin_fetch(&shared);
            }
            event = events.recv() => match event {
                None => break,
                Some(EngineEvent::FormChanged) => {
                    let fetchable = shared.state.lock().form.is_fetchable();
                    debounce_deadline = if fetchable {
                        Some(Instant::now() + shared.ctx.config.debounce)
                    } else {
                        None
                    };
                }
                Some(EngineEvent::RefreshNow) => {
                    debounce_deadline = None;
                    begin_fetch(&shared);
                }
                Some(EngineEvent::QuoteResult { generation, result }) => {
                    apply_quote_result(&shared, generation, result);
                }
            }
        }
    }
}

/// Freshness re-evaluation; flips the quote-expired error exactly once per
/// quote and republishes so countdown indicators advance
fn on_tick(shared: &Arc<Shared>) {
    let has_quote = {
        let mut state = shared.state.lock();
        let state = &mut *state;
        match &state.quote {
            Some(quote) => {
                let fresh = freshness::evaluate(
                    quote.fetched_at,
                    Instant::now(),
                    shared.ctx.config.quote_validity,
                );
                if fresh.has_expired && state.error.is_none() {
                    logger::info(
                        LogTag::Quote,
                        &format!("Quote {} expired, refresh required", quote.request_id),
                    );
                    state.error = Some(SwapFlowError::QuoteExpired);
                }
                true
            }
            None => false,
        }
    };
    if has_quote {
        shared.publish();
    }
}

/// Start a fetch for the current form state, superseding any in-flight one
fn begin_fetch(shared: &Arc<Shared>) {
    let generation = shared.generation.load(Ordering::SeqCst);

    // Settings are file-backed; read them before taking the state mutex
    let fee_settings = shared.ctx.settings.fee_settings();
    let reference_fees = shared.reference_fees_now();

    let request = {
        let mut state = shared.state.lock();
        if !state.form.is_fetchable() {
            return;
        }
        let (Some(input_token), Some(output_token)) = (
            state.form.input_token.clone(),
            state.form.output_token.clone(),
        ) else {
            return;
        };

        let resolved = fees::resolve(
            state.form.slippage_mode,
            state.form.slippage_pct,
            state.form.dynamic_slippage_pct,
            &fee_settings,
            &reference_fees,
            None,
        );
        state.zero_fee_warning = resolved.zero_fee_warning;

        let request = OrderRequest {
            input_mint: input_token.mint,
            output_mint: output_token.mint,
            amount_raw: state.form.input_amount_raw(),
            taker: state.wallet.as_ref().map(|w| w.address()),
            swap_mode: SwapMode::ExactIn,
            slippage: resolved.slippage,
            priority_fee_micro_lamports: Some(resolved.priority_micro_lamports),
        };

        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.phase = QuotePhase::Fetching;
        let handle = fetcher::spawn_quote_fetch(
            shared.ctx.quotes.clone(),
            request.clone(),
            generation,
            shared.events.clone(),
        );
        state.in_flight = Some(handle);
        request
    };
    shared.publish();

    logger::debug(
        LogTag::Engine,
        &format!(
            "Fetch started gen={}: {} -> {} amount={}",
            generation, request.input_mint, request.output_mint, request.amount_raw
        ),
    );
}

/// Apply a finished fetch, unless its generation was superseded
fn apply_quote_result(
    shared: &Arc<Shared>,
    generation: u64,
    result: Result<QuoteSnapshot, SwapletError>,
) {
    if generation != shared.generation.load(Ordering::SeqCst) {
        // Superseded fetch: silently discarded, not a user-visible failure
        logger::debug(
            LogTag::Engine,
            &format!("Discarding superseded quote result gen={}", generation),
        );
        return;
    }

    {
        let mut state = shared.state.lock();
        state.in_flight = None;

        match result {
            Ok(snapshot) => {
                // Invariant: a snapshot may only ever describe the form's
                // current pair
                let pair_matches = state
                    .form
                    .input_token
                    .as_ref()
                    .map(|t| t.mint == snapshot.input_mint)
                    .unwrap_or(false)
                    && state
                        .form
                        .output_token
                        .as_ref()
                        .map(|t| t.mint == snapshot.output_mint)
                        .unwrap_or(false);
                if !pair_matches {
                    logger::warning(
                        LogTag::Engine,
                        "Discarding quote for a pair the form no longer holds",
                    );
                    return;
                }

                logger::info(
                    LogTag::Quote,
                    &format!(
                        "Quote ready: {} -> {} out={} impact={:.4}% route={}",
                        snapshot.input_mint,
                        snapshot.output_mint,
                        snapshot.out_amount_raw,
                        snapshot.price_impact_pct,
                        snapshot.route_summary()
                    ),
                );

                let output_decimals = state.form.output_token.as_ref().map(|t| t.decimals);
                if let Some(decimals) = output_decimals {
                    state.form.output_amount = format!("{}", snapshot.out_amount_ui(decimals));
                }
                state.quote = Some(snapshot);
                state.phase = QuotePhase::Ready;
                state.error = None;
                state.errored_at = None;
            }
            Err(e) => {
                logger::warning(LogTag::Quote, &format!("Quote fetch failed: {}", e));
                state.quote = None;
                state.form.output_amount.clear();
                state.phase = QuotePhase::Errored;
                state.errored_at = Some(Instant::now());
                state.error = Some(SwapFlowError::CouldNotFindAnyRoute);
            }
        }
    }
    shared.publish();
}

// =============================================================================
// PUBLIC ENGINE HANDLE
// =============================================================================

/// One mounted widget instance. Multiple engines on the same host are fully
/// independent. Dropping the handle (or calling `unmount`) tears down all
/// background tasks.
pub struct SwapEngine {
    shared: Arc<Shared>,
    view_rx: watch::Receiver<SwapView>,
    supervisor: JoinHandle<()>,
    fee_poller: JoinHandle<()>,
}

impl SwapEngine {
    /// Create the engine and start its background tasks. Must be called
    /// from within a tokio runtime.
    pub fn mount(ctx: EngineContext) -> Self {
        let settings = ctx.settings.clone();
        let form = SwapForm {
            slippage_mode: settings.slippage_mode(),
            slippage_pct: settings.slippage_pct(),
            dynamic_slippage_pct: settings.dynamic_slippage_pct(),
            ..SwapForm::default()
        };

        let initial_view = SwapView {
            form: form.clone(),
            phase: QuotePhase::Idle,
            quote: None,
            error: None,
            freshness: None,
            errored_at: None,
            zero_fee_warning: false,
            attempt: SwapAttempt::idle(),
            last_result: None,
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(initial_view);
        let (fees_rx, fee_poller) = crate::api::spawn_reference_fee_poller(
            ctx.reference_fees.clone(),
            ctx.config.reference_fee_poll,
        );

        let shared = Arc::new(Shared {
            ctx,
            state: Mutex::new(EngineState {
                form,
                phase: QuotePhase::Idle,
                quote: None,
                error: None,
                errored_at: None,
                zero_fee_warning: false,
                attempt: SwapAttempt::idle(),
                last_result: None,
                wallet: None,
                in_flight: None,
            }),
            view_tx,
            events: events_tx,
            generation: AtomicU64::new(0),
            attempt_seq: AtomicU64::new(0),
            reference_fees: fees_rx,
        });

        let supervisor = tokio::spawn(supervise(shared.clone(), events_rx));
        logger::info(LogTag::Engine, "Swap engine mounted");

        Self {
            shared,
            view_rx,
            supervisor,
            fee_poller,
        }
    }

    /// Tear down background tasks. Equivalent to dropping the handle.
    pub fn unmount(self) {}

    // ---- Observation ----

    /// Current view snapshot
    pub fn view(&self) -> SwapView {
        self.view_rx.borrow().clone()
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> watch::Receiver<SwapView> {
        self.view_rx.clone()
    }

    pub fn settings(&self) -> &UserSettings {
        &self.shared.ctx.settings
    }

    // ---- Form setters ----

    /// Shared mutation protocol for mint/amount changes: invalidate the
    /// quote, clear errors, then let the debounce re-arm downstream
    fn on_form_change<F: FnOnce(&mut EngineState)>(&self, mutate: F) {
        {
            let mut state = self.shared.state.lock();
            mutate(&mut state);
            state.quote = None;
            state.form.output_amount.clear();
            state.error = None;
            state.errored_at = None;
            state.phase = if state.form.is_fetchable() {
                QuotePhase::Debouncing
            } else {
                QuotePhase::Idle
            };
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.publish();
        let _ = self.shared.events.send(EngineEvent::FormChanged);
    }

    pub fn set_input_token(&self, token: TokenInfo) {
        self.on_form_change(|state| state.form.input_token = Some(token));
    }

    pub fn set_output_token(&self, token: TokenInfo) {
        self.on_form_change(|state| state.form.output_token = Some(token));
    }

    /// Swap input and output sides, keeping the typed amount
    pub fn switch_tokens(&self) {
        self.on_form_change(|state| {
            std::mem::swap(&mut state.form.input_token, &mut state.form.output_token);
        });
    }

    /// Raw amount keystroke. Non-numeric input is ignored (previous value
    /// retained); amounts above the ceiling are rejected synchronously and
    /// never reach the network.
    pub fn set_amount(&self, raw: &str) {
        let Some(clean) = input::sanitize_amount(raw) else {
            logger::debug(
                LogTag::Engine,
                &format!("Ignoring non-numeric amount input: {:?}", raw),
            );
            return;
        };

        let max_ui = self.shared.ctx.config.max_input_amount_ui;
        if input::exceeds_ceiling(&clean, max_ui) {
            let mut state = self.shared.state.lock();
            state.error = Some(SwapFlowError::AmountExceedsCeiling { max_ui });
            drop(state);
            self.shared.publish();
            return;
        }

        self.on_form_change(|state| state.form.input_amount = clean);
    }

    // ---- Slippage settings (persisted) ----

    pub fn set_slippage_mode(&self, mode: SlippageMode) {
        self.shared.ctx.settings.set_slippage_mode(mode);
        self.on_form_change(|state| state.form.slippage_mode = mode);
    }

    pub fn set_slippage_pct(&self, pct: f64) {
        self.shared.ctx.settings.set_slippage_pct(pct);
        self.on_form_change(|state| state.form.slippage_pct = pct);
    }

    pub fn set_dynamic_slippage_pct(&self, pct: f64) {
        self.shared.ctx.settings.set_dynamic_slippage_pct(pct);
        self.on_form_change(|state| state.form.dynamic_slippage_pct = pct);
    }

    /// Explicit save action from the fee settings screen. Re-evaluates the
    /// zero-fee warning so the settings UI can surface it right away.
    pub fn save_fee_settings(&self, settings: &FeeSettings) {
        self.shared.ctx.settings.save_fee_settings(settings);
        let price = fees::resolve_priority_fee(settings, &self.shared.reference_fees_now(), None);
        self.shared.state.lock().zero_fee_warning = price == 0;
        self.shared.publish();
    }

    // ---- Wallet ----

    /// Connect or disconnect the wallet signer. Changes the taker, which is
    /// part of the quote key, so the current quote is invalidated.
    pub fn set_wallet(&self, wallet: Option<Arc<dyn WalletSigner>>) {
        self.on_form_change(|state| state.wallet = wallet);
    }

    // ---- Quote lifecycle ----

    /// Re-fetch the current pair immediately, bypassing the debounce. Used
    /// by the "refresh quote" affordance after expiry.
    pub fn refresh_quote(&self) {
        {
            let mut state = self.shared.state.lock();
            if !state.form.is_fetchable() {
                return;
            }
            state.error = None;
            state.errored_at = None;
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.shared.events.send(EngineEvent::RefreshNow);
    }

    /// Recreate the form wholesale and drop quote, attempt and last result
    pub fn reset(&self) {
        {
            let mut state = self.shared.state.lock();
            let settings = &self.shared.ctx.settings;
            state.form = SwapForm {
                slippage_mode: settings.slippage_mode(),
                slippage_pct: settings.slippage_pct(),
                dynamic_slippage_pct: settings.dynamic_slippage_pct(),
                ..SwapForm::default()
            };
            state.quote = None;
            state.error = None;
            state.errored_at = None;
            state.phase = QuotePhase::Idle;
            // A fresh idle attempt; late executor results can no longer match
            state.attempt = SwapAttempt::idle();
            state.last_result = None;
            if let Some(handle) = state.in_flight.take() {
                handle.abort();
            }
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.publish();
        let _ = self.shared.events.send(EngineEvent::FormChanged);
        logger::info(LogTag::Engine, "Engine reset");
    }

    // ---- Execution ----

    /// Run one swap attempt against the current quote. Preflight failures
    /// come back as `Err`; terminal attempt outcomes (including wallet
    /// rejection and submission failure) come back as `Ok(LastSwapResult)`
    /// and are also reflected in the view state.
    pub async fn execute(&self) -> Result<LastSwapResult, SwapFlowError> {
        executor::run(&self.shared).await
    }
}

impl Drop for SwapEngine {
    fn drop(&mut self) {
        self.supervisor.abort();
        self.fee_poller.abort();
        if let Some(handle) = self.shared.state.lock().in_flight.take() {
            handle.abort();
        }
    }
}
