/// Swap execution lifecycle
///
/// Drives one attempt through idle -> pending-approval -> sending ->
/// success | fail | timeout. Terminal states are sticky until the engine is
/// reset. All transitions are guarded by the attempt id so a result arriving
/// after a reset is dropped instead of resurrecting a dead attempt.

use crate::api::ExecuteRequest;
use crate::engine::{freshness, Shared};
use crate::errors::SwapFlowError;
use crate::fees;
use crate::logger::{self, LogTag};
use crate::types::{LastSwapResult, SwapAttempt, SwapStatus};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::time::Instant;

/// Expiry-class failure messages from the execution endpoint. Everything
/// else lands in plain `Fail`.
pub(crate) fn is_expiry_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("expired") || lower.contains("block height exceeded")
}

/// Guarded terminal transition: applies only while `attempt_id` is still the
/// live attempt, otherwise the result is dropped.
fn finish_attempt(
    shared: &Shared,
    attempt_id: u64,
    status: SwapStatus,
    txid: Option<String>,
    result: LastSwapResult,
) -> bool {
    let mut state = shared.state.lock();
    if state.attempt.id != attempt_id {
        logger::warning(
            LogTag::Swap,
            &format!(
                "Dropping result for superseded attempt {} (current: {})",
                attempt_id, state.attempt.id
            ),
        );
        return false;
    }
    state.attempt.status = status;
    state.attempt.txid = txid;
    if let LastSwapResult::Error(err) = &result {
        state.error = Some(err.clone());
    }
    state.last_result = Some(result);
    drop(state);
    shared.publish();
    true
}

/// Guarded non-terminal transition (pending-approval -> sending)
fn advance_attempt(shared: &Shared, attempt_id: u64, status: SwapStatus) -> bool {
    let mut state = shared.state.lock();
    if state.attempt.id != attempt_id {
        return false;
    }
    state.attempt.status = status;
    drop(state);
    shared.publish();
    true
}

pub(crate) async fn run(shared: &Arc<Shared>) -> Result<LastSwapResult, SwapFlowError> {
    // ---- Preflight: gather everything under the lock, fail fast ----
    // Settings live in files; read them before taking the state mutex
    let fee_settings = shared.ctx.settings.fee_settings();
    let reference_fees = shared.reference_fees_now();
    let (signer, quote, slippage_bps) = {
        let state = shared.state.lock();
        if state.attempt.status.is_in_flight() {
            return Err(SwapFlowError::SwapInProgress);
        }
        let signer = state.wallet.clone().ok_or(SwapFlowError::MissingWallet)?;
        let quote = state.quote.clone().ok_or(SwapFlowError::QuoteExpired)?;

        let resolved = fees::resolve(
            state.form.slippage_mode,
            state.form.slippage_pct,
            state.form.dynamic_slippage_pct,
            &fee_settings,
            &reference_fees,
            None,
        );
        (signer, quote, resolved.slippage.bps())
    };

    let validity = shared.ctx.config.quote_validity;
    if freshness::evaluate(quote.fetched_at, Instant::now(), validity).has_expired {
        let mut state = shared.state.lock();
        state.error = Some(SwapFlowError::QuoteExpired);
        drop(state);
        shared.publish();
        return Err(SwapFlowError::QuoteExpired);
    }

    let transaction = quote.transaction.clone().ok_or_else(|| {
        SwapFlowError::SubmissionFailed {
            message: "order carries no transaction to sign".to_string(),
            signature: None,
        }
    })?;

    let taker = signer.address();

    // ---- Balance guard: blocks before any network submission ----
    if let Some(balances) = &shared.ctx.balances {
        // An unreadable balance does not block; only a known-short one does
        if let Ok(available) = balances.balance_raw(&taker, &quote.input_mint).await {
            if available < quote.in_amount_raw {
                let err = SwapFlowError::InsufficientBalance {
                    required_raw: quote.in_amount_raw,
                    available_raw: available,
                };
                let mut state = shared.state.lock();
                state.error = Some(err.clone());
                drop(state);
                shared.publish();
                return Err(err);
            }
        }
    }

    // ---- Claim the attempt slot ----
    let attempt_id = {
        let mut state = shared.state.lock();
        // Re-check: the async balance read may have lost a race
        if state.attempt.status.is_in_flight() {
            return Err(SwapFlowError::SwapInProgress);
        }
        match &state.quote {
            Some(current) if current.request_id == quote.request_id => {}
            _ => return Err(SwapFlowError::QuoteExpired),
        }
        let id = shared.attempt_seq.fetch_add(1, Ordering::SeqCst) + 1;
        // The prior attempt's terminal result stays visible until this
        // attempt reaches its own terminal state (or the engine is reset)
        state.attempt = SwapAttempt {
            id,
            status: SwapStatus::PendingApproval,
            txid: None,
            quoted_slippage_bps: slippage_bps,
        };
        id
    };
    shared.publish();

    logger::info(
        LogTag::Swap,
        &format!(
            "Attempt {} awaiting wallet approval: {} {} -> {} (request {})",
            attempt_id, quote.in_amount_raw, quote.input_mint, quote.output_mint, quote.request_id
        ),
    );

    // ---- Signature: not cancelable once dispatched, never auto-retried ----
    let signed_transaction = match signer.sign_transaction(&transaction).await {
        Ok(signed) => signed,
        Err(e) => {
            logger::warning(
                LogTag::Swap,
                &format!("Attempt {} rejected by wallet: {}", attempt_id, e),
            );
            let result = LastSwapResult::Error(SwapFlowError::WalletRejected {
                reason: e.message().to_string(),
            });
            finish_attempt(shared, attempt_id, SwapStatus::Fail, None, result.clone());
            return Ok(result);
        }
    };

    if !advance_attempt(shared, attempt_id, SwapStatus::Sending) {
        // Engine was reset while the wallet prompt was open; the signature
        // belongs to a dead attempt and is ignored
        return Err(SwapFlowError::SwapInProgress);
    }

    logger::info(
        LogTag::Swap,
        &format!("Attempt {} submitting signed transaction", attempt_id),
    );

    // ---- Submission ----
    let request = ExecuteRequest {
        signed_transaction,
        request_id: quote.request_id.clone(),
    };
    let result = match shared.ctx.execution.execute(&request).await {
        Ok(response) if response.is_success() => {
            let txid = response.signature.clone().unwrap_or_default();
            logger::info(
                LogTag::Swap,
                &format!("Attempt {} confirmed: signature {}", attempt_id, txid),
            );
            let result = LastSwapResult::Success {
                txid: txid.clone(),
                input_mint: quote.input_mint.clone(),
                output_mint: quote.output_mint.clone(),
                in_amount_raw: quote.in_amount_raw,
                out_amount_raw: quote.out_amount_raw,
            };
            if finish_attempt(
                shared,
                attempt_id,
                SwapStatus::Success,
                Some(txid),
                result.clone(),
            ) {
                // Fire-and-forget: a failed refresh never flips the outcome
                if let Some(balances) = shared.ctx.balances.clone() {
                    let owner = taker.clone();
                    tokio::spawn(async move {
                        balances.refresh(&owner).await;
                    });
                }
            }
            result
        }
        Ok(response) => {
            let message = response
                .error
                .clone()
                .unwrap_or_else(|| "execution endpoint reported failure".to_string());
            let (status, flow_error) = if is_expiry_message(&message) {
                (
                    SwapStatus::Timeout,
                    SwapFlowError::TransactionExpired {
                        signature: response.signature.clone(),
                    },
                )
            } else {
                (
                    SwapStatus::Fail,
                    SwapFlowError::SubmissionFailed {
                        message,
                        signature: response.signature.clone(),
                    },
                )
            };
            logger::warning(
                LogTag::Swap,
                &format!("Attempt {} failed: {}", attempt_id, flow_error),
            );
            let result = LastSwapResult::Error(flow_error);
            finish_attempt(shared, attempt_id, status, response.signature, result.clone());
            result
        }
        Err(e) => {
            logger::error(
                LogTag::Swap,
                &format!("Attempt {} submission error: {}", attempt_id, e),
            );
            let result = LastSwapResult::Error(SwapFlowError::SubmissionFailed {
                message: e.message().to_string(),
                signature: None,
            });
            finish_attempt(shared, attempt_id, SwapStatus::Fail, None, result.clone());
            result
        }
    };

    Ok(result)
}
