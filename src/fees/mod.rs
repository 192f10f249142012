/// Fee & slippage resolution
///
/// Pure functions combining user-configured slippage and priority-fee
/// settings with advisory reference fees into the concrete parameters a
/// transaction needs. No IO here; the reference fee feed lives in
/// `api::reference_fees`.

use crate::api::SlippageParam;
use crate::types::{FeeSettings, PriorityMode, ReferenceFees, SlippageMode, LAMPORTS_PER_SOL};

// =============================================================================
// LIMITS & DEFAULTS
// =============================================================================

/// Fixed slippage clamp: 0% to 50%
pub const MAX_FIXED_SLIPPAGE_BPS: u16 = 5_000;

/// Dynamic slippage cap clamp: 0.1% to 100%
pub const MIN_DYNAMIC_SLIPPAGE_BPS: u16 = 10;
pub const MAX_DYNAMIC_SLIPPAGE_BPS: u16 = 10_000;

/// Generous compute-unit fallback so the per-unit price is never computed
/// against a zero or unknown denominator
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u64 = 1_400_000;

/// Minimum priority fee floor applied in Max mode before comparing against
/// the user's ceiling
pub const PRIORITY_FEE_FLOOR_LAMPORTS: u64 = 10_000;

/// Resolved transaction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFees {
    pub slippage: SlippageParam,
    pub priority_micro_lamports: u64,
    /// A zero fee is a legal "no extra fee" choice, but worth flagging in
    /// the settings UI
    pub zero_fee_warning: bool,
}

// =============================================================================
// SLIPPAGE
// =============================================================================

/// Resolve the slippage parameter to send with an order request
pub fn resolve_slippage(
    mode: SlippageMode,
    fixed_pct: f64,
    dynamic_pct: f64,
) -> SlippageParam {
    match mode {
        SlippageMode::Fixed => {
            let bps = (fixed_pct * 100.0).round();
            let bps = bps.clamp(0.0, MAX_FIXED_SLIPPAGE_BPS as f64) as u16;
            SlippageParam::FixedBps(bps)
        }
        SlippageMode::Dynamic => {
            let bps = (dynamic_pct * 100.0).round();
            let bps = bps.clamp(
                MIN_DYNAMIC_SLIPPAGE_BPS as f64,
                MAX_DYNAMIC_SLIPPAGE_BPS as f64,
            ) as u16;
            SlippageParam::DynamicCapBps(bps)
        }
    }
}

// =============================================================================
// PRIORITY FEES
// =============================================================================

pub fn sol_to_lamports(sol: f64) -> u64 {
    if !sol.is_finite() || sol <= 0.0 {
        return 0;
    }
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Per-compute-unit price: floor(fee_lamports * 1e6 / compute_unit_limit)
pub fn micro_lamports_per_cu(fee_lamports: u64, compute_unit_limit: Option<u64>) -> u64 {
    let cu_limit = match compute_unit_limit {
        Some(limit) if limit > 0 => limit,
        _ => DEFAULT_COMPUTE_UNIT_LIMIT,
    };
    fee_lamports.saturating_mul(1_000_000) / cu_limit
}

/// Resolve the priority fee per compute unit from user settings plus
/// reference fees.
///
/// - Exact mode: the user's value verbatim, reference fees ignored.
/// - Max mode: min(user ceiling, max(reference fee for the selected level,
///   minimum floor)), everything compared in per-unit price space.
pub fn resolve_priority_fee(
    settings: &FeeSettings,
    reference: &ReferenceFees,
    compute_unit_limit: Option<u64>,
) -> u64 {
    let user_lamports = sol_to_lamports(settings.priority_fee_sol);
    let user_price = micro_lamports_per_cu(user_lamports, compute_unit_limit);

    match settings.priority_mode {
        PriorityMode::Exact => user_price,
        PriorityMode::Max => {
            let reference_lamports = reference
                .for_level(settings.priority_level)
                .max(PRIORITY_FEE_FLOOR_LAMPORTS);
            let reference_price = micro_lamports_per_cu(reference_lamports, compute_unit_limit);
            user_price.min(reference_price)
        }
    }
}

/// Full resolution of slippage + priority fee for one transaction
pub fn resolve(
    slippage_mode: SlippageMode,
    fixed_pct: f64,
    dynamic_pct: f64,
    settings: &FeeSettings,
    reference: &ReferenceFees,
    compute_unit_limit: Option<u64>,
) -> ResolvedFees {
    let slippage = resolve_slippage(slippage_mode, fixed_pct, dynamic_pct);
    let priority_micro_lamports = resolve_priority_fee(settings, reference, compute_unit_limit);

    ResolvedFees {
        slippage,
        priority_micro_lamports,
        zero_fee_warning: priority_micro_lamports == 0,
    }
}
