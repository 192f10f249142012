/// Core data model for the swap engine
/// Shared structures for the form, quote snapshots, fee settings, attempts
/// and terminal results. Wire-format structs live next to the API clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// =============================================================================
// TIMING CONSTANTS
// =============================================================================

/// Quiet interval after the last keystroke before a quote fetch is armed
pub const DEBOUNCE_MS: u64 = 250;

/// How long a fetched quote stays valid before it must be refreshed
pub const QUOTE_VALIDITY_MS: u64 = 20_000;

/// Freshness re-evaluation tick
pub const FRESHNESS_TICK_MS: u64 = 1_000;

/// Delay before the single quote retry after a failed fetch
pub const QUOTE_RETRY_DELAY_MS: u64 = 2_000;

/// Reference fee poll interval
pub const REFERENCE_FEE_POLL_MS: u64 = 60_000;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

// =============================================================================
// TOKENS & FORM
// =============================================================================

/// Minimal token identity the engine needs: mint plus display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub mint: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(mint: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            mint: mint.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Slippage configuration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlippageMode {
    /// Send the configured bps verbatim
    Fixed,
    /// Send a cap; the aggregator resolves effective slippage up to it
    Dynamic,
}

impl SlippageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlippageMode::Fixed => "fixed",
            SlippageMode::Dynamic => "dynamic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(SlippageMode::Fixed),
            "dynamic" => Some(SlippageMode::Dynamic),
            _ => None,
        }
    }
}

/// Mutable user intent. Owned by the engine, mutated only through its
/// setters, recreated wholesale on reset.
#[derive(Debug, Clone)]
pub struct SwapForm {
    pub input_token: Option<TokenInfo>,
    pub output_token: Option<TokenInfo>,
    /// Raw amount text as typed; only validated values ever land here
    pub input_amount: String,
    /// Display value derived from the current quote, never user-typed
    pub output_amount: String,
    pub slippage_mode: SlippageMode,
    /// Fixed slippage in percent (0.5 = 0.5%)
    pub slippage_pct: f64,
    /// Dynamic slippage cap in percent
    pub dynamic_slippage_pct: f64,
}

impl Default for SwapForm {
    fn default() -> Self {
        Self {
            input_token: None,
            output_token: None,
            input_amount: String::new(),
            output_amount: String::new(),
            slippage_mode: SlippageMode::Fixed,
            slippage_pct: 0.5,
            dynamic_slippage_pct: 2.5,
        }
    }
}

impl SwapForm {
    /// Input amount converted to raw units of the input token (0 when empty,
    /// unparsable, or no input token is selected)
    pub fn input_amount_raw(&self) -> u64 {
        match &self.input_token {
            Some(token) => crate::engine::input::amount_to_raw(&self.input_amount, token.decimals),
            None => 0,
        }
    }

    /// A quote fetch only makes sense with both mints and a positive amount
    pub fn is_fetchable(&self) -> bool {
        self.input_token.is_some() && self.output_token.is_some() && self.input_amount_raw() > 0
    }
}

// =============================================================================
// QUOTE SNAPSHOT
// =============================================================================

/// One hop of the route the aggregator picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub label: String,
    pub amm_key: String,
}

/// Immutable result of one successful quote fetch. Replaced atomically when a
/// new quote lands; superseded snapshots are discarded, never queued.
#[derive(Debug, Clone)]
pub struct QuoteSnapshot {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount_raw: u64,
    pub out_amount_raw: u64,
    pub other_amount_threshold: u64,
    pub price_impact_pct: f64,
    pub route: Vec<RouteStep>,
    pub fee_bps: u16,
    pub request_id: String,
    /// Pre-built transaction blob (base64), present when the aggregator could
    /// build one for the taker
    pub transaction: Option<String>,
    /// Monotonic stamp used for freshness math
    pub fetched_at: Instant,
    /// Wall-clock stamp for display and logs
    pub fetched_at_utc: DateTime<Utc>,
}

impl QuoteSnapshot {
    /// Route rendered as "Orca → Meteora", or "Direct" for an empty plan
    pub fn route_summary(&self) -> String {
        if self.route.is_empty() {
            return "Direct".to_string();
        }
        self.route
            .iter()
            .map(|step| step.label.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Output amount in UI units for the given output token decimals
    pub fn out_amount_ui(&self, decimals: u8) -> f64 {
        self.out_amount_raw as f64 / 10f64.powi(decimals as i32)
    }
}

// =============================================================================
// FEES
// =============================================================================

/// Priority fee mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityMode {
    /// User value is a ceiling; reference fees pick the actual fee under it
    Max,
    /// User value is applied verbatim, reference fees ignored
    Exact,
}

impl PriorityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityMode::Max => "max",
            PriorityMode::Exact => "exact",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "max" => Some(PriorityMode::Max),
            "exact" => Some(PriorityMode::Exact),
            _ => None,
        }
    }
}

/// Priority level selecting which reference fee column applies in Max mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityLevel {
    Medium,
    High,
    VeryHigh,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Medium => "medium",
            PriorityLevel::High => "high",
            PriorityLevel::VeryHigh => "very_high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "medium" => Some(PriorityLevel::Medium),
            "high" => Some(PriorityLevel::High),
            "very_high" => Some(PriorityLevel::VeryHigh),
            _ => None,
        }
    }
}

/// User priority-fee settings, persisted across sessions and read at
/// submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSettings {
    pub priority_mode: PriorityMode,
    pub priority_level: PriorityLevel,
    /// Fee in native units (SOL)
    pub priority_fee_sol: f64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            priority_mode: PriorityMode::Max,
            priority_level: PriorityLevel::High,
            priority_fee_sol: 0.004,
        }
    }
}

/// Advisory market fee guidance, refreshed on its own schedule. Values are
/// lamports per transaction for each priority level. Never required for
/// correctness: the defaults below are the fallback when the feed is down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFees {
    pub medium_lamports: u64,
    pub high_lamports: u64,
    pub very_high_lamports: u64,
    pub swap_fee_lamports: u64,
}

impl Default for ReferenceFees {
    fn default() -> Self {
        Self {
            medium_lamports: 100_000,
            high_lamports: 500_000,
            very_high_lamports: 1_000_000,
            swap_fee_lamports: 0,
        }
    }
}

impl ReferenceFees {
    /// Reference fee in lamports for the selected priority level
    pub fn for_level(&self, level: PriorityLevel) -> u64 {
        match level {
            PriorityLevel::Medium => self.medium_lamports,
            PriorityLevel::High => self.high_lamports,
            PriorityLevel::VeryHigh => self.very_high_lamports,
        }
    }
}

// =============================================================================
// SWAP ATTEMPT & RESULT
// =============================================================================

/// Lifecycle of one swap attempt. Terminal states are sticky until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatus {
    Idle,
    PendingApproval,
    Sending,
    Success,
    Fail,
    Timeout,
}

impl SwapStatus {
    /// True while the wallet prompt or the submission is outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SwapStatus::PendingApproval | SwapStatus::Sending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapStatus::Success | SwapStatus::Fail | SwapStatus::Timeout
        )
    }
}

/// Transient per-submission record. Exactly one attempt is live at a time;
/// the id lets late async results prove they still belong to it.
#[derive(Debug, Clone)]
pub struct SwapAttempt {
    pub id: u64,
    pub status: SwapStatus,
    pub txid: Option<String>,
    pub quoted_slippage_bps: u16,
}

impl SwapAttempt {
    pub fn idle() -> Self {
        Self {
            id: 0,
            status: SwapStatus::Idle,
            txid: None,
            quoted_slippage_bps: 0,
        }
    }
}

/// Terminal record of the most recently completed attempt, retained until
/// explicitly reset and used to render the outcome screen
#[derive(Debug, Clone, PartialEq)]
pub enum LastSwapResult {
    Success {
        txid: String,
        input_mint: String,
        output_mint: String,
        in_amount_raw: u64,
        out_amount_raw: u64,
    },
    Error(crate::errors::SwapFlowError),
}
