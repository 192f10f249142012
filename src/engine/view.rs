/// Read model published to the host UI
///
/// The engine is the single source of truth; the UI only ever sees cloned
/// `SwapView` snapshots over a watch channel and never recomputes derived
/// state on its own.

use crate::engine::freshness::Freshness;
use crate::errors::SwapFlowError;
use crate::types::{LastSwapResult, QuoteSnapshot, SwapAttempt, SwapForm};
use tokio::time::Instant;

/// Quote pipeline phase, driven by discrete events in the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePhase {
    /// Nothing to fetch (missing mints or zero amount)
    Idle,
    /// Input changed, waiting out the quiet interval
    Debouncing,
    /// Order request in flight
    Fetching,
    /// A current quote is available
    Ready,
    /// Last fetch failed; `error` carries the reason
    Errored,
}

#[derive(Debug, Clone)]
pub struct SwapView {
    pub form: SwapForm,
    pub phase: QuotePhase,
    pub quote: Option<QuoteSnapshot>,
    pub error: Option<SwapFlowError>,
    /// Present whenever a quote is; recomputed on every tick and publish
    pub freshness: Option<Freshness>,
    /// When the last fetch failed; cleared by the next quote or form change.
    /// Lets the host rate-limit its own retry affordance.
    pub errored_at: Option<Instant>,
    /// The configured priority fee resolves to zero. Legal, but the settings
    /// UI should call it out.
    pub zero_fee_warning: bool,
    pub attempt: SwapAttempt,
    pub last_result: Option<LastSwapResult>,
}

impl SwapView {
    /// Loading flag for the quote area spinner
    pub fn quote_loading(&self) -> bool {
        self.phase == QuotePhase::Fetching
    }

    /// Whether the submit button should be enabled
    pub fn can_submit(&self) -> bool {
        let fresh = matches!(
            self.freshness,
            Some(Freshness {
                has_expired: false,
                ..
            })
        );
        self.quote.is_some() && fresh && self.error.is_none() && !self.attempt.status.is_in_flight()
    }

    /// Countdown indicator value clamped to 0..100, where 100 means the
    /// quote is due for refresh
    pub fn countdown_percent(&self) -> f64 {
        match self.freshness {
            Some(f) => (100.0 + f.percent_elapsed).clamp(0.0, 100.0),
            None => 0.0,
        }
    }
}
