/// Quote freshness math
///
/// A quote is valid for a fixed wall-clock window after it was fetched.
/// The engine re-evaluates every tick; expiry is one-directional until a new
/// snapshot arrives and resets the clock.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freshness {
    pub has_expired: bool,
    /// Percent of the validity window elapsed *past* expiry: negative before
    /// expiry, 0 at the expiry instant, 100 one full window later. The
    /// consumer clamps for display.
    pub percent_elapsed: f64,
}

pub fn evaluate(fetched_at: Instant, now: Instant, validity: Duration) -> Freshness {
    let elapsed = now.saturating_duration_since(fetched_at);
    let has_expired = elapsed >= validity;
    let since_expiry_secs = elapsed.as_secs_f64() - validity.as_secs_f64();
    let percent_elapsed = since_expiry_secs / validity.as_secs_f64() * 100.0;

    Freshness {
        has_expired,
        percent_elapsed,
    }
}
