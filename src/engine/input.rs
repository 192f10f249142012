/// Amount input validation and conversion
///
/// Raw keystrokes land here before anything else sees them. Non-numeric
/// input is rejected outright (the previous value stays), so the debounce
/// and fetch path only ever deal with clean values.

/// Validate a raw amount string. Returns the accepted value, or `None` when
/// the keystroke must be ignored and the previous value retained.
///
/// Accepted: empty string (clears the field), or a finite non-negative
/// number. A lone "." is tolerated as the start of a decimal entry.
pub fn sanitize_amount(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some(String::new());
    }
    if raw == "." {
        return Some("0.".to_string());
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(raw.to_string()),
        _ => None,
    }
}

/// Parse a UI amount string, 0.0 when empty or unparsable
pub fn parse_amount_ui(raw: &str) -> f64 {
    raw.parse::<f64>().unwrap_or(0.0)
}

/// Convert a UI amount to raw token units, flooring sub-unit dust
pub fn amount_to_raw(raw: &str, decimals: u8) -> u64 {
    let ui = parse_amount_ui(raw);
    if ui <= 0.0 || !ui.is_finite() {
        return 0;
    }
    (ui * 10f64.powi(decimals as i32)).floor() as u64
}

/// Synchronous ceiling check, applied before anything reaches the network
pub fn exceeds_ceiling(raw: &str, max_ui: f64) -> bool {
    parse_amount_ui(raw) > max_ui
}
