/// Error types for the swaplet engine
/// Split in two layers: transport errors raised at the network/parse boundary
/// (`SwapletError`) and the user-facing swap flow taxonomy (`SwapFlowError`)
/// that the engine converts everything into before it reaches the view state.

// =============================================================================
// TRANSPORT / BOUNDARY ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum SwapletError {
    /// HTTP transport failed (timeout, DNS, connection refused)
    Network { message: String },

    /// Endpoint answered with a non-success status or an error body
    Api { message: String },

    /// Response body did not match the expected schema
    Parse { message: String },

    /// Input rejected before it could reach the network
    Validation { message: String },

    /// Wallet signer failed or refused to sign
    Wallet { message: String },

    /// Programming error, should not happen in normal operation
    Internal { message: String },
}

impl SwapletError {
    pub fn network_error(message: impl Into<String>) -> Self {
        SwapletError::Network {
            message: message.into(),
        }
    }

    pub fn api_error(message: impl Into<String>) -> Self {
        SwapletError::Api {
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        SwapletError::Parse {
            message: message.into(),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        SwapletError::Validation {
            message: message.into(),
        }
    }

    pub fn wallet_error(message: impl Into<String>) -> Self {
        SwapletError::Wallet {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        SwapletError::Internal {
            message: message.into(),
        }
    }

    /// Inner message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            SwapletError::Network { message }
            | SwapletError::Api { message }
            | SwapletError::Parse { message }
            | SwapletError::Validation { message }
            | SwapletError::Wallet { message }
            | SwapletError::Internal { message } => message,
        }
    }
}

impl std::fmt::Display for SwapletError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapletError::Network { message } => write!(f, "Network Error: {}", message),
            SwapletError::Api { message } => write!(f, "API Error: {}", message),
            SwapletError::Parse { message } => write!(f, "Parse Error: {}", message),
            SwapletError::Validation { message } => write!(f, "Validation Error: {}", message),
            SwapletError::Wallet { message } => write!(f, "Wallet Error: {}", message),
            SwapletError::Internal { message } => write!(f, "Internal Error: {}", message),
        }
    }
}

impl std::error::Error for SwapletError {}

// =============================================================================
// SWAP FLOW ERRORS (user facing)
// =============================================================================

/// What the user can do to get out of a terminal error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    GoBack,
    RefreshQuote,
    ReconnectWallet,
}

/// User-facing error taxonomy for the swap flow.
/// Every terminal error state in the view resolves to exactly one of these,
/// and each maps to one human-readable message plus at most one retry action.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapFlowError {
    /// Aggregator could not price the pair (no route, or the request failed)
    CouldNotFindAnyRoute,

    /// Quote outlived its validity window; must be re-fetched, never resubmitted
    QuoteExpired,

    /// Amount failed synchronous validation (exceeds the input ceiling)
    AmountExceedsCeiling { max_ui: f64 },

    /// Known balance is smaller than the requested input amount
    InsufficientBalance {
        required_raw: u64,
        available_raw: u64,
    },

    /// No connected wallet signer
    MissingWallet,

    /// An attempt is already pending approval or sending
    SwapInProgress,

    /// The wallet rejected or failed the signature request
    WalletRejected { reason: String },

    /// Execution endpoint reported a failure; signature preserved for lookup
    SubmissionFailed {
        message: String,
        signature: Option<String>,
    },

    /// Execution endpoint reported an expiry-class failure
    TransactionExpired { signature: Option<String> },
}

impl SwapFlowError {
    /// The single human-readable message for this error state
    pub fn user_message(&self) -> String {
        match self {
            SwapFlowError::CouldNotFindAnyRoute => {
                "Could not find any route for this pair".to_string()
            }
            SwapFlowError::QuoteExpired => "Quote expired, refresh to get a new price".to_string(),
            SwapFlowError::AmountExceedsCeiling { max_ui } => {
                format!("Amount exceeds the maximum input of {}", max_ui)
            }
            SwapFlowError::InsufficientBalance {
                required_raw,
                available_raw,
            } => {
                format!(
                    "Insufficient balance: need {} units, have {}",
                    required_raw, available_raw
                )
            }
            SwapFlowError::MissingWallet => "Connect a wallet to swap".to_string(),
            SwapFlowError::SwapInProgress => {
                "A swap is already in progress, wait for it to finish".to_string()
            }
            SwapFlowError::WalletRejected { reason } => {
                format!("Wallet rejected the transaction: {}", reason)
            }
            SwapFlowError::SubmissionFailed { message, signature } => match signature {
                Some(sig) => format!("Swap failed: {} (signature: {})", message, sig),
                None => format!("Swap failed: {}", message),
            },
            SwapFlowError::TransactionExpired { signature } => match signature {
                Some(sig) => {
                    format!("Transaction expired before confirmation (signature: {})", sig)
                }
                None => "Transaction expired before confirmation".to_string(),
            },
        }
    }

    /// The retry affordance to render next to the message, if any
    pub fn retry_action(&self) -> Option<RetryAction> {
        match self {
            SwapFlowError::CouldNotFindAnyRoute => Some(RetryAction::GoBack),
            SwapFlowError::QuoteExpired => Some(RetryAction::RefreshQuote),
            SwapFlowError::AmountExceedsCeiling { .. } => Some(RetryAction::GoBack),
            SwapFlowError::InsufficientBalance { .. } => Some(RetryAction::GoBack),
            SwapFlowError::MissingWallet => Some(RetryAction::ReconnectWallet),
            SwapFlowError::SwapInProgress => None,
            SwapFlowError::WalletRejected { .. } => Some(RetryAction::GoBack),
            SwapFlowError::SubmissionFailed { .. } => Some(RetryAction::GoBack),
            SwapFlowError::TransactionExpired { .. } => Some(RetryAction::RefreshQuote),
        }
    }

    /// Signature of the failed attempt, when the endpoint returned one
    pub fn signature(&self) -> Option<&str> {
        match self {
            SwapFlowError::SubmissionFailed { signature, .. }
            | SwapFlowError::TransactionExpired { signature } => signature.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for SwapFlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for SwapFlowError {}
