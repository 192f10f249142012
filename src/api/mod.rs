/// External collaborator contracts
///
/// The engine talks to three remote services (quoting, execution, reference
/// fees) and two host-provided collaborators (wallet signer, balance
/// provider). Everything goes through the narrow async traits below so the
/// engine itself never touches HTTP and tests can plug in fakes.

pub mod client;
pub mod reference_fees;

use crate::errors::SwapletError;
use crate::types::ReferenceFees;
use async_trait::async_trait;
use serde::Deserializer;

pub use client::{
    AggregatorClient, ExecuteRequest, ExecuteResponse, OrderRequest, OrderResponse, RoutePlanStep,
    SwapInfo,
};
pub use reference_fees::{spawn_reference_fee_poller, ReferenceFeeClient};

/// Swap direction semantics on the order request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMode {
    /// Exact input amount, output is estimated
    ExactIn,
    /// Exact output amount, input is estimated
    ExactOut,
}

impl SwapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapMode::ExactIn => "ExactIn",
            SwapMode::ExactOut => "ExactOut",
        }
    }
}

/// Slippage parameter resolved from user settings, attached to the order
/// request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlippageParam {
    /// Fixed bps sent verbatim
    FixedBps(u16),
    /// Cap in bps; effective slippage is resolved server-side up to it
    DynamicCapBps(u16),
}

impl SlippageParam {
    pub fn bps(&self) -> u16 {
        match self {
            SlippageParam::FixedBps(bps) | SlippageParam::DynamicCapBps(bps) => *bps,
        }
    }
}

// =============================================================================
// SERVICE TRAITS
// =============================================================================

/// Priced-quote source (`GET /order` on the hosted aggregator)
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_order(&self, request: &OrderRequest) -> Result<OrderResponse, SwapletError>;
}

/// Signed-transaction submission (`POST /execute`)
#[async_trait]
pub trait ExecutionEndpoint: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, SwapletError>;
}

/// Advisory market fee guidance (`GET /reference-fees`)
#[async_trait]
pub trait ReferenceFeeSource: Send + Sync {
    async fn fetch_reference_fees(&self) -> Result<ReferenceFees, SwapletError>;
}

// =============================================================================
// HOST-PROVIDED COLLABORATORS
// =============================================================================

/// Wallet signing provider supplied by the host. Signing may wait
/// indefinitely on human interaction and may fail or be rejected.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Taker address the quotes and swaps run on behalf of
    fn address(&self) -> String;

    /// Sign a pre-built base64 transaction blob, returning the signed blob
    async fn sign_transaction(&self, transaction_base64: &str) -> Result<String, SwapletError>;
}

/// On-chain balance reads and post-swap refresh, supplied by the host
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Known balance in raw units for `owner`'s `mint` account
    async fn balance_raw(&self, owner: &str, mint: &str) -> Result<u64, SwapletError>;

    /// Fire-and-forget refresh after a successful swap; failures are the
    /// provider's problem and never affect the swap's terminal status
    async fn refresh(&self, owner: &str);
}

// =============================================================================
// DESERIALIZATION HELPERS
// =============================================================================

/// Deserializer for wire fields that show up as either string or number
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_owned())
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
