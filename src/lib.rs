//! swaplet: an embeddable, headless swap engine
//!
//! The engine debounces user input, fetches priced quotes from a hosted
//! aggregator, resolves slippage and priority-fee parameters from persisted
//! user settings plus live reference fees, and drives the sign-and-submit
//! swap lifecycle through a host-provided wallet signer. The host UI
//! observes one consistent `SwapView` read model; all rendering stays on the
//! host side.
//!
//! ```no_run
//! use std::sync::Arc;
//! use swaplet::context::{EngineConfig, EngineContext};
//! use swaplet::engine::SwapEngine;
//! use swaplet::settings::UserSettings;
//! use swaplet::types::TokenInfo;
//!
//! # async fn demo() {
//! let settings = UserSettings::in_memory();
//! let engine = SwapEngine::mount(EngineContext::new(EngineConfig::default(), settings));
//!
//! engine.set_input_token(TokenInfo::new(
//!     "So11111111111111111111111111111111111111112", "SOL", 9));
//! engine.set_output_token(TokenInfo::new(
//!     "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6));
//! engine.set_amount("1.0");
//!
//! let mut views = engine.subscribe();
//! while views.changed().await.is_ok() {
//!     let view = views.borrow().clone();
//!     if view.quote.is_some() { break; }
//! }
//! # }
//! ```

pub mod api;
pub mod context;
pub mod engine;
pub mod errors;
pub mod fees;
pub mod logger;
pub mod settings;
pub mod types;

pub use context::{EngineConfig, EngineContext};
pub use engine::view::{QuotePhase, SwapView};
pub use engine::SwapEngine;
pub use errors::{RetryAction, SwapFlowError, SwapletError};
