//! Decision service integration for reasoning-agent bidders.
//!
//! The [`DecisionQuery`] trait is the boundary to the external LLM: given a
//! private value and a natural-language phase context it returns either a
//! numeric bid or a continue/drop signal. Responses are untrusted text;
//! parsing and fallbacks live in `protocol`, the HTTP transport in `client`.

pub mod client;
pub mod protocol;

use async_trait::async_trait;

use crate::error::QueryError;

pub use client::ChatDecisionClient;
pub use protocol::{fallback_bid, parse_bid, parse_continue, FALLBACK_SHADE};

/// Boundary contract to the external reasoning service.
///
/// Implementations must enforce their own timeouts; callers never wait
/// longer than the configured request deadline.
#[async_trait]
pub trait DecisionQuery: Send + Sync {
    /// Ask for a sealed bid given the bidder's private value and phase context.
    async fn query_bid(
        &self,
        private_value: f64,
        context: &str,
    ) -> std::result::Result<f64, QueryError>;

    /// Ask whether to keep bidding at `current_price` in an ascending auction.
    async fn query_continue(
        &self,
        private_value: f64,
        current_price: f64,
        context: &str,
    ) -> std::result::Result<bool, QueryError>;
}
