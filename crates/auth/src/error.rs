use std::time::Duration;

use thiserror::Error;

use crate::result::Tier;

/// Failure of a single tier.
///
/// These are local, recoverable events: the chain catches them and falls
/// through to the next tier. Only exhaustion of the whole chain becomes
/// visible to callers, and then only as a string on a denying result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Tier 1 unreachable (connect/transport/decode failure).
    #[error("network error: {0}")]
    Network(String),

    /// Tier 1 answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Tier 2 function missing or erroring.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Tier 3 table/row error, including a missing profile row.
    #[error("query error: {0}")]
    Query(String),

    /// The tier could not attribute the call to an authenticated subject
    /// (e.g. no session credential available).
    #[error("no authenticated principal")]
    NoPrincipal,

    /// The tier did not answer within the configured bound.
    #[error("{tier} timed out after {after:?}")]
    Timeout { tier: Tier, after: Duration },

    /// The tier answered for a different subject than the one asked about.
    #[error("principal mismatch: expected '{expected}', got '{found}'")]
    PrincipalMismatch { expected: String, found: String },
}

impl ValidationError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn server(status: u16, msg: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: msg.into(),
        }
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}
