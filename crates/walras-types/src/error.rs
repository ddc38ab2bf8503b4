//! Error types for the Walras clearing engine.
//!
//! All errors use the `WL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Market validation errors
//! - 5xx: Clearing errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Matching, PriceVector, SellerId};

/// Central error enum for all Walras operations.
#[derive(Debug, Error)]
pub enum WalrasError {
    // =================================================================
    // Market Errors (1xx)
    // =================================================================
    /// The market has no buyers and no sellers.
    #[error("WL_ERR_100: Empty market: at least one buyer and one seller required")]
    EmptyMarket,

    /// The market failed validation (unequal sides, buyer without offers, ...).
    #[error("WL_ERR_101: Malformed market: {reason}")]
    MalformedMarket { reason: String },

    // =================================================================
    // Clearing Errors (5xx)
    // =================================================================
    /// The round bound was exceeded before a perfect matching appeared.
    ///
    /// Carries the last price vector and the partial matching of the final
    /// round for diagnostics.
    #[error("WL_ERR_500: No convergence in {rounds} rounds ({matched} of {size} buyers matched)")]
    NonConvergence {
        rounds: u64,
        matched: usize,
        size: usize,
        prices: PriceVector,
        matching: Matching,
    },

    /// A price raise would push a seller past [`crate::constants::MAX_PRICE`].
    #[error("WL_ERR_501: Price overflow: {seller} at {price} cannot rise by {delta}")]
    PriceOverflow {
        seller: SellerId,
        price: Decimal,
        delta: Decimal,
    },

    /// A sum over the outcome does not fit in a `Decimal`.
    #[error("WL_ERR_502: Value overflow: {0}")]
    ValueOverflow(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// An engine invariant was violated. Indicates a defect, not bad input.
    #[error("WL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("WL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Invalid clearing configuration.
    #[error("WL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl WalrasError {
    /// Shorthand for [`WalrasError::MalformedMarket`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMarket {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WalrasError>;

impl From<serde_json::Error> for WalrasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let msg = format!("{}", WalrasError::EmptyMarket);
        assert!(msg.starts_with("WL_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn malformed_market_display() {
        let err = WalrasError::malformed("buyer B2 has no valuations");
        let msg = format!("{err}");
        assert!(msg.contains("WL_ERR_101"));
        assert!(msg.contains("B2"));
    }

    #[test]
    fn non_convergence_display() {
        let err = WalrasError::NonConvergence {
            rounds: 90,
            matched: 2,
            size: 3,
            prices: PriceVector::default(),
            matching: Matching::default(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("WL_ERR_500"));
        assert!(msg.contains("90 rounds"));
        assert!(msg.contains("2 of 3"));
    }

    #[test]
    fn all_errors_have_wl_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(WalrasError::EmptyMarket),
            Box::new(WalrasError::malformed("x")),
            Box::new(WalrasError::PriceOverflow {
                seller: SellerId(1),
                price: Decimal::ONE,
                delta: Decimal::ONE,
            }),
            Box::new(WalrasError::ValueOverflow("total".into())),
            Box::new(WalrasError::Internal("test".into())),
            Box::new(WalrasError::Serialization("bad".into())),
            Box::new(WalrasError::Configuration("zero".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("WL_ERR_"),
                "Error missing WL_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let err: WalrasError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, WalrasError::Serialization(_)));
    }
}
