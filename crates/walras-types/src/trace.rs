//! Per-round trace records for external presenters.
//!
//! The clearing loop produces one [`RoundTrace`] per round. Nothing in this
//! crate renders them; they are plain serializable data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BuyerId, ConstrictedSet, Matching, PriceVector, RoundId, SellerId};

/// One edge of the preferred-seller graph with the payoff that put it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredEdge {
    pub buyer: BuyerId,
    pub seller: SellerId,
    pub valuation: Decimal,
    /// `valuation - price(seller)`; equal to the buyer's maximum payoff.
    pub payoff: Decimal,
}

/// Snapshot of a single clearing round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrace {
    pub round: RoundId,
    /// Prices the preferred graph of this round was built from.
    pub prices: PriceVector,
    /// Preferred edges ordered by buyer then seller.
    pub preferred: Vec<PreferredEdge>,
    /// Maximum matching found this round.
    pub matching: Matching,
    /// The Hall violator, when the matching was not perfect.
    pub constricted: Option<ConstrictedSet>,
    /// Raise applied to every seller in the constricted neighbourhood.
    pub delta: Option<Decimal>,
}

impl RoundTrace {
    /// `true` for the round that produced a perfect matching.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.constricted.is_none()
    }

    /// Preferred sellers of one buyer, ascending.
    #[must_use]
    pub fn preferred_of(&self, buyer: BuyerId) -> Vec<SellerId> {
        self.preferred
            .iter()
            .filter(|e| e.buyer == buyer)
            .map(|e| e.seller)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_round_has_no_violator() {
        let trace = RoundTrace {
            round: RoundId::FIRST,
            prices: PriceVector::default(),
            preferred: vec![
                PreferredEdge {
                    buyer: BuyerId(0),
                    seller: SellerId(2),
                    valuation: Decimal::ONE,
                    payoff: Decimal::ONE,
                },
                PreferredEdge {
                    buyer: BuyerId(1),
                    seller: SellerId(3),
                    valuation: Decimal::TWO,
                    payoff: Decimal::TWO,
                },
            ],
            matching: Matching::new(),
            constricted: None,
            delta: None,
        };
        assert!(trace.is_final());
        assert_eq!(trace.preferred_of(BuyerId(1)), vec![SellerId(3)]);

        let json = serde_json::to_string(&trace).unwrap();
        let back: RoundTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(trace, back);
    }
}
