//! Result of a successful clearing run and its graph export.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BuyerId, Matching, PriceVector, SellerId};

/// A Walrasian equilibrium: prices plus a perfect matching in which every
/// buyer holds a payoff-maximizing seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingOutcome {
    /// Final market-clearing prices.
    pub prices: PriceVector,
    /// Perfect matching, ascending by buyer.
    pub matching: Matching,
    /// Sum of valuations over matched pairs.
    pub total_value: Decimal,
    /// Each buyer's payoff (valuation minus price) at the final prices.
    pub payoffs: BTreeMap<BuyerId, Decimal>,
    /// Number of rounds run, including the final one.
    pub rounds: u64,
}

impl ClearingOutcome {
    /// Matched pairs in ascending buyer order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(BuyerId, SellerId)> {
        self.matching.pairs()
    }

    #[must_use]
    pub fn payoff_of(&self, buyer: BuyerId) -> Option<Decimal> {
        self.payoffs.get(&buyer).copied()
    }

    /// Sum of buyer payoffs. Adding `prices.total()` gives `total_value`.
    /// `None` if the sum does not fit in a `Decimal`.
    #[must_use]
    pub fn total_payoff(&self) -> Option<Decimal> {
        self.payoffs
            .values()
            .try_fold(Decimal::ZERO, |acc, &p| acc.checked_add(p))
    }
}

// ---------------------------------------------------------------------------
// Graph export
// ---------------------------------------------------------------------------

/// Which side of the bipartite graph a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Buyer,
    Seller,
}

/// A node of the exported graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Raw identifier (buyer and seller ids are disjoint).
    pub id: u32,
    pub partition: Partition,
    pub label: String,
    /// Final price; sellers only.
    pub price: Option<Decimal>,
}

/// A preferred edge of the final graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub buyer: u32,
    pub seller: u32,
    pub valuation: Decimal,
    pub payoff: Decimal,
    /// Edge is part of the final matching.
    pub matched: bool,
}

/// Final preferred-seller graph, annotated with the matching, for an
/// external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Buyers first, then sellers, each ascending.
    pub nodes: Vec<GraphNode>,
    /// Ordered by buyer then seller.
    pub edges: Vec<GraphEdge>,
    pub total_value: Decimal,
}

impl GraphExport {
    pub fn matched_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.matched)
    }
}
