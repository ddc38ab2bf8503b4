//! Preferred-seller graph construction.
//!
//! For each buyer the payoff of a seller is `valuation - price`; the
//! buyer's preferred sellers are all sellers attaining the maximum payoff.
//! Ties are kept: several buyers crowding onto the same tied sellers is
//! exactly what the constricted-set search detects.
//!
//! The graph is a pure function of the market and the current prices and is
//! rebuilt every round.

use rust_decimal::Decimal;
use walras_types::{Market, PreferredEdge, PriceVector};

use crate::matching::Adjacency;

/// Preferred edges of one round, indexed by market position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredSellerGraph {
    size: usize,
    /// Ascending seller indices per buyer.
    adjacency: Vec<Vec<usize>>,
    /// Row-major `size × size` membership bitmap.
    membership: Vec<bool>,
    /// Maximum payoff per buyer.
    max_payoff: Vec<Decimal>,
}

impl PreferredSellerGraph {
    /// Build the preferred-seller graph of `market` at `prices`.
    #[must_use]
    pub fn build(market: &Market, prices: &PriceVector) -> Self {
        let size = market.size();
        let seller_prices: Vec<Decimal> = market.sellers().iter().map(|&s| prices.get(s)).collect();

        let mut adjacency = Vec::with_capacity(size);
        let mut membership = vec![false; size * size];
        let mut max_payoff = Vec::with_capacity(size);

        for bi in 0..size {
            let mut best: Option<Decimal> = None;
            let mut preferred: Vec<usize> = Vec::new();

            for (si, value) in market.offers_of(bi) {
                let payoff = value - seller_prices[si];
                match best {
                    Some(b) if payoff < b => {}
                    Some(b) if payoff == b => preferred.push(si),
                    _ => {
                        best = Some(payoff);
                        preferred.clear();
                        preferred.push(si);
                    }
                }
            }

            for &si in &preferred {
                membership[bi * size + si] = true;
            }
            adjacency.push(preferred);
            // A validated market gives every buyer at least one offer.
            max_payoff.push(best.unwrap_or(Decimal::ZERO));
        }

        Self {
            size,
            adjacency,
            membership,
            max_payoff,
        }
    }

    /// Number of buyers (and sellers).
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Preferred sellers of buyer `bi`, ascending.
    #[must_use]
    pub fn preferred(&self, bi: usize) -> &[usize] {
        &self.adjacency[bi]
    }

    #[must_use]
    pub fn is_preferred(&self, bi: usize, si: usize) -> bool {
        self.membership[bi * self.size + si]
    }

    /// Best payoff available to buyer `bi` at this round's prices.
    #[must_use]
    pub fn max_payoff(&self, bi: usize) -> Decimal {
        self.max_payoff[bi]
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Identifier-level edges with valuations and payoffs, ordered by buyer
    /// then seller. `market` must be the market the graph was built from.
    #[must_use]
    pub fn edges(&self, market: &Market) -> Vec<PreferredEdge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (bi, sellers) in self.adjacency.iter().enumerate() {
            for &si in sellers {
                let Some(valuation) = market.valuation_at(bi, si) else {
                    continue;
                };
                edges.push(PreferredEdge {
                    buyer: market.buyer_at(bi),
                    seller: market.seller_at(si),
                    valuation,
                    payoff: self.max_payoff[bi],
                });
            }
        }
        edges
    }
}

impl Adjacency for PreferredSellerGraph {
    fn size(&self) -> usize {
        self.size
    }

    fn neighbours(&self, buyer: usize) -> &[usize] {
        &self.adjacency[buyer]
    }

    fn has_edge(&self, buyer: usize, seller: usize) -> bool {
        self.is_preferred(buyer, seller)
    }
}
