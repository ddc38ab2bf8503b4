//! Constricted-set (Hall violator) detection.
//!
//! Given a maximum but not perfect matching, an alternating breadth-first
//! search from the lowest unmatched buyer `u0` collects:
//!
//! - `S`: `u0` plus every buyer matched to a seller in `T`
//! - `T`: every preferred seller of a buyer in `S`
//!
//! Because the matching is maximum, the search never meets an unmatched
//! seller (that would be an augmenting path), so each seller in `T` is
//! matched into `S` and `|T| = |S| - 1`.

use std::collections::VecDeque;

use walras_types::{ConstrictedSet, Market};

use crate::matching::{Adjacency, IndexMatching};

/// A constricted set over market positions. Both lists are ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constriction {
    pub buyers: Vec<usize>,
    pub sellers: Vec<usize>,
}

impl Constriction {
    #[must_use]
    pub fn to_ids(&self, market: &Market) -> ConstrictedSet {
        ConstrictedSet {
            buyers: self.buyers.iter().map(|&b| market.buyer_at(b)).collect(),
            sellers: self.sellers.iter().map(|&s| market.seller_at(s)).collect(),
        }
    }
}

/// Find the constricted set rooted at the lowest unmatched buyer.
///
/// Returns `None` when `matching` is perfect, and also when the search
/// reaches an unmatched seller, which means `matching` was not maximum.
#[must_use]
pub fn find_constricted_set<G: Adjacency + ?Sized>(
    graph: &G,
    matching: &IndexMatching,
) -> Option<Constriction> {
    let root = matching.first_unmatched_buyer()?;
    let size = graph.size();

    let mut in_s = vec![false; size];
    let mut in_t = vec![false; size];
    let mut queue = VecDeque::from([root]);
    in_s[root] = true;

    while let Some(buyer) = queue.pop_front() {
        for &seller in graph.neighbours(buyer) {
            if in_t[seller] {
                continue;
            }
            in_t[seller] = true;
            let owner = matching.buyer_of(seller)?;
            if !in_s[owner] {
                in_s[owner] = true;
                queue.push_back(owner);
            }
        }
    }

    let collect = |flags: &[bool]| -> Vec<usize> {
        flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    };
    Some(Constriction {
        buyers: collect(&in_s),
        sellers: collect(&in_t),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use walras_types::*;

    use super::*;
    use crate::{PreferredSellerGraph, maximum_matching};

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn perfect_matching_has_no_violator() {
        let market = Market::worked_example();
        let prices = PriceVector::for_market(&market, [(SellerId(4), dec(2))]).unwrap();
        let graph = PreferredSellerGraph::build(&market, &prices);
        let matching = maximum_matching(&graph);
        assert!(matching.is_perfect());
        assert!(find_constricted_set(&graph, &matching).is_none());
    }

    #[test]
    fn two_buyers_crowding_one_seller() {
        let market = Market::worked_example();
        let graph = PreferredSellerGraph::build(&market, &PriceVector::zero(&market));
        let matching = maximum_matching(&graph);
        let set = find_constricted_set(&graph, &matching).unwrap();
        assert_eq!(set.buyers, vec![1, 2]);
        assert_eq!(set.sellers, vec![1]);

        let ids = set.to_ids(&market);
        assert!(ids.is_constricted());
        assert_eq!(ids.sellers, [SellerId(4)].into());
        assert_eq!(ids.buyers, [BuyerId(1), BuyerId(2)].into());
    }

    #[test]
    fn neighbourhood_is_fully_matched_into_s() {
        let market = Market::random(8, 0.6, 5, 7);
        let graph = PreferredSellerGraph::build(&market, &PriceVector::zero(&market));
        let matching = maximum_matching(&graph);
        if let Some(set) = find_constricted_set(&graph, &matching) {
            assert_eq!(set.sellers.len() + 1, set.buyers.len());
            for &s in &set.sellers {
                let owner = matching.buyer_of(s).unwrap();
                assert!(set.buyers.contains(&owner));
            }
            for &b in &set.buyers {
                for &s in graph.preferred(b) {
                    assert!(set.sellers.contains(&s));
                }
            }
        } else {
            assert!(matching.is_perfect());
        }
    }

    #[test]
    fn non_maximum_matching_is_detected() {
        let market = Market::worked_example();
        let graph = PreferredSellerGraph::build(&market, &PriceVector::zero(&market));
        // Empty matching: buyer 0's preferred seller is free.
        let matching = IndexMatching::empty(3);
        assert!(find_constricted_set(&graph, &matching).is_none());
    }
}
