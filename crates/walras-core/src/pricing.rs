//! Minimal price raise on a constricted neighbourhood.
//!
//! Raising every price in `T` by `delta` lowers the payoff of each buyer in
//! `S` on its preferred sellers by exactly `delta`. The smallest `delta`
//! that makes some seller outside `T` tie with the buyer's best payoff is
//!
//! ```text
//! delta = min { max_payoff(b) - (valuation(b, s) - price(s)) : b ∈ S, s ∉ T }
//! ```
//!
//! Sellers outside `T` are not preferred by any buyer in `S`, so every term
//! is strictly positive. Valuations and prices never exceed
//! `constants::MAX_PRICE`, so each term fits in a `Decimal`.

use rust_decimal::Decimal;
use walras_types::{Market, PriceVector, Result};

use crate::{Constriction, PreferredSellerGraph};

/// Smallest raise on `violator.sellers` that opens a new preferred edge.
///
/// `None` when no buyer in `S` values any seller outside `T`, which cannot
/// happen in a market that admits a perfect matching over its offers.
#[must_use]
pub fn minimal_raise(
    market: &Market,
    prices: &PriceVector,
    graph: &PreferredSellerGraph,
    violator: &Constriction,
) -> Option<Decimal> {
    let mut in_t = vec![false; market.size()];
    for &s in &violator.sellers {
        in_t[s] = true;
    }
    let in_t = &in_t;

    violator
        .buyers
        .iter()
        .flat_map(move |&b| {
            let best = graph.max_payoff(b);
            market
                .offers_of(b)
                .filter(move |&(s, _)| !in_t[s])
                .map(move |(s, value)| best - (value - prices.get(market.seller_at(s))))
        })
        .min()
}

/// Raise the price of every seller in `violator.sellers` by `delta`.
///
/// # Errors
/// [`walras_types::WalrasError::PriceOverflow`] if any raised price would
/// pass [`walras_types::constants::MAX_PRICE`]. No price is changed then.
pub fn apply_raise(
    market: &Market,
    prices: &mut PriceVector,
    violator: &Constriction,
    delta: Decimal,
) -> Result<()> {
    let mut raised = prices.clone();
    for &s in &violator.sellers {
        raised.raise(market.seller_at(s), delta)?;
    }
    *prices = raised;
    Ok(())
}

#[cfg(test)]
mod tests {
    use walras_types::*;

    use super::*;
    use crate::{find_constricted_set, maximum_matching};

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn raise_closes_smallest_gap() {
        let market = Market::worked_example();
        let mut prices = PriceVector::zero(&market);
        let graph = PreferredSellerGraph::build(&market, &prices);
        let violator = find_constricted_set(&graph, &maximum_matching(&graph)).unwrap();

        // Buyer 1: 6 - 4 = 2 to seller 5; buyer 2: 7 - 3 = 4 to seller 5.
        let delta = minimal_raise(&market, &prices, &graph, &violator).unwrap();
        assert_eq!(delta, dec(2));

        apply_raise(&market, &mut prices, &violator, delta).unwrap();
        assert_eq!(prices.get(SellerId(4)), dec(2));
        assert_eq!(prices.get(SellerId(3)), Decimal::ZERO);
        assert_eq!(prices.get(SellerId(5)), Decimal::ZERO);

        let next = PreferredSellerGraph::build(&market, &prices);
        assert!(next.is_preferred(1, 2), "raise must open a new edge");
        assert!(next.is_preferred(1, 1), "old edges inside S x T survive");
    }

    #[test]
    fn raise_past_ceiling_leaves_prices_untouched() {
        let market = Market::worked_example();
        let mut prices =
            PriceVector::for_market(&market, [(SellerId(5), constants::MAX_PRICE)]).unwrap();
        let violator = Constriction {
            buyers: vec![0, 1],
            sellers: vec![1, 2],
        };
        let before = prices.clone();
        let err = apply_raise(&market, &mut prices, &violator, dec(1)).unwrap_err();
        assert!(matches!(
            err,
            WalrasError::PriceOverflow {
                seller: SellerId(5),
                ..
            }
        ));
        assert_eq!(prices, before);
    }

    #[test]
    fn fractional_valuations_give_exact_delta() {
        let market = MarketBuilder::new()
            .buyer(
                BuyerId(0),
                [
                    (SellerId(2), Decimal::new(55, 1)),
                    (SellerId(3), Decimal::new(525, 2)),
                ],
            )
            .buyer(BuyerId(1), [(SellerId(2), Decimal::new(3, 0))])
            .sellers([SellerId(2), SellerId(3)])
            .build()
            .unwrap();
        let prices = PriceVector::zero(&market);
        let graph = PreferredSellerGraph::build(&market, &prices);
        let violator = find_constricted_set(&graph, &maximum_matching(&graph)).unwrap();
        let delta = minimal_raise(&market, &prices, &graph, &violator).unwrap();
        assert_eq!(delta, Decimal::new(25, 2));
    }

    #[test]
    fn no_outside_offer_yields_none() {
        let market = MarketBuilder::new()
            .buyer(BuyerId(0), [(SellerId(2), dec(1))])
            .buyer(BuyerId(1), [(SellerId(2), dec(1))])
            .sellers([SellerId(2), SellerId(3)])
            .build()
            .unwrap();
        let prices = PriceVector::zero(&market);
        let graph = PreferredSellerGraph::build(&market, &prices);
        let violator = find_constricted_set(&graph, &maximum_matching(&graph)).unwrap();
        assert!(minimal_raise(&market, &prices, &graph, &violator).is_none());
    }
}
