//! Seller price vector.
//!
//! Prices start at zero and only ever move up within one clearing run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Market, Result, SellerId, WalrasError, constants};

/// Mapping seller → current price. Every price is non-negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceVector(BTreeMap<SellerId, Decimal>);

impl PriceVector {
    /// All sellers of `market` at price zero.
    #[must_use]
    pub fn zero(market: &Market) -> Self {
        Self(
            market
                .sellers()
                .iter()
                .map(|&s| (s, Decimal::ZERO))
                .collect(),
        )
    }

    /// Build a price vector for `market` from explicit prices.
    ///
    /// Sellers not mentioned start at zero.
    ///
    /// # Errors
    /// [`WalrasError::MalformedMarket`] for a negative price, a price above
    /// [`constants::MAX_PRICE`], or a seller that is not part of the market.
    pub fn for_market(
        market: &Market,
        prices: impl IntoIterator<Item = (SellerId, Decimal)>,
    ) -> Result<Self> {
        let mut vector = Self::zero(market);
        for (seller, price) in prices {
            if market.seller_index(seller).is_none() {
                return Err(WalrasError::malformed(format!(
                    "price given for unknown seller {seller}"
                )));
            }
            if price < Decimal::ZERO {
                return Err(WalrasError::malformed(format!(
                    "negative price {price} for {seller}"
                )));
            }
            if price > constants::MAX_PRICE {
                return Err(WalrasError::malformed(format!(
                    "price {price} for {seller} exceeds {}",
                    constants::MAX_PRICE
                )));
            }
            vector.0.insert(seller, price);
        }
        Ok(vector)
    }

    /// Current price of `seller` (zero if never set).
    #[must_use]
    pub fn get(&self, seller: SellerId) -> Decimal {
        self.0.get(&seller).copied().unwrap_or(Decimal::ZERO)
    }

    /// Raise one seller's price by `delta`. Negative deltas are ignored.
    ///
    /// # Errors
    /// [`WalrasError::PriceOverflow`] if the new price would exceed
    /// [`constants::MAX_PRICE`]. The price is left unchanged.
    pub fn raise(&mut self, seller: SellerId, delta: Decimal) -> Result<()> {
        if delta <= Decimal::ZERO {
            return Ok(());
        }
        let price = self.0.entry(seller).or_insert(Decimal::ZERO);
        match price.checked_add(delta) {
            Some(raised) if raised <= constants::MAX_PRICE => {
                *price = raised;
                Ok(())
            }
            _ => Err(WalrasError::PriceOverflow {
                seller,
                price: *price,
                delta,
            }),
        }
    }

    /// `(seller, price)` in ascending seller order.
    pub fn iter(&self) -> impl Iterator<Item = (SellerId, Decimal)> + '_ {
        self.0.iter().map(|(&s, &p)| (s, p))
    }

    /// Sum of all prices; the potential that grows every unfinished round.
    /// `None` if the sum does not fit in a `Decimal`.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.0
            .values()
            .try_fold(Decimal::ZERO, |acc, &p| acc.checked_add(p))
    }

    /// `true` if no seller is priced below its price in `earlier`.
    #[must_use]
    pub fn dominates(&self, earlier: &Self) -> bool {
        earlier.iter().all(|(s, p)| self.get(s) >= p)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PriceVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (s, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {p}", s.raw())?;
        }
        write!(f, "}}")
    }
}
