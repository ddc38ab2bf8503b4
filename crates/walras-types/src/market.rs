//! The assignment market: buyers, sellers and a partial valuation relation.
//!
//! A [`Market`] is validated once at construction and is immutable after
//! that. Participants are stored in ascending identifier order and
//! valuations live in a dense `n × n` matrix indexed by those positions, so
//! the engine can work on plain indices while callers keep using ids.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BuyerId, Result, SellerId, WalrasError, constants};

/// One buyer's valuation of one seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub buyer: BuyerId,
    pub seller: SellerId,
    pub value: Decimal,
}

/// Wire form of a [`Market`]: participant lists plus valuation triples.
///
/// Deserializing a `Market` goes through this and then [`Market::new`], so a
/// deserialized market is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInput {
    pub buyers: Vec<BuyerId>,
    pub sellers: Vec<SellerId>,
    pub valuations: Vec<Valuation>,
}

/// A validated assignment market with `n` buyers and `n` sellers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarketInput", into = "MarketInput")]
pub struct Market {
    buyers: Vec<BuyerId>,
    sellers: Vec<SellerId>,
    /// `valuations[buyer_idx][seller_idx]`; `None` = no offer.
    valuations: Vec<Vec<Option<Decimal>>>,
}

impl Market {
    /// Build and validate a market.
    ///
    /// # Errors
    /// - [`WalrasError::EmptyMarket`] if both sides are empty.
    /// - [`WalrasError::MalformedMarket`] if the sides differ in size, an id
    ///   repeats or appears on both sides, a valuation is negative, above
    ///   [`constants::MAX_PRICE`], repeated or names an unknown participant,
    ///   or some buyer has no valuation.
    pub fn new(
        buyers: impl IntoIterator<Item = BuyerId>,
        sellers: impl IntoIterator<Item = SellerId>,
        valuations: impl IntoIterator<Item = Valuation>,
    ) -> Result<Self> {
        let mut buyers: Vec<BuyerId> = buyers.into_iter().collect();
        let mut sellers: Vec<SellerId> = sellers.into_iter().collect();

        if buyers.is_empty() && sellers.is_empty() {
            return Err(WalrasError::EmptyMarket);
        }
        if buyers.len() != sellers.len() {
            return Err(WalrasError::malformed(format!(
                "{} buyers but {} sellers",
                buyers.len(),
                sellers.len()
            )));
        }

        buyers.sort_unstable();
        sellers.sort_unstable();
        if let Some(dup) = buyers.windows(2).find(|w| w[0] == w[1]) {
            return Err(WalrasError::malformed(format!("duplicate buyer {}", dup[0])));
        }
        if let Some(dup) = sellers.windows(2).find(|w| w[0] == w[1]) {
            return Err(WalrasError::malformed(format!("duplicate seller {}", dup[0])));
        }
        let buyer_raw: BTreeSet<u32> = buyers.iter().map(|b| b.raw()).collect();
        if let Some(shared) = sellers.iter().find(|s| buyer_raw.contains(&s.raw())) {
            return Err(WalrasError::malformed(format!(
                "identifier {} is both a buyer and a seller",
                shared.raw()
            )));
        }

        let n = buyers.len();
        let mut matrix = vec![vec![None; n]; n];
        for Valuation {
            buyer,
            seller,
            value,
        } in valuations
        {
            let bi = buyers.binary_search(&buyer).map_err(|_| {
                WalrasError::malformed(format!("valuation names unknown buyer {buyer}"))
            })?;
            let si = sellers.binary_search(&seller).map_err(|_| {
                WalrasError::malformed(format!("valuation names unknown seller {seller}"))
            })?;
            if value < Decimal::ZERO {
                return Err(WalrasError::malformed(format!(
                    "negative valuation {value} for {buyer} -> {seller}"
                )));
            }
            if value > constants::MAX_PRICE {
                return Err(WalrasError::malformed(format!(
                    "valuation for {buyer} -> {seller} exceeds {}",
                    constants::MAX_PRICE
                )));
            }
            let slot: &mut Option<Decimal> = &mut matrix[bi][si];
            if slot.is_some() {
                return Err(WalrasError::malformed(format!(
                    "duplicate valuation for {buyer} -> {seller}"
                )));
            }
            *slot = Some(value);
        }

        if let Some(bi) = matrix.iter().position(|row| row.iter().all(Option::is_none)) {
            return Err(WalrasError::malformed(format!(
                "buyer {} has no valuations",
                buyers[bi]
            )));
        }

        Ok(Self {
            buyers,
            sellers,
            valuations: matrix,
        })
    }

    /// Number of buyers (equal to the number of sellers).
    #[must_use]
    pub fn size(&self) -> usize {
        self.buyers.len()
    }

    /// Buyers in ascending order.
    #[must_use]
    pub fn buyers(&self) -> &[BuyerId] {
        &self.buyers
    }

    /// Sellers in ascending order.
    #[must_use]
    pub fn sellers(&self) -> &[SellerId] {
        &self.sellers
    }

    #[must_use]
    pub fn buyer_index(&self, buyer: BuyerId) -> Option<usize> {
        self.buyers.binary_search(&buyer).ok()
    }

    #[must_use]
    pub fn seller_index(&self, seller: SellerId) -> Option<usize> {
        self.sellers.binary_search(&seller).ok()
    }

    #[must_use]
    pub fn buyer_at(&self, idx: usize) -> BuyerId {
        self.buyers[idx]
    }

    #[must_use]
    pub fn seller_at(&self, idx: usize) -> SellerId {
        self.sellers[idx]
    }

    /// Valuation of `buyer` for `seller`, if one was given.
    #[must_use]
    pub fn valuation(&self, buyer: BuyerId, seller: SellerId) -> Option<Decimal> {
        let bi = self.buyer_index(buyer)?;
        let si = self.seller_index(seller)?;
        self.valuations[bi][si]
    }

    /// Index-level valuation lookup. Panics on out-of-range indices.
    #[must_use]
    pub fn valuation_at(&self, buyer_idx: usize, seller_idx: usize) -> Option<Decimal> {
        self.valuations[buyer_idx][seller_idx]
    }

    /// `(seller_idx, value)` for every defined valuation of one buyer, in
    /// ascending seller order.
    pub fn offers_of(&self, buyer_idx: usize) -> impl Iterator<Item = (usize, Decimal)> + '_ {
        self.valuations[buyer_idx]
            .iter()
            .enumerate()
            .filter_map(|(si, v)| v.map(|v| (si, v)))
    }

    /// Every defined valuation, ordered by buyer then seller.
    pub fn valuations(&self) -> impl Iterator<Item = Valuation> + '_ {
        (0..self.size()).flat_map(move |bi| {
            self.offers_of(bi).map(move |(si, value)| Valuation {
                buyer: self.buyers[bi],
                seller: self.sellers[si],
                value,
            })
        })
    }

    /// Largest valuation in the market.
    #[must_use]
    pub fn max_valuation(&self) -> Decimal {
        self.valuations
            .iter()
            .flatten()
            .flatten()
            .copied()
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<MarketInput> for Market {
    type Error = WalrasError;

    fn try_from(input: MarketInput) -> Result<Self> {
        Self::new(input.buyers, input.sellers, input.valuations)
    }
}

impl From<Market> for MarketInput {
    fn from(market: Market) -> Self {
        let valuations = market.valuations().collect();
        Self {
            buyers: market.buyers,
            sellers: market.sellers,
            valuations,
        }
    }
}

// ---------------------------------------------------------------------------
// MarketBuilder
// ---------------------------------------------------------------------------

/// Incremental construction of a [`Market`].
///
/// ```
/// use rust_decimal::Decimal;
/// use walras_types::{BuyerId, MarketBuilder, SellerId};
///
/// let market = MarketBuilder::new()
///     .buyer(BuyerId(0), [(SellerId(1), Decimal::new(5, 0))])
///     .seller(SellerId(1))
///     .build()
///     .unwrap();
/// assert_eq!(market.size(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarketBuilder {
    buyers: Vec<BuyerId>,
    sellers: Vec<SellerId>,
    valuations: Vec<Valuation>,
}

impl MarketBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a buyer together with its offers.
    #[must_use]
    pub fn buyer(
        mut self,
        buyer: BuyerId,
        offers: impl IntoIterator<Item = (SellerId, Decimal)>,
    ) -> Self {
        self.buyers.push(buyer);
        self.valuations
            .extend(offers.into_iter().map(|(seller, value)| Valuation {
                buyer,
                seller,
                value,
            }));
        self
    }

    #[must_use]
    pub fn seller(mut self, seller: SellerId) -> Self {
        self.sellers.push(seller);
        self
    }

    #[must_use]
    pub fn sellers(mut self, sellers: impl IntoIterator<Item = SellerId>) -> Self {
        self.sellers.extend(sellers);
        self
    }

    pub fn build(self) -> Result<Market> {
        Market::new(self.buyers, self.sellers, self.valuations)
    }
}

// ---------------------------------------------------------------------------
// Fixture markets (test helpers)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl Market {
    /// Buyers `{0, 1, 2}`, sellers `{3, 4, 5}`, every pair valued.
    ///
    /// Clears at prices `{3: 0, 4: 2, 5: 0}` with matching
    /// `[(0, 3), (1, 5), (2, 4)]` and total value 23 after two rounds.
    #[must_use]
    pub fn worked_example() -> Self {
        let sellers = [SellerId(3), SellerId(4), SellerId(5)];
        let rows: [[i64; 3]; 3] = [[12, 4, 2], [2, 6, 4], [2, 7, 3]];
        let mut builder = MarketBuilder::new().sellers(sellers);
        for (b, values) in (0..).zip(rows) {
            let offers = sellers.into_iter().zip(values.map(Decimal::from));
            builder = builder.buyer(BuyerId(b), offers);
        }
        builder
            .build()
            .expect("worked example is valid by construction")
    }

    /// Random integer-valued market with buyers `0..n` and sellers `n..2n`.
    ///
    /// Buyer `i` always values seller `n + i`, so the market admits a
    /// perfect matching; every other pair is present with probability
    /// `density`. Values are drawn from `0..=max_value`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn random(n: usize, density: f64, max_value: i64, seed: u64) -> Self {
        use rand::{Rng, SeedableRng, rngs::StdRng};

        assert!(n > 0, "random market needs at least one buyer");
        let mut rng = StdRng::seed_from_u64(seed);
        let buyers: Vec<BuyerId> = (0..n as u32).map(BuyerId).collect();
        let sellers: Vec<SellerId> = (n as u32..2 * n as u32).map(SellerId).collect();

        let mut valuations = Vec::new();
        for (bi, &buyer) in buyers.iter().enumerate() {
            for (si, &seller) in sellers.iter().enumerate() {
                if bi == si || rng.gen_bool(density) {
                    valuations.push(Valuation {
                        buyer,
                        seller,
                        value: Decimal::from(rng.gen_range(0..=max_value)),
                    });
                }
            }
        }
        Self::new(buyers, sellers, valuations).expect("random market is valid by construction")
    }
}
