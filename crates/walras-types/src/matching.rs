//! Matchings and constricted sets over the preferred-seller graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{BuyerId, SellerId};

/// A partial one-to-one assignment of buyers to sellers.
///
/// Serialized as an ascending list of `(buyer, seller)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(BuyerId, SellerId)>", into = "Vec<(BuyerId, SellerId)>")]
pub struct Matching {
    by_buyer: BTreeMap<BuyerId, SellerId>,
    by_seller: BTreeMap<SellerId, BuyerId>,
}

impl Matching {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `buyer` with `seller`, dropping any previous partner of either.
    pub fn insert(&mut self, buyer: BuyerId, seller: SellerId) {
        if let Some(old_seller) = self.by_buyer.insert(buyer, seller) {
            self.by_seller.remove(&old_seller);
        }
        if let Some(old_buyer) = self.by_seller.insert(seller, buyer) {
            if old_buyer != buyer {
                self.by_buyer.remove(&old_buyer);
            }
        }
    }

    #[must_use]
    pub fn seller_of(&self, buyer: BuyerId) -> Option<SellerId> {
        self.by_buyer.get(&buyer).copied()
    }

    #[must_use]
    pub fn buyer_of(&self, seller: SellerId) -> Option<BuyerId> {
        self.by_seller.get(&seller).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_buyer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_buyer.is_empty()
    }

    /// Pairs in ascending buyer order.
    pub fn iter(&self) -> impl Iterator<Item = (BuyerId, SellerId)> + '_ {
        self.by_buyer.iter().map(|(&b, &s)| (b, s))
    }

    #[must_use]
    pub fn pairs(&self) -> Vec<(BuyerId, SellerId)> {
        self.iter().collect()
    }
}

impl From<Vec<(BuyerId, SellerId)>> for Matching {
    fn from(pairs: Vec<(BuyerId, SellerId)>) -> Self {
        let mut matching = Self::new();
        for (b, s) in pairs {
            matching.insert(b, s);
        }
        matching
    }
}

impl From<Matching> for Vec<(BuyerId, SellerId)> {
    fn from(matching: Matching) -> Self {
        matching.pairs()
    }
}

impl FromIterator<(BuyerId, SellerId)> for Matching {
    fn from_iter<I: IntoIterator<Item = (BuyerId, SellerId)>>(iter: I) -> Self {
        let mut matching = Self::new();
        for (b, s) in iter {
            matching.insert(b, s);
        }
        matching
    }
}

/// A Hall violator `(S, T)`: buyers `S` whose preferred sellers `T = N(S)`
/// are strictly fewer than `S`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstrictedSet {
    /// `S`: buyers reached by the alternating search.
    pub buyers: BTreeSet<BuyerId>,
    /// `T`: their neighbourhood in the preferred-seller graph.
    pub sellers: BTreeSet<SellerId>,
}

impl ConstrictedSet {
    /// `|S| - |T|`; positive for a genuine constricted set.
    #[must_use]
    pub fn excess(&self) -> usize {
        self.buyers.len().saturating_sub(self.sellers.len())
    }

    #[must_use]
    pub fn is_constricted(&self) -> bool {
        self.sellers.len() < self.buyers.len()
    }
}
