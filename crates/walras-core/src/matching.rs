//! Maximum-cardinality bipartite matching by augmenting paths.
//!
//! Kuhn's algorithm: every buyer, in ascending order, searches for an
//! augmenting path through the graph, trying sellers in ascending order.
//! The search is an iterative depth-first walk with an explicit stack, so
//! large markets cannot overflow the call stack. `O(n · E)` per matching.
//!
//! The engine is written against [`Adjacency`] so it runs both on the
//! preferred-seller graph of a round and on the full offer graph used to
//! check that a market is clearable at all.

use walras_types::{Market, Matching};

/// Bipartite adjacency over buyer and seller indices `0..size`.
pub trait Adjacency {
    /// Number of buyers (and sellers).
    fn size(&self) -> usize;

    /// Sellers adjacent to `buyer`, in ascending order.
    fn neighbours(&self, buyer: usize) -> &[usize];

    fn has_edge(&self, buyer: usize, seller: usize) -> bool;
}

/// Every defined valuation of a market as an edge.
#[derive(Debug, Clone)]
pub struct OfferGraph {
    adjacency: Vec<Vec<usize>>,
}

impl OfferGraph {
    #[must_use]
    pub fn new(market: &Market) -> Self {
        Self {
            adjacency: (0..market.size())
                .map(|bi| market.offers_of(bi).map(|(si, _)| si).collect())
                .collect(),
        }
    }
}

impl Adjacency for OfferGraph {
    fn size(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbours(&self, buyer: usize) -> &[usize] {
        &self.adjacency[buyer]
    }

    fn has_edge(&self, buyer: usize, seller: usize) -> bool {
        self.adjacency[buyer].binary_search(&seller).is_ok()
    }
}

// ---------------------------------------------------------------------------
// IndexMatching
// ---------------------------------------------------------------------------

/// A matching over market positions, kept consistent in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMatching {
    seller_of: Vec<Option<usize>>,
    buyer_of: Vec<Option<usize>>,
}

impl IndexMatching {
    /// Nobody matched.
    #[must_use]
    pub fn empty(size: usize) -> Self {
        Self {
            seller_of: vec![None; size],
            buyer_of: vec![None; size],
        }
    }

    /// Convert an identifier-level matching. Pairs naming participants
    /// outside `market` are dropped.
    #[must_use]
    pub fn from_matching(market: &Market, matching: &Matching) -> Self {
        let mut out = Self::empty(market.size());
        for (b, s) in matching.iter() {
            if let (Some(bi), Some(si)) = (market.buyer_index(b), market.seller_index(s)) {
                out.assign(bi, si);
            }
        }
        out
    }

    #[must_use]
    pub fn seller_of(&self, buyer: usize) -> Option<usize> {
        self.seller_of[buyer]
    }

    #[must_use]
    pub fn buyer_of(&self, seller: usize) -> Option<usize> {
        self.buyer_of[seller]
    }

    /// Number of matched pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seller_of.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seller_of.iter().all(Option::is_none)
    }

    /// Every buyer is matched.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.seller_of.iter().all(Option::is_some)
    }

    /// Lowest-index unmatched buyer.
    #[must_use]
    pub fn first_unmatched_buyer(&self) -> Option<usize> {
        self.seller_of.iter().position(Option::is_none)
    }

    /// `(buyer, seller)` index pairs in ascending buyer order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.seller_of
            .iter()
            .enumerate()
            .filter_map(|(b, s)| s.map(|s| (b, s)))
    }

    /// Identifier-level copy of this matching.
    #[must_use]
    pub fn to_matching(&self, market: &Market) -> Matching {
        self.pairs()
            .map(|(bi, si)| (market.buyer_at(bi), market.seller_at(si)))
            .collect()
    }

    fn assign(&mut self, buyer: usize, seller: usize) {
        if let Some(old) = self.seller_of[buyer].replace(seller) {
            self.buyer_of[old] = None;
        }
        if let Some(old) = self.buyer_of[seller].replace(buyer) {
            if old != buyer {
                self.seller_of[old] = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Matching engine
// ---------------------------------------------------------------------------

/// Maximum matching of `graph`, computed from scratch.
#[must_use]
pub fn maximum_matching<G: Adjacency + ?Sized>(graph: &G) -> IndexMatching {
    let size = graph.size();
    let mut matching = IndexMatching::empty(size);
    let mut visited = vec![false; size];
    for buyer in 0..size {
        visited.fill(false);
        augment_from(graph, &mut matching, buyer, &mut visited);
    }
    matching
}

/// Maximum matching of `graph`, seeded with the edges of `prior` that are
/// still edges of `graph`. Unmatched buyers then augment in ascending order.
#[must_use]
pub fn extend_matching<G: Adjacency + ?Sized>(graph: &G, prior: &IndexMatching) -> IndexMatching {
    let size = graph.size();
    let mut matching = IndexMatching::empty(size);
    for (b, s) in prior.pairs() {
        if b < size && s < size && graph.has_edge(b, s) {
            matching.assign(b, s);
        }
    }
    let mut visited = vec![false; size];
    for buyer in 0..size {
        if matching.seller_of(buyer).is_some() {
            continue;
        }
        visited.fill(false);
        augment_from(graph, &mut matching, buyer, &mut visited);
    }
    matching
}

/// Search for an augmenting path starting at the unmatched buyer `root` and
/// flip it if found. Returns `true` when the matching grew by one.
fn augment_from<G: Adjacency + ?Sized>(
    graph: &G,
    matching: &mut IndexMatching,
    root: usize,
    visited: &mut [bool],
) -> bool {
    // Each frame is (buyer, position of the next neighbour to try).
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    // via[k] is the matched seller that led from frame k to frame k + 1.
    let mut via: Vec<usize> = Vec::new();

    while let Some(frame) = stack.last_mut() {
        let (buyer, pos) = *frame;
        let Some(&seller) = graph.neighbours(buyer).get(pos) else {
            stack.pop();
            via.pop();
            continue;
        };
        frame.1 += 1;

        if visited[seller] {
            continue;
        }
        visited[seller] = true;

        if let Some(owner) = matching.buyer_of(seller) {
            via.push(seller);
            stack.push((owner, 0));
            continue;
        }

        // Free seller: shift every buyer on the path one edge forward.
        let top = stack.len() - 1;
        for (k, &(b, _)) in stack.iter().enumerate() {
            let s = if k == top { seller } else { via[k] };
            matching.assign(b, s);
        }
        return true;
    }
    false
}
