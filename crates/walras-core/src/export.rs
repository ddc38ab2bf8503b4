//! Export of the final preferred-seller graph for rendering.
//!
//! The export is plain data: nodes tagged by partition, sellers carrying
//! their final price, and the final preferred edges flagged when they are
//! part of the matching. Layout and drawing belong to the consumer.

use walras_types::{ClearingOutcome, GraphEdge, GraphExport, GraphNode, Market, Partition};

use crate::PreferredSellerGraph;

/// Build the graph export of `outcome`, which must come from clearing
/// `market`.
#[must_use]
pub fn export_graph(market: &Market, outcome: &ClearingOutcome) -> GraphExport {
    let graph = PreferredSellerGraph::build(market, &outcome.prices);

    let buyers = market.buyers().iter().map(|b| GraphNode {
        id: b.raw(),
        partition: Partition::Buyer,
        label: b.to_string(),
        price: None,
    });
    let sellers = market.sellers().iter().map(|&s| GraphNode {
        id: s.raw(),
        partition: Partition::Seller,
        label: s.to_string(),
        price: Some(outcome.prices.get(s)),
    });

    let edges = graph
        .edges(market)
        .into_iter()
        .map(|e| GraphEdge {
            buyer: e.buyer.raw(),
            seller: e.seller.raw(),
            valuation: e.valuation,
            payoff: e.payoff,
            matched: outcome.matching.seller_of(e.buyer) == Some(e.seller),
        })
        .collect();

    GraphExport {
        nodes: buyers.chain(sellers).collect(),
        edges,
        total_value: outcome.total_value,
    }
}
