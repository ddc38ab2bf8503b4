//! The ascending-auction clearing loop.
//!
//! Each round:
//!
//! ```text
//! BUILD_GRAPH -> MATCH -> CHECK -> DONE
//!                           |
//!                           +-> CONSTRICT -> RAISE_PRICE -> BUILD_GRAPH
//! ```
//!
//! and the run fails with [`WalrasError::NonConvergence`] once the round
//! bound is exhausted. The loop owns the price vector and the current
//! matching; every other component is a pure function of them.
//!
//! ## Determinism
//!
//! Buyers and sellers are always visited in ascending identifier order, and
//! the constricted-set search starts at the lowest unmatched buyer. The same
//! market and starting prices therefore always produce the same outcome.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use walras_types::{
    ClearingConfig, ClearingOutcome, Market, PriceVector, Result, RoundId, RoundTrace, WalrasError,
};

use crate::{
    Constriction, IndexMatching, OfferGraph, PreferredSellerGraph, apply_raise,
    determinism::compute_outcome_root, extend_matching, find_constricted_set, maximum_matching,
    minimal_raise,
};

// ---------------------------------------------------------------------------
// Round observers
// ---------------------------------------------------------------------------

/// Receives one [`RoundTrace`] per round, for an external presenter.
pub trait RoundObserver {
    fn on_round(&mut self, trace: &RoundTrace);

    /// Return `false` to skip building trace records altogether.
    fn wants_trace(&self) -> bool {
        true
    }
}

impl<F: FnMut(&RoundTrace)> RoundObserver for F {
    fn on_round(&mut self, trace: &RoundTrace) {
        self(trace);
    }
}

/// Observer that ignores every round.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RoundObserver for NoopObserver {
    fn on_round(&mut self, _trace: &RoundTrace) {}

    fn wants_trace(&self) -> bool {
        false
    }
}

/// Observer that keeps every round it sees.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    pub rounds: Vec<RoundTrace>,
}

impl TraceRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoundObserver for TraceRecorder {
    fn on_round(&mut self, trace: &RoundTrace) {
        self.rounds.push(trace.clone());
    }
}

// ---------------------------------------------------------------------------
// ClearingLoop
// ---------------------------------------------------------------------------

/// Drives rounds of graph building, matching and price raising until the
/// preferred-seller graph has a perfect matching.
#[derive(Debug, Clone, Default)]
pub struct ClearingLoop {
    config: ClearingConfig,
}

impl ClearingLoop {
    #[must_use]
    pub fn new(config: ClearingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ClearingConfig {
        &self.config
    }

    /// Clear `market` starting from zero prices.
    pub fn run(&self, market: &Market) -> Result<ClearingOutcome> {
        self.run_with_observer(market, &PriceVector::zero(market), &mut NoopObserver)
    }

    /// Clear `market` starting from `initial` prices.
    pub fn run_from(&self, market: &Market, initial: &PriceVector) -> Result<ClearingOutcome> {
        self.run_with_observer(market, initial, &mut NoopObserver)
    }

    /// Clear `market` from `initial` prices, reporting every round to
    /// `observer`.
    ///
    /// # Errors
    /// - [`WalrasError::Configuration`] for an invalid config.
    /// - [`WalrasError::MalformedMarket`] if `initial` prices a seller outside
    ///   the market or negatively, or if no perfect matching exists over the
    ///   market's offers.
    /// - [`WalrasError::NonConvergence`] when the round bound runs out.
    /// - [`WalrasError::PriceOverflow`] or [`WalrasError::ValueOverflow`] when
    ///   prices or the matched total leave the supported numeric range.
    /// - [`WalrasError::Internal`] on a violated engine invariant.
    pub fn run_with_observer<O: RoundObserver + ?Sized>(
        &self,
        market: &Market,
        initial: &PriceVector,
        observer: &mut O,
    ) -> Result<ClearingOutcome> {
        self.config.validate()?;
        let mut prices = PriceVector::for_market(market, initial.iter())?;
        ensure_clearable(market)?;

        let bound = self.config.round_bound(market.size());
        let mut round = RoundId::FIRST;
        let mut current: Option<IndexMatching> = None;

        for _ in 0..bound {
            let graph = PreferredSellerGraph::build(market, &prices);
            let matching = match (&current, self.config.warm_start) {
                (Some(prior), true) => extend_matching(&graph, prior),
                _ => maximum_matching(&graph),
            };

            if matching.is_perfect() {
                if observer.wants_trace() {
                    let trace = trace_round(market, round, &prices, &graph, &matching, None, None);
                    observer.on_round(&trace);
                }
                return settle(market, prices, &matching, round);
            }

            let Some(violator) = find_constricted_set(&graph, &matching) else {
                tracing::error!(round = round.0, "Maximum matching without a constricted set");
                return Err(WalrasError::Internal(format!(
                    "{round}: no constricted set for a non-perfect matching"
                )));
            };
            let Some(delta) = minimal_raise(market, &prices, &graph, &violator) else {
                tracing::error!(round = round.0, "Constricted set without an outside offer");
                return Err(WalrasError::Internal(format!(
                    "{round}: constricted set has no seller to move towards"
                )));
            };

            if observer.wants_trace() {
                observer.on_round(&trace_round(
                    market,
                    round,
                    &prices,
                    &graph,
                    &matching,
                    Some(&violator),
                    Some(delta),
                ));
            }

            tracing::debug!(
                round = round.0,
                matched = matching.len(),
                constricted_buyers = violator.buyers.len(),
                constricted_sellers = violator.sellers.len(),
                delta = %delta,
                "Raising constricted prices"
            );

            if let Err(err) = apply_raise(market, &mut prices, &violator, delta) {
                tracing::warn!(round = round.0, delta = %delta, "Price raise out of range");
                return Err(err);
            }
            current = Some(matching);
            round = round.next();
        }

        let matching = current.unwrap_or_else(|| IndexMatching::empty(market.size()));
        tracing::warn!(
            rounds = bound,
            matched = matching.len(),
            size = market.size(),
            prices = %prices,
            "Clearing did not converge"
        );
        Err(WalrasError::NonConvergence {
            rounds: bound as u64,
            matched: matching.len(),
            size: market.size(),
            prices,
            matching: matching.to_matching(market),
        })
    }
}

/// Clear `market` from zero prices with the default configuration.
pub fn clear_market(market: &Market) -> Result<ClearingOutcome> {
    ClearingLoop::default().run(market)
}

/// Reject markets whose offers admit no perfect matching at any prices.
fn ensure_clearable(market: &Market) -> Result<()> {
    let matching = maximum_matching(&OfferGraph::new(market));
    if matching.is_perfect() {
        return Ok(());
    }
    Err(WalrasError::malformed(format!(
        "no perfect matching over the offered valuations: at most {} of {} buyers can be assigned",
        matching.len(),
        market.size()
    )))
}

fn trace_round(
    market: &Market,
    round: RoundId,
    prices: &PriceVector,
    graph: &PreferredSellerGraph,
    matching: &IndexMatching,
    violator: Option<&Constriction>,
    delta: Option<Decimal>,
) -> RoundTrace {
    RoundTrace {
        round,
        prices: prices.clone(),
        preferred: graph.edges(market),
        matching: matching.to_matching(market),
        constricted: violator.map(|v| v.to_ids(market)),
        delta,
    }
}

fn settle(
    market: &Market,
    prices: PriceVector,
    matching: &IndexMatching,
    round: RoundId,
) -> Result<ClearingOutcome> {
    let mut total_value = Decimal::ZERO;
    let mut payoffs = BTreeMap::new();
    for (bi, si) in matching.pairs() {
        let Some(value) = market.valuation_at(bi, si) else {
            return Err(WalrasError::Internal(format!(
                "matched pair {} -> {} has no valuation",
                market.buyer_at(bi),
                market.seller_at(si)
            )));
        };
        total_value = total_value.checked_add(value).ok_or_else(|| {
            WalrasError::ValueOverflow("total value of the matching".into())
        })?;
        payoffs.insert(market.buyer_at(bi), value - prices.get(market.seller_at(si)));
    }

    let outcome = ClearingOutcome {
        prices,
        matching: matching.to_matching(market),
        total_value,
        payoffs,
        rounds: round.0,
    };

    tracing::info!(
        rounds = outcome.rounds,
        size = market.size(),
        total_value = %outcome.total_value,
        prices = %outcome.prices,
        fingerprint = hex::encode(compute_outcome_root(&outcome)),
        "Market cleared"
    );

    Ok(outcome)
}
