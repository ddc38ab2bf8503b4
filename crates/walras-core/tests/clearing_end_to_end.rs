//! End-to-end tests through the public API.
//!
//! These exercise the full path a collaborator takes: build or deserialize
//! a market, clear it while recording the trace, then export the final
//! graph and fingerprint the outcome.

use rust_decimal::Decimal;
use walras_core::{
    ClearingLoop, TraceRecorder, clear_market, compute_outcome_root, export_graph,
    verify_outcome_root,
};
use walras_types::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("walras_core=debug"))
        .with_test_writer()
        .try_init();
}

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

const WORKED_MARKET: &str = r#"{
    "buyers": [0, 1, 2],
    "sellers": [3, 4, 5],
    "valuations": [
        {"buyer": 0, "seller": 3, "value": "12"},
        {"buyer": 0, "seller": 4, "value": "4"},
        {"buyer": 0, "seller": 5, "value": "2"},
        {"buyer": 1, "seller": 3, "value": "2"},
        {"buyer": 1, "seller": 4, "value": "6"},
        {"buyer": 1, "seller": 5, "value": "4"},
        {"buyer": 2, "seller": 3, "value": "2"},
        {"buyer": 2, "seller": 4, "value": "7"},
        {"buyer": 2, "seller": 5, "value": "3"}
    ]
}"#;

#[test]
fn worked_scenario_from_json() {
    init_tracing();
    let market: Market = serde_json::from_str(WORKED_MARKET).unwrap();
    assert_eq!(market.size(), 3);

    let mut recorder = TraceRecorder::new();
    let outcome = ClearingLoop::default()
        .run_with_observer(&market, &PriceVector::zero(&market), &mut recorder)
        .unwrap();

    assert_eq!(outcome.prices.to_string(), "{3: 0, 4: 2, 5: 0}");
    assert_eq!(
        outcome.pairs(),
        vec![
            (BuyerId(0), SellerId(3)),
            (BuyerId(1), SellerId(5)),
            (BuyerId(2), SellerId(4)),
        ]
    );
    assert_eq!(outcome.total_value, dec(23));

    // Round 1: buyers 1 and 2 both want seller 4 only.
    let first = &recorder.rounds[0];
    assert_eq!(first.preferred_of(BuyerId(0)), vec![SellerId(3)]);
    assert_eq!(first.preferred_of(BuyerId(1)), vec![SellerId(4)]);
    assert_eq!(first.preferred_of(BuyerId(2)), vec![SellerId(4)]);
    assert_eq!(first.delta, Some(dec(2)));

    let export = export_graph(&market, &outcome);
    let matched: Vec<_> = export.matched_edges().map(|e| (e.buyer, e.seller)).collect();
    assert_eq!(matched, vec![(0, 3), (1, 5), (2, 4)]);

    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["nodes"][4]["label"], "S4");
    assert_eq!(json["nodes"][4]["price"], "2");
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(export.edges.len()));
}

#[test]
fn outcome_serializes_to_output_contract() {
    let market: Market = serde_json::from_str(WORKED_MARKET).unwrap();
    let outcome = clear_market(&market).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["prices"]["4"], "2");
    assert_eq!(json["matching"], serde_json::json!([[0, 3], [1, 5], [2, 4]]));
    assert_eq!(json["total_value"], "23");
    assert_eq!(json["payoffs"]["2"], "5");

    let back: ClearingOutcome = serde_json::from_value(json).unwrap();
    assert_eq!(back, outcome);
}

#[test]
fn fingerprint_is_stable_across_runs() {
    init_tracing();
    let market: Market = serde_json::from_str(WORKED_MARKET).unwrap();
    let a = clear_market(&market).unwrap();
    let root = compute_outcome_root(&a);
    for _ in 0..5 {
        let b = clear_market(&market).unwrap();
        assert!(verify_outcome_root(&b, &root));
    }
}

#[test]
fn empty_market_surfaces_immediately() {
    let err = serde_json::from_str::<Market>(r#"{"buyers":[],"sellers":[],"valuations":[]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("WL_ERR_100"), "{err}");
}

#[test]
fn malformed_markets_rejected_before_first_round() {
    let unequal =
        r#"{"buyers":[0,1],"sellers":[2],"valuations":[{"buyer":0,"seller":2,"value":"1"}]}"#;
    let err = serde_json::from_str::<Market>(unequal).unwrap_err();
    assert!(err.to_string().contains("WL_ERR_101"), "{err}");

    let no_offer = MarketBuilder::new()
        .buyer(BuyerId(0), [(SellerId(2), dec(1))])
        .buyer(BuyerId(1), Vec::<(SellerId, Decimal)>::new())
        .sellers([SellerId(2), SellerId(3)])
        .build()
        .unwrap_err();
    assert!(matches!(no_offer, WalrasError::MalformedMarket { .. }));
}

/// B0 only wants S2, so B1 is pushed to S3 and B4 to S5, and S2 ends up
/// priced at twice the top valuation.
fn chained_market(top: Decimal) -> Result<Market> {
    MarketBuilder::new()
        .buyer(BuyerId(0), [(SellerId(2), Decimal::ZERO)])
        .buyer(BuyerId(1), [(SellerId(2), top), (SellerId(3), Decimal::ZERO)])
        .buyer(BuyerId(4), [(SellerId(3), top), (SellerId(5), Decimal::ZERO)])
        .sellers([SellerId(2), SellerId(3), SellerId(5)])
        .build()
}

#[test]
fn large_valuations_clear_exactly() {
    let top = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let outcome = clear_market(&chained_market(top).unwrap()).unwrap();
    assert_eq!(outcome.prices.get(SellerId(2)), top * Decimal::TWO);
    assert_eq!(outcome.prices.get(SellerId(3)), top);
    assert_eq!(outcome.prices.get(SellerId(5)), Decimal::ZERO);
    assert_eq!(outcome.total_value, Decimal::ZERO);
    assert_eq!(outcome.rounds, 3);
}

#[test]
fn valuations_beyond_ceiling_are_malformed() {
    let err = chained_market(Decimal::MAX).unwrap_err();
    assert!(err.to_string().starts_with("WL_ERR_101"), "{err}");
}

#[test]
fn prices_past_ceiling_fail_without_panicking() {
    init_tracing();
    let market = chained_market(constants::MAX_PRICE).unwrap();
    let err = clear_market(&market).unwrap_err();
    match err {
        WalrasError::PriceOverflow {
            seller,
            price,
            delta,
        } => {
            assert_eq!(seller, SellerId(2));
            assert_eq!(price, constants::MAX_PRICE);
            assert_eq!(delta, constants::MAX_PRICE);
        }
        other => panic!("expected PriceOverflow, got {other}"),
    }
}

#[test]
fn non_convergence_carries_diagnostics() {
    init_tracing();
    let market: Market = serde_json::from_str(WORKED_MARKET).unwrap();
    let err = ClearingLoop::new(ClearingConfig::default().with_max_rounds(1))
        .run(&market)
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("WL_ERR_500"), "{msg}");
    assert!(msg.contains("2 of 3"), "{msg}");
}

#[test]
fn config_from_json() {
    let cfg: ClearingConfig =
        serde_json::from_str(r#"{"max_rounds": 50, "warm_start": true}"#).unwrap();
    let market: Market = serde_json::from_str(WORKED_MARKET).unwrap();
    let outcome = ClearingLoop::new(cfg).run(&market).unwrap();
    assert_eq!(outcome.total_value, dec(23));
}
