//! Integration tests for the order-matching simulator and metrics aggregation.
//!
//! Covers the same-bar tie-break contract, TTL expiry, end-to-end
//! simulate → aggregate, and proptest invariants over random intent sets.

use proptest::prelude::*;
use std::collections::HashSet;

use sweeplab_core::aggregate::aggregate;
use sweeplab_core::domain::{OhlcData, OrderIntent, OrderKind, OrderRole, OrderSide};
use sweeplab_core::engine::simulate;
use sweeplab_core::schema::{MetricsRow, COL_NET_PROFIT, COL_TRADES};

// ─── Helpers ──────────────────────────────────────────────────────────

fn single_bar(open: f64, high: f64, low: f64, close: f64) -> OhlcData {
    OhlcData {
        open: vec![open],
        high: vec![high],
        low: vec![low],
        close: vec![close],
    }
}

#[allow(clippy::too_many_arguments)]
fn intent(
    id: u64,
    created_bar: i64,
    role: OrderRole,
    kind: OrderKind,
    side: OrderSide,
    price: f64,
    ttl_bars: i64,
) -> OrderIntent {
    OrderIntent {
        order_id: id,
        created_bar,
        role,
        kind,
        side,
        price,
        qty: 1,
        ttl_bars,
    }
}

// ─── Tie-break ───────────────────────────────────────────────────────

#[test]
fn entry_and_exit_stops_on_bar_zero_fill_in_id_order() {
    let data = single_bar(100.0, 120.0, 80.0, 100.0);
    let bars = data.series().unwrap();
    let intents = [
        intent(1, -1, OrderRole::Entry, OrderKind::Stop, OrderSide::Buy, 105.0, 0),
        intent(2, -1, OrderRole::Exit, OrderKind::Stop, OrderSide::Sell, 95.0, 0),
    ];

    let fills = simulate(&bars, &intents, 0);

    assert_eq!(fills.len(), 2);
    let shape: Vec<_> = fills.iter().map(|f| (f.role, f.side, f.kind)).collect();
    assert_eq!(
        shape,
        vec![
            (OrderRole::Entry, OrderSide::Buy, OrderKind::Stop),
            (OrderRole::Exit, OrderSide::Sell, OrderKind::Stop),
        ]
    );
    assert_eq!(fills[0].price, 105.0);
    assert_eq!(fills[1].price, 95.0);
    assert!(fills.iter().all(|f| f.bar_index == 0));
}

#[test]
fn reversing_input_order_does_not_change_output() {
    let data = single_bar(100.0, 120.0, 80.0, 100.0);
    let bars = data.series().unwrap();
    let mut intents = vec![
        intent(1, -1, OrderRole::Entry, OrderKind::Stop, OrderSide::Buy, 105.0, 0),
        intent(2, -1, OrderRole::Exit, OrderKind::Stop, OrderSide::Sell, 95.0, 0),
    ];
    let forward = simulate(&bars, &intents, 0);
    intents.reverse();
    let backward = simulate(&bars, &intents, 0);
    assert_eq!(forward, backward);
}

#[test]
fn exit_with_lower_id_fills_before_entry() {
    let data = single_bar(100.0, 120.0, 80.0, 100.0);
    let bars = data.series().unwrap();
    let intents = [
        intent(7, -1, OrderRole::Entry, OrderKind::Stop, OrderSide::Buy, 105.0, 0),
        intent(3, -1, OrderRole::Exit, OrderKind::Stop, OrderSide::Sell, 95.0, 0),
    ];
    let fills = simulate(&bars, &intents, 0);
    assert_eq!(fills[0].role, OrderRole::Exit);
    assert_eq!(fills[1].role, OrderRole::Entry);

    // Pairing is chronological by (bar, id): the exit precedes the entry, so
    // nothing closes and the row stays flat.
    assert_eq!(aggregate(&fills, 0.0, 0.0), MetricsRow::ZERO);
}

// ─── End to end ──────────────────────────────────────────────────────

#[test]
fn breakout_entry_then_stop_exit_produces_one_trade() {
    let data = OhlcData {
        open: vec![100.0, 101.0, 104.0, 103.0, 99.0],
        high: vec![101.0, 105.0, 106.0, 104.0, 100.0],
        low: vec![99.0, 100.5, 103.0, 100.0, 96.0],
        close: vec![101.0, 104.0, 103.5, 100.5, 97.0],
    };
    let bars = data.series().unwrap();
    let intents = [
        intent(10, 0, OrderRole::Entry, OrderKind::Stop, OrderSide::Buy, 102.0, 3),
        intent(11, 2, OrderRole::Exit, OrderKind::Stop, OrderSide::Sell, 98.0, 5),
    ];
    let fills = simulate(&bars, &intents, -1);
    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].bar_index, 1);
    assert_eq!(fills[1].bar_index, 4);

    let row = aggregate(&fills, 0.5, 0.0).to_array();
    assert_eq!(row[COL_TRADES], 1.0);
    assert_eq!(row[COL_NET_PROFIT], -4.0 - 1.0);
}

#[test]
fn expired_intents_produce_fewer_fills_than_intents() {
    let data = OhlcData::from_closes(&[100.0; 10], 0.5);
    let bars = data.series().unwrap();
    let intents = [
        intent(1, -1, OrderRole::Entry, OrderKind::Market, OrderSide::Buy, 0.0, 0),
        intent(2, 3, OrderRole::Exit, OrderKind::Limit, OrderSide::Sell, 150.0, 2),
        intent(3, 5, OrderRole::Exit, OrderKind::Market, OrderSide::Sell, 0.0, 0),
    ];
    let fills = simulate(&bars, &intents, -1);
    let ids: Vec<u64> = fills.iter().map(|f| f.order_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(fills[1].bar_index, 5);
}

// ─── Property tests ──────────────────────────────────────────────────

fn arb_intent() -> impl Strategy<Value = OrderIntent> {
    (
        0..50_u64,
        -1..30_i64,
        prop_oneof![Just(OrderRole::Entry), Just(OrderRole::Exit)],
        prop_oneof![
            Just(OrderKind::Market),
            Just(OrderKind::Limit),
            Just(OrderKind::Stop)
        ],
        prop_oneof![Just(OrderSide::Buy), Just(OrderSide::Sell)],
        80.0..120.0_f64,
        -1..5_i64,
        -3..10_i64,
    )
        .prop_map(
            |(order_id, created_bar, role, kind, side, price, qty, ttl_bars)| OrderIntent {
                order_id,
                created_bar,
                role,
                kind,
                side,
                price,
                qty,
                ttl_bars,
            },
        )
}

fn arb_bars() -> impl Strategy<Value = OhlcData> {
    prop::collection::vec(-3.0..3.0_f64, 1..40).prop_map(|steps| {
        let mut close = 100.0;
        let closes: Vec<f64> = steps
            .iter()
            .map(|s| {
                close += s;
                close
            })
            .collect();
        OhlcData::from_closes(&closes, 1.5)
    })
}

proptest! {
    #[test]
    fn fills_are_chronological_and_id_ordered(
        data in arb_bars(),
        intents in prop::collection::vec(arb_intent(), 0..30),
        default_ttl in -1..6_i64,
    ) {
        let bars = data.series().unwrap();
        let fills = simulate(&bars, &intents, default_ttl);
        for w in fills.windows(2) {
            prop_assert!(
                (w[0].bar_index, w[0].order_id) <= (w[1].bar_index, w[1].order_id),
                "out of order: {:?} then {:?}", w[0], w[1]
            );
        }
    }

    #[test]
    fn at_most_one_fill_per_intent(
        data in arb_bars(),
        intents in prop::collection::vec(arb_intent(), 0..30),
    ) {
        // Give every intent a unique id so fills can be attributed.
        let intents: Vec<OrderIntent> = intents
            .into_iter()
            .enumerate()
            .map(|(i, mut o)| { o.order_id = i as u64; o })
            .collect();
        let bars = data.series().unwrap();
        let fills = simulate(&bars, &intents, 3);
        let unique: HashSet<u64> = fills.iter().map(|f| f.order_id).collect();
        prop_assert_eq!(unique.len(), fills.len());
        prop_assert!(fills.len() <= intents.len());
        for f in &fills {
            let o = &intents[f.order_id as usize];
            prop_assert!(o.qty > 0);
            prop_assert!(f.bar_index as i64 >= o.created_bar.max(0));
        }
    }

    #[test]
    fn simulation_is_deterministic(
        data in arb_bars(),
        intents in prop::collection::vec(arb_intent(), 0..30),
    ) {
        let bars = data.series().unwrap();
        prop_assert_eq!(simulate(&bars, &intents, 2), simulate(&bars, &intents, 2));
    }

    #[test]
    fn aggregate_never_counts_more_trades_than_exits(
        data in arb_bars(),
        intents in prop::collection::vec(arb_intent(), 0..30),
    ) {
        let bars = data.series().unwrap();
        let fills = simulate(&bars, &intents, -1);
        let row = aggregate(&fills, 0.1, 0.01);
        let exits = fills.iter().filter(|f| f.role == OrderRole::Exit).count() as u64;
        prop_assert!(row.trades <= exits);
        prop_assert!(row.max_drawdown <= 0.0);
        if row.trades == 0 {
            prop_assert_eq!(row, MetricsRow::ZERO);
        }
    }
}
