use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use engine::{MatchingEngine, Order, OrderBook, OrderStatus, OrderType, Side};
use tokio::runtime::Runtime;

fn limit_order(id: u64, symbol: &str, side: Side, price: i64, qty: i64) -> Order {
    Order {
        id: format!("o{id}"),
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Limit,
        px_ticks: price,
        qty,
        filled: 0,
        status: OrderStatus::Pending,
        ts_ns: id as u128,
        client_id: "bench".to_string(),
    }
}

fn market_order(id: u64, symbol: &str, side: Side, qty: i64) -> Order {
    Order {
        order_type: OrderType::Market,
        px_ticks: 0,
        ..limit_order(id, symbol, side, 0, qty)
    }
}

/// Book with `levels` ask levels of `per_level` one-lot orders each,
/// starting at price 10_000.
fn ask_ladder(levels: i64, per_level: i64) -> OrderBook {
    let mut ob = OrderBook::new("AAPL");
    let mut id = 0;
    for level in 0..levels {
        for _ in 0..per_level {
            let mut ask = limit_order(id, "AAPL", Side::Sell, 10_000 + level, 1);
            ob.add_order(&mut ask);
            id += 1;
        }
    }
    ob
}

/// Resting insert cost as the ladder widens: 512 bids spread over a
/// growing number of price levels, so the BTreeMap entry path dominates
/// once levels stop being reused.
fn bench_resting_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("book_insert");

    const ORDERS: i64 = 512;
    for &levels in [1, 16, 256].iter() {
        group.bench_with_input(BenchmarkId::new("levels", levels), &levels, |b, &levels| {
            b.iter(|| {
                let mut ob = OrderBook::new("AAPL");
                for i in 0..ORDERS {
                    let mut bid =
                        limit_order(i as u64, "AAPL", Side::Buy, 9_000 - (i % levels), 1);
                    black_box(ob.add_order(&mut bid));
                }
            })
        });
    }

    group.finish();
}

/// Two sweep shapes with the same total fill count: a deep ladder (one
/// order per level, every fill pops a level) versus a long queue (all
/// orders at one price, every fill advances the FIFO). Separates ladder
/// traversal cost from queue drain cost.
fn bench_market_sweep_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_sweep");

    for &fills in [16, 128].iter() {
        group.bench_with_input(
            BenchmarkId::new("deep_ladder", fills),
            &fills,
            |b, &fills| {
                b.iter_batched(
                    || ask_ladder(fills, 1),
                    |mut ob| {
                        let mut taker = market_order(9_999, "AAPL", Side::Buy, fills);
                        black_box(ob.add_order(&mut taker))
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("long_queue", fills),
            &fills,
            |b, &fills| {
                b.iter_batched(
                    || ask_ladder(1, fills),
                    |mut ob| {
                        let mut taker = market_order(9_999, "AAPL", Side::Buy, fills);
                        black_box(ob.add_order(&mut taker))
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

/// Locator-index cancel under the two level shapes it has to deal with:
/// everything at one price (the in-level position scan dominates) versus
/// one order per price (the ladder lookup dominates).
fn bench_cancel_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel");

    const ORDERS: i64 = 256;
    for &(name, levels) in [("dense_level", 1), ("spread_levels", ORDERS)].iter() {
        group.bench_function(BenchmarkId::new(name, ORDERS), |b| {
            b.iter_batched(
                || {
                    let mut ob = OrderBook::new("AAPL");
                    let mut ids = Vec::new();
                    for i in 0..ORDERS {
                        let mut bid =
                            limit_order(i as u64, "AAPL", Side::Buy, 9_000 - (i % levels), 1);
                        ids.push(bid.id.clone());
                        ob.add_order(&mut bid);
                    }
                    (ob, ids)
                },
                |(mut ob, ids)| {
                    for id in &ids {
                        black_box(ob.cancel(id));
                    }
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Snapshot aggregation: many thin levels versus few crowded ones, same
/// resting order count either way.
fn bench_snapshot_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for &(name, levels, per_level) in
        [("thin_levels", 256, 1), ("crowded_levels", 8, 32)].iter()
    {
        let ob = ask_ladder(levels, per_level);
        group.bench_function(name, |b| b.iter(|| black_box(ob.snapshot())));
    }

    group.finish();
}

/// Full dispatcher path: timestamp stamping, symbol routing, the book
/// lock, and stream publication. Round-robins one batch of orders over a
/// varying symbol count so the per-book serialization and the DashMap
/// lookup both show up.
fn bench_engine_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let rt = Runtime::new().unwrap();

    const ORDERS: u64 = 400;
    for &symbols in [1usize, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("symbols", symbols),
            &symbols,
            |b, &symbols| {
                b.iter_batched(
                    || {
                        let (engine, streams) = MatchingEngine::new();
                        let names: Vec<String> =
                            (0..symbols).map(|s| format!("SYM{s}")).collect();
                        let orders: Vec<Order> = (0..ORDERS)
                            .map(|i| {
                                let symbol = &names[i as usize % symbols];
                                // Each symbol sees alternating sides at one
                                // price, so half its submissions cross and
                                // publish trades
                                let side = if (i as usize / symbols) % 2 == 0 {
                                    Side::Sell
                                } else {
                                    Side::Buy
                                };
                                limit_order(i, symbol, side, 5_000, 1)
                            })
                            .collect();
                        (engine, streams, orders)
                    },
                    |(engine, streams, mut orders)| {
                        rt.block_on(async {
                            for order in &mut orders {
                                black_box(engine.process_order(order).await);
                            }
                        });
                        drop(streams);
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resting_inserts,
    bench_market_sweep_shapes,
    bench_cancel_paths,
    bench_snapshot_aggregation,
    bench_engine_dispatch
);

criterion_main!(benches);
