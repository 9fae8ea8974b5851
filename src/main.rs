//! matchx Performance Test Suite
//!
//! Runs performance tests followed by a basic trading demo showing
//! order placement, matching, and trade execution.

use engine::{Order, OrderBook, OrderStatus, OrderType, Side};

mod latency_test;

/// Main entry point - runs performance tests and demo.
fn main() {
    println!("=== matchx Performance Lab ===");

    // Run comprehensive performance tests
    latency_test::run_latency_tests();
    latency_test::run_throughput_test(10);

    // Run 1-minute sustained throughput test
    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test(60);

    // Show basic matching functionality
    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

fn demo_order(id: &str, side: Side, price: i64, qty: i64, ts: u128) -> Order {
    Order {
        id: id.to_string(),
        symbol: "AAPL".to_string(),
        side,
        order_type: OrderType::Limit,
        px_ticks: price,
        qty,
        filled: 0,
        status: OrderStatus::Pending,
        ts_ns: ts,
        client_id: "demo".to_string(),
    }
}

/// Demonstrates basic matching with trade execution.
fn run_basic_demo() {
    let mut ob = OrderBook::new("AAPL");

    println!("matchx - Order Book Demo");

    // Ask at $150.00, bid at $149.50 (creates spread)
    let mut ask_order = demo_order("demo-ask", Side::Sell, 15000, 100, 1_000_000_000);
    let mut bid_order = demo_order("demo-bid", Side::Buy, 14950, 50, 1_000_000_001);

    println!(
        "Submitting ask order: {} @ {}",
        ask_order.qty, ask_order.px_ticks
    );
    ob.add_order(&mut ask_order);

    println!(
        "Submitting bid order: {} @ {}",
        bid_order.qty, bid_order.px_ticks
    );
    ob.add_order(&mut bid_order);

    println!("Best bid: {:?}", ob.best_bid());
    println!("Best ask: {:?}", ob.best_ask());

    // Crossing bid that executes against the ask
    let mut crossing_bid = demo_order("demo-cross", Side::Buy, 15000, 75, 1_000_000_002);

    println!(
        "Submitting crossing bid: {} @ {}",
        crossing_bid.qty, crossing_bid.px_ticks
    );
    let trades = ob.add_order(&mut crossing_bid);

    println!("Trades executed: {}", trades.len());
    for trade in trades {
        // Executes at the maker's price (15000)
        println!("  Trade {}: {} lots @ {} ticks", trade.id, trade.qty, trade.px_ticks);
    }

    println!("Final best bid: {:?}", ob.best_bid()); // Original bid remains
    println!("Final best ask: {:?}", ob.best_ask()); // 25 lots left of original ask
    println!("Last price: {}", ob.last_price());
}
