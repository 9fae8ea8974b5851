//! Trading strategies reacting to engine events.
//!
//! A strategy observes market data, trades, and order updates, and returns
//! new orders to submit. The event loop owns the strategies and feeds every
//! returned order back into the engine.

use std::collections::HashMap;

use engine::{MarketData, Order, OrderStatus, OrderType, Side, Trade};
use uuid::Uuid;

pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn on_market_data(&mut self, data: &MarketData) -> Vec<Order> {
        let _ = data;
        Vec::new()
    }

    fn on_trade(&mut self, trade: &Trade) -> Vec<Order> {
        let _ = trade;
        Vec::new()
    }

    fn on_order_update(&mut self, order: &Order) -> Vec<Order> {
        let _ = order;
        Vec::new()
    }
}

/// Quotes a symmetric bid/ask pair around the last observed price.
///
/// Re-quotes whenever a trade or tick moves the reference price, and
/// forgets its quotes once they reach a terminal state.
pub struct MarketMaker {
    symbol: String,
    half_spread_ticks: i64,
    qty: i64,
    last_price: i64,
    active_orders: HashMap<String, Side>,
}

impl MarketMaker {
    pub fn new(symbol: impl Into<String>, half_spread_ticks: i64, qty: i64) -> Self {
        Self {
            symbol: symbol.into(),
            half_spread_ticks,
            qty,
            last_price: 0,
            active_orders: HashMap::new(),
        }
    }

    fn quote(&self, side: Side, price: i64) -> Order {
        let tag = match side {
            Side::Buy => "bid",
            Side::Sell => "ask",
        };
        Order {
            id: format!("mm-{tag}-{}", Uuid::new_v4()),
            symbol: self.symbol.clone(),
            side,
            order_type: OrderType::Limit,
            px_ticks: price,
            qty: self.qty,
            filled: 0,
            status: OrderStatus::Pending,
            ts_ns: 0, // Engine stamps arrival time
            client_id: "market-maker".to_string(),
        }
    }

    fn requote(&mut self) -> Vec<Order> {
        if self.last_price <= 0 {
            return Vec::new();
        }

        // Previous quotes are simply forgotten here; the owner of this
        // strategy is expected to cancel them out-of-band if desired.
        self.active_orders.clear();

        let bid = self.quote(Side::Buy, self.last_price - self.half_spread_ticks);
        let ask = self.quote(Side::Sell, self.last_price + self.half_spread_ticks);
        self.active_orders.insert(bid.id.clone(), Side::Buy);
        self.active_orders.insert(ask.id.clone(), Side::Sell);

        vec![bid, ask]
    }
}

impl Strategy for MarketMaker {
    fn name(&self) -> &str {
        "market-maker"
    }

    fn on_market_data(&mut self, data: &MarketData) -> Vec<Order> {
        if data.symbol != self.symbol {
            return Vec::new();
        }
        self.last_price = data.px_ticks;
        self.requote()
    }

    fn on_trade(&mut self, trade: &Trade) -> Vec<Order> {
        if trade.symbol != self.symbol {
            return Vec::new();
        }
        self.last_price = trade.px_ticks;
        self.requote()
    }

    fn on_order_update(&mut self, order: &Order) -> Vec<Order> {
        if order.status == OrderStatus::Filled || order.status == OrderStatus::Cancelled {
            self.active_orders.remove(&order.id);
        }
        Vec::new()
    }
}
