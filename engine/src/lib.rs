//! Continuous-auction matching engine with price-time priority.
//!
//! Core features:
//! - Price-time priority matching (best price first, then FIFO)
//! - Market and limit orders with partial fills
//! - O(log P) cancel through an order-id locator index
//! - Aggregated per-level snapshots
//! - Multi-symbol dispatch with bounded trade / order-update streams

pub mod types;

pub use types::{BookLevel, BookSnapshot, MarketData, Order, OrderStatus, OrderType, Side, Trade};
pub mod price_levels;
pub use price_levels::PriceLevels;
pub mod engine;
pub use engine::{EngineStreams, MatchingEngine, EVENT_STREAM_CAPACITY};

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since epoch.
pub(crate) fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Central limit order book for one symbol.
///
/// Uses price-time priority: better prices match first, then earliest
/// arrivals. Trades execute at the maker's price following standard
/// exchange rules. Not thread-safe - the dispatcher wraps each book in
/// an RwLock for concurrent access.
pub struct OrderBook {
    symbol: String,
    /// Buy orders, highest price first
    pub bids: PriceLevels,
    /// Sell orders, lowest price first
    pub asks: PriceLevels,
    /// Resting order locator: id -> (side, level price)
    index: HashMap<String, (Side, i64)>,
    /// Price of the most recent trade; zero until the first match
    last_price: i64,
    trade_seq: u64,
}

impl OrderBook {
    /// Creates an empty order book.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: PriceLevels::new(Side::Buy),
            asks: PriceLevels::new(Side::Sell),
            index: HashMap::new(),
            last_price: 0,
            trade_seq: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn last_price(&self) -> i64 {
        self.last_price
    }

    /// Returns current best bid price (highest buy price).
    pub fn best_bid(&self) -> Option<i64> {
        self.bids.best_price()
    }

    /// Returns current best ask price (lowest sell price).
    pub fn best_ask(&self) -> Option<i64> {
        self.asks.best_price()
    }

    /// Submits an order, returning any immediate trades.
    ///
    /// Market orders sweep the opposite side from the best price outward and
    /// discard whatever cannot be filled. Limit orders match while the book
    /// crosses their price, then rest the remainder on their own side. The
    /// taker's `filled` and `status` reflect the outcome when this returns.
    pub fn add_order(&mut self, taker: &mut Order) -> Vec<Trade> {
        let limit_px = match taker.order_type {
            OrderType::Market => None,
            OrderType::Limit => Some(taker.px_ticks),
        };
        let trades = self.match_incoming(taker, limit_px);

        taker.status = if taker.is_filled() {
            OrderStatus::Filled
        } else if taker.filled > 0 {
            OrderStatus::Partial
        } else {
            OrderStatus::Pending
        };

        // Limit remainders rest in the book; market remainders are discarded.
        if taker.order_type == OrderType::Limit && !taker.is_filled() {
            self.index
                .insert(taker.id.clone(), (taker.side, taker.px_ticks));
            match taker.side {
                Side::Buy => self.bids.push(taker.clone()),
                Side::Sell => self.asks.push(taker.clone()),
            }
        }

        if let Some(last) = trades.last() {
            self.last_price = last.px_ticks;
        }

        trades
    }

    /// Matches the taker against the opposite side, best price outward.
    /// `limit_px` of None means match at any price (market order).
    fn match_incoming(&mut self, taker: &mut Order, limit_px: Option<i64>) -> Vec<Trade> {
        let mut trades = Vec::new();

        while taker.remaining() > 0 {
            let opposite = match taker.side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };

            let Some(best_px) = opposite.best_price() else {
                break; // Opposite side exhausted
            };

            if let Some(px) = limit_px {
                let crosses = match taker.side {
                    Side::Buy => px >= best_px,
                    Side::Sell => px <= best_px,
                };
                if !crosses {
                    break;
                }
            }

            let Some(maker) = opposite.best_mut() else {
                break;
            };

            let fill = taker.remaining().min(maker.remaining());
            maker.filled += fill;
            let maker_id = maker.id.clone();
            if maker.is_filled() {
                maker.status = OrderStatus::Filled;
                opposite.pop_best();
                self.index.remove(&maker_id);
            }

            taker.filled += fill;
            self.trade_seq += 1;

            let (buy_order_id, sell_order_id) = match taker.side {
                Side::Buy => (taker.id.clone(), maker_id),
                Side::Sell => (maker_id, taker.id.clone()),
            };
            trades.push(Trade {
                id: format!("T{}", self.trade_seq),
                symbol: self.symbol.clone(),
                buy_order_id,
                sell_order_id,
                px_ticks: best_px, // Trade at maker's price
                qty: fill,
                ts_ns: taker.ts_ns,
            });
        }

        trades
    }

    /// Cancels a resting order by id, returning it marked `Cancelled`.
    ///
    /// Returns None when the id is unknown, already filled, or already
    /// cancelled. Orders behind the cancelled one keep their queue slots.
    pub fn cancel(&mut self, order_id: &str) -> Option<Order> {
        let (side, price) = self.index.remove(order_id)?;
        let queue = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let mut order = queue.remove(order_id, price)?;
        order.status = OrderStatus::Cancelled;
        Some(order)
    }

    /// Aggregated view of the resting book: bids descending, asks ascending,
    /// each level reporting the sum of unfilled remainders and its order count.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: Self::aggregate(&self.bids),
            asks: Self::aggregate(&self.asks),
            ts_ns: now_ns(),
        }
    }

    fn aggregate(side: &PriceLevels) -> Vec<BookLevel> {
        side.iter_levels_best_first()
            .map(|(price, queue)| BookLevel {
                price,
                quantity: queue.iter().map(Order::remaining).sum(),
                orders: queue.len(),
            })
            .collect()
    }
}
