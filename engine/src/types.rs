//! Core data types for the matching engine.
//!
//! Prices are integer ticks and quantities integer lots so fill accounting
//! and price comparison stay exact. Timestamps are nanoseconds since epoch
//! and serve as the time-priority key.

use serde::{Deserialize, Serialize};

/// Order side - Buy (bid) or Sell (ask).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order execution type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Take liquidity at any price; never rests in the book
    Market,
    /// Execute at the limit price or better; remainder rests
    Limit,
}

/// Lifecycle state of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Untouched by matching
    Pending,
    /// Some quantity filled, some outstanding
    Partial,
    /// Fully matched; terminal
    Filled,
    /// Removed by cancel; terminal
    Cancelled,
}

/// A request to buy or sell a quantity of a symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub px_ticks: i64, // Limit price in ticks; ignored for market orders
    pub qty: i64,      // Total requested lots; never mutated after submit
    pub filled: i64,   // Cumulative matched lots
    pub status: OrderStatus,
    pub ts_ns: u128, // Engine ingress time, the time-priority key
    pub client_id: String,
}

impl Order {
    /// Lots still outstanding.
    pub fn remaining(&self) -> i64 {
        self.qty - self.filled
    }

    pub fn is_filled(&self) -> bool {
        self.filled >= self.qty
    }
}

/// Trade execution record. Executes at the maker's price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String, // Per-book sequence rendered as "T<n>"
    pub symbol: String,
    pub buy_order_id: String,
    pub sell_order_id: String,
    pub px_ticks: i64,
    pub qty: i64,
    pub ts_ns: u128,
}

/// Ticker observation from an upstream venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: String,
    pub px_ticks: i64,
    pub qty: i64,
    pub side: Side,
    pub ts_ns: u128,
}

/// Aggregated resting orders at one price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: i64,
    pub quantity: i64, // Sum of unfilled remainders at this price
    pub orders: usize, // Number of resting orders at this price
}

/// Read-only aggregated view of the book at an instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<BookLevel>, // Price descending
    pub asks: Vec<BookLevel>, // Price ascending
    pub ts_ns: u128,
}
