//! API types for REST and WebSocket interfaces.

use engine::{OrderStatus, OrderType, Side, Trade};
use serde::{Deserialize, Serialize};

/// Request to submit a new order.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    pub side: Side,
    #[serde(rename = "type", default = "default_order_type")]
    pub order_type: OrderType,
    /// Limit price in ticks; required for limit orders, ignored for market
    #[serde(default)]
    pub price: Option<i64>,
    pub quantity: i64,
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_order_type() -> OrderType {
    OrderType::Limit
}

/// Response after submitting an order.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub filled: i64,
    pub trades: Vec<Trade>, // Any immediate executions
    pub latency_us: u64,
}

/// Query parameters for market depth requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepthQuery {
    pub levels: Option<usize>,
}

/// List of active trading symbols.
#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

/// Trade execution event for WebSocket streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub symbol: String,
    pub trade: Trade,
    pub ts_ns: u128,
}

/// Top-of-book update for WebSocket streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthUpdate {
    pub symbol: String,
    pub best_bid: Option<i64>,
    pub best_ask: Option<i64>,
    pub bid_size: i64,
    pub ask_size: i64,
    pub ts_ns: u128,
}

/// WebSocket message types.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebSocketMessage {
    #[serde(rename = "trade")]
    Trade(TradeEvent),
    #[serde(rename = "depth")]
    Depth(DepthUpdate),
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "ping")]
    Ping { ts_ns: u128 },
    #[serde(rename = "pong")]
    Pong { ts_ns: u128 },
}
