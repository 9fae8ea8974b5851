//! Multi-symbol dispatch: routes orders to per-symbol books and publishes
//! trade and order-update events on bounded streams.
//!
//! # Concurrency Model
//! - `DashMap`: lock-free access to the symbol-to-book mapping; `entry()`
//!   gives the re-checked create on first touch of a symbol
//! - `RwLock<OrderBook>`: exclusive writer per symbol during matching and
//!   cancel, concurrent readers for snapshots
//! - Event publication uses `try_send` and never blocks; when a consumer
//!   falls behind the full stream sheds events and a counter records it

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::{mpsc, RwLock};

use crate::types::{BookSnapshot, Order, Trade};
use crate::{now_ns, OrderBook};

/// Capacity of the trade and order-update streams.
pub const EVENT_STREAM_CAPACITY: usize = 10_000;

/// Receive halves of the engine's event streams, handed out once at
/// construction. Consumers drain these; producers never wait on them.
pub struct EngineStreams {
    /// Every executed trade, in creation order per symbol
    pub trades: mpsc::Receiver<Trade>,
    /// Every order after matching or cancel, with updated status and fills
    pub order_updates: mpsc::Receiver<Order>,
}

/// Order router over per-symbol books.
///
/// Books are created on first reference to a symbol and live for the
/// process lifetime. All mutation for one symbol serializes under that
/// book's write lock; operations on different symbols run in parallel.
pub struct MatchingEngine {
    books: DashMap<String, RwLock<OrderBook>>,
    trade_tx: mpsc::Sender<Trade>,
    update_tx: mpsc::Sender<Order>,
    trades_dropped: AtomicU64,
    updates_dropped: AtomicU64,
}

impl MatchingEngine {
    /// Creates an engine with the default stream capacity.
    pub fn new() -> (Self, EngineStreams) {
        Self::with_capacity(EVENT_STREAM_CAPACITY)
    }

    /// Creates an engine with a custom stream capacity.
    pub fn with_capacity(capacity: usize) -> (Self, EngineStreams) {
        let (trade_tx, trades) = mpsc::channel(capacity);
        let (update_tx, order_updates) = mpsc::channel(capacity);

        (
            Self {
                books: DashMap::new(),
                trade_tx,
                update_tx,
                trades_dropped: AtomicU64::new(0),
                updates_dropped: AtomicU64::new(0),
            },
            EngineStreams {
                trades,
                order_updates,
            },
        )
    }

    /// Submits an order for matching, returning the trades it generated.
    ///
    /// The arrival timestamp is stamped here - the engine is authoritative
    /// for time priority regardless of what the caller set. After matching,
    /// the caller's order reflects its fills and status, a copy goes out on
    /// the order-update stream, and each trade goes out on the trade stream.
    pub async fn process_order(&self, order: &mut Order) -> Vec<Trade> {
        order.ts_ns = now_ns();

        // entry() re-checks under the shard lock, so concurrent first
        // touches of a symbol create exactly one book.
        let book = self
            .books
            .entry(order.symbol.clone())
            .or_insert_with(|| RwLock::new(OrderBook::new(order.symbol.clone())));

        let trades = {
            let mut book = book.write().await;
            book.add_order(order)
        };
        drop(book);

        self.publish_update(order.clone());
        for trade in &trades {
            if self.trade_tx.try_send(trade.clone()).is_err() {
                self.trades_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }

        trades
    }

    /// Cancels a resting order. Returns true iff the order was found resting.
    ///
    /// Unknown symbols and unknown or already-terminal orders report false.
    /// A successful cancel publishes the order, now `Cancelled`, on the
    /// order-update stream so owners observe it in-band.
    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> bool {
        let Some(book) = self.books.get(symbol) else {
            return false;
        };

        let cancelled = {
            let mut book = book.write().await;
            book.cancel(order_id)
        };

        match cancelled {
            Some(order) => {
                self.publish_update(order);
                true
            }
            None => false,
        }
    }

    /// Consistent snapshot of a symbol's book, or None for unknown symbols.
    pub async fn snapshot(&self, symbol: &str) -> Option<BookSnapshot> {
        let book = self.books.get(symbol)?;
        let book = book.read().await;
        Some(book.snapshot())
    }

    /// Current (best bid, best ask) for a symbol.
    pub async fn best_prices(&self, symbol: &str) -> Option<(Option<i64>, Option<i64>)> {
        let book = self.books.get(symbol)?;
        let book = book.read().await;
        Some((book.best_bid(), book.best_ask()))
    }

    /// Price of the most recent trade for a symbol; zero before any trade.
    pub async fn last_price(&self, symbol: &str) -> Option<i64> {
        let book = self.books.get(symbol)?;
        let book = book.read().await;
        Some(book.last_price())
    }

    /// Ensures a book exists for the symbol without touching existing state.
    pub fn register_symbol(&self, symbol: &str) {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| RwLock::new(OrderBook::new(symbol.to_string())));
    }

    /// All symbols with a book, in arbitrary order.
    pub fn symbols(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    /// (trades, order updates) shed so far because a stream was full.
    pub fn dropped_events(&self) -> (u64, u64) {
        (
            self.trades_dropped.load(Ordering::Relaxed),
            self.updates_dropped.load(Ordering::Relaxed),
        )
    }

    fn publish_update(&self, order: Order) {
        if self.update_tx.try_send(order).is_err() {
            self.updates_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
