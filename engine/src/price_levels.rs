//! Price ladder: sorted price levels, each holding a FIFO queue of orders.
//!
//! Levels live in a BTreeMap keyed on price ticks; the side determines which
//! end of the map is the best price:
//! - Asks: lowest price is best (front of map)
//! - Bids: highest price is best (back of map)
//!
//! Within a level, orders queue in arrival order, so price-time priority
//! falls out of the structure itself.

use crate::types::{Order, Side};
use std::collections::{BTreeMap, VecDeque};

pub struct PriceLevels {
    side: Side,
    levels: BTreeMap<i64, VecDeque<Order>>,
}

impl PriceLevels {
    /// Creates empty price levels for the given side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Adds an order at its price level, creating the level if needed.
    /// FIFO within the level stays intact.
    pub fn push(&mut self, order: Order) {
        self.levels
            .entry(order.px_ticks)
            .or_default()
            .push_back(order);
    }

    /// Best price on this side, if any orders rest.
    pub fn best_price(&self) -> Option<i64> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// The order first in line at the best price.
    pub fn peek_best(&self) -> Option<&Order> {
        let price = self.best_price()?;
        self.levels.get(&price).and_then(|queue| queue.front())
    }

    /// Mutable access to the order first in line at the best price.
    pub fn best_mut(&mut self) -> Option<&mut Order> {
        let price = self.best_price()?;
        self.levels.get_mut(&price).and_then(|queue| queue.front_mut())
    }

    /// Removes and returns the order first in line at the best price.
    /// Empty levels are dropped so `best_price` never reports a hollow level.
    pub fn pop_best(&mut self) -> Option<Order> {
        let price = self.best_price()?;
        let queue = self.levels.get_mut(&price)?;
        let order = queue.pop_front();
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Removes an arbitrary resting order by id, given its level price.
    /// Other orders at the level keep their queue positions.
    pub fn remove(&mut self, order_id: &str, price: i64) -> Option<Order> {
        let queue = self.levels.get_mut(&price)?;
        let pos = queue.iter().position(|o| o.id == order_id)?;
        let order = queue.remove(pos);
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Enumerates (price, queue) pairs best price first.
    pub fn iter_levels_best_first(
        &self,
    ) -> Box<dyn Iterator<Item = (i64, &VecDeque<Order>)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(|(p, q)| (*p, q))),
            Side::Sell => Box::new(self.levels.iter().map(|(p, q)| (*p, q))),
        }
    }

    /// Total unfilled quantity resting at a price.
    pub fn qty_at_price(&self, price: i64) -> i64 {
        self.levels
            .get(&price)
            .map(|queue| queue.iter().map(Order::remaining).sum())
            .unwrap_or(0)
    }

    /// Total number of resting orders across all levels.
    pub fn total_len(&self) -> usize {
        self.levels.values().map(VecDeque::len).sum()
    }

    /// Number of distinct price levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, OrderType};

    fn order(id: &str, side: Side, price: i64, qty: i64, ts: u128) -> Order {
        Order {
            id: id.to_string(),
            symbol: "NVDA".to_string(),
            side,
            order_type: OrderType::Limit,
            px_ticks: price,
            qty,
            filled: 0,
            status: OrderStatus::Pending,
            ts_ns: ts,
            client_id: "test".to_string(),
        }
    }

    #[test]
    fn test_new_empty() {
        let bids = PriceLevels::new(Side::Buy);
        assert!(bids.is_empty());
        let asks = PriceLevels::new(Side::Sell);
        assert!(asks.is_empty());
    }

    #[test]
    fn test_push_keeps_fifo() {
        let mut levels = PriceLevels::new(Side::Buy);

        levels.push(order("o1", Side::Buy, 10100, 10, 1));
        levels.push(order("o2", Side::Buy, 10100, 20, 2));
        levels.push(order("o3", Side::Buy, 10100, 30, 3));

        assert_eq!(levels.level_count(), 1);
        assert_eq!(levels.peek_best().map(|o| o.id.as_str()), Some("o1"));

        let popped = levels.pop_best().unwrap();
        assert_eq!(popped.id, "o1");
        assert_eq!(levels.peek_best().map(|o| o.id.as_str()), Some("o2"));
    }

    #[test]
    fn test_best_price_per_side() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push(order("b1", Side::Buy, 10000, 10, 1));
        bids.push(order("b2", Side::Buy, 10100, 10, 2));
        bids.push(order("b3", Side::Buy, 9900, 10, 3));
        assert_eq!(bids.best_price(), Some(10100));

        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order("a1", Side::Sell, 10000, 10, 1));
        asks.push(order("a2", Side::Sell, 10100, 10, 2));
        asks.push(order("a3", Side::Sell, 9900, 10, 3));
        assert_eq!(asks.best_price(), Some(9900));
    }

    #[test]
    fn test_pop_best_drops_empty_level() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order("a1", Side::Sell, 10000, 10, 1));
        asks.push(order("a2", Side::Sell, 10100, 10, 2));

        assert_eq!(asks.pop_best().unwrap().id, "a1");
        assert_eq!(asks.best_price(), Some(10100));
        assert_eq!(asks.level_count(), 1);
    }

    #[test]
    fn test_remove_by_id_preserves_queue() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push(order("o1", Side::Buy, 10100, 10, 1));
        bids.push(order("o2", Side::Buy, 10100, 20, 2));
        bids.push(order("o3", Side::Buy, 10100, 30, 3));

        let removed = bids.remove("o2", 10100).unwrap();
        assert_eq!(removed.qty, 20);
        assert_eq!(bids.total_len(), 2);
        assert_eq!(bids.peek_best().map(|o| o.id.as_str()), Some("o1"));

        // Unknown id and wrong price both miss
        assert!(bids.remove("o2", 10100).is_none());
        assert!(bids.remove("o1", 9999).is_none());
    }

    #[test]
    fn test_qty_at_price_sums_remainders() {
        let mut bids = PriceLevels::new(Side::Buy);
        let mut partly = order("o1", Side::Buy, 10100, 10, 1);
        partly.filled = 4;
        bids.push(partly);
        bids.push(order("o2", Side::Buy, 10100, 20, 2));

        assert_eq!(bids.qty_at_price(10100), 26);
        assert_eq!(bids.qty_at_price(9000), 0);
    }

    #[test]
    fn test_iter_levels_best_first_direction() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push(order("b1", Side::Buy, 9900, 10, 1));
        bids.push(order("b2", Side::Buy, 10100, 10, 2));
        bids.push(order("b3", Side::Buy, 10000, 10, 3));

        let prices: Vec<i64> = bids.iter_levels_best_first().map(|(p, _)| p).collect();
        assert_eq!(prices, vec![10100, 10000, 9900]);

        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order("a1", Side::Sell, 9900, 10, 1));
        asks.push(order("a2", Side::Sell, 10100, 10, 2));

        let prices: Vec<i64> = asks.iter_levels_best_first().map(|(p, _)| p).collect();
        assert_eq!(prices, vec![9900, 10100]);
    }
}
