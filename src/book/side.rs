// One side of the order book: price levels keyed by discretised price
//
// Every price maps to an integer bucket `round(price / tick_size)` before
// any lookup, so float representation noise can never split a level. The
// BTreeMap keeps levels price-ordered; bids iterate from the back.

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};
use crate::types::{Order, OrderType, Side};

use super::level::PriceLevel;

pub struct SideBook {
    side: Side,
    tick_size: f64,
    levels: BTreeMap<i64, PriceLevel>,
}

impl SideBook {
    pub fn new(side: Side, tick_size: f64) -> Self {
        Self {
            side,
            tick_size,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn bucket(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    /// Buckets in best-first order: descending for bids, ascending for asks.
    fn best_buckets(&self) -> Box<dyn Iterator<Item = i64> + '_> {
        match self.side {
            Side::Sell => Box::new(self.levels.keys().copied()),
            _ => Box::new(self.levels.keys().rev().copied()),
        }
    }

    fn best_bucket(&self) -> Option<i64> {
        match self.side {
            Side::Sell => self.levels.keys().next().copied(),
            _ => self.levels.keys().next_back().copied(),
        }
    }

    /// Level lookup goes through the bucket; the level keeps the price it
    /// was first created with, so observable prices round-trip exactly.
    pub fn get_or_create_level(&mut self, price: f64) -> &mut PriceLevel {
        let bucket = self.bucket(price);
        let side = self.side;
        self.levels
            .entry(bucket)
            .or_insert_with(|| PriceLevel::new(side, price))
    }

    pub fn level_at(&self, price: f64) -> Option<&PriceLevel> {
        self.levels.get(&self.bucket(price))
    }

    pub fn add(&mut self, order: Order) -> SimResult<()> {
        if order.side != self.side {
            return Err(SimError::InvalidSide(order.id));
        }
        self.get_or_create_level(order.price).add(order)
    }

    /// Cancel the order with `order_id` resting at `price`. The level is
    /// dropped from the book if the cancel leaves it empty.
    pub fn cancel(&mut self, order_id: u64, price: f64) -> SimResult<Order> {
        let bucket = self.bucket(price);
        let level = self
            .levels
            .get_mut(&bucket)
            .ok_or(SimError::OrderNotFound(order_id))?;

        let order = level.cancel(order_id)?;
        if level.is_empty() {
            self.levels.remove(&bucket);
        }
        Ok(order)
    }

    /// Price of the n-th best level, if that deep.
    pub fn best_price(&self, n: usize) -> Option<f64> {
        self.best_buckets()
            .nth(n)
            .and_then(|b| self.levels.get(&b))
            .map(|l| l.price())
    }

    /// Total open quantity at the n-th best level.
    pub fn best_qty(&self, n: usize) -> Option<f64> {
        self.best_buckets()
            .nth(n)
            .and_then(|b| self.levels.get(&b))
            .map(|l| l.total_qty())
    }

    /// Top-n (price, total quantity) pairs, best first.
    pub fn depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.best_buckets()
            .take(n)
            .filter_map(|b| self.levels.get(&b))
            .map(|l| (l.price(), l.total_qty()))
            .collect()
    }

    fn is_marketable(&self, incoming: &Order, level_price: f64) -> bool {
        if incoming.order_type == OrderType::Market {
            return true;
        }
        match incoming.side {
            Side::Buy => level_price <= incoming.price,
            Side::Sell => level_price >= incoming.price,
            Side::None => false,
        }
    }

    /// Would an incoming order from the opposite side trade immediately?
    pub fn crosses(&self, incoming: &Order) -> bool {
        self.best_bucket()
            .and_then(|b| self.levels.get(&b))
            .map(|level| self.is_marketable(incoming, level.price()))
            .unwrap_or(false)
    }

    /// Total open quantity across levels marketable for an incoming order.
    /// Used for all-or-nothing pre-checks before any fill is committed.
    pub fn marketable_qty(&self, incoming: &Order) -> f64 {
        let mut qty = 0.0;
        for bucket in self.best_buckets() {
            let Some(level) = self.levels.get(&bucket) else {
                continue;
            };
            if !self.is_marketable(incoming, level.price()) {
                break;
            }
            qty += level.total_qty();
        }
        qty
    }

    /// Match an incoming order from the opposite side, walking levels from
    /// the best price while it stays marketable. Emptied levels are removed.
    /// Returns the aggregated trades; the residual state lives on `incoming`.
    pub fn match_order(&mut self, incoming: &mut Order) -> Vec<Order> {
        let mut trades = Vec::new();
        incoming.current_exec_qty = 0.0;

        while incoming.remaining() > 0.0 {
            let Some(bucket) = self.best_bucket() else {
                break;
            };
            let Some(level_price) = self.levels.get(&bucket).map(|l| l.price()) else {
                break;
            };
            if !self.is_marketable(incoming, level_price) {
                break;
            }

            let Some(level) = self.levels.get_mut(&bucket) else {
                break;
            };
            let before = incoming.exec_qty;
            let (_, mut level_trades) = level.match_order(incoming);
            trades.append(&mut level_trades);

            let emptied = level.is_empty();
            if emptied {
                self.levels.remove(&bucket);
            }
            if incoming.exec_qty == before && !emptied {
                // Nothing left to take at the best level
                break;
            }
        }

        trades
    }

    /// Drop all anonymous depth, keeping own resting orders. Levels left
    /// with no orders are removed.
    pub fn clear_market_depth(&mut self) {
        self.levels.retain(|_, level| {
            level.set_market_qty(0.0);
            !level.is_empty()
        });
    }

    /// Set the anonymous depth at one price. Zero quantity removes the
    /// level unless own orders still rest there.
    pub fn update_market_qty(&mut self, price: f64, qty: f64) {
        let bucket = self.bucket(price);
        if qty <= 0.0 {
            if let Some(level) = self.levels.get_mut(&bucket) {
                level.set_market_qty(0.0);
                if level.is_empty() {
                    self.levels.remove(&bucket);
                }
            }
        } else {
            self.get_or_create_level(price).set_market_qty(qty);
        }
    }
}
