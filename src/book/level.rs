// Price level: FIFO queue of resting orders at one price
//
// A level also carries `market_qty`, the aggregate anonymous depth seen in
// venue snapshots. Anonymous depth sits ahead of our own resting orders in
// queue priority since it was on the venue before anything we submitted.

use std::collections::VecDeque;

use crate::error::{SimError, SimResult};
use crate::types::{Order, OrderStatus, Side};

pub struct PriceLevel {
    price: f64,
    side: Side,
    market_qty: f64,
    orders: VecDeque<Order>,
}

impl PriceLevel {
    pub fn new(side: Side, price: f64) -> Self {
        Self {
            price,
            side,
            market_qty: 0.0,
            orders: VecDeque::new(),
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn market_qty(&self) -> f64 {
        self.market_qty
    }

    /// Replace the anonymous depth at this level. Own orders are untouched.
    pub fn set_market_qty(&mut self, qty: f64) {
        self.market_qty = qty.max(0.0);
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.market_qty <= 0.0 && self.orders.is_empty()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Append an order at the tail of the queue (time priority).
    pub fn add(&mut self, order: Order) -> SimResult<()> {
        if order.side != self.side {
            return Err(SimError::InvalidSide(order.id));
        }
        self.orders.try_reserve(1)?;
        self.orders.push_back(order);
        Ok(())
    }

    /// Remove the order with the given id, preserving the queue order of
    /// everything behind it. Time priority must survive a cancel.
    pub fn cancel(&mut self, order_id: u64) -> SimResult<Order> {
        let pos = self
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or(SimError::OrderNotFound(order_id))?;

        let Some(mut order) = self.orders.remove(pos) else {
            return Err(SimError::OrderNotFound(order_id));
        };
        order.status = OrderStatus::Canceled;
        Ok(order)
    }

    /// Total open quantity: anonymous depth plus own remaining quantities.
    pub fn total_qty(&self) -> f64 {
        self.market_qty + self.orders.iter().map(|o| o.remaining()).sum::<f64>()
    }

    /// Match an incoming order against this level in FIFO order.
    ///
    /// The caller guarantees the incoming price is marketable here. Each
    /// fill stamps per-fill fields on both sides and appends a snapshot of
    /// the resting order to the trade output; a snapshot of the incoming
    /// order is appended last. `current_exec_qty` on the incoming order
    /// accumulates across levels within one match pass, so the side book
    /// resets it before the first level.
    ///
    /// Returns `(level_broken_through, trades)`: broken through means the
    /// incoming order still has remaining quantity after this level.
    pub fn match_order(&mut self, incoming: &mut Order) -> (bool, Vec<Order>) {
        let mut trades = Vec::new();

        if self.market_qty > 0.0 && incoming.remaining() > 0.0 {
            let take = incoming.remaining().min(self.market_qty);
            self.market_qty -= take;
            incoming.exec_qty += take;
            incoming.current_exec_qty += take;
            incoming.current_exec_price = self.price;
            incoming.current_is_maker = false;
        }

        let mut i = 0;
        while i < self.orders.len() {
            if incoming.remaining() <= 0.0 {
                break;
            }

            let resting = &mut self.orders[i];
            let take = incoming.remaining().min(resting.remaining());
            if take <= 0.0 {
                i += 1;
                continue;
            }

            resting.exec_qty += take;
            resting.current_exec_qty = take;
            resting.current_exec_price = self.price;
            resting.current_is_maker = true;
            resting.status = if resting.remaining() <= 0.0 {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };

            incoming.exec_qty += take;
            incoming.current_exec_qty += take;
            incoming.current_exec_price = self.price;
            incoming.current_is_maker = false;

            // Snapshot after stamping, before the order can leave the level
            trades.push(resting.clone());

            if resting.remaining() <= 0.0 {
                self.orders.remove(i);
            } else {
                i += 1;
            }
        }

        incoming.status = if incoming.remaining() <= 0.0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        trades.push(incoming.clone());

        (incoming.remaining() > 0.0, trades)
    }
}
