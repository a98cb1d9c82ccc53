// Two-sided order book with price-time priority matching
//
// Composes a bid and an ask side book and enforces time-in-force policy
// around the matching pass. Policy violations (post-only cross, unfillable
// all-or-nothing) are reported in-band through order status, never as Err.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::types::{Order, OrderStatus, OrderType, Side, TimeInForce};

use super::side::SideBook;

/// Book-level configuration, immutable after construction.
#[derive(Debug, Clone, Copy)]
pub struct BookOptions {
    pub tick_size: f64,
    pub lot_size: f64,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            tick_size: 0.0001,
            lot_size: 1.0,
        }
    }
}

/// Result of a matching pass: the final state of the submitted order and
/// the trade snapshots it produced (maker fills plus per-level snapshots
/// of the submitted order itself).
#[derive(Debug)]
pub struct MatchOutcome {
    pub order: Order,
    pub trades: Vec<Order>,
}

pub struct OrderBook {
    opts: BookOptions,
    bids: SideBook,
    asks: SideBook,
}

impl OrderBook {
    pub fn new(opts: BookOptions) -> Self {
        Self {
            bids: SideBook::new(Side::Buy, opts.tick_size),
            asks: SideBook::new(Side::Sell, opts.tick_size),
            opts,
        }
    }

    pub fn options(&self) -> &BookOptions {
        &self.opts
    }

    pub fn bids(&self) -> &SideBook {
        &self.bids
    }

    pub fn asks(&self) -> &SideBook {
        &self.asks
    }

    fn validate_price(&self, price: f64) -> SimResult<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(SimError::InvalidPrice(price));
        }
        Ok(())
    }

    /// Rest an order on its own side without matching. Used to seed book
    /// state; live submissions go through `match_or_rest`.
    pub fn add_order(&mut self, mut order: Order) -> SimResult<()> {
        if order.side == Side::None {
            return Err(SimError::InvalidSide(order.id));
        }
        self.validate_price(order.price)?;
        if order.status == OrderStatus::None {
            order.status = OrderStatus::New;
        }
        match order.side {
            Side::Buy => self.bids.add(order),
            Side::Sell => self.asks.add(order),
            Side::None => Err(SimError::InvalidSide(order.id)),
        }
    }

    /// Cancel a resting order. Errors from the side book pass through
    /// unchanged.
    pub fn cancel(&mut self, side: Side, price: f64, order_id: u64) -> SimResult<Order> {
        match side {
            Side::Buy => self.bids.cancel(order_id, price),
            Side::Sell => self.asks.cancel(order_id, price),
            Side::None => Err(SimError::InvalidSide(order_id)),
        }
    }

    /// All-or-nothing pre-check: is currently marketable depth enough to
    /// fill the whole order?
    pub fn check_marketable_depth(&self, order: &Order) -> SimResult<()> {
        let opposite = match order.side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
            Side::None => return Err(SimError::InvalidSide(order.id)),
        };
        let available = opposite.marketable_qty(order);
        if available < order.qty {
            return Err(SimError::InsufficientDepth {
                id: order.id,
                required: order.qty,
                available,
            });
        }
        Ok(())
    }

    /// Match an order against the opposite side, then rest or cancel the
    /// residual according to its time-in-force.
    pub fn match_or_rest(&mut self, mut order: Order) -> SimResult<MatchOutcome> {
        if order.side == Side::None {
            return Err(SimError::InvalidSide(order.id));
        }
        if order.order_type == OrderType::Limit {
            self.validate_price(order.price)?;
        }
        if order.status == OrderStatus::None {
            order.status = OrderStatus::New;
        }

        // Policy checks run before any fill is committed
        if order.time_in_force == TimeInForce::Gtx {
            let crossed = match order.side {
                Side::Buy => self.asks.crosses(&order),
                Side::Sell => self.bids.crosses(&order),
                Side::None => false,
            };
            if crossed {
                debug!(order_id = order.id, "post-only order would cross, rejecting");
                order.status = OrderStatus::Rejected;
                return Ok(MatchOutcome {
                    order,
                    trades: Vec::new(),
                });
            }
        }

        if order.time_in_force == TimeInForce::Fok {
            if let Err(err) = self.check_marketable_depth(&order) {
                debug!(order_id = order.id, %err, "rejecting all-or-nothing order");
                order.status = OrderStatus::Rejected;
                return Ok(MatchOutcome {
                    order,
                    trades: Vec::new(),
                });
            }
        }

        let (own, opposite) = match order.side {
            Side::Buy => (&mut self.bids, &mut self.asks),
            Side::Sell => (&mut self.asks, &mut self.bids),
            Side::None => return Err(SimError::InvalidSide(order.id)),
        };

        let trades = opposite.match_order(&mut order);

        if order.remaining() > 0.0 {
            match (order.order_type, order.time_in_force) {
                (OrderType::Limit, TimeInForce::Gtc) | (OrderType::Limit, TimeInForce::Gtx) => {
                    own.add(order.clone())?;
                }
                _ => {
                    // Synthetic cancel at match time, never via the clock
                    order.status = OrderStatus::Canceled;
                }
            }
        }

        Ok(MatchOutcome { order, trades })
    }

    pub fn bid(&self, n: usize) -> Option<f64> {
        self.bids.best_price(n)
    }

    pub fn ask(&self, n: usize) -> Option<f64> {
        self.asks.best_price(n)
    }

    pub fn bid_qty(&self, n: usize) -> Option<f64> {
        self.bids.best_qty(n)
    }

    pub fn ask_qty(&self, n: usize) -> Option<f64> {
        self.asks.best_qty(n)
    }

    /// Top-n depth per side, best first.
    pub fn depth(&self, n: usize) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        (self.bids.depth(n), self.asks.depth(n))
    }

    pub fn spread(&self) -> Option<f64> {
        match (self.ask(0), self.bid(0)) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn mid_price(&self) -> Option<f64> {
        match (self.ask(0), self.bid(0)) {
            (Some(ask), Some(bid)) => Some((ask + bid) / 2.0),
            _ => None,
        }
    }

    /// Replace all anonymous depth with a venue snapshot. Own resting
    /// orders survive.
    pub fn apply_depth_snapshot(&mut self, bids: &[(f64, f64)], asks: &[(f64, f64)]) {
        self.bids.clear_market_depth();
        self.asks.clear_market_depth();
        for &(price, qty) in bids {
            self.bids.update_market_qty(price, qty);
        }
        for &(price, qty) in asks {
            self.asks.update_market_qty(price, qty);
        }
    }

    /// Patch the anonymous depth at one price. Zero removes the level
    /// unless own orders rest there.
    pub fn apply_depth_update(&mut self, side: Side, price: f64, qty: f64) {
        match side {
            Side::Buy => self.bids.update_market_qty(price, qty),
            Side::Sell => self.asks.update_market_qty(price, qty),
            Side::None => {}
        }
    }
}
