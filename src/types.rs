// Core order types shared across the book and the simulation

use serde::{Deserialize, Serialize};

/// Virtual clock timestamp, integer nanoseconds since simulation start.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
    None,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::None => Side::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Rest until filled or canceled
    Gtc,
    /// Post-only: reject if the order would take liquidity
    Gtx,
    /// Fill the entire quantity immediately or reject
    Fok,
    /// Fill what is marketable, cancel the rest
    Ioc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    None,
    New,
    Expired,
    Filled,
    Canceled,
    PartiallyFilled,
    Rejected,
    Unsupported,
}

/// A single order and its execution state.
///
/// `qty` is the original quantity and never changes after creation;
/// `exec_qty` accumulates fills. The `current_*` fields describe the most
/// recent match event only and are overwritten on every fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub price: f64,
    pub side: Side,
    pub qty: f64,
    pub exec_qty: f64,
    pub current_exec_qty: f64,
    pub current_exec_price: f64,
    pub current_is_maker: bool,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    pub create_timestamp: Timestamp,
}

impl Order {
    pub fn new(
        id: u64,
        side: Side,
        price: f64,
        qty: f64,
        order_type: OrderType,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id,
            price,
            side,
            qty,
            exec_qty: 0.0,
            current_exec_qty: 0.0,
            current_exec_price: 0.0,
            current_is_maker: false,
            order_type,
            time_in_force,
            status: OrderStatus::None,
            create_timestamp: 0,
        }
    }

    /// Limit order resting until filled or canceled.
    pub fn limit(id: u64, side: Side, price: f64, qty: f64) -> Self {
        Self::new(id, side, price, qty, OrderType::Limit, TimeInForce::Gtc)
    }

    /// Market order: price is ignored for marketability.
    pub fn market(id: u64, side: Side, qty: f64) -> Self {
        Self::new(id, side, 0.0, qty, OrderType::Market, TimeInForce::Ioc)
    }

    pub fn remaining(&self) -> f64 {
        self.qty - self.exec_qty
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Filled
                | OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::Rejected
        )
    }
}
