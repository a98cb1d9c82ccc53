// Run statistics and execution log
//
// Counters are order-leg level: a leg's executed quantity is added to the
// traded volume once, when the leg reaches a terminal status. The trade
// log keeps one record per delivered fill event, as reported.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OrderStatus, Side, Timestamp};

use super::event::{Event, EventKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub asset_no: usize,
    pub order_id: u64,
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub is_maker: bool,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    pub total_orders: u64,
    pub filled_orders: u64,
    pub partial_fills: u64,
    pub rejected_orders: u64,
    pub canceled_orders: u64,
    pub total_volume: f64,
    trades: Vec<TradeRecord>,
}

impl SimulationStats {
    pub fn record_order_submitted(&mut self) {
        self.total_orders += 1;
    }

    /// Account one delivered local-bound event.
    pub fn record_local_event(&mut self, event: &Event) {
        let EventKind::Fill(order) = &event.kind else {
            return;
        };

        match order.status {
            OrderStatus::Filled => self.filled_orders += 1,
            OrderStatus::PartiallyFilled => self.partial_fills += 1,
            OrderStatus::Rejected => self.rejected_orders += 1,
            OrderStatus::Canceled => self.canceled_orders += 1,
            _ => {}
        }

        if order.is_terminal() {
            self.total_volume += order.exec_qty;
        }

        if order.current_exec_qty > 0.0 {
            self.trades.push(TradeRecord {
                id: Uuid::new_v4(),
                asset_no: event.asset_no,
                order_id: order.id,
                side: order.side,
                price: order.current_exec_price,
                qty: order.current_exec_qty,
                is_maker: order.current_is_maker,
                timestamp: event.finish_time,
            });
        }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }
}
