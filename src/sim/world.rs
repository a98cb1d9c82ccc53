// The simulation world
//
// Owns the virtual clock and binds the local (strategy) side to the
// exchange side through two directed event pools. Orders travel local →
// exchange delayed by `delay.send`; fills and acks travel back delayed by
// `delay.receive`. Time only moves through `goto_time`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::book::OrderBook;
use crate::error::{SimError, SimResult};
use crate::types::{Order, Side, Timestamp};

use super::event::{Event, EventKind, EventPool};
use super::exchange::Exchange;
use super::stats::SimulationStats;

/// One-way trip times between the local side and the venue, in the same
/// integer unit as the virtual clock.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Delay {
    pub send: i64,
    pub receive: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub lot_size: f64,
    pub tick_size: f64,
    pub delay: Delay,
}

/// Callback surface the host provides. Invoked once per `goto_time`
/// advance with the batch of delivered local-bound events.
pub trait Strategy {
    fn on_local_events(&mut self, events: &[Event]);
}

/// Adapter turning a closure into a [`Strategy`].
pub struct StrategyFn<F>(pub F);

impl<F: FnMut(&[Event])> Strategy for StrategyFn<F> {
    fn on_local_events(&mut self, events: &[Event]) {
        (self.0)(events)
    }
}

/// Accumulates delivered events for hosts that poll between advances.
#[derive(Debug, Default)]
pub struct EventCollector {
    pub events: Vec<Event>,
}

impl Strategy for EventCollector {
    fn on_local_events(&mut self, events: &[Event]) {
        self.events.extend_from_slice(events);
    }
}

pub struct World {
    time: Timestamp,
    assets: Vec<Asset>,
    ex_ep: EventPool,
    local_ep: EventPool,
    exchange: Exchange,
    stats: SimulationStats,
}

impl World {
    pub fn new(assets: Vec<Asset>) -> Self {
        let exchange = Exchange::new(&assets);
        info!(assets = assets.len(), "📖 simulation world initialized");
        Self {
            time: 0,
            assets,
            ex_ep: EventPool::new(),
            local_ep: EventPool::new(),
            exchange,
            stats: SimulationStats::default(),
        }
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// The exchange-side book for an asset. Read-only: a backtest host
    /// observing exchange state directly would be lookahead bias, but
    /// metrics and assertions need it.
    pub fn book(&self, asset_no: usize) -> Option<&OrderBook> {
        self.exchange.book(asset_no)
    }

    pub fn ex_pool(&self) -> &EventPool {
        &self.ex_ep
    }

    pub fn local_pool(&self) -> &EventPool {
        &self.local_ep
    }

    /// Submit an order from the local side. It reaches the exchange at
    /// `time + delay.send`.
    pub fn new_order(&mut self, asset_no: usize, mut order: Order) -> SimResult<()> {
        let asset = self
            .assets
            .get(asset_no)
            .ok_or(SimError::UnknownAsset(asset_no))?;
        if order.side == Side::None {
            return Err(SimError::InvalidSide(order.id));
        }

        order.create_timestamp = self.time;
        let finish_time = self.time + asset.delay.send;
        debug!(
            asset = %asset.name,
            order_id = order.id,
            finish_time,
            "submitting order"
        );
        self.stats.record_order_submitted();
        self.ex_ep.add(Event {
            finish_time,
            asset_no,
            kind: EventKind::NewOrder(order),
        })
    }

    /// Request a cancel from the local side, delayed like any order.
    pub fn cancel_order(
        &mut self,
        asset_no: usize,
        side: Side,
        price: f64,
        order_id: u64,
    ) -> SimResult<()> {
        let asset = self
            .assets
            .get(asset_no)
            .ok_or(SimError::UnknownAsset(asset_no))?;
        let finish_time = self.time + asset.delay.send;
        self.ex_ep.add(Event {
            finish_time,
            asset_no,
            kind: EventKind::CancelOrder {
                order_id,
                side,
                price,
            },
        })
    }

    /// Inject a pre-timestamped event (market data from a feed). The
    /// finish time is taken as-is and must already be in virtual time.
    pub fn feed_event(&mut self, event: Event) -> SimResult<()> {
        if event.asset_no >= self.assets.len() {
            return Err(SimError::UnknownAsset(event.asset_no));
        }
        self.ex_ep.add(event)
    }

    /// Earliest pending finish time across both pools.
    pub fn next_event_time(&self) -> Option<Timestamp> {
        match (self.ex_ep.earliest(), self.local_ep.earliest()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Advance the virtual clock to `t` (or to the next pending event when
    /// `None`), deliver everything due, and hand the local batch to the
    /// strategy. Exchange events process before local events at the same
    /// timestamp, so a fill produced with zero receive delay is delivered
    /// within the same advance. No-op when `None` and both pools are empty.
    pub fn goto_time<S: Strategy + ?Sized>(
        &mut self,
        t: Option<Timestamp>,
        strategy: &mut S,
    ) -> SimResult<Timestamp> {
        let Some(target) = t.or_else(|| self.next_event_time()) else {
            return Ok(self.time);
        };
        // The clock never runs backwards
        let target = target.max(self.time);
        self.time = target;

        let ex_batch = self.ex_ep.drain_until(target);
        if !ex_batch.is_empty() {
            self.exchange
                .process_events(ex_batch, &self.assets, target, &mut self.local_ep)?;
        }

        let local_batch = self.local_ep.drain_until(target);
        for event in &local_batch {
            self.stats.record_local_event(event);
        }
        if !local_batch.is_empty() {
            strategy.on_local_events(&local_batch);
        }

        Ok(self.time)
    }

    /// Run until both pools drain or the clock passes `until`.
    pub fn run_until<S: Strategy + ?Sized>(
        &mut self,
        until: Timestamp,
        strategy: &mut S,
    ) -> SimResult<Timestamp> {
        while let Some(next) = self.next_event_time() {
            if next > until {
                break;
            }
            self.goto_time(Some(next), strategy)?;
        }
        Ok(self.time)
    }

    pub fn get_best_prices(&self, asset_no: usize) -> Option<(f64, f64)> {
        let book = self.book(asset_no)?;
        Some((book.bid(0)?, book.ask(0)?))
    }

    pub fn get_spread(&self, asset_no: usize) -> Option<f64> {
        self.book(asset_no)?.spread()
    }

    pub fn get_mid_price(&self, asset_no: usize) -> Option<f64> {
        self.book(asset_no)?.mid_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, OrderType, TimeInForce};

    fn two_assets() -> Vec<Asset> {
        vec![
            Asset {
                name: "BTCUSD".to_string(),
                lot_size: 1.0,
                tick_size: 0.01,
                delay: Delay { send: 1, receive: 2 },
            },
            Asset {
                name: "ETHUSD".to_string(),
                lot_size: 1.0,
                tick_size: 0.01,
                delay: Delay { send: 1, receive: 1 },
            },
        ]
    }

    #[test]
    fn test_new_order_enqueues_with_send_delay() {
        let mut world = World::new(two_assets());
        world.new_order(0, Order::limit(1, Side::Buy, 100.0, 1.0)).unwrap();
        world.new_order(1, Order::limit(2, Side::Buy, 100.0, 1.0)).unwrap();

        assert_eq!(world.ex_pool().len(), 2);
        assert_eq!(world.ex_pool().earliest(), Some(1));

        let mut sink = EventCollector::default();
        world.goto_time(None, &mut sink).unwrap();

        assert_eq!(world.time(), 1);
        assert!(world.ex_pool().is_empty());
        // Rest acks pending at 1+receive per asset
        assert_eq!(world.local_pool().len(), 2);
        assert_eq!(world.local_pool().earliest(), Some(2));
    }

    #[test]
    fn test_goto_time_is_noop_when_idle() {
        let mut world = World::new(two_assets());
        let mut sink = EventCollector::default();
        assert_eq!(world.goto_time(None, &mut sink).unwrap(), 0);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut world = World::new(two_assets());
        let mut sink = EventCollector::default();
        world.goto_time(Some(50), &mut sink).unwrap();
        assert_eq!(world.time(), 50);
        world.goto_time(Some(10), &mut sink).unwrap();
        assert_eq!(world.time(), 50);
    }

    #[test]
    fn test_unknown_asset_rejected() {
        let mut world = World::new(two_assets());
        assert!(matches!(
            world.new_order(5, Order::limit(1, Side::Buy, 100.0, 1.0)),
            Err(SimError::UnknownAsset(5))
        ));
    }

    #[test]
    fn test_side_none_rejected() {
        let mut world = World::new(two_assets());
        let order = Order::new(
            1,
            Side::None,
            100.0,
            1.0,
            OrderType::Limit,
            TimeInForce::Gtc,
        );
        assert!(matches!(
            world.new_order(0, order),
            Err(SimError::InvalidSide(1))
        ));
    }

    #[test]
    fn test_fill_round_trip_with_latency() {
        let mut world = World::new(two_assets());
        let mut sink = EventCollector::default();

        // Rest a sell, then cross it with a buy
        world.new_order(0, Order::limit(1, Side::Sell, 101.0, 5.0)).unwrap();
        world.goto_time(None, &mut sink).unwrap(); // t=1: order reaches venue
        assert_eq!(world.book(0).unwrap().ask(0), Some(101.0));

        world.goto_time(None, &mut sink).unwrap(); // t=3: rest ack delivered
        assert_eq!(world.time(), 3);
        assert_eq!(sink.events.len(), 1);

        world.new_order(0, Order::limit(2, Side::Buy, 101.0, 3.0)).unwrap();
        world.goto_time(None, &mut sink).unwrap(); // t=4: match at venue
        assert_eq!(world.time(), 4);

        world.goto_time(None, &mut sink).unwrap(); // t=6: fills delivered
        assert_eq!(world.time(), 6);

        let fills: Vec<&Order> = sink.events[1..]
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Fill(o) => Some(o),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);

        let maker = fills.iter().find(|o| o.id == 1).unwrap();
        assert_eq!(maker.status, OrderStatus::PartiallyFilled);
        assert_eq!(maker.current_exec_qty, 3.0);
        assert!(maker.current_is_maker);

        let taker = fills.iter().find(|o| o.id == 2).unwrap();
        assert_eq!(taker.status, OrderStatus::Filled);
        assert_eq!(taker.current_exec_price, 101.0);

        // Residual still resting at the venue
        assert_eq!(world.book(0).unwrap().ask_qty(0), Some(2.0));
        assert_eq!(world.stats().filled_orders, 1);
        assert_eq!(world.stats().partial_fills, 1);
    }

    #[test]
    fn test_cancel_round_trip() {
        let mut world = World::new(two_assets());
        let mut sink = EventCollector::default();

        world.new_order(0, Order::limit(1, Side::Buy, 100.0, 5.0)).unwrap();
        world.run_until(10, &mut sink).unwrap();
        assert_eq!(world.book(0).unwrap().bid(0), Some(100.0));

        world.cancel_order(0, Side::Buy, 100.0, 1).unwrap();
        world.run_until(10, &mut sink).unwrap();

        assert_eq!(world.book(0).unwrap().bid(0), None);
        let last = sink.events.last().unwrap();
        match &last.kind {
            EventKind::Fill(order) => assert_eq!(order.status, OrderStatus::Canceled),
            other => panic!("expected fill event, got {:?}", other),
        }
    }

    #[test]
    fn test_closure_strategy_adapter() {
        let mut world = World::new(two_assets());
        let mut seen = 0usize;
        let mut strategy = StrategyFn(|events: &[Event]| seen += events.len());

        world.new_order(0, Order::limit(1, Side::Buy, 100.0, 5.0)).unwrap();
        world.run_until(10, &mut strategy).unwrap();

        assert_eq!(seen, 1);
    }
}
