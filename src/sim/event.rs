// Time-tagged events and the delayed delivery pool
//
// An event becomes visible to its destination once the virtual clock
// reaches its finish time. The pool keeps events unordered and caches the
// earliest finish time so the world can find the next advance target
// without scanning.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::types::{Order, Side, Timestamp};

/// Anonymous L2 depth for one asset. A snapshot replaces all anonymous
/// depth; a diff patches the listed prices (zero quantity removes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthUpdate {
    pub is_snapshot: bool,
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    NewOrder(Order),
    CancelOrder {
        order_id: u64,
        side: Side,
        price: f64,
    },
    /// Order state reported back to the local side: fills, rest acks,
    /// cancels and rejects, distinguished by the carried order status.
    Fill(Order),
    Depth(DepthUpdate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub finish_time: Timestamp,
    pub asset_no: usize,
    pub kind: EventKind,
}

/// Unordered event store with a cached earliest finish time.
#[derive(Debug, Default)]
pub struct EventPool {
    events: Vec<Event>,
    earliest: Option<Timestamp>,
}

impl EventPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn earliest(&self) -> Option<Timestamp> {
        self.earliest
    }

    pub fn add(&mut self, event: Event) -> SimResult<()> {
        self.events.try_reserve(1)?;
        self.earliest = Some(match self.earliest {
            Some(t) => t.min(event.finish_time),
            None => event.finish_time,
        });
        self.events.push(event);
        Ok(())
    }

    /// Remove and return every event with `finish_time <= t`, ordered by
    /// finish time with ties in insertion order. The cached earliest is
    /// recomputed from what remains.
    pub fn drain_until(&mut self, t: Timestamp) -> Vec<Event> {
        match self.earliest {
            Some(earliest) if earliest <= t => {}
            _ => return Vec::new(),
        }

        let mut delivered = Vec::new();
        let mut retained = Vec::new();
        for event in self.events.drain(..) {
            if event.finish_time <= t {
                delivered.push(event);
            } else {
                retained.push(event);
            }
        }
        self.events = retained;
        self.earliest = self.events.iter().map(|e| e.finish_time).min();

        // Stable sort keeps enqueue order among equal finish times
        delivered.sort_by_key(|e| e.finish_time);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Order;

    fn event_at(finish_time: Timestamp, id: u64) -> Event {
        Event {
            finish_time,
            asset_no: 0,
            kind: EventKind::NewOrder(Order::limit(id, Side::Buy, 100.0, 1.0)),
        }
    }

    fn order_id(event: &Event) -> u64 {
        match &event.kind {
            EventKind::NewOrder(o) => o.id,
            _ => panic!("expected NewOrder"),
        }
    }

    #[test]
    fn test_empty_pool_has_no_earliest() {
        let mut pool = EventPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.earliest(), None);
        assert!(pool.drain_until(100).is_empty());
    }

    #[test]
    fn test_add_tracks_earliest() {
        let mut pool = EventPool::new();
        pool.add(event_at(5, 1)).unwrap();
        assert_eq!(pool.earliest(), Some(5));
        pool.add(event_at(2, 2)).unwrap();
        assert_eq!(pool.earliest(), Some(2));
        pool.add(event_at(9, 3)).unwrap();
        assert_eq!(pool.earliest(), Some(2));
    }

    #[test]
    fn test_drain_until_partitions_and_orders() {
        let mut pool = EventPool::new();
        for (t, id) in [(2, 1), (1, 2), (3, 3), (1, 4)] {
            pool.add(event_at(t, id)).unwrap();
        }

        let delivered = pool.drain_until(pool.earliest().unwrap());

        let ids: Vec<u64> = delivered.iter().map(order_id).collect();
        assert_eq!(ids, vec![2, 4], "equal finish times keep enqueue order");
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.earliest(), Some(2));
    }

    #[test]
    fn test_drain_is_idempotent() {
        let mut pool = EventPool::new();
        pool.add(event_at(1, 1)).unwrap();
        pool.add(event_at(2, 2)).unwrap();

        assert_eq!(pool.drain_until(2).len(), 2);
        assert!(pool.drain_until(2).is_empty());
        assert_eq!(pool.earliest(), None);
    }

    #[test]
    fn test_drain_short_circuits_before_earliest() {
        let mut pool = EventPool::new();
        pool.add(event_at(10, 1)).unwrap();

        assert!(pool.drain_until(9).is_empty());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.earliest(), Some(10));
    }

    #[test]
    fn test_drain_orders_across_times() {
        let mut pool = EventPool::new();
        for (t, id) in [(7, 1), (3, 2), (5, 3), (3, 4)] {
            pool.add(event_at(t, id)).unwrap();
        }

        let ids: Vec<u64> = pool.drain_until(7).iter().map(order_id).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
        assert!(pool.is_empty());
    }
}
