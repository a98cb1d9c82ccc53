// Common test utilities and helpers

#![allow(dead_code)]

use lob_backtest::{AssetConfig, DelayConfig, Order, Side, SimConfig, World};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Two assets with asymmetric latencies, tick 0.01.
pub fn test_config() -> SimConfig {
    let mut btc = AssetConfig::new("BTCUSD");
    btc.tick_size = 0.01;
    btc.delay = DelayConfig { send: 1, receive: 2 };

    let mut eth = AssetConfig::new("ETHUSD");
    eth.tick_size = 0.01;
    eth.delay = DelayConfig { send: 1, receive: 1 };

    SimConfig {
        assets: vec![btc, eth],
    }
}

pub fn test_world() -> World {
    World::new(test_config().build_assets())
}

/// Bids at 101/100/100/99 and asks at 103/105, the standard fixture.
pub fn seeded_book_orders() -> Vec<Order> {
    vec![
        Order::limit(1, Side::Buy, 100.0, 100.0),
        Order::limit(2, Side::Buy, 100.0, 200.0),
        Order::limit(3, Side::Buy, 99.0, 200.0),
        Order::limit(4, Side::Buy, 101.0, 200.0),
        Order::limit(5, Side::Sell, 103.0, 200.0),
        Order::limit(6, Side::Sell, 105.0, 200.0),
    ]
}

/// Deterministic pseudo-random sequence; simulations must be replayable,
/// so tests avoid entropy too.
pub struct TestRng(u64);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        // Linear congruential step, constants from Numerical Recipes
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    pub fn next_in(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }
}
