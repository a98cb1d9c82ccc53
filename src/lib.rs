// Market Microstructure Backtesting Core
//
// A deterministic, event-driven simulator for a trading strategy
// interacting with limit order book venues, with configurable send and
// receive latencies between the local side and the exchange.

pub mod book;
pub mod config;
pub mod error;
pub mod feed;
pub mod sim;
pub mod types;

// Re-export commonly used types for convenience
pub use book::{BookOptions, MatchOutcome, OrderBook, PriceLevel, SideBook};
pub use config::{AssetConfig, ConfigError, DelayConfig, SimConfig};
pub use error::{SimError, SimResult};
pub use feed::{parse_depth_records, DepthRecord, FeedError, MarketDataFeed};
pub use sim::{
    Asset, Delay, DepthUpdate, Event, EventCollector, EventKind, EventPool, Exchange,
    SimulationStats, Strategy, StrategyFn, TradeRecord, World,
};
pub use types::{Order, OrderStatus, OrderType, Side, TimeInForce, Timestamp};
