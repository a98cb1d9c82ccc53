// Simulation world
// Virtual clock, delayed event pools, and the exchange/local bridge

pub mod event;
pub mod exchange;
pub mod stats;
pub mod world;

pub use event::{DepthUpdate, Event, EventKind, EventPool};
pub use exchange::Exchange;
pub use stats::{SimulationStats, TradeRecord};
pub use world::{Asset, Delay, EventCollector, Strategy, StrategyFn, World};
