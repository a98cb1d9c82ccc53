// Limit order book
// Price-time priority matching over two side books of FIFO price levels

pub mod level;
pub mod order_book;
pub mod side;

pub use level::PriceLevel;
pub use order_book::{BookOptions, MatchOutcome, OrderBook};
pub use side::SideBook;
