// Error types for the simulation core
//
// Matching itself never errors on ordinary exhaustion: residual quantity
// and TIF rejections are reported in-band through order status.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("order {0} not found")]
    OrderNotFound(u64),

    #[error("invalid side for order {0}")]
    InvalidSide(u64),

    #[error("insufficient depth for order {id}: required {required}, available {available}")]
    InsufficientDepth {
        id: u64,
        required: f64,
        available: f64,
    },

    #[error("invalid price {0}")]
    InvalidPrice(f64),

    #[error("unknown asset index {0}")]
    UnknownAsset(usize),

    #[error("allocation failure: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

pub type SimResult<T> = Result<T, SimError>;
