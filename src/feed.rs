// Market data feed adapter
//
// Replays recorded L2 depth into the simulation. Records carry wall-clock
// timestamps from the venue; the feed maps them onto the virtual clock
// relative to a fixed origin and hands back ready-to-inject events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sim::{DepthUpdate, Event, EventKind};
use crate::types::Timestamp;

/// One recorded L2 update, line-delimited JSON on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthRecord {
    pub timestamp: DateTime<Utc>,
    pub asset_no: usize,
    #[serde(default)]
    pub is_snapshot: bool,
    #[serde(default)]
    pub bids: Vec<(f64, f64)>,
    #[serde(default)]
    pub asks: Vec<(f64, f64)>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to parse depth record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("record at {timestamp} precedes feed origin {origin}")]
    BeforeOrigin {
        timestamp: DateTime<Utc>,
        origin: DateTime<Utc>,
    },

    #[error("record at {0} does not fit the virtual clock range")]
    RangeExceeded(DateTime<Utc>),
}

/// Maps venue wall-clock timestamps onto the virtual nanosecond clock.
pub struct MarketDataFeed {
    origin: DateTime<Utc>,
}

impl MarketDataFeed {
    /// `origin` becomes virtual time zero; every record must be at or
    /// after it.
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self { origin }
    }

    /// Feed origin anchored at the first record.
    pub fn anchored_to(records: &[DepthRecord]) -> Option<Self> {
        records.first().map(|r| Self::new(r.timestamp))
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn virtual_time(&self, timestamp: DateTime<Utc>) -> Result<Timestamp, FeedError> {
        if timestamp < self.origin {
            return Err(FeedError::BeforeOrigin {
                timestamp,
                origin: self.origin,
            });
        }
        (timestamp - self.origin)
            .num_nanoseconds()
            .ok_or(FeedError::RangeExceeded(timestamp))
    }

    /// Convert one record into an injectable event.
    pub fn to_event(&self, record: &DepthRecord) -> Result<Event, FeedError> {
        let finish_time = self.virtual_time(record.timestamp)?;
        Ok(Event {
            finish_time,
            asset_no: record.asset_no,
            kind: EventKind::Depth(DepthUpdate {
                is_snapshot: record.is_snapshot,
                bids: record.bids.clone(),
                asks: record.asks.clone(),
            }),
        })
    }
}

/// Parse line-delimited JSON depth records. Blank lines are skipped.
pub fn parse_depth_records(input: &str) -> Result<Vec<DepthRecord>, FeedError> {
    let mut records = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }
    debug!(count = records.len(), "parsed depth records");
    Ok(records)
}
