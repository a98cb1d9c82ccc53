// Exchange side of the simulation
//
// Dispatches delivered events into the per-asset order books and reports
// every resulting order state (fills, rest acks, cancels, rejects) back
// through the local-bound pool, delayed by the asset's receive latency.

use tracing::{debug, warn};

use crate::book::{BookOptions, OrderBook};
use crate::error::{SimError, SimResult};
use crate::types::{OrderStatus, Side, Timestamp};

use super::event::{Event, EventKind, EventPool};
use super::world::Asset;

pub struct Exchange {
    books: Vec<OrderBook>,
}

impl Exchange {
    pub fn new(assets: &[Asset]) -> Self {
        let books = assets
            .iter()
            .map(|asset| {
                OrderBook::new(BookOptions {
                    tick_size: asset.tick_size,
                    lot_size: asset.lot_size,
                })
            })
            .collect();
        Self { books }
    }

    pub fn book(&self, asset_no: usize) -> Option<&OrderBook> {
        self.books.get(asset_no)
    }

    pub fn book_mut(&mut self, asset_no: usize) -> Option<&mut OrderBook> {
        self.books.get_mut(asset_no)
    }

    /// Process one delivered batch in order. `now` is the world clock at
    /// delivery; every response lands in `local_ep` at
    /// `now + delay.receive` for the event's asset.
    pub fn process_events(
        &mut self,
        batch: Vec<Event>,
        assets: &[Asset],
        now: Timestamp,
        local_ep: &mut EventPool,
    ) -> SimResult<()> {
        for event in batch {
            let asset = assets
                .get(event.asset_no)
                .ok_or(SimError::UnknownAsset(event.asset_no))?;
            let receive_time = now + asset.delay.receive;

            match event.kind {
                EventKind::NewOrder(order) => {
                    let book = self
                        .books
                        .get_mut(event.asset_no)
                        .ok_or(SimError::UnknownAsset(event.asset_no))?;

                    let outcome = book.match_or_rest(order)?;
                    debug!(
                        asset = %asset.name,
                        order_id = outcome.order.id,
                        status = ?outcome.order.status,
                        fills = outcome.trades.len(),
                        "processed order"
                    );

                    for trade in outcome.trades {
                        local_ep.add(Event {
                            finish_time: receive_time,
                            asset_no: event.asset_no,
                            kind: EventKind::Fill(trade),
                        })?;
                    }

                    // Rest acks and in-band policy outcomes are not part
                    // of the trade output, so report them separately.
                    if matches!(
                        outcome.order.status,
                        OrderStatus::New | OrderStatus::Rejected | OrderStatus::Canceled
                    ) {
                        local_ep.add(Event {
                            finish_time: receive_time,
                            asset_no: event.asset_no,
                            kind: EventKind::Fill(outcome.order),
                        })?;
                    }
                }
                EventKind::CancelOrder {
                    order_id,
                    side,
                    price,
                } => {
                    let book = self
                        .books
                        .get_mut(event.asset_no)
                        .ok_or(SimError::UnknownAsset(event.asset_no))?;

                    match book.cancel(side, price, order_id) {
                        Ok(order) => {
                            local_ep.add(Event {
                                finish_time: receive_time,
                                asset_no: event.asset_no,
                                kind: EventKind::Fill(order),
                            })?;
                        }
                        Err(err) => {
                            warn!(asset = %asset.name, order_id, %err, "cancel failed");
                        }
                    }
                }
                EventKind::Depth(update) => {
                    let book = self
                        .books
                        .get_mut(event.asset_no)
                        .ok_or(SimError::UnknownAsset(event.asset_no))?;

                    if update.is_snapshot {
                        book.apply_depth_snapshot(&update.bids, &update.asks);
                    } else {
                        for &(price, qty) in &update.bids {
                            book.apply_depth_update(Side::Buy, price, qty);
                        }
                        for &(price, qty) in &update.asks {
                            book.apply_depth_update(Side::Sell, price, qty);
                        }
                    }
                }
                EventKind::Fill(order) => {
                    warn!(
                        asset = %asset.name,
                        order_id = order.id,
                        "fill event delivered to the exchange side, dropping"
                    );
                }
            }
        }
        Ok(())
    }
}
