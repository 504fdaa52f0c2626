//! Periodic live price publisher.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::data_source::{MarketDataSource, ProviderError, SeriesRequest};
use crate::normalizer::round_to;
use crate::{Interval, LiveTick, LiveUpdate, Period, Symbol, UtcDateTime};

pub const LIVE_TICKERS: [&str; 3] = ["^GSPC", "^DJI", "^IXIC"];
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(30);
const CHANNEL_CAPACITY: usize = 16;

/// Re-fetches a fixed symbol set on a fixed delay and publishes one
/// [`LiveUpdate`] per cycle. Cycles run sequentially and never overlap.
pub struct LiveBroadcaster {
    source: Arc<dyn MarketDataSource>,
    symbols: Vec<Symbol>,
    interval: Duration,
    sender: broadcast::Sender<LiveUpdate>,
}

impl LiveBroadcaster {
    pub fn new(source: Arc<dyn MarketDataSource>, interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let symbols = LIVE_TICKERS
            .iter()
            .filter_map(|ticker| Symbol::parse(ticker).ok())
            .collect();
        Self {
            source,
            symbols,
            interval,
            sender,
        }
    }

    pub fn with_sender(mut self, sender: broadcast::Sender<LiveUpdate>) -> Self {
        self.sender = sender;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveUpdate> {
        self.sender.subscribe()
    }

    /// One fetch round. Any provider failure aborts the whole cycle; empty
    /// series are skipped.
    pub async fn run_cycle(&self) -> Result<LiveUpdate, ProviderError> {
        let mut ticks = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let series = self
                .source
                .series(SeriesRequest::new(symbol.clone(), Period::OneDay, Interval::OneMinute))
                .await?;
            if let Some(close) = series.last_close() {
                ticks.push(LiveTick {
                    symbol: symbol.clone(),
                    price: round_to(close, 2),
                    timestamp: UtcDateTime::now(),
                });
            }
        }
        Ok(LiveUpdate::equities(ticks))
    }

    /// Runs cycles until `shutdown` resolves. Failed cycles are logged and
    /// retried after the same delay.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        info!(interval = ?self.interval, symbols = self.symbols.len(), "live broadcaster started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => match outcome {
                    Ok(update) => {
                        let count = update.data.len();
                        match self.sender.send(update) {
                            Ok(receivers) => debug!(ticks = count, receivers, "published live update"),
                            Err(_) => debug!(ticks = count, "no live subscribers"),
                        }
                    }
                    Err(error) => warn!(%error, "live update cycle failed"),
                },
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("live broadcaster stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::ProviderFuture;
    use crate::{PricePoint, PriceSeries, ProviderId};

    struct FixedSource;

    impl MarketDataSource for FixedSource {
        fn id(&self) -> ProviderId {
            ProviderId::Fixture
        }

        fn series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries> {
            Box::pin(async move {
                if req.symbol.as_str() == "^DJI" {
                    return Ok(PriceSeries::empty(req.symbol));
                }
                Ok(PriceSeries {
                    symbol: req.symbol,
                    points: vec![PricePoint::close_only(UtcDateTime::now(), 5_000.456)],
                    previous_close: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn cycle_skips_empty_series_and_rounds_price() {
        let broadcaster = LiveBroadcaster::new(Arc::new(FixedSource), DEFAULT_BROADCAST_INTERVAL);
        let update = broadcaster.run_cycle().await.expect("cycle succeeds");

        assert_eq!(update.kind, "equities");
        assert_eq!(update.data.len(), 2);
        assert_eq!(update.data[0].price, Some(5_000.46));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_shutdown_resolves() {
        let broadcaster = LiveBroadcaster::new(Arc::new(FixedSource), DEFAULT_BROADCAST_INTERVAL);
        let mut updates = broadcaster.subscribe();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            broadcaster
                .run(async {
                    let _ = stop_rx.await;
                })
                .await;
        });

        updates.recv().await.expect("first update");
        stop_tx.send(()).expect("broadcaster still running");
        handle.await.expect("broadcaster task joins");
    }
}
