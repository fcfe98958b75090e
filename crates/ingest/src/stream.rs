//! Timed snapshot stream.
//!
//! A background tokio task pulls snapshots from a [`TelemetrySource`] and
//! pushes them into a bounded channel: one immediately, then one per
//! interval while cycling. Stopping aborts the task; dropping the receiver
//! ends it on the next send.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use cellscope_core::BatteryPackSnapshot;

use crate::mock::TelemetrySource;

const DEFAULT_INTERVAL_MS: u64 = 2000;
const DEFAULT_BUFFER: usize = 8;

#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Delay between snapshots while cycling.
    pub interval: Duration,
    /// When false, only the initial snapshot is emitted.
    pub cycle: bool,
    /// Channel capacity.
    pub buffer: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            cycle: true,
            buffer: DEFAULT_BUFFER,
        }
    }
}

/// Handle to a running telemetry producer.
pub struct TelemetryStream {
    rx: mpsc::Receiver<BatteryPackSnapshot>,
    handle: JoinHandle<()>,
}

impl TelemetryStream {
    /// Start producing snapshots. Must be called inside a tokio runtime.
    pub fn spawn<S>(mut source: S, options: StreamOptions) -> Self
    where
        S: TelemetrySource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(options.buffer.max(1));
        // tokio intervals must be non-zero.
        let period = options.interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            if tx.send(source.next_snapshot()).await.is_err() {
                return;
            }
            if !options.cycle {
                return;
            }

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial snapshot already covered it.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tx.send(source.next_snapshot()).await.is_err() {
                    debug!("telemetry receiver dropped, stopping stream");
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    /// Next snapshot, or `None` once the producer has finished and the buffer is drained.
    pub async fn next(&mut self) -> Option<BatteryPackSnapshot> {
        self.rx.recv().await
    }

    /// Stop producing. Already-buffered snapshots can still be drained with [`next`](Self::next).
    pub fn stop(&mut self) {
        self.handle.abort();
        self.rx.close();
    }
}

impl Drop for TelemetryStream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBatteryGenerator, PackLayout};

    fn generator() -> MockBatteryGenerator {
        MockBatteryGenerator::seeded(PackLayout::with_cells(8), 1)
    }

    fn fast(cycle: bool) -> StreamOptions {
        StreamOptions {
            interval: Duration::from_millis(5),
            cycle,
            buffer: 2,
        }
    }

    #[tokio::test]
    async fn single_shot_emits_once() {
        let mut stream = TelemetryStream::spawn(generator(), fast(false));

        let first = stream.next().await.expect("initial snapshot");
        assert_eq!(first.cells.len(), 8);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn cycling_emits_fresh_snapshots() {
        let mut stream = TelemetryStream::spawn(generator(), fast(true));

        let a = stream.next().await.unwrap();
        let b = stream.next().await.unwrap();
        let c = stream.next().await.unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        stream.stop();
    }

    #[tokio::test]
    async fn stop_ends_the_stream() {
        let mut stream = TelemetryStream::spawn(generator(), fast(true));
        stream.next().await.unwrap();
        stream.stop();

        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            let mut n = 0;
            while stream.next().await.is_some() {
                n += 1;
            }
            n
        })
        .await
        .expect("stream should end after stop");
        assert!(drained <= 2);
    }

    #[tokio::test]
    async fn matches_direct_generation() {
        let mut direct = generator();
        let expected = direct.next_snapshot();

        let mut stream = TelemetryStream::spawn(generator(), fast(false));
        assert_eq!(stream.next().await, Some(expected));
    }
}
