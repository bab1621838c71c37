//! Watch-queue consumer.
//!
//! Exactly one consumer drains the watch-service channel, keeping the
//! tracker the sole writer of the persisted list. The loop ends when the
//! channel closes or the cancellation token fires.

use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use corpus_types::CorpusError;

use crate::event::WatchEvent;
use crate::tracker::FileTracker;

/// Drain events into the tracker until the channel closes or `cancel`
/// fires. Returns the number of newly tracked files.
pub async fn drain_events(
    mut receiver: Receiver<WatchEvent>,
    tracker: &mut FileTracker,
    cancel: CancellationToken,
) -> Result<usize, CorpusError> {
    let mut recorded = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(recorded, "Watch consumer cancelled");
                break;
            }
            event = receiver.recv() => {
                match event {
                    Some(event) => {
                        if tracker.record(&event)?.is_some() {
                            recorded += 1;
                        }
                    }
                    None => {
                        debug!(recorded, "Watch channel closed");
                        break;
                    }
                }
            }
        }
    }
    Ok(recorded)
}
