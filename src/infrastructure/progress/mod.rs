//! Bounded, drop-oldest progress event channel.
//!
//! Progress events for an extraction session are delivered in emission
//! order to whatever sink is watching (an SSE stream, a log sink, a
//! test probe). A plain `tokio::sync::mpsc` channel drops the *newest*
//! message when full, which is backwards for a live progress UI: it's
//! better to lose an early "loading" tick than the final "complete".
//! This wraps an `mpsc` channel with an explicit drop-oldest policy,
//! implemented by giving the sender a handle to the same receiver (behind
//! a mutex) so that on a full channel it can race a non-blocking drain
//! of one stale entry before retrying the send.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::domain::value_objects::extraction_stage::ExtractionStage;

/// Channel capacity per extraction session.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// One observable tick of extraction progress.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub session_id: Uuid,
    pub stage: ExtractionStage,
    pub progress_percent: u8,
    pub message: String,
    pub emitted_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn for_stage(session_id: Uuid, stage: ExtractionStage) -> Self {
        Self {
            session_id,
            progress_percent: stage.progress_percent(),
            message: stage.phase_name().to_string(),
            stage,
            emitted_at: Utc::now(),
        }
    }
}

/// Producer half. Cheap to clone; every clone shares the same
/// drop-oldest eviction path.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
    rx: Arc<Mutex<mpsc::Receiver<ProgressEvent>>>,
}

impl ProgressSender {
    /// Sends an event, never blocking the caller. If the channel is
    /// full, evicts the single oldest buffered event first so the
    /// latest progress is never lost to backpressure.
    pub async fn send(&self, event: ProgressEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                if let Ok(mut rx) = self.rx.try_lock() {
                    let _ = rx.try_recv();
                }
                // If another producer raced us to the drained slot, or
                // the receiver wasn't free to drain, silently drop this
                // event rather than block: a missed tick is not fatal.
                let _ = self.tx.try_send(event);
            }
        }
    }
}

/// Consumer half. Not clonable: one reader drains the channel.
pub struct ProgressReceiver {
    rx: Arc<Mutex<mpsc::Receiver<ProgressEvent>>>,
}

impl ProgressReceiver {
    pub async fn recv(&self) -> Option<ProgressEvent> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

/// Creates a linked sender/receiver pair with the fixed drop-oldest capacity.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let rx = Arc::new(Mutex::new(rx));
    (ProgressSender { tx, rx: rx.clone() }, ProgressReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_are_delivered_in_emission_order() {
        let (tx, rx) = progress_channel();
        let session_id = Uuid::new_v4();
        tx.send(ProgressEvent::for_stage(session_id, ExtractionStage::Connecting)).await;
        tx.send(ProgressEvent::for_stage(session_id, ExtractionStage::LoadingVidsrc)).await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.stage, ExtractionStage::Connecting);
        assert_eq!(second.stage, ExtractionStage::LoadingVidsrc);
    }

    #[tokio::test]
    async fn full_channel_drops_oldest_not_newest() {
        let (tx, rx) = progress_channel();
        let session_id = Uuid::new_v4();

        for _ in 0..PROGRESS_CHANNEL_CAPACITY {
            tx.send(ProgressEvent::for_stage(session_id, ExtractionStage::Connecting)).await;
        }
        // one more send should evict the oldest buffered Connecting event
        // and make room for a distinguishable final event
        tx.send(ProgressEvent::for_stage(session_id, ExtractionStage::Complete)).await;

        let mut saw_complete = false;
        let mut count = 0;
        while let Ok(Some(event)) = tokio::time::timeout(std::time::Duration::from_millis(50), rx.recv()).await {
            count += 1;
            if event.stage == ExtractionStage::Complete {
                saw_complete = true;
            }
        }
        assert!(saw_complete, "the newest event must survive backpressure");
        assert!(count <= PROGRESS_CHANNEL_CAPACITY);
    }
}
