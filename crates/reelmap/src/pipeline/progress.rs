use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use super::status::SourceStatus;

/// Pipeline steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Fetch,
    Extract,
    Geocode,
    Persist,
}

/// Events emitted while a source is processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Step {
        source_id: i64,
        step: PipelineStep,
    },
    /// Sent for every persisted status change.
    Status {
        source_id: i64,
        status: SourceStatus,
        place_id: Option<i64>,
        error: Option<String>,
    },
}

impl ProgressEvent {
    pub fn source_id(&self) -> i64 {
        match self {
            ProgressEvent::Step { source_id, .. } | ProgressEvent::Status { source_id, .. } => {
                *source_id
            }
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for the CLI and unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to a broadcast channel for live observers.
///
/// Sending with no subscribers is not an error; events are simply dropped.
#[derive(Clone)]
pub struct BroadcastProgress {
    sender: Arc<broadcast::Sender<ProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(sender: Arc<broadcast::Sender<ProgressEvent>>) -> Self {
        Self { sender }
    }

    /// Creates a channel with room for `capacity` unread events per
    /// subscriber.
    pub fn channel(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self::new(Arc::new(sender))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_delivers_to_subscribers() {
        let progress = BroadcastProgress::channel(8);
        let mut rx = progress.subscribe();

        progress.report(ProgressEvent::Step {
            source_id: 7,
            step: PipelineStep::Fetch,
        });
        progress.report(ProgressEvent::Status {
            source_id: 7,
            status: SourceStatus::Processed,
            place_id: Some(1),
            error: None,
        });

        let first = rx.try_recv().unwrap();
        assert_eq!(first.source_id(), 7);
        assert!(matches!(first, ProgressEvent::Step { step: PipelineStep::Fetch, .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::Status { status: SourceStatus::Processed, .. }
        ));
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let progress = BroadcastProgress::channel(1);
        progress.report(ProgressEvent::Step {
            source_id: 1,
            step: PipelineStep::Geocode,
        });
    }

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::Status {
            source_id: 3,
            status: SourceStatus::GeocodeFailed,
            place_id: None,
            error: Some("no results".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["status"], "geocode_failed");
        assert_eq!(json["error"], "no results");
    }
}
