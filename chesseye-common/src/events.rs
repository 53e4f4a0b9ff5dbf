//! Event types for the ChessEye event system
//!
//! State machines and coordinators report their transitions on an
//! [`EventBus`]; the UI shell (or the CLI) subscribes to render them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Correction submission lifecycle
///
/// `Idle` → `Success` (correction accepted) → `Redirect` (editor export
/// offered). Both later states return to `Idle` only on error or when the
/// prediction is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Success,
    Redirect,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Success => write!(f, "success"),
            SubmissionState::Redirect => write!(f, "redirect"),
        }
    }
}

/// ChessEye event types
///
/// Serialized with a `type` tag so they can be forwarded to a stream as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChessEyeEvent {
    /// Submission state machine moved between states
    SubmissionStateChanged {
        old_state: SubmissionState,
        new_state: SubmissionState,
        timestamp: DateTime<Utc>,
    },

    /// Correction submission was rejected by the gateway
    CorrectionFailed {
        prediction_id: i64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Active prediction replaced by a fresh one
    PredictionReplaced {
        prediction_id: Option<i64>,
        timestamp: DateTime<Utc>,
    },

    /// Re-prediction after a service switch failed; prior state kept
    RepredictionFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Inference backend changed
    ServiceSwitched {
        previous_service: String,
        new_service: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChessEyeEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            ChessEyeEvent::SubmissionStateChanged { .. } => "SubmissionStateChanged",
            ChessEyeEvent::CorrectionFailed { .. } => "CorrectionFailed",
            ChessEyeEvent::PredictionReplaced { .. } => "PredictionReplaced",
            ChessEyeEvent::RepredictionFailed { .. } => "RepredictionFailed",
            ChessEyeEvent::ServiceSwitched { .. } => "ServiceSwitched",
        }
    }
}

/// Broadcast bus for [`ChessEyeEvent`]s
///
/// Cloning the bus shares the underlying channel.
///
/// # Examples
///
/// ```
/// use chesseye_common::events::{ChessEyeEvent, EventBus, SubmissionState};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(ChessEyeEvent::SubmissionStateChanged {
///     old_state: SubmissionState::Idle,
///     new_state: SubmissionState::Success,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(rx.try_recv().unwrap().event_type(), "SubmissionStateChanged");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChessEyeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChessEyeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ChessEyeEvent,
    ) -> Result<usize, broadcast::error::SendError<ChessEyeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ChessEyeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_state_display_and_serde() {
        assert_eq!(SubmissionState::Idle.to_string(), "idle");
        assert_eq!(SubmissionState::Redirect.to_string(), "redirect");
        assert_eq!(
            serde_json::to_string(&SubmissionState::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(SubmissionState::default(), SubmissionState::Idle);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ChessEyeEvent::CorrectionFailed {
            prediction_id: 42,
            message: "timeout".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.event_type());
        assert_eq!(value["prediction_id"], 42);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        let event = ChessEyeEvent::RepredictionFailed {
            message: "offline".to_string(),
            timestamp: Utc::now(),
        };
        assert!(bus.emit(event.clone()).is_err());
        bus.emit_lossy(event);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 4);
    }

    #[tokio::test]
    async fn test_clone_shares_channel() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let clone = bus.clone();

        clone.emit_lossy(ChessEyeEvent::PredictionReplaced {
            prediction_id: Some(9),
            timestamp: Utc::now(),
        });

        match rx.recv().await.unwrap() {
            ChessEyeEvent::PredictionReplaced { prediction_id, .. } => {
                assert_eq!(prediction_id, Some(9))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
