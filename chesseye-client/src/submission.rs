//! Correction submission state machine
//!
//! `Idle` → `Success` when the gateway accepts a correction, then
//! `Success` → `Redirect` after [`SUCCESS_MESSAGE_DURATION`] so the shell
//! can swap the confirmation for the editor export button.
//!
//! The delayed transition runs on a spawned task owned by the flow. At most
//! one such task is alive at a time; scheduling a new one aborts the old
//! one, and [`SubmissionFlow::dispose`] (also run on drop) aborts it
//! synchronously. Each task carries the generation it was scheduled under
//! and does nothing if that generation is no longer current, so a task
//! that already woke up before being aborted still cannot touch state.

use chesseye_common::api::CorrectionRequest;
use chesseye_common::config::TomlConfig;
use chesseye_common::events::{ChessEyeEvent, EventBus, SubmissionState};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::editor_export::{self, EditorError, UrlOpener, DEFAULT_EDITOR_BASE_URL};
use crate::services::gateway::PredictionGateway;

/// How long the success confirmation shows before `Redirect`
pub const SUCCESS_MESSAGE_DURATION: Duration = Duration::from_millis(1500);

/// Result of a [`SubmissionFlow::submit`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to submit, or the flow was disposed
    Skipped,
    Submitted,
    /// Gateway rejected the correction; state is back to `Idle`
    Failed,
}

#[derive(Debug, Default)]
struct FlowState {
    state: SubmissionState,
    timer: Option<JoinHandle<()>>,
    generation: u64,
    /// Bumped by `reset`; a submit that started under an older epoch was
    /// for a prediction that is gone
    epoch: u64,
    disposed: bool,
}

impl FlowState {
    /// Abort the pending redirect, if any, and invalidate its generation
    fn cancel_timer(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Set the state, returning the transition if it changed
    fn transition(&mut self, new_state: SubmissionState) -> Option<ChessEyeEvent> {
        let old_state = self.state;
        if old_state == new_state {
            return None;
        }
        self.state = new_state;
        Some(ChessEyeEvent::SubmissionStateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        })
    }
}

fn lock_state(inner: &Mutex<FlowState>) -> MutexGuard<'_, FlowState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Correction submission lifecycle for one prediction screen
///
/// Must be used from within a tokio runtime; the delayed transition is
/// spawned on the current runtime.
#[derive(Debug)]
pub struct SubmissionFlow {
    inner: Arc<Mutex<FlowState>>,
    events: EventBus,
    success_message_duration: Duration,
    editor_base_url: String,
}

impl SubmissionFlow {
    pub fn new(events: EventBus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FlowState::default())),
            events,
            success_message_duration: SUCCESS_MESSAGE_DURATION,
            editor_base_url: DEFAULT_EDITOR_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &TomlConfig, events: EventBus) -> Self {
        Self::new(events)
            .with_success_message_duration(config.success_message_duration())
            .with_editor_base_url(&config.editor_base_url)
    }

    pub fn with_success_message_duration(mut self, duration: Duration) -> Self {
        self.success_message_duration = duration;
        self
    }

    pub fn with_editor_base_url(mut self, base_url: &str) -> Self {
        self.editor_base_url = base_url.to_string();
        self
    }

    pub fn state(&self) -> SubmissionState {
        lock_state(&self.inner).state
    }

    /// True while a `Success` → `Redirect` transition is scheduled
    pub fn has_pending_timer(&self) -> bool {
        lock_state(&self.inner)
            .timer
            .as_ref()
            .map_or(false, |timer| !timer.is_finished())
    }

    pub fn is_disposed(&self) -> bool {
        lock_state(&self.inner).disposed
    }

    pub fn success_message_duration(&self) -> Duration {
        self.success_message_duration
    }

    /// Receive state transitions and correction failures
    pub fn subscribe(&self) -> broadcast::Receiver<ChessEyeEvent> {
        self.events.subscribe()
    }

    /// Submit a correction for a prediction
    ///
    /// Skipped without calling the gateway when either input is missing
    /// (an empty FEN counts as missing). Gateway failures are logged,
    /// reported on the event bus and leave the flow `Idle`; they are never
    /// returned to the caller.
    pub async fn submit<G>(
        &self,
        gateway: &G,
        prediction_id: Option<i64>,
        corrected_fen: Option<&str>,
    ) -> SubmitOutcome
    where
        G: PredictionGateway + ?Sized,
    {
        let (prediction_id, corrected_fen) = match (prediction_id, corrected_fen) {
            (Some(id), Some(fen)) if !fen.is_empty() => (id, fen),
            _ => {
                debug!("Nothing to submit");
                return SubmitOutcome::Skipped;
            }
        };
        if self.is_disposed() {
            debug!(prediction_id, "Submission flow disposed, ignoring submit");
            return SubmitOutcome::Skipped;
        }
        let epoch = lock_state(&self.inner).epoch;

        let request = CorrectionRequest {
            prediction_id,
            corrected_fen: corrected_fen.to_string(),
        };
        let result = gateway.submit_correction(&request).await;

        let mut state = lock_state(&self.inner);
        if state.disposed {
            debug!(prediction_id, "Submission flow disposed during request");
            return match result {
                Ok(_) => SubmitOutcome::Submitted,
                Err(_) => SubmitOutcome::Failed,
            };
        }
        if state.epoch != epoch {
            debug!(prediction_id, "Flow reset during request, ignoring response");
            return match result {
                Ok(_) => SubmitOutcome::Submitted,
                Err(_) => SubmitOutcome::Failed,
            };
        }

        match result {
            Ok(_) => {
                state.cancel_timer();
                let event = state.transition(SubmissionState::Success);
                state.timer = Some(self.schedule_redirect(state.generation));
                drop(state);

                info!(prediction_id, "Correction submitted");
                if let Some(event) = event {
                    self.events.emit_lossy(event);
                }
                SubmitOutcome::Submitted
            }
            Err(e) => {
                state.cancel_timer();
                let event = state.transition(SubmissionState::Idle);
                drop(state);

                warn!(prediction_id, error = %e, "Failed to submit correction");
                if let Some(event) = event {
                    self.events.emit_lossy(event);
                }
                self.events.emit_lossy(ChessEyeEvent::CorrectionFailed {
                    prediction_id,
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                SubmitOutcome::Failed
            }
        }
    }

    /// Open the external editor for the corrected position
    ///
    /// Does nothing when there is no corrected FEN. Opener failures are
    /// returned.
    pub async fn open_external_editor<O>(
        &self,
        opener: &O,
        corrected_fen: Option<&str>,
    ) -> Result<(), EditorError>
    where
        O: UrlOpener + ?Sized,
    {
        let fen = match corrected_fen {
            Some(fen) if !fen.is_empty() => fen,
            _ => return Ok(()),
        };
        editor_export::open_editor(opener, &self.editor_base_url, fen).await?;
        Ok(())
    }

    /// Back to `Idle`, dropping any scheduled redirect
    ///
    /// Used when the prediction this flow was submitting for is replaced.
    /// Responses to submits still in flight are ignored.
    pub fn reset(&self) {
        let mut state = lock_state(&self.inner);
        state.cancel_timer();
        state.epoch = state.epoch.wrapping_add(1);
        let event = state.transition(SubmissionState::Idle);
        drop(state);

        if let Some(event) = event {
            self.events.emit_lossy(event);
        }
    }

    /// Cancel any scheduled transition and stop accepting submissions
    ///
    /// Idempotent. The state is left as it was.
    pub fn dispose(&self) {
        let mut state = lock_state(&self.inner);
        if state.disposed {
            return;
        }
        state.cancel_timer();
        state.disposed = true;
        debug!("Submission flow disposed");
    }

    fn schedule_redirect(&self, generation: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        // Deadline fixed now, not when the task is first polled
        let deadline = tokio::time::Instant::now() + self.success_message_duration;

        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let mut state = lock_state(&inner);
            if state.disposed || state.generation != generation {
                return;
            }
            // Our own handle; the task is finishing anyway
            state.timer = None;
            let event = state.transition(SubmissionState::Redirect);
            drop(state);

            if let Some(event) = event {
                events.emit_lossy(event);
            }
        })
    }
}

impl Drop for SubmissionFlow {
    fn drop(&mut self) {
        self.dispose();
    }
}
