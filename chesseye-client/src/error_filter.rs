//! Process-wide filter for benign board-editor panics
//!
//! Rule-engine failures raised while the user drags pieces into an illegal
//! position are expected. While the filter is active, panics matching
//! [`is_benign_editor_error`] are reported with `tracing::warn!` instead of
//! the regular panic output; every other panic goes to the previous hook.
//!
//! The hook is registered once per process and then toggled, so
//! uninstalling restores the previous behavior exactly.

use std::panic;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;
use tracing::{debug, warn};

static HOOK_REGISTERED: Once = Once::new();
static FILTER_ACTIVE: AtomicBool = AtomicBool::new(false);
static SUPPRESSED: AtomicUsize = AtomicUsize::new(0);

/// True for failures raised by the chess rules engine or the board editor
///
/// `context` is whatever locates the failure (source location, backtrace);
/// it plays the role of a stack trace.
pub fn is_benign_editor_error(message: &str, context: &str) -> bool {
    message.contains("chess.js")
        || context.contains("Chess#")
        || context.contains("chess-board-editor")
        || (message.contains("Cannot read property 'type'")
            && (context.contains("Chess") || context.contains("chess")))
}

/// Handle on the process-wide panic filter
pub struct ErrorFilterRegistration;

impl ErrorFilterRegistration {
    /// Activate the filter
    ///
    /// Returns `false` without changing anything if it is already active.
    pub fn install() -> bool {
        if FILTER_ACTIVE.swap(true, Ordering::SeqCst) {
            warn!("Error filter already installed");
            return false;
        }

        HOOK_REGISTERED.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if FILTER_ACTIVE.load(Ordering::SeqCst) {
                    let message = info
                        .payload()
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| info.payload().downcast_ref::<String>().cloned())
                        .unwrap_or_default();
                    let context = info
                        .location()
                        .map(|l| l.to_string())
                        .unwrap_or_default();

                    if is_benign_editor_error(&message, &context) {
                        SUPPRESSED.fetch_add(1, Ordering::SeqCst);
                        warn!(%message, location = %context, "Caught board editor error (non-fatal)");
                        return;
                    }
                }
                previous(info);
            }));
        });

        debug!("Error filter installed");
        true
    }

    /// Deactivate the filter; panics go straight to the previous hook again
    pub fn uninstall() {
        if FILTER_ACTIVE.swap(false, Ordering::SeqCst) {
            debug!("Error filter uninstalled");
        }
    }

    pub fn is_installed() -> bool {
        FILTER_ACTIVE.load(Ordering::SeqCst)
    }

    /// Panics downgraded to warnings since process start
    pub fn suppressed_count() -> usize {
        SUPPRESSED.load(Ordering::SeqCst)
    }
}
