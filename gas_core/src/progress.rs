use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

/// Receives human-readable status messages while a calculation runs
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Deliver `message` to the sink, if any. A panicking sink is logged and ignored.
pub fn emit_progress(sink: Option<&dyn ProgressSink>, message: &str) {
    debug!("Progress: {}", message);

    let Some(sink) = sink else {
        return;
    };

    if panic::catch_unwind(AssertUnwindSafe(|| sink.report(message))).is_err() {
        warn!("Progress sink panicked while reporting '{}'", message);
    }
}
