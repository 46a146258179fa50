//! Operator-facing report sink injected into every pipeline stage.
//!
//! The original tool streamed per-row commentary ("SKIPPING malformed
//! block…", "Matched 12 candidates") to a log pane through a thread-safe
//! queue. The library reduces that to a single capability: a stage can
//! `report` a line of text and does not care where it goes. The concrete
//! transport — a channel to a UI thread, stderr, a test buffer — is an
//! adapter supplied by the host.
//!
//! Diagnostic logging for developers goes through `tracing` instead; the
//! sink carries only messages an operator acts on.

use std::sync::Mutex;

/// Receives operator-facing progress and skip messages from the pipeline.
///
/// Implementations must be `Send + Sync`; the host may run the pipeline off
/// its interactive thread and forward messages back to it.
pub trait ReportSink: Send + Sync {
    /// Deliver one line of operator-facing text.
    fn report(&self, message: &str);
}

/// Discards all messages. The default for library callers that only want
/// the returned values.
pub struct NoopReportSink;

impl ReportSink for NoopReportSink {
    fn report(&self, _message: &str) {}
}

/// Collects messages in memory. Used by tests to assert on skip behaviour;
/// also handy for hosts that show a post-run log.
#[derive(Default)]
pub struct BufferedReportSink {
    lines: Mutex<Vec<String>>,
}

impl BufferedReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().expect("report sink poisoned"))
    }
}

impl ReportSink for BufferedReportSink {
    fn report(&self, message: &str) {
        self.lines
            .lock()
            .expect("report sink poisoned")
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_sink_collects_in_order() {
        let sink = BufferedReportSink::new();
        sink.report("first");
        sink.report("second");
        assert_eq!(sink.take(), vec!["first", "second"]);
        assert!(sink.take().is_empty(), "take() drains the buffer");
    }

    #[test]
    fn sink_is_object_safe() {
        let sink: Box<dyn ReportSink> = Box::new(NoopReportSink);
        sink.report("ignored");
    }
}
