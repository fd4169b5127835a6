//! Scoped ownership of a result sink for the duration of one run

use crate::output::traits::{CrawlRecord, OutputError, OutputResult, ResultSink};
use std::sync::{Arc, Mutex};

/// Cloneable handle through which workers emit records
///
/// Every record is written while holding the sink lock, so concurrent
/// workers can never interleave two records.
#[derive(Clone)]
pub struct SinkHandle {
    sink: Arc<Mutex<Box<dyn ResultSink>>>,
}

impl SinkHandle {
    /// Writes one complete record
    pub fn emit(&self, record: &CrawlRecord) -> OutputResult<()> {
        self.with_sink(|sink| sink.output(record))
    }

    fn with_sink<T>(
        &self,
        f: impl FnOnce(&mut dyn ResultSink) -> OutputResult<T>,
    ) -> OutputResult<T> {
        // A poisoned lock means a writer panicked mid-record
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| OutputError::Write("sink lock poisoned".to_string()))?;
        f(&mut **sink)
    }
}

/// An open sink whose teardown is guaranteed
///
/// [`SinkSession::open`] runs `setup`; [`SinkSession::close`] runs `teardown`
/// and reports its result. If the session is dropped without being closed
/// (an early return, a failed setup, a panic unwinding through the engine),
/// `teardown` still runs and any failure is logged.
pub struct SinkSession {
    handle: SinkHandle,
    closed: bool,
}

impl SinkSession {
    /// Takes ownership of `sink` and runs its setup
    pub fn open(sink: Box<dyn ResultSink>) -> OutputResult<Self> {
        let session = Self {
            handle: SinkHandle {
                sink: Arc::new(Mutex::new(sink)),
            },
            closed: false,
        };

        // On failure the session drops here, and Drop tears the sink down
        session.handle.with_sink(|sink| sink.setup())?;
        Ok(session)
    }

    /// Returns a handle for emitting records
    pub fn handle(&self) -> SinkHandle {
        self.handle.clone()
    }

    /// Runs teardown and reports its result
    pub fn close(mut self) -> OutputResult<()> {
        self.closed = true;
        self.handle.with_sink(|sink| sink.teardown())
    }
}

impl Drop for SinkSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.handle.with_sink(|sink| sink.teardown()) {
            tracing::error!("Error with output teardown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records lifecycle calls into a shared log
    struct EventSink {
        events: Arc<Mutex<Vec<String>>>,
        fail_setup: bool,
    }

    impl ResultSink for EventSink {
        fn setup(&mut self) -> OutputResult<()> {
            self.events.lock().unwrap().push("setup".to_string());
            if self.fail_setup {
                return Err(OutputError::Write("setup failed".to_string()));
            }
            Ok(())
        }

        fn output(&mut self, record: &CrawlRecord) -> OutputResult<()> {
            self.events.lock().unwrap().push(record.url.clone());
            Ok(())
        }

        fn teardown(&mut self) -> OutputResult<()> {
            self.events.lock().unwrap().push("teardown".to_string());
            Ok(())
        }
    }

    fn event_sink(fail_setup: bool) -> (Box<dyn ResultSink>, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = EventSink {
            events: events.clone(),
            fail_setup,
        };
        (Box::new(sink), events)
    }

    #[test]
    fn test_open_emit_close() {
        let (sink, events) = event_sink(false);

        let session = SinkSession::open(sink).unwrap();
        session
            .handle()
            .emit(&CrawlRecord::new("https://www.example.org/", vec![]))
            .unwrap();
        session.close().unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["setup", "https://www.example.org/", "teardown"]
        );
    }

    #[test]
    fn test_drop_runs_teardown() {
        let (sink, events) = event_sink(false);

        {
            let _session = SinkSession::open(sink).unwrap();
        }

        assert_eq!(*events.lock().unwrap(), vec!["setup", "teardown"]);
    }

    #[test]
    fn test_failed_setup_still_tears_down() {
        let (sink, events) = event_sink(true);

        assert!(SinkSession::open(sink).is_err());
        assert_eq!(*events.lock().unwrap(), vec!["setup", "teardown"]);
    }

    #[test]
    fn test_close_runs_teardown_once() {
        let (sink, events) = event_sink(false);

        let session = SinkSession::open(sink).unwrap();
        session.close().unwrap();

        let teardowns = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == "teardown")
            .count();
        assert_eq!(teardowns, 1);
    }
}
