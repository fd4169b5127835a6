//! Streaming JSON array output
//!
//! Records are written as they arrive, one object per line, inside a single
//! top-level array:
//!
//! ```text
//! [
//!   {"url":"https://www.example.org/","assets":["https://www.example.org/style.css"]},
//!   {"url":"https://www.example.org/about","assets":[]}
//! ]
//! ```

use crate::output::traits::{CrawlRecord, OutputError, OutputResult, ResultSink};
use std::io::Write;

/// Where the sink is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// `setup` has not run
    Idle,
    /// The opening bracket is written; `written` records follow it
    Open { written: usize },
    /// Closed, or `setup` failed; nothing more may be written
    Closed,
}

/// A [`ResultSink`] that streams a JSON array to any writer
pub struct JsonStreamSink<W: Write + Send> {
    writer: W,
    phase: Phase,
}

impl<W: Write + Send> JsonStreamSink<W> {
    /// Creates a sink over `writer`; nothing is written until `setup`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            phase: Phase::Idle,
        }
    }

    /// Returns the number of records written so far
    pub fn records_written(&self) -> usize {
        match self.phase {
            Phase::Open { written } => written,
            _ => 0,
        }
    }

    /// Consumes the sink and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for JsonStreamSink<W> {
    fn setup(&mut self) -> OutputResult<()> {
        if self.phase != Phase::Idle {
            return Err(OutputError::Lifecycle("setup called twice"));
        }

        // A failed setup leaves no usable stream; teardown must not close it
        self.phase = Phase::Closed;
        self.writer.write_all(b"[")?;
        self.writer.flush()?;
        self.phase = Phase::Open { written: 0 };
        Ok(())
    }

    fn output(&mut self, record: &CrawlRecord) -> OutputResult<()> {
        let Phase::Open { written } = self.phase else {
            return Err(OutputError::Lifecycle("output outside setup/teardown"));
        };

        let separator: &[u8] = if written == 0 { b"\n  " } else { b",\n  " };
        let mut buffer = separator.to_vec();
        serde_json::to_writer(&mut buffer, record)?;

        // One write per record so a record is never split by a failure midway
        self.writer.write_all(&buffer)?;
        self.writer.flush()?;

        self.phase = Phase::Open {
            written: written + 1,
        };
        Ok(())
    }

    fn teardown(&mut self) -> OutputResult<()> {
        let Phase::Open { written } = self.phase else {
            return Ok(());
        };

        self.phase = Phase::Closed;
        let closing: &[u8] = if written == 0 { b"]\n" } else { b"\n]\n" };
        self.writer.write_all(closing)?;
        self.writer.flush()?;
        Ok(())
    }
}
