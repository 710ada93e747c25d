//! Event sinks: in-memory recording and a CSV event log.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use csv::Writer;
use loco_core::{EventSink, LocoId, ProtocolEvent};
use parking_lot::Mutex;

use crate::{OutputError, OutputResult};

// ── RecordingSink ─────────────────────────────────────────────────────────────

/// Keeps every event in arrival order.  Mostly useful in tests.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProtocolEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far.
    pub fn events(&self) -> Vec<ProtocolEvent> {
        self.events.lock().clone()
    }

    /// Events concerning `loco`, in order.
    pub fn events_of(&self, loco: LocoId) -> Vec<ProtocolEvent> {
        self.events.lock().iter().filter(|e| e.loco() == loco).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &ProtocolEvent) {
        self.events.lock().push(event.clone());
    }
}

// ── CsvEventLog ───────────────────────────────────────────────────────────────

/// File name written inside the output directory.
pub const EVENTS_FILE: &str = "events.csv";

struct CsvState {
    writer:     Writer<File>,
    seq:        u64,
    finished:   bool,
    last_error: Option<OutputError>,
}

/// Writes one CSV row per protocol event to `<dir>/events.csv`.
///
/// Columns: `seq, elapsed_ms, loco, event, block, detail`.  `block` and
/// `detail` are empty when the event has none.
///
/// `record` cannot return an error, so the first write error is kept and
/// later writes are skipped; check [`take_error`](Self::take_error) or the
/// result of [`finish`](Self::finish) after the run.
pub struct CsvEventLog {
    started: Instant,
    state:   Mutex<CsvState>,
}

impl CsvEventLog {
    /// Create (or truncate) `events.csv` in `dir` and write the header row.
    pub fn create(dir: &Path) -> OutputResult<Self> {
        let mut writer = Writer::from_path(dir.join(EVENTS_FILE))?;
        writer.write_record(["seq", "elapsed_ms", "loco", "event", "block", "detail"])?;
        Ok(Self {
            started: Instant::now(),
            state:   Mutex::new(CsvState { writer, seq: 0, finished: false, last_error: None }),
        })
    }

    /// Flush the file.  Returns the stored write error, if any.  Idempotent.
    pub fn finish(&self) -> OutputResult<()> {
        let mut state = self.state.lock();
        if let Some(e) = state.last_error.take() {
            return Err(e);
        }
        if state.finished {
            return Ok(());
        }
        state.finished = true;
        state.writer.flush()?;
        Ok(())
    }

    /// Take the stored write error, if any.
    pub fn take_error(&self) -> Option<OutputError> {
        self.state.lock().last_error.take()
    }
}

impl EventSink for CsvEventLog {
    fn record(&self, event: &ProtocolEvent) {
        let elapsed_ms = self.started.elapsed().as_millis();
        let mut state = self.state.lock();
        if state.finished || state.last_error.is_some() {
            return;
        }
        state.seq += 1;
        let row = [
            state.seq.to_string(),
            elapsed_ms.to_string(),
            event.loco().get().to_string(),
            event.kind().to_owned(),
            event.block().map(|b| b.get().to_string()).unwrap_or_default(),
            event.detail(),
        ];
        let written = state.writer.write_record(&row);
        if let Err(e) = written {
            state.last_error = Some(e.into());
        }
    }
}
