//! Per-sensor session file.
//!
//! A [`SessionWriter`] owns one CSV destination. Data routes call [`SessionWriter::write`]
//! from their delivery context while the session orchestrator owns the lifecycle
//! (`open`/`close`). The destination lives behind the writer's own lock so a late
//! sample racing with `close` is either fully written before the close or dropped.

use csv::{Writer, WriterBuilder};
use parking_lot::Mutex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use common::constants::CSV_HEADER;
use common::types::{Sample, SensorKind};

use crate::models::StreamerError;

pub struct SessionWriter {
    kind: SensorKind,
    path: PathBuf,
    destination: Mutex<Option<Writer<File>>>,
    count: AtomicU64,
}

impl SessionWriter {
    /// Creates `path`, writes the header row and keeps the file open for appending.
    pub fn open(kind: SensorKind, path: impl AsRef<Path>) -> Result<Self, StreamerError> {
        let path = path.as_ref().to_path_buf();
        let mut destination = WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| csv_error(&path, e))?;
        destination
            .write_record(CSV_HEADER)
            .map_err(|e| csv_error(&path, e))?;
        destination.flush()?;

        log::debug!("Opened {} writer at {}", kind, path.display());
        Ok(Self {
            kind,
            path,
            destination: Mutex::new(Some(destination)),
            count: AtomicU64::new(0),
        })
    }

    /// Appends one `<millis>,<x>,<y>,<z>` row, flushes it to the file and bumps the
    /// counter, so the count never includes a row still sitting in a buffer.
    /// Returns false without touching the file once the writer is closed, or if the
    /// row could not be written.
    pub fn write(&self, sample: &Sample) -> bool {
        let mut destination = self.destination.lock();
        let Some(writer) = destination.as_mut() else {
            return false;
        };
        let [x, y, z] = sample.measurement().inner();
        let record = [
            sample.timestamp_millis().to_string(),
            x.to_string(),
            y.to_string(),
            z.to_string(),
        ];
        let written = writer
            .write_record(&record)
            .and_then(|()| writer.flush().map_err(csv::Error::from));
        match written {
            Ok(()) => {
                self.count.fetch_add(1, Ordering::Release);
                true
            }
            Err(e) => {
                log::error!("Error writing {} sample: {}", self.kind, e);
                false
            }
        }
    }

    /// Flushes and releases the file. Only the first call does any work.
    pub fn close(&self) -> Result<(), StreamerError> {
        let Some(mut writer) = self.destination.lock().take() else {
            return Ok(());
        };
        writer.flush()?;
        log::debug!(
            "Closed {} writer after {} samples",
            self.kind,
            self.sample_count()
        );
        Ok(())
    }

    pub fn sample_count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.destination.lock().is_none()
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Error closing {} writer: {}", self.kind, e);
        }
    }
}

fn csv_error(path: &Path, e: csv::Error) -> StreamerError {
    StreamerError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", path.display(), e),
    ))
}
