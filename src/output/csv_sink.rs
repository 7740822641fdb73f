//! CSV export of broken-link records

use crate::output::traits::{BrokenLinkRecord, OutputResult, ResultSink};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Builds the report path: `<dir>/broken_links_<YYYY-MM-DD>_<name>.csv`
///
/// The date is the local date the run started.
pub fn report_path(directory: &Path, csv_name: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    directory.join(format!("broken_links_{}_{}.csv", date, csv_name))
}

/// Writes one CSV row per broken link
///
/// The header row is written up front so that a clean run still leaves a
/// well-formed, empty report. Each row is flushed as soon as it is written.
pub struct CsvSink<W: Write + Send = File> {
    writer: Mutex<csv::Writer<W>>,
}

impl CsvSink<File> {
    /// Creates the report file, and its parent directory if needed
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        tracing::info!("Writing broken links to {}", path.display());
        Self::from_writer(file)
    }
}

impl<W: Write + Send> CsvSink<W> {
    /// Wraps any writer and emits the header row
    pub fn from_writer(inner: W) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record([
            "url",
            "previous_page",
            "previous_link_href",
            "previous_link_text",
            "status",
        ])?;
        writer.flush()?;

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        let writer = self
            .writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        writer
            .into_inner()
            .map_err(|e| crate::output::OutputError::Write(e.to_string()))
    }
}

impl<W: Write + Send> ResultSink for CsvSink<W> {
    fn record(&self, record: &BrokenLinkRecord) -> OutputResult<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    fn finish(&self) -> OutputResult<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()?;
        Ok(())
    }
}
