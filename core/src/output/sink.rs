use log::info;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::event::OutputRow;
use crate::output::ntuple::{NtupleRecord, COLUMNS, NTUPLE_NAME, NTUPLE_TITLE};

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("output i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv writer: {0}")]
    Csv(#[from] csv::Error),
    #[error("output sink is not open")]
    NotOpen,
    #[error("output sink is already open")]
    AlreadyOpen,
}

/// Append-only table of reconstructed events.
///
/// Each worker owns its own sink; rows are never revisited once appended.
pub trait OutputSink {
    fn open(&mut self) -> Result<(), OutputError>;
    fn append(&mut self, row: &OutputRow) -> Result<(), OutputError>;
    /// Flushes and releases the resource. Closing a closed sink is a no-op.
    fn close(&mut self) -> Result<(), OutputError>;
    fn rows_written(&self) -> u64;
}

/// File name for a run's table.
///
/// A base ending in `.csv` is used as given; otherwise the ntuple name is
/// appended (`beamscan_output` -> `beamscan_output_nt_beamscan.csv`). Worker
/// tables get a `_t<n>` suffix before the extension.
pub fn output_path(base: &str, worker: Option<usize>) -> PathBuf {
    let stem = match base.strip_suffix(".csv") {
        Some(stem) => stem.to_string(),
        None => format!("{}_nt_{}", base, NTUPLE_NAME),
    };
    match worker {
        Some(n) => PathBuf::from(format!("{}_t{}.csv", stem, n)),
        None => PathBuf::from(format!("{}.csv", stem)),
    }
}

pub struct CsvSink {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows: u64,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
            rows: 0,
        }
    }

    pub fn for_run(base: &str, worker: Option<usize>) -> Self {
        Self::new(output_path(base, worker))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for CsvSink {
    fn open(&mut self) -> Result<(), OutputError> {
        if self.writer.is_some() {
            return Err(OutputError::AlreadyOpen);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        self.writer = Some(writer);
        self.rows = 0;
        info!("opened {} ({}) at {}", NTUPLE_NAME, NTUPLE_TITLE, self.path.display());
        Ok(())
    }

    fn append(&mut self, row: &OutputRow) -> Result<(), OutputError> {
        let writer = self.writer.as_mut().ok_or(OutputError::NotOpen)?;
        writer.serialize(NtupleRecord::from(row))?;
        self.rows += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            info!(
                "closed output table {} ({} rows)",
                self.path.display(),
                self.rows
            );
        }
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }
}

/// In-memory sink for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<NtupleRecord>,
    open: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NtupleRecord] {
        &self.rows
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl OutputSink for MemorySink {
    fn open(&mut self) -> Result<(), OutputError> {
        if self.open {
            return Err(OutputError::AlreadyOpen);
        }
        self.open = true;
        self.rows.clear();
        Ok(())
    }

    fn append(&mut self, row: &OutputRow) -> Result<(), OutputError> {
        if !self.open {
            return Err(OutputError::NotOpen);
        }
        self.rows.push(NtupleRecord::from(row));
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        self.open = false;
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows.len() as u64
    }
}
