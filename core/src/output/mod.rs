pub mod ntuple;
pub mod sink;

pub use ntuple::{NtupleRecord, COLUMNS, NTUPLE_NAME, NTUPLE_TITLE};
pub use sink::{output_path, CsvSink, MemorySink, OutputError, OutputSink};
