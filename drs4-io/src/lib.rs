//! drs4-io: Memory-mapped file I/O for DRS4 data.
//!
//! This crate opens DRS4 files through memmap2, feeds them to the
//! decoder and writes decoded events out as CSV, binary or JSON lines.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{Drs4FileReader, MappedFileReader};
pub use writer::{ExportFormat, WaveformFileWriter};
