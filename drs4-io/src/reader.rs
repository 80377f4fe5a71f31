//! Memory-mapped file readers.
//!

use crate::Result;
use drs4_format::{
    decode, parse_header, ByteCursor, DecodedRun, DecoderConfig, EventStreamReader, Header,
    OutputCollector,
};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire file
/// into memory. The mapping is released when the reader is dropped.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Path the reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A DRS4 file reader with memory-mapped I/O.
pub struct Drs4FileReader {
    reader: MappedFileReader,
    config: DecoderConfig,
}

impl Drs4FileReader {
    /// Opens a DRS4 file for reading with default configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        Ok(Self {
            reader,
            config: DecoderConfig::default(),
        })
    }

    /// Sets the decoder configuration.
    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the decoder configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Parses only the file header.
    ///
    /// # Errors
    /// Returns an error if the header is malformed or truncated.
    pub fn read_header(&self) -> Result<Header> {
        let mut cursor = ByteCursor::new(self.reader.as_bytes());
        Ok(parse_header(&mut cursor, &self.config)?)
    }

    /// Decodes the whole file.
    ///
    /// # Errors
    /// Returns the first decoding error; no events are returned in that case.
    pub fn decode(&self) -> Result<DecodedRun> {
        Ok(decode(self.reader.as_bytes(), &self.config)?)
    }

    /// Decodes the file, keeping the events completed before a failure.
    ///
    /// Returns the collected events together with the error that stopped
    /// decoding, if any.
    ///
    /// # Errors
    /// Returns an error only if the header cannot be parsed.
    pub fn decode_partial(&self) -> Result<(OutputCollector, Option<drs4_format::Error>)> {
        let reader = self.events()?;
        let mut collector = OutputCollector::new();
        let failure = collector.drain_from(reader).err();
        Ok((collector, failure))
    }

    /// Returns a streaming decoder over the file's events.
    ///
    /// # Errors
    /// Returns an error if the header cannot be parsed.
    pub fn events(&self) -> Result<EventStreamReader<'_>> {
        Ok(EventStreamReader::new(
            self.reader.as_bytes(),
            self.config.clone(),
        )?)
    }
}
