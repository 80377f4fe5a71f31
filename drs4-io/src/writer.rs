//! File writers for decoded events.

use crate::Result;
use drs4_core::Event;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Output encoding for decoded events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One line per sample: `event,channel,cell,time_ns,voltage`.
    Csv,
    /// Little-endian binary blocks, one per channel and event.
    Binary,
    /// One JSON object per event and line.
    JsonLines,
}

impl ExportFormat {
    /// Picks the format from a file extension. Unknown or missing
    /// extensions fall back to binary.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("jsonl" | "json") => Self::JsonLines,
            Some("bin" | "dat") => Self::Binary,
            other => {
                warn!(
                    extension = other.unwrap_or(""),
                    "unknown output extension, defaulting to binary"
                );
                Self::Binary
            }
        }
    }
}

/// Writer for decoded DRS4 events.
pub struct WaveformFileWriter {
    writer: BufWriter<File>,
    format: ExportFormat,
    wrote_header: bool,
}

impl WaveformFileWriter {
    /// Creates a writer, choosing the format from the path's extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = ExportFormat::from_path(&path);
        Self::create_with_format(path, format)
    }

    /// Creates a writer with an explicit format.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create_with_format<P: AsRef<Path>>(path: P, format: ExportFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            format,
            wrote_header: false,
        })
    }

    /// Output format of this writer.
    #[must_use]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Writes one event in the writer's format.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        match self.format {
            ExportFormat::Csv => self.write_event_csv(event),
            ExportFormat::Binary => self.write_event_binary(event),
            ExportFormat::JsonLines => self.write_event_json(event),
        }
    }

    /// Writes an event as CSV rows, preceded by a header row on first use.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_event_csv(&mut self, event: &Event) -> Result<()> {
        if !self.wrote_header {
            writeln!(self.writer, "event,channel,cell,time_ns,voltage")?;
            self.wrote_header = true;
        }
        for (channel, waveform) in &event.channels {
            for (cell, (time, voltage)) in waveform.iter().enumerate() {
                writeln!(
                    self.writer,
                    "{},{},{},{},{}",
                    event.serial, channel, cell, time, voltage
                )?;
            }
        }
        Ok(())
    }

    /// Writes an event as binary blocks.
    ///
    /// Format: for each channel, u32 (event serial) + u32 (channel index) +
    /// u32 (sample count), then per sample f64 (time) + f64 (voltage).
    ///
    /// # Errors
    /// Returns an error if writing fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_event_binary(&mut self, event: &Event) -> Result<()> {
        for (channel, waveform) in &event.channels {
            self.writer.write_all(&event.serial.to_le_bytes())?;
            self.writer
                .write_all(&(channel.as_usize() as u32).to_le_bytes())?;
            self.writer
                .write_all(&(waveform.len() as u32).to_le_bytes())?;
            for (time, voltage) in waveform.iter() {
                self.writer.write_all(&time.to_le_bytes())?;
                self.writer.write_all(&voltage.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Writes an event as a single JSON line.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_event_json(&mut self, event: &Event) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
