//! drs4 CLI
//!
//! Inspects, decodes and exports DRS4 evaluation-board waveform files.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Args, Parser, Subcommand, ValueEnum};

use drs4_core::{ChannelIndex, TimeBase};
use drs4_format::DecoderConfig;
use drs4_io::{Drs4FileReader, WaveformFileWriter};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Drs4Io(#[from] drs4_io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] drs4_format::Error),
}

/// Sample time reconstruction rule.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeBaseArg {
    /// Cumulative sum sampled at even positions (default)
    PairAveraged,
    /// Cumulative sum over every cell
    CellSum,
}

impl From<TimeBaseArg> for TimeBase {
    fn from(arg: TimeBaseArg) -> Self {
        match arg {
            TimeBaseArg::PairAveraged => TimeBase::PairAveraged,
            TimeBaseArg::CellSum => TimeBase::CellSum,
        }
    }
}

/// Decoder options shared by `decode` and `export`.
#[derive(Args, Debug)]
struct DecodeOptions {
    /// JSON decoder configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time base used to reconstruct sample times
    #[arg(long, value_enum)]
    time_base: Option<TimeBaseArg>,

    /// Keep each channel's own time origin instead of aligning to the board reference
    #[arg(long)]
    no_align: bool,

    /// Emit an event left open at end of file
    #[arg(long)]
    keep_trailing: bool,
}

impl DecodeOptions {
    fn to_config(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => DecoderConfig::from_file(path)?,
            None => DecoderConfig::default(),
        };
        if let Some(time_base) = self.time_base {
            config = config.with_time_base(time_base.into());
        }
        if self.no_align {
            config = config.with_align_channels(false);
        }
        if self.keep_trailing {
            config = config.with_flush_trailing_event(true);
        }
        config.validate()?;
        Ok(config)
    }
}

/// DRS4 binary waveform decoder.
#[derive(Parser)]
#[command(name = "drs4")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header information of a DRS4 file
    Info {
        /// Input DRS4 file
        input: PathBuf,
    },

    /// Decode a DRS4 file and print an event summary
    Decode {
        /// Input DRS4 file
        input: PathBuf,

        #[command(flatten)]
        options: DecodeOptions,
    },

    /// Decode a DRS4 file and write the events to disk
    Export {
        /// Input DRS4 file
        input: PathBuf,

        /// Output file path (.csv, .bin, .dat or .jsonl)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: DecodeOptions,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let reader = Drs4FileReader::open(&input)?;
            let header = reader.read_header()?;
            let file_size = reader.file_size();

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                file_size,
                file_size as f64 / 1_000_000.0
            );
            match header.format_version {
                Some(version) => println!("Format version: {}", version),
                None => println!("Format version: unmarked"),
            }
            println!("Boards: {}", header.num_boards());
            for board in header.registry.boards() {
                let serial = board
                    .serial
                    .map_or_else(|| "unknown".to_string(), |s| s.to_string());
                println!("  Board {} (serial {})", board.ordinal, serial);
                for &channel in &board.channels {
                    if let Some(table) = header.registry.table(channel) {
                        println!("    Channel {}: period {:.3} ns", channel, table.period());
                    }
                }
            }
            println!("Channels: {}", header.num_channels());
            println!("Event data starts at byte {}", header.data_offset);
        }

        Commands::Decode { input, options } => {
            let config = options.to_config()?;
            let reader = Drs4FileReader::open(&input)?.with_config(config);

            let start = Instant::now();
            let (collector, failure) = reader.decode_partial()?;
            let elapsed = start.elapsed();

            println!(
                "Decoded {} events in {:.2}s",
                collector.len(),
                elapsed.as_secs_f64()
            );
            if let (Some(first), Some(last)) = (collector.events().first(), collector.events().last())
            {
                println!("Serial range: {} - {}", first.serial, last.serial);
            }

            let mut ranges: BTreeMap<ChannelIndex, (f64, f64)> = BTreeMap::new();
            for event in collector.events() {
                for (&channel, waveform) in &event.channels {
                    if let Some((lo, hi)) = waveform.voltage_range() {
                        let entry = ranges.entry(channel).or_insert((lo, hi));
                        entry.0 = entry.0.min(lo);
                        entry.1 = entry.1.max(hi);
                    }
                }
            }
            for (channel, (lo, hi)) in &ranges {
                println!("Channel {}: voltage {:.4} V to {:.4} V", channel, lo, hi);
            }

            if let Some(err) = failure {
                warn!(events = collector.len(), "decoding stopped early");
                return Err(err.into());
            }
        }

        Commands::Export {
            input,
            output,
            options,
        } => {
            let config = options.to_config()?;
            let reader = Drs4FileReader::open(&input)?.with_config(config);
            let mut writer = WaveformFileWriter::create(&output)?;
            info!(output = %output.display(), format = ?writer.format(), "writing events");

            let start = Instant::now();
            let mut written = 0usize;
            let mut failure = None;
            for event in reader.events()? {
                match event {
                    Ok(event) => {
                        writer.write_event(&event)?;
                        written += 1;
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
            writer.flush()?;

            println!(
                "Wrote {} events to {} in {:.2}s",
                written,
                output.display(),
                start.elapsed().as_secs_f64()
            );

            if let Some(err) = failure {
                warn!(events = written, "export stopped early");
                return Err(err.into());
            }
        }
    }

    Ok(())
}
