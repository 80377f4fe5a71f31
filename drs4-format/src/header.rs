//! File header parsing.
//!
//! The header is a sequence of 4-byte tags: an optional `DRSn` version
//! marker, an optional `TIME` marker, then board (`B#`) and channel (`Cxxx`)
//! declarations. Each channel declaration is followed by its bin-width
//! table. The header ends at the first `EHDR` sentinel.

use crate::cursor::ByteCursor;
use crate::tag::HeaderTag;
use crate::{DecoderConfig, Error, FormatError, Result};
use drs4_core::{BinWidthTable, ChannelRegistry, NUM_CELLS};
use tracing::{debug, info};

/// Parsed file header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Version from a leading `DRSn` tag, if present.
    pub format_version: Option<u8>,
    /// Boards, channels and their bin-width tables.
    pub registry: ChannelRegistry,
    /// Byte offset of the first event.
    pub data_offset: usize,
}

impl Header {
    /// Number of declared channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.registry.num_channels()
    }

    /// Number of declared boards.
    #[must_use]
    pub fn num_boards(&self) -> usize {
        self.registry.num_boards()
    }
}

/// Parses the header, leaving `cursor` at the first byte of the first event.
///
/// # Errors
/// - [`Error::Format`] for a tag that is not valid in the header, a
///   misplaced `TIME` marker or a bad channel declaration.
/// - [`Error::Truncated`] if the input ends before the `EHDR` sentinel.
pub fn parse_header(cursor: &mut ByteCursor<'_>, config: &DecoderConfig) -> Result<Header> {
    config.validate()?;

    let mut registry = ChannelRegistry::new(config.channels_per_board);
    let mut format_version = None;
    let mut tags_seen = 0usize;

    loop {
        let offset = cursor.position();
        let Some(raw) = cursor.read_tag()? else {
            return Err(Error::Truncated {
                offset,
                needed: 4,
                available: 0,
            });
        };

        let tag = HeaderTag::parse(raw).ok_or(Error::Format {
            offset,
            kind: FormatError::UnrecognizedHeaderTag(raw),
        })?;

        match tag {
            HeaderTag::FormatVersion(version) if tags_seen == 0 => {
                debug!(version, "file format version");
                format_version = Some(version);
            }
            HeaderTag::FormatVersion(_) => {
                return Err(Error::Format {
                    offset,
                    kind: FormatError::UnrecognizedHeaderTag(raw),
                });
            }
            HeaderTag::TimeMarker => {
                let leading = tags_seen == 0 || (tags_seen == 1 && format_version.is_some());
                if !leading {
                    return Err(Error::Format {
                        offset,
                        kind: FormatError::MisplacedTimeMarker,
                    });
                }
            }
            HeaderTag::Board { serial } => {
                let ordinal = registry.declare_board(serial);
                debug!(ordinal, serial, "board declared");
            }
            HeaderTag::Channel { number } => {
                let widths = cursor.read_f32_block(NUM_CELLS)?;
                let table = BinWidthTable::new(widths)?;
                let index = registry
                    .declare_channel(number, table)
                    .map_err(|e| Error::from_core_at(offset, e))?;
                debug!(number, index = index.as_usize(), "channel declared");
            }
            HeaderTag::EventHeader => break,
        }
        tags_seen += 1;
    }

    info!(
        "Reading events measured with {} channels on {} board(s)",
        registry.num_channels(),
        registry.num_boards()
    );

    Ok(Header {
        format_version,
        registry,
        data_offset: cursor.position(),
    })
}
