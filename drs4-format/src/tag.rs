//! DRS4 record tags.
//!
//! Every structural element of the file starts with a 4-byte ASCII tag.

use std::fmt;

/// A raw 4-byte tag as read from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawTag(pub [u8; 4]);

impl RawTag {
    /// File-format time marker.
    pub const TIME: RawTag = RawTag(*b"TIME");
    /// Event header sentinel; ends the file header and each event.
    pub const EVENT_HEADER: RawTag = RawTag(*b"EHDR");

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }

    /// True for `B#` board tags.
    #[inline]
    #[must_use]
    pub fn is_board(&self) -> bool {
        self.0.starts_with(b"B#")
    }

    /// Serial number carried in the trailing two bytes of a board tag.
    #[inline]
    #[must_use]
    pub fn trailing_u16(&self) -> u16 {
        u16::from_le_bytes([self.0[2], self.0[3]])
    }

    /// Channel number of a `C` tag (`C001` → 1), or `None` for other tags.
    ///
    /// The tag must be `C` followed by a digit and end in an ASCII digit;
    /// the last digit is the channel number.
    #[must_use]
    pub fn channel_number(&self) -> Option<u8> {
        let [c, first, _, last] = self.0;
        (c == b'C' && first.is_ascii_digit() && last.is_ascii_digit()).then(|| last - b'0')
    }

    /// Format version of a leading `DRSn` tag, or `None` for other tags.
    #[must_use]
    pub fn format_version(&self) -> Option<u8> {
        let [d, r, s, v] = self.0;
        (d == b'D' && r == b'R' && s == b'S' && v.is_ascii_digit()).then(|| v - b'0')
    }
}

impl fmt::Display for RawTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

/// Tags valid in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTag {
    /// `DRSn` file-format version marker.
    FormatVersion(u8),
    /// `TIME` marker.
    TimeMarker,
    /// `Cxxx` channel declaration, followed by its bin-width table.
    Channel { number: u8 },
    /// `B#` board declaration.
    Board { serial: u16 },
    /// `EHDR` sentinel.
    EventHeader,
}

impl HeaderTag {
    /// Classifies a raw tag, or `None` if it is not a header tag.
    #[must_use]
    pub fn parse(raw: RawTag) -> Option<Self> {
        if raw == RawTag::EVENT_HEADER {
            Some(Self::EventHeader)
        } else if raw == RawTag::TIME {
            Some(Self::TimeMarker)
        } else if raw.is_board() {
            Some(Self::Board {
                serial: raw.trailing_u16(),
            })
        } else if let Some(number) = raw.channel_number() {
            Some(Self::Channel { number })
        } else {
            raw.format_version().map(Self::FormatVersion)
        }
    }
}

/// Tags valid inside an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    /// `B#` record opening the next board of the event.
    Board { serial: u16 },
    /// `Cxxx` channel data record.
    Channel { number: u8 },
    /// `EHDR` sentinel closing the event.
    EventHeader,
}

impl RecordTag {
    /// Classifies a raw tag, or `None` if it is not valid inside an event.
    #[must_use]
    pub fn parse(raw: RawTag) -> Option<Self> {
        if raw == RawTag::EVENT_HEADER {
            Some(Self::EventHeader)
        } else if raw.is_board() {
            Some(Self::Board {
                serial: raw.trailing_u16(),
            })
        } else {
            raw.channel_number().map(|number| Self::Channel { number })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_tag_parse() {
        assert_eq!(HeaderTag::parse(RawTag(*b"TIME")), Some(HeaderTag::TimeMarker));
        assert_eq!(HeaderTag::parse(RawTag(*b"EHDR")), Some(HeaderTag::EventHeader));
        assert_eq!(
            HeaderTag::parse(RawTag(*b"C003")),
            Some(HeaderTag::Channel { number: 3 })
        );
        assert_eq!(
            HeaderTag::parse(RawTag([b'B', b'#', 0x34, 0x12])),
            Some(HeaderTag::Board { serial: 0x1234 })
        );
        assert_eq!(HeaderTag::parse(RawTag(*b"DRS2")), Some(HeaderTag::FormatVersion(2)));
        assert_eq!(HeaderTag::parse(RawTag(*b"XXXX")), None);
        assert_eq!(HeaderTag::parse(RawTag(*b"CXYZ")), None);
    }

    #[test]
    fn test_record_tag_rejects_header_only_tags() {
        assert_eq!(RecordTag::parse(RawTag(*b"TIME")), None);
        assert_eq!(RecordTag::parse(RawTag(*b"DRS2")), None);
        assert_eq!(
            RecordTag::parse(RawTag(*b"C002")),
            Some(RecordTag::Channel { number: 2 })
        );
    }

    #[test]
    fn test_raw_tag_display_escapes() {
        assert_eq!(RawTag(*b"XXXX").to_string(), "\"XXXX\"");
        assert_eq!(RawTag([b'A', 0, b'B', 0xff]).to_string(), "\"A\\x00B\\xff\"");
    }
}
