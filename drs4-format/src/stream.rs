//! Event stream decoding.
//!
//! After the header, the file is a sequence of events. Each event starts
//! with its serial number, a timestamp, a filler word and the trigger cell
//! of the first board, followed by tagged records:
//!
//! - `B#` opens the next board and carries that board's trigger cell,
//! - `Cxxx` holds one channel's scaler and 1024 sample codes,
//! - `EHDR` closes the event.
//!
//! [`EventStreamReader`] walks these records with an explicit state machine
//! and yields one calibrated [`Event`] per closed event.

use crate::cursor::ByteCursor;
use crate::header::{parse_header, Header};
use crate::tag::RecordTag;
use crate::{DecoderConfig, Error, FormatError, Result};
use drs4_core::{
    calibrate_times, BoardTrigger, CalibratedTimes, ChannelIndex, Event, EventTimestamp,
    Waveform, NUM_CELLS,
};
use tracing::{debug, info, warn};

/// Decoder state between two reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Next bytes are the preamble of a new event.
    AwaitingEvent,
    /// A `B#` tag was read; next bytes are that board's trigger cell.
    ReadingBoardHeader { serial: u16 },
    /// Next bytes are a record tag inside the current event.
    ReadingChannelRecord,
    /// An `EHDR` tag closed the current event.
    EventComplete,
    /// The stream is exhausted or decoding failed.
    EndOfStream,
}

/// Calibrated but not yet aligned channel data of the open board.
struct PendingChannel {
    index: ChannelIndex,
    times: CalibratedTimes,
    codes: Vec<u16>,
    scaler: u32,
}

/// Event under construction.
struct EventBuilder {
    event: Event,
    board_ordinal: usize,
    trigger_cell: u16,
    pending: Vec<PendingChannel>,
}

impl EventBuilder {
    fn new(serial: u32, timestamp: EventTimestamp) -> Self {
        Self {
            event: Event::new(serial, timestamp),
            board_ordinal: 0,
            trigger_cell: 0,
            pending: Vec::new(),
        }
    }

    fn open_board(&mut self, ordinal: usize, serial: Option<u16>, trigger_cell: u16) {
        let trigger_cell = trigger_cell % NUM_CELLS as u16;
        self.board_ordinal = ordinal;
        self.trigger_cell = trigger_cell;
        self.event.boards.push(BoardTrigger {
            ordinal,
            serial,
            trigger_cell,
        });
    }

    fn push_channel(&mut self, channel: PendingChannel) {
        if let Some(slot) = self.pending.iter_mut().find(|p| p.index == channel.index) {
            warn!(
                event = self.event.serial,
                channel = channel.index.as_usize(),
                "repeated channel record replaces earlier one"
            );
            *slot = channel;
        } else {
            self.pending.push(channel);
        }
    }

    /// Aligns the open board's channels to its reference channel and moves
    /// them into the event.
    fn close_board(&mut self, align: bool) -> Result<()> {
        let reference = self
            .pending
            .iter()
            .min_by_key(|p| p.index)
            .map(|p| p.times.first_cell_time());

        for mut channel in self.pending.drain(..) {
            if let (true, Some(reference)) = (align, reference) {
                channel.times.align_to(reference);
            }
            let waveform = Waveform::assemble(channel.times, &channel.codes, channel.scaler)?;
            self.event.channels.insert(channel.index, waveform);
        }
        Ok(())
    }

    fn finish(mut self, align: bool) -> Result<Event> {
        self.close_board(align)?;
        Ok(self.event)
    }
}

/// Streaming decoder over the events of a DRS4 file.
///
/// Yields `Ok(event)` for every event closed by an `EHDR` sentinel. After
/// the first error, or once the input is exhausted, it yields `None`.
pub struct EventStreamReader<'a> {
    cursor: ByteCursor<'a>,
    header: Header,
    config: DecoderConfig,
    state: ReaderState,
    current: Option<EventBuilder>,
    events_emitted: usize,
}

impl<'a> EventStreamReader<'a> {
    /// Parses the header of `data` and positions the reader at the first
    /// event.
    ///
    /// # Errors
    /// Returns any header parsing error.
    pub fn new(data: &'a [u8], config: DecoderConfig) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let header = parse_header(&mut cursor, &config)?;
        Ok(Self::from_header(cursor, header, config))
    }

    /// Creates a reader from an already parsed header. `cursor` must be at
    /// the header's data offset.
    #[must_use]
    pub fn from_header(cursor: ByteCursor<'a>, header: Header, config: DecoderConfig) -> Self {
        Self {
            cursor,
            header,
            config,
            state: ReaderState::AwaitingEvent,
            current: None,
            events_emitted: 0,
        }
    }

    /// The parsed file header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Consumes the reader and returns the header.
    #[must_use]
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Current decoder state.
    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Byte offset of the next read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Number of events yielded so far.
    #[must_use]
    pub fn events_emitted(&self) -> usize {
        self.events_emitted
    }

    /// Performs one state transition, returning an event if one was
    /// completed.
    fn step(&mut self) -> Result<Option<Event>> {
        match self.state {
            ReaderState::AwaitingEvent => {
                if self.cursor.is_at_end() {
                    self.state = ReaderState::EndOfStream;
                    return Ok(None);
                }
                self.read_event_preamble()?;
                self.state = ReaderState::ReadingChannelRecord;
                Ok(None)
            }
            ReaderState::ReadingBoardHeader { serial } => {
                let trigger_cell = self.cursor.read_trailing_u16()?;
                let align = self.config.align_channels;
                let builder = self.builder_mut();
                builder.close_board(align)?;
                let ordinal = builder.board_ordinal + 1;
                builder.open_board(ordinal, Some(serial), trigger_cell);
                self.state = ReaderState::ReadingChannelRecord;
                Ok(None)
            }
            ReaderState::ReadingChannelRecord => {
                let offset = self.cursor.position();
                let Some(raw) = self.cursor.read_tag()? else {
                    self.state = ReaderState::EndOfStream;
                    return self.finish_at_end();
                };
                match RecordTag::parse(raw) {
                    Some(RecordTag::Board { serial }) => {
                        self.state = ReaderState::ReadingBoardHeader { serial };
                    }
                    Some(RecordTag::EventHeader) => {
                        self.state = ReaderState::EventComplete;
                    }
                    Some(RecordTag::Channel { number }) => {
                        self.read_channel_record(offset, number)?;
                    }
                    None => {
                        return Err(Error::Format {
                            offset,
                            kind: FormatError::UnrecognizedRecordTag(raw),
                        });
                    }
                }
                Ok(None)
            }
            ReaderState::EventComplete => {
                self.state = ReaderState::AwaitingEvent;
                match self.current.take() {
                    Some(builder) => builder.finish(self.config.align_channels).map(Some),
                    None => Ok(None),
                }
            }
            ReaderState::EndOfStream => Ok(None),
        }
    }

    fn builder_mut(&mut self) -> &mut EventBuilder {
        self.current
            .get_or_insert_with(|| EventBuilder::new(0, EventTimestamp::default()))
    }

    fn read_event_preamble(&mut self) -> Result<()> {
        let serial = self.cursor.read_u32()?;
        let mut words = [0u16; 8];
        for word in &mut words {
            *word = self.cursor.read_u16()?;
        }
        let filler: [u8; 4] = self.cursor.read_array()?;
        let trigger_cell = self.cursor.read_trailing_u16()?;

        let serial_of_first_board = if filler.starts_with(b"B#") {
            Some(u16::from_le_bytes([filler[2], filler[3]]))
        } else {
            self.header.registry.board(0).and_then(|b| b.serial)
        };

        let interval = self.config.progress_interval;
        if interval > 0 && serial % interval == 0 {
            info!("Running on event: {serial}");
        }

        let mut builder = EventBuilder::new(serial, EventTimestamp::from_words(words));
        builder.open_board(0, serial_of_first_board, trigger_cell);
        self.current = Some(builder);
        Ok(())
    }

    fn read_channel_record(&mut self, offset: usize, number: u8) -> Result<()> {
        let board_ordinal = self.builder_mut().board_ordinal;
        let index = ChannelIndex::from_board_slot(
            board_ordinal,
            number,
            self.header.registry.channels_per_board(),
        )
        .map_err(|e| Error::from_core_at(offset, e))?;
        let table = self
            .header
            .registry
            .table(index)
            .ok_or(Error::ConfigMismatch { channel: index })?
            .clone();

        let scaler = self.cursor.read_u32()?;
        let codes = self.cursor.read_u16_block(NUM_CELLS)?;

        let time_base = self.config.time_base;
        let builder = self.builder_mut();
        let times = calibrate_times(&table, builder.trigger_cell, time_base);
        builder.push_channel(PendingChannel {
            index,
            times,
            codes,
            scaler,
        });
        Ok(())
    }

    fn finish_at_end(&mut self) -> Result<Option<Event>> {
        let Some(builder) = self.current.take() else {
            return Ok(None);
        };
        if self.config.flush_trailing_event {
            builder.finish(self.config.align_channels).map(Some)
        } else {
            debug!(
                event = builder.event.serial,
                "stream ended inside an event without a closing sentinel"
            );
            Ok(None)
        }
    }
}

impl Iterator for EventStreamReader<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state != ReaderState::EndOfStream {
            match self.step() {
                Ok(Some(event)) => {
                    self.events_emitted += 1;
                    return Some(Ok(event));
                }
                Ok(None) => {}
                Err(e) => {
                    // The open event is lost; events already yielded stay valid.
                    self.state = ReaderState::EndOfStream;
                    self.current = None;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for EventStreamReader<'_> {}
