//! Collection of decoded events.

use crate::header::Header;
use crate::Result;
use drs4_core::{ChannelIndex, Event, Waveform};

/// Accumulates finalized events in stream order.
#[derive(Debug, Clone, Default)]
pub struct OutputCollector {
    events: Vec<Event>,
}

impl OutputCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finalized event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Pulls events from `events` until it is exhausted or fails.
    ///
    /// Returns the number of events added. On error, every event completed
    /// before the failure stays in the collector.
    ///
    /// # Errors
    /// Returns the first decoding error produced by `events`.
    pub fn drain_from<I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        let before = self.events.len();
        for event in events {
            self.events.push(event?);
        }
        Ok(self.events.len() - before)
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no event was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Collected events in stream order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consumes the collector and returns the events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Waveforms of one channel across all events, with event serials.
    /// Events without data for the channel are skipped.
    pub fn channel_trace(&self, index: ChannelIndex) -> impl Iterator<Item = (u32, &Waveform)> {
        self.events
            .iter()
            .filter_map(move |event| event.channel(index).map(|wf| (event.serial, wf)))
    }
}

/// Header and events of a completely decoded file.
#[derive(Debug, Clone)]
pub struct DecodedRun {
    /// Parsed file header.
    pub header: Header,
    /// Decoded events in stream order.
    pub events: Vec<Event>,
}

impl DecodedRun {
    /// Number of decoded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the file held no complete event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serial numbers of the first and last event.
    #[must_use]
    pub fn serial_range(&self) -> Option<(u32, u32)> {
        Some((self.events.first()?.serial, self.events.last()?.serial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use drs4_core::EventTimestamp;

    fn event_with_channel(serial: u32, index: usize) -> Event {
        let mut event = Event::new(serial, EventTimestamp::default());
        event
            .channels
            .insert(ChannelIndex(index), Waveform::default());
        event
    }

    #[test]
    fn test_drain_keeps_events_before_error() {
        let items: Vec<Result<Event>> = vec![
            Ok(event_with_channel(1, 0)),
            Ok(event_with_channel(2, 0)),
            Err(Error::Config("boom".into())),
            Ok(event_with_channel(3, 0)),
        ];

        let mut collector = OutputCollector::new();
        assert!(collector.drain_from(items).is_err());
        assert_eq!(collector.len(), 2);
        assert_eq!(collector.events()[1].serial, 2);
    }

    #[test]
    fn test_channel_trace() {
        let mut collector = OutputCollector::new();
        collector.push(event_with_channel(10, 1));
        collector.push(event_with_channel(11, 0));
        collector.push(event_with_channel(12, 1));

        let serials: Vec<u32> = collector
            .channel_trace(ChannelIndex(1))
            .map(|(serial, _)| serial)
            .collect();
        assert_eq!(serials, vec![10, 12]);
    }
}
