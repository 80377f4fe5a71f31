//! Board and channel registry built from the file header.

use crate::{BinWidthTable, Board, ChannelIndex, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Boards, channels and their bin-width tables.
///
/// Populated once while the header is parsed and shared read-only by every
/// event afterwards. Tables are reference counted so decoded events never
/// hold a mutable view of them.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels_per_board: usize,
    boards: Vec<Board>,
    tables: BTreeMap<ChannelIndex, Arc<BinWidthTable>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(channels_per_board: usize) -> Self {
        Self {
            channels_per_board,
            boards: Vec::new(),
            tables: BTreeMap::new(),
        }
    }

    /// Number of channels on each board.
    #[must_use]
    pub fn channels_per_board(&self) -> usize {
        self.channels_per_board
    }

    /// Declares a board with the given serial number.
    ///
    /// If channels were declared before any board, the implicit board that
    /// holds them takes this serial instead of a new board being opened.
    /// Returns the ordinal of the named board.
    pub fn declare_board(&mut self, serial: u16) -> usize {
        if let Some(last) = self.boards.last_mut() {
            if last.serial.is_none() {
                last.serial = Some(serial);
                return last.ordinal;
            }
        }
        let ordinal = self.boards.len();
        self.boards.push(Board::new(ordinal, Some(serial)));
        ordinal
    }

    /// Declares channel `number` (1-based) on the most recent board.
    ///
    /// # Errors
    /// Returns an error if the channel number is out of range or the channel
    /// was already declared.
    pub fn declare_channel(&mut self, number: u8, table: BinWidthTable) -> Result<ChannelIndex> {
        if self.boards.is_empty() {
            self.boards.push(Board::new(0, None));
        }
        let board_ordinal = self.boards.len() - 1;
        let index = ChannelIndex::from_board_slot(board_ordinal, number, self.channels_per_board)?;
        if self.tables.contains_key(&index) {
            return Err(Error::DuplicateChannel(index));
        }
        self.tables.insert(index, Arc::new(table));
        self.boards[board_ordinal].channels.push(index);
        Ok(index)
    }

    /// Returns the bin-width table of a channel.
    #[must_use]
    pub fn table(&self, index: ChannelIndex) -> Option<&Arc<BinWidthTable>> {
        self.tables.get(&index)
    }

    /// Returns the declared boards in discovery order.
    #[must_use]
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Returns a board by ordinal.
    #[must_use]
    pub fn board(&self, ordinal: usize) -> Option<&Board> {
        self.boards.get(ordinal)
    }

    /// Number of declared boards.
    #[must_use]
    pub fn num_boards(&self) -> usize {
        self.boards.len()
    }

    /// Number of declared channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.tables.len()
    }

    /// Iterates over declared channels and their tables in index order.
    pub fn channels(&self) -> impl Iterator<Item = (ChannelIndex, &Arc<BinWidthTable>)> {
        self.tables.iter().map(|(&index, table)| (index, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_boards_own_their_channels() {
        let mut registry = ChannelRegistry::new(4);
        assert_eq!(registry.declare_board(0x1234), 0);
        registry.declare_channel(1, BinWidthTable::uniform(0.2)).unwrap();
        registry.declare_channel(2, BinWidthTable::uniform(0.2)).unwrap();
        assert_eq!(registry.declare_board(0x5678), 1);
        let idx = registry
            .declare_channel(1, BinWidthTable::uniform(0.3))
            .unwrap();

        assert_eq!(idx, ChannelIndex(4));
        assert_eq!(registry.num_boards(), 2);
        assert_eq!(registry.num_channels(), 3);
        assert_eq!(registry.boards()[0].channels, vec![ChannelIndex(0), ChannelIndex(1)]);
        assert_eq!(registry.boards()[1].serial, Some(0x5678));
        assert!(registry.table(ChannelIndex(4)).is_some());
        assert!(registry.table(ChannelIndex(2)).is_none());
    }

    #[test]
    fn test_registry_implicit_board_takes_first_serial() {
        let mut registry = ChannelRegistry::new(4);
        registry.declare_channel(1, BinWidthTable::uniform(0.2)).unwrap();
        assert_eq!(registry.boards()[0].serial, None);

        assert_eq!(registry.declare_board(42), 0);
        assert_eq!(registry.num_boards(), 1);
        assert_eq!(registry.boards()[0].serial, Some(42));
    }

    #[test]
    fn test_registry_rejects_duplicate_channel() {
        let mut registry = ChannelRegistry::new(4);
        registry.declare_board(1);
        registry.declare_channel(3, BinWidthTable::uniform(0.2)).unwrap();
        assert!(matches!(
            registry.declare_channel(3, BinWidthTable::uniform(0.2)),
            Err(Error::DuplicateChannel(ChannelIndex(2)))
        ));
    }
}
