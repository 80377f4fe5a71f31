#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
use approx::assert_relative_eq;
use drs4_core::{calibrate_times, first_cell_index, BinWidthTable, TimeBase, NUM_CELLS};
use drs4_format::{
    decode, ChannelIndex, DecoderConfig, Error, EventStreamReader, FormatError, OutputCollector,
};

// Helper to append a board declaration / board record
fn push_board(data: &mut Vec<u8>, serial: u16) {
    data.extend_from_slice(b"B#");
    data.extend_from_slice(&serial.to_le_bytes());
}

// Helper to append a channel declaration with its bin-width table
fn push_channel_table(data: &mut Vec<u8>, number: u8, widths: &[f32]) {
    data.extend_from_slice(&[b'C', b'0', b'0', b'0' + number]);
    for w in widths {
        data.extend_from_slice(&w.to_le_bytes());
    }
}

// Helper to append an event preamble (serial, timestamp, filler, trigger cell)
fn push_event_preamble(data: &mut Vec<u8>, serial: u32, trigger_cell: u16) {
    data.extend_from_slice(&serial.to_le_bytes());
    for word in [2024u16, 5, 17, 12, 30, 45, 123, 0] {
        data.extend_from_slice(&word.to_le_bytes());
    }
    data.extend_from_slice(&[0u8; 4]);
    data.extend_from_slice(b"T#");
    data.extend_from_slice(&trigger_cell.to_le_bytes());
}

// Helper to append the trigger cell record following an in-event board tag
fn push_trigger_cell(data: &mut Vec<u8>, trigger_cell: u16) {
    data.extend_from_slice(b"T#");
    data.extend_from_slice(&trigger_cell.to_le_bytes());
}

// Helper to append a channel data record
fn push_channel_samples(data: &mut Vec<u8>, number: u8, codes: impl Fn(usize) -> u16) {
    data.extend_from_slice(&[b'C', b'0', b'0', b'0' + number]);
    data.extend_from_slice(&0u32.to_le_bytes());
    for i in 0..NUM_CELLS {
        data.extend_from_slice(&codes(i).to_le_bytes());
    }
}

fn uniform(width: f32) -> Vec<f32> {
    vec![width; NUM_CELLS]
}

// Non-uniform table, different per seed
fn wobbly(seed: usize) -> Vec<f32> {
    (0..NUM_CELLS)
        .map(|i| 0.18 + ((i * (seed + 3)) % 11) as f32 * 0.005)
        .collect()
}

fn single_channel_file(trigger_cell: u16, code: u16) -> Vec<u8> {
    let mut data = b"TIME".to_vec();
    push_board(&mut data, 0x1234);
    push_channel_table(&mut data, 1, &uniform(0.2));
    data.extend_from_slice(b"EHDR");
    push_event_preamble(&mut data, 1, trigger_cell);
    push_channel_samples(&mut data, 1, |_| code);
    data.extend_from_slice(b"EHDR");
    data
}

#[test]
fn test_single_channel_uniform_pair_averaged() {
    let data = single_channel_file(0, 32768);
    let run = decode(&data, &DecoderConfig::default()).unwrap();

    assert_eq!(run.header.num_boards(), 1);
    assert_eq!(run.header.registry.boards()[0].serial, Some(0x1234));
    assert_eq!(run.len(), 1);

    let event = &run.events[0];
    assert_eq!(event.serial, 1);
    assert_eq!(event.timestamp.year(), 2024);
    let wf = event.channel(ChannelIndex(0)).unwrap();
    assert_eq!(wf.len(), NUM_CELLS);
    for (i, (t, v)) in wf.iter().enumerate() {
        // Even entries of the cumulative sum: 0.2, 0.6, 1.0, ...
        assert_relative_eq!(t, 0.2 * (2 * i + 1) as f64, epsilon = 1e-3);
        assert_relative_eq!(v, 32768.0 / 65535.0 - 0.5, epsilon = 1e-12);
    }
}

#[test]
fn test_single_channel_uniform_cell_sum() {
    let data = single_channel_file(0, 32768);
    let config = DecoderConfig::default().with_time_base(TimeBase::CellSum);
    let run = decode(&data, &config).unwrap();

    let wf = run.events[0].channel(ChannelIndex(0)).unwrap();
    assert_relative_eq!(wf.times[0], 0.0);
    assert_relative_eq!(wf.times[1], 0.2, epsilon = 1e-6);
    assert_relative_eq!(wf.times[2], 0.4, epsilon = 1e-6);
    assert_relative_eq!(wf.times[NUM_CELLS - 1], 204.6, epsilon = 1e-3);
    assert!(wf.voltages.iter().all(|&v| (v - 0.000_007_6).abs() < 1e-6));
}

#[test]
fn test_malformed_header_is_format_error() {
    let mut data = b"TIME".to_vec();
    data.extend_from_slice(b"XXXX");
    data.extend_from_slice(b"EHDR");
    push_event_preamble(&mut data, 1, 0);

    let err = decode(&data, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Format {
            offset: 4,
            kind: FormatError::UnrecognizedHeaderTag(_)
        }
    ));
}

#[test]
fn test_truncated_sample_block_drops_open_event() {
    let mut data = b"TIME".to_vec();
    push_board(&mut data, 1);
    push_channel_table(&mut data, 1, &uniform(0.2));
    data.extend_from_slice(b"EHDR");
    push_event_preamble(&mut data, 1, 0);
    push_channel_samples(&mut data, 1, |_| 1000);
    data.extend_from_slice(b"EHDR");
    push_event_preamble(&mut data, 2, 0);
    push_channel_samples(&mut data, 1, |_| 1000);
    data.truncate(data.len() - 500);

    assert!(decode(&data, &DecoderConfig::default())
        .unwrap_err()
        .is_truncated());

    // The event closed before the truncation is still available.
    let reader = EventStreamReader::new(&data, DecoderConfig::default()).unwrap();
    let mut collector = OutputCollector::new();
    let err = collector.drain_from(reader).unwrap_err();
    assert!(matches!(err, Error::Truncated { needed: 2048, .. }));
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.events()[0].serial, 1);

    // Flushing does not resurrect a failed event.
    let config = DecoderConfig::default().with_flush_trailing_event(true);
    let reader = EventStreamReader::new(&data, config).unwrap();
    let mut collector = OutputCollector::new();
    assert!(collector.drain_from(reader).is_err());
    assert_eq!(collector.len(), 1);
}

#[test]
fn test_two_boards_aligned_independently() {
    let tc = [130u16, 871u16];
    let mut tables = Vec::new();

    let mut data = b"DRS2".to_vec();
    data.extend_from_slice(b"TIME");
    for (board, serial) in [0x0A01u16, 0x0A02].into_iter().enumerate() {
        push_board(&mut data, serial);
        for number in 1..=4u8 {
            let widths = wobbly(board * 4 + usize::from(number));
            push_channel_table(&mut data, number, &widths);
            tables.push(BinWidthTable::new(widths).unwrap());
        }
    }
    data.extend_from_slice(b"EHDR");

    push_event_preamble(&mut data, 42, tc[0]);
    for number in 1..=4u8 {
        push_channel_samples(&mut data, number, |i| (i * 64) as u16);
    }
    push_board(&mut data, 0x0A02);
    push_trigger_cell(&mut data, tc[1]);
    for number in 1..=4u8 {
        push_channel_samples(&mut data, number, |i| 65535 - (i * 64) as u16);
    }
    data.extend_from_slice(b"EHDR");

    let run = decode(&data, &DecoderConfig::default()).unwrap();
    assert_eq!(run.header.format_version, Some(2));
    assert_eq!(run.header.num_channels(), 8);
    assert_eq!(run.len(), 1);

    let event = &run.events[0];
    assert_eq!(event.channel_count(), 8);
    assert_eq!(event.trigger_cell(0), Some(tc[0]));
    assert_eq!(event.trigger_cell(1), Some(tc[1]));
    assert_eq!(event.boards[1].serial, Some(0x0A02));

    for board in 0..2 {
        let reference = calibrate_times(&tables[board * 4], tc[board], TimeBase::PairAveraged);
        let first = first_cell_index(tc[board]);
        for slot in 0..4 {
            let wf = event.channel(ChannelIndex(board * 4 + slot)).unwrap();
            assert_eq!(wf.times[first], reference.first_cell_time());
        }
    }

    // Board 2 keeps its own origin.
    let origin_0 = event.channel(ChannelIndex(0)).unwrap().times[first_cell_index(tc[0])];
    let origin_1 = event.channel(ChannelIndex(4)).unwrap().times[first_cell_index(tc[1])];
    assert_ne!(origin_0, origin_1);
}

#[test]
fn test_alignment_can_be_disabled() {
    let mut data = b"TIME".to_vec();
    push_board(&mut data, 9);
    push_channel_table(&mut data, 1, &wobbly(1));
    push_channel_table(&mut data, 2, &wobbly(2));
    data.extend_from_slice(b"EHDR");
    push_event_preamble(&mut data, 1, 300);
    push_channel_samples(&mut data, 1, |_| 0);
    push_channel_samples(&mut data, 2, |_| 0);
    data.extend_from_slice(b"EHDR");

    let config = DecoderConfig::default().with_align_channels(false);
    let run = decode(&data, &config).unwrap();
    let table = BinWidthTable::new(wobbly(2)).unwrap();
    let expected = calibrate_times(&table, 300, TimeBase::PairAveraged);
    let wf = run.events[0].channel(ChannelIndex(1)).unwrap();
    assert_eq!(wf.times.as_slice(), expected.as_slice());
}

#[test]
fn test_event_count_matches_sentinels() {
    let mut data = b"TIME".to_vec();
    push_board(&mut data, 3);
    push_channel_table(&mut data, 1, &wobbly(0));
    push_channel_table(&mut data, 2, &wobbly(5));
    data.extend_from_slice(b"EHDR");

    let mut sentinels = 0;
    for serial in 0..25u32 {
        push_event_preamble(&mut data, serial, (serial * 97 % 1024) as u16);
        push_channel_samples(&mut data, 1, |i| (i as u16).wrapping_mul(61));
        push_channel_samples(&mut data, 2, |i| u16::MAX - i as u16);
        data.extend_from_slice(b"EHDR");
        sentinels += 1;
    }
    // A final event without a closing sentinel.
    push_event_preamble(&mut data, 25, 5);
    push_channel_samples(&mut data, 1, |_| 0);

    let run = decode(&data, &DecoderConfig::default()).unwrap();
    assert_eq!(run.len(), sentinels);
    assert_eq!(run.serial_range(), Some((0, 24)));

    for event in &run.events {
        for wf in event.channels.values() {
            assert_eq!(wf.times.len(), NUM_CELLS);
            assert!(wf.times.windows(2).all(|w| w[0] <= w[1]));
            assert!(wf.voltages.iter().all(|&v| (-0.5..=0.5).contains(&v)));
        }
    }

    let config = DecoderConfig::default().with_flush_trailing_event(true);
    assert_eq!(decode(&data, &config).unwrap().len(), sentinels + 1);
}

#[test]
fn test_partial_trailing_tag_is_truncated() {
    let mut data = single_channel_file(0, 0);
    data.extend_from_slice(b"EH");

    let mut reader = EventStreamReader::new(&data, DecoderConfig::default()).unwrap();
    assert!(reader.next().unwrap().is_ok());
    assert!(reader.next().unwrap().unwrap_err().is_truncated());
    assert!(reader.next().is_none());
}
