//! Streaming tests for asif
//!
//! Tests for:
//! - SampleEncoder -> ContainerWriter -> ContainerReader -> SampleDecoder
//! - chunk size never changing the decoded samples
//! - host-supplied frame buffers

use libasif::{
    ContainerReader, ContainerWriter, MemoryStorage, PlanarFrame, ReaderOptions, SampleDecoder,
    SampleEncoder, StreamParams, WriterOptions,
};
use proptest::prelude::*;

fn sine_u8(len: usize, step: f32, phase: f32) -> Vec<u8> {
    (0..len)
        .map(|i| (128.0 + 100.0 * (i as f32 * step + phase).sin()) as u8)
        .collect()
}

fn write_planes(planes: &[Vec<u8>], sample_rate: u32) -> Vec<u8> {
    let params = StreamParams::new(sample_rate, planes.len() as u16);
    let mut encoder = SampleEncoder::new(params).unwrap();
    let mut writer =
        ContainerWriter::from_params(MemoryStorage::new(), &params, WriterOptions::default())
            .unwrap();

    let n = planes[0].len();
    let mut start = 0;
    while start < n {
        let run = 333.min(n - start);
        let frame: Vec<&[u8]> = planes.iter().map(|p| &p[start..start + run]).collect();
        let packet = encoder.encode_frame(&frame).unwrap();
        assert_eq!(packet.pts, start as u64);
        writer.write_packet(&packet.data).unwrap();
        start += run;
    }

    writer.finalize().unwrap().storage.into_inner()
}

/// decode a whole file into one plane per channel
fn read_planes(file: Vec<u8>, options: ReaderOptions) -> Vec<Vec<u8>> {
    let mut reader = ContainerReader::open_with(MemoryStorage::from_vec(file), options).unwrap();
    let mut decoder = SampleDecoder::from_params(&reader.stream_params()).unwrap();
    let mut planes = vec![Vec::new(); decoder.channels()];

    for packet in reader.chunks() {
        let frame = decoder.decode(&packet.unwrap()).unwrap();
        for (plane, run) in planes.iter_mut().zip(frame.planes()) {
            plane.extend_from_slice(run);
        }
    }
    planes
}

#[test]
fn test_pipeline_stereo_sine() {
    let left = sine_u8(44100, 0.05, 0.0);
    let right = sine_u8(44100, 0.05, 1.0);
    let file = write_planes(&[left.clone(), right.clone()], 44100);

    let planes = read_planes(file, ReaderOptions::default());
    // slow sine never needs more than a byte of delta
    assert_eq!(planes, vec![left, right]);
}

#[test]
fn test_pipeline_chunking_at_44100() {
    let file = write_planes(&[vec![0u8; 3000]], 44100);
    let mut reader = ContainerReader::open(MemoryStorage::from_vec(file)).unwrap();

    let mut durations = Vec::new();
    while let Some(packet) = reader.read_chunk().unwrap() {
        durations.push(packet.duration);
    }
    // 44100 / 25 = 1764, capped at 1024
    assert_eq!(durations, vec![1024, 1024, 952]);
}

#[test]
fn test_pipeline_low_rate_chunks() {
    // rate below the divisor still yields one-sample chunks
    let file = write_planes(&[vec![1, 2, 3], vec![4, 5, 6]], 10);
    let mut reader = ContainerReader::open(MemoryStorage::from_vec(file)).unwrap();
    assert_eq!(reader.next_chunk_samples(), 1);
    assert_eq!(reader.chunks().count(), 3);
}

#[test]
fn test_decode_into_planar_frame() {
    let file = write_planes(&[vec![50, 60, 70], vec![200, 190, 180]], 8000);
    let mut reader = ContainerReader::open(MemoryStorage::from_vec(file)).unwrap();
    let packet = reader.next_chunk().unwrap();

    let mut decoder = SampleDecoder::new(2).unwrap();
    let mut frame = PlanarFrame {
        channels: 2,
        ..Default::default()
    };
    frame.nb_samples = decoder.decode_into(&packet.data, &mut frame).unwrap();
    assert_eq!(frame.interleaved(), vec![50, 200, 60, 190, 70, 180]);
}

#[test]
fn test_interleaved_input() {
    let params = StreamParams::new(8000, 2);
    let mut encoder = SampleEncoder::new(params).unwrap();
    let packet = encoder.encode_interleaved(&[1, 101, 2, 102, 3, 103]).unwrap();

    let mut writer =
        ContainerWriter::from_params(MemoryStorage::new(), &params, WriterOptions::deferred())
            .unwrap();
    writer.write_packet(&packet.data).unwrap();
    let file = writer.finalize().unwrap().storage.into_inner();

    assert_eq!(
        read_planes(file, ReaderOptions::fixed(2)),
        vec![vec![1, 2, 3], vec![101, 102, 103]]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chunk_size_does_not_change_output(
        channels in 1usize..5,
        n in 1usize..600,
        seed in any::<u8>(),
        chunk in 1u32..700,
    ) {
        let planes: Vec<Vec<u8>> = (0..channels)
            .map(|ch| {
                (0..n)
                    .map(|i| (seed as usize + i * (ch * 17 + 5) + (i * i) % 91) as u8)
                    .collect()
            })
            .collect();
        let file = write_planes(&planes, 8000);

        let whole = read_planes(file.clone(), ReaderOptions::fixed(n as u32));
        let chunked = read_planes(file, ReaderOptions::fixed(chunk));
        prop_assert_eq!(whole, chunked);
    }
}
