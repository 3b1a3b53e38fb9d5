use log::debug;

use crate::core::{AsifError, AsifResult, Header, Packet, StreamParams, HEADER_SIZE};
use crate::options::ReaderOptions;
use crate::storage::RandomAccess;

/// chunked reader for asif files
///
/// Each pull reads the same sample window from every channel region and
/// concatenates the runs channel-major. Deltas are left undecoded; feed the
/// packets to a [`SampleDecoder`](crate::SampleDecoder).
#[derive(Debug)]
pub struct ContainerReader<S: RandomAccess> {
    storage: S,
    header: Header,
    options: ReaderOptions,
    current: u32,
}

impl<S: RandomAccess> ContainerReader<S> {
    /// open with default options
    pub fn open(storage: S) -> AsifResult<Self> {
        Self::open_with(storage, ReaderOptions::default())
    }

    /// parse the header with a single read
    ///
    /// Nothing else is read if the header is rejected.
    pub fn open_with(mut storage: S, options: ReaderOptions) -> AsifResult<Self> {
        let mut raw = [0u8; HEADER_SIZE as usize];
        let available = storage.read_at(0, &mut raw)?;
        let header = Header::parse(&raw[..available])?;

        debug!(
            "opened asif: {} Hz, {} channels, {} samples per channel",
            header.sample_rate, header.channels, header.samples_per_channel
        );

        Ok(ContainerReader {
            storage,
            header,
            options,
            current: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn stream_params(&self) -> StreamParams {
        self.header.stream_params()
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// samples per channel already pulled
    pub fn position(&self) -> u32 {
        self.current
    }

    /// samples per channel left to pull
    pub fn remaining(&self) -> u32 {
        self.header.samples_per_channel.saturating_sub(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// samples per channel the next pull will return
    pub fn next_chunk_samples(&self) -> u32 {
        self.options
            .chunk_samples(self.header.sample_rate)
            .min(self.remaining())
    }

    /// pull the next chunk, `None` once every sample has been read
    pub fn read_chunk(&mut self) -> AsifResult<Option<Packet>> {
        let size = self.next_chunk_samples();
        if size == 0 {
            return Ok(None);
        }

        let channels = self.header.channels as usize;
        let run = size as usize;
        let total = run * channels;

        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| AsifError::AllocationFailure { requested: total })?;
        data.resize(total, 0);

        for (ch, dst) in data.chunks_exact_mut(run).enumerate() {
            let offset = self.header.channel_offset(ch as u16) + self.current as u64;
            let got = self.storage.read_at(offset, dst)?;
            if got < run {
                return Err(AsifError::TruncatedData {
                    offset,
                    expected: run,
                    available: got,
                });
            }
        }

        let packet = Packet::new(data, self.current as u64, size);
        self.current += size;

        debug!(
            "read asif chunk: {} samples x {} channels at {}",
            size, channels, packet.pts
        );

        Ok(Some(packet))
    }

    /// like [`read_chunk`](Self::read_chunk) but end of stream is an error
    pub fn next_chunk(&mut self) -> AsifResult<Packet> {
        self.read_chunk()?.ok_or(AsifError::EndOfStream)
    }

    /// iterate over the remaining chunks
    pub fn chunks(&mut self) -> Chunks<'_, S> {
        Chunks { reader: self }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

/// iterator returned by [`ContainerReader::chunks`]
pub struct Chunks<'a, S: RandomAccess> {
    reader: &'a mut ContainerReader<S>,
}

impl<S: RandomAccess> Iterator for Chunks<'_, S> {
    type Item = AsifResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_chunk().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn two_channel_file() -> Vec<u8> {
        let mut data = Header::new(8000, 2, 3).to_bytes().to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        data
    }

    #[test]
    fn test_chunks_are_channel_major() {
        let storage = MemoryStorage::from_vec(two_channel_file());
        let mut reader = ContainerReader::open_with(storage, ReaderOptions::fixed(2)).unwrap();

        let first = reader.read_chunk().unwrap().unwrap();
        assert_eq!(first.data, vec![1, 2, 4, 5]);
        assert_eq!((first.pts, first.duration), (0, 2));

        let second = reader.read_chunk().unwrap().unwrap();
        assert_eq!(second.data, vec![3, 6]);
        assert_eq!((second.pts, second.duration), (2, 1));

        assert!(reader.read_chunk().unwrap().is_none());
        assert!(reader.is_finished());
    }

    #[test]
    fn test_next_chunk_reports_end_of_stream() {
        let storage = MemoryStorage::from_vec(two_channel_file());
        let mut reader = ContainerReader::open(storage).unwrap();
        assert_eq!(reader.next_chunk().unwrap().duration, 3);
        assert!(reader.next_chunk().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_truncated_region() {
        let mut data = two_channel_file();
        data.truncate(data.len() - 1);
        let mut reader = ContainerReader::open(MemoryStorage::from_vec(data)).unwrap();
        let err = reader.read_chunk().unwrap_err();
        assert!(matches!(
            err,
            AsifError::TruncatedData {
                offset: 17,
                expected: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn test_chunks_iterator() {
        let storage = MemoryStorage::from_vec(two_channel_file());
        let mut reader = ContainerReader::open_with(storage, ReaderOptions::fixed(1)).unwrap();
        let packets: Vec<Packet> = reader.chunks().collect::<AsifResult<_>>().unwrap();
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[2].data, vec![3, 6]);
    }
}
