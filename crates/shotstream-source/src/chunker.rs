use shotstream_core::{Chunk, SourceError, RECOMMENDED_MAX_CHUNK_SIZE};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Lazy, single-pass reader that splits a byte source into fixed-size chunks.
///
/// Every chunk except the last is exactly `chunk_size` bytes long; the last
/// one holds the remainder and is never empty. The underlying reader is
/// dropped as soon as the sequence ends or a read fails, so a file handle is
/// released no matter how far the caller got. Once exhausted the reader stays
/// exhausted; reopen the file for a fresh pass.
#[derive(Debug)]
pub struct ChunkReader<R> {
    reader: Option<R>,
    chunk_size: usize,
    chunks_read: usize,
    bytes_read: u64,
}

impl ChunkReader<File> {
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(SourceError::InvalidChunkSize);
        }
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), chunk_size, "opened media file");
        Self::new(file, chunk_size)
    }
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(SourceError::InvalidChunkSize);
        }
        if chunk_size > RECOMMENDED_MAX_CHUNK_SIZE {
            tracing::warn!(
                chunk_size,
                "chunk size exceeds the recommended maximum of {RECOMMENDED_MAX_CHUNK_SIZE} bytes"
            );
        }
        Ok(Self {
            reader: Some(reader),
            chunk_size,
            chunks_read: 0,
            bytes_read: 0,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }

    fn read_chunk(reader: &mut R, chunk_size: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(chunk_size);
        // `take` keeps reading past short reads until the limit or EOF.
        reader.by_ref().take(chunk_size as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        match Self::read_chunk(reader, self.chunk_size) {
            Ok(data) if data.is_empty() => {
                self.reader = None;
                tracing::debug!(
                    chunks = self.chunks_read,
                    bytes = self.bytes_read,
                    "reached end of input"
                );
                None
            }
            Ok(data) => {
                self.chunks_read += 1;
                self.bytes_read += data.len() as u64;
                tracing::trace!(index = self.chunks_read, len = data.len(), "read chunk");
                Some(Ok(Chunk { data }))
            }
            Err(source) => {
                self.reader = None;
                Some(Err(SourceError::Read {
                    index: self.chunks_read,
                    source,
                }))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for ChunkReader<R> {}
