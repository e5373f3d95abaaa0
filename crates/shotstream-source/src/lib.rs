pub mod chunker;

pub use chunker::ChunkReader;
pub use shotstream_core::{DEFAULT_CHUNK_SIZE, RECOMMENDED_MAX_CHUNK_SIZE};
