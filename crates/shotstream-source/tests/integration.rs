use shotstream_source::{ChunkReader, DEFAULT_CHUNK_SIZE};
use std::path::PathBuf;

const MIB: usize = 1024 * 1024;

fn write_fixture(name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let dir = std::env::temp_dir().join(format!("shotstream_source_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("input.bin");
    let data: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
    std::fs::write(&path, &data).unwrap();
    (path, data)
}

fn cleanup(path: &std::path::Path) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_twelve_mib_file_splits_into_five_five_two() {
    let (path, data) = write_fixture("twelve_mib", 12 * MIB);

    let chunks: Vec<_> = ChunkReader::open(&path, DEFAULT_CHUNK_SIZE)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let lens: Vec<_> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lens, vec![5 * MIB, 5 * MIB, 2 * MIB]);

    let joined: Vec<u8> = chunks.into_iter().flat_map(|c| c.into_bytes()).collect();
    assert_eq!(joined, data);

    cleanup(&path);
}

#[test]
fn test_empty_file_yields_nothing() {
    let (path, _) = write_fixture("empty", 0);

    let mut reader = ChunkReader::open(&path, DEFAULT_CHUNK_SIZE).unwrap();
    assert!(reader.next().is_none());
    assert!(reader.is_exhausted());
    assert_eq!(reader.bytes_read(), 0);

    cleanup(&path);
}

#[test]
fn test_file_of_exact_multiple_size() {
    let (path, _) = write_fixture("exact_multiple", 3 * 4096);

    let reader = ChunkReader::open(&path, 4096).unwrap();
    let lens: Vec<_> = reader.map(|c| c.unwrap().len()).collect();
    assert_eq!(lens, vec![4096, 4096, 4096]);

    cleanup(&path);
}

#[test]
fn test_file_handle_released_after_exhaustion() {
    let (path, _) = write_fixture("released", 100);

    let mut reader = ChunkReader::open(&path, 64).unwrap();
    while reader.next().is_some() {}
    assert!(reader.is_exhausted());
    // The reader no longer holds the file, so removing it cannot race with us.
    std::fs::remove_file(&path).unwrap();
    assert!(reader.next().is_none());

    cleanup(&path);
}

#[test]
fn test_open_zero_chunk_size_fails_before_touching_file() {
    let result = ChunkReader::open(std::path::Path::new("/nonexistent/video.mp4"), 0);
    assert!(matches!(
        result,
        Err(shotstream_core::SourceError::InvalidChunkSize)
    ));
}
