//! Streaming content hashing

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for streaming hashes
pub const CHUNK_SIZE: usize = 8192;

/// Digest and length of one file's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash {
    /// Lowercase hex SHA-256
    pub digest: String,
    /// Number of bytes hashed
    pub size: u64,
}

/// Hash a file's contents with SHA-256
///
/// The file is read in `CHUNK_SIZE` pieces so large files never sit in memory
/// whole; the digest is identical to hashing the full contents at once. The
/// reported size is the number of bytes actually hashed, so digest and size
/// always describe the same content.
pub fn hash_file(path: &Path) -> io::Result<FileHash> {
    let file = File::open(path)?;
    hash_reader(file, CHUNK_SIZE)
}

/// Hash everything readable from `reader` using a buffer of `chunk_size` bytes
pub fn hash_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<FileHash> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut size = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok(FileHash {
        digest: hex::encode(hasher.finalize()),
        size,
    })
}
