//! Chunk integrity error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum IntegrityError {
    /// A downloaded chunk hashes to something other than the manifest's
    /// declared value. No partial digest is ever reported after this.
    #[error("chunk {number} download md5 {actual} does not match reported md5 {expected}")]
    ChunkMismatch {
        number: i64,
        expected: String,
        actual: String,
    },

    /// A 206 response carried a body shorter or longer than the requested
    /// byte window.
    #[error("chunk {number} range {start}-{end} returned {actual} bytes, expected {expected}")]
    WrongLength {
        number: i64,
        start: u64,
        end: u64,
        expected: u64,
        actual: u64,
    },

    #[error("malformed digest: {message}")]
    MalformedDigest { message: String },
}
