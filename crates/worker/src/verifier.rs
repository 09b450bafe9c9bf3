//! Ordered chunk download with per-chunk integrity gating

use tracing::debug;

use fixity_dds::ApiClient;
use fixity_errors::{IntegrityError, Result};
use fixity_hash::{Md5Accumulator, Md5Digest};
use fixity_types::ChunkSummary;

/// Downloads chunks in ascending `number` order, verifies each against its
/// declared hash, and folds the bytes into a running whole-file digest.
///
/// Verifying every chunk before folding means a corrupted or truncated
/// transfer can never leak into a reported whole-file checksum. The
/// pre-signed download URL is fetched fresh before every chunk; it is
/// short-lived and never reusable.
pub struct ChunkedDigestVerifier<'a> {
    client: &'a mut ApiClient,
    file_version_id: &'a str,
}

impl<'a> ChunkedDigestVerifier<'a> {
    pub fn new(client: &'a mut ApiClient, file_version_id: &'a str) -> Self {
        Self {
            client,
            file_version_id,
        }
    }

    /// Verify every chunk and return the whole-file MD5 in lowercase hex.
    ///
    /// The manifest may arrive in any order; chunks are sorted ascending by
    /// `number` and the byte offset of each chunk is the sum of the sizes
    /// of all chunks with smaller numbers.
    ///
    /// # Errors
    ///
    /// Returns an API error when a download fails and an integrity error
    /// when a chunk's bytes do not match its declared hash or requested
    /// byte window. No partial digest survives either.
    pub async fn verify(mut self, chunks: &[ChunkSummary]) -> Result<Md5Digest> {
        let mut ordered: Vec<&ChunkSummary> = chunks.iter().collect();
        ordered.sort_by_key(|chunk| chunk.number);

        let mut offset = 0u64;
        let mut digest = Md5Accumulator::new();

        for chunk in ordered {
            let bytes = self.fetch_verified(chunk, offset).await?;
            digest.update(&bytes);
            offset += chunk.size;
        }

        Ok(digest.finalize())
    }

    async fn fetch_verified(&mut self, chunk: &ChunkSummary, offset: u64) -> Result<Vec<u8>> {
        let declared = Md5Digest::from_hex(&chunk.hash.value)?;

        let bytes = if chunk.size == 0 {
            Vec::new()
        } else {
            let end = offset + chunk.size - 1;
            let target = self.client.download_url(self.file_version_id).await?;
            let bytes = self
                .client
                .chunk(&target.full_url(), chunk.number, offset, end)
                .await?;

            if bytes.len() as u64 != chunk.size {
                return Err(IntegrityError::WrongLength {
                    number: chunk.number,
                    start: offset,
                    end,
                    expected: chunk.size,
                    actual: bytes.len() as u64,
                }
                .into());
            }
            bytes
        };

        let actual = Md5Digest::from_data(&bytes);
        if actual != declared {
            return Err(IntegrityError::ChunkMismatch {
                number: chunk.number,
                expected: declared.to_hex(),
                actual: actual.to_hex(),
            }
            .into());
        }

        debug!(number = chunk.number, size = chunk.size, offset, "chunk verified");
        Ok(bytes)
    }
}
