#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! MD5 digests for fixity
//!
//! The storage service declares chunk hashes and accepts whole-file hashes
//! as MD5 hex, so that algorithm is fixed here. This crate provides the
//! digest value type plus a streaming accumulator for folding chunk bytes
//! into a whole-file digest in order.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;

use fixity_errors::{Error, IntegrityError};

/// An MD5 digest value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest {
    bytes: [u8; 16],
}

impl Md5Digest {
    /// Create a digest from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from a hex string, upper or lower case
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not
    /// exactly 32 characters (16 bytes).
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|e| IntegrityError::MalformedDigest {
            message: format!("invalid hex: {e}"),
        })?;

        if bytes.len() != 16 {
            return Err(IntegrityError::MalformedDigest {
                message: format!("md5 must be 16 bytes, got {}", bytes.len()),
            }
            .into());
        }

        let mut array = [0u8; 16];
        array.copy_from_slice(&bytes);
        Ok(Self::from_bytes(array))
    }

    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_bytes(Md5::digest(data).into())
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Md5Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Md5Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Streaming MD5 accumulator
///
/// Bytes must be fed strictly in file order; the caller is responsible for
/// ordering (the chunk verifier sorts by chunk number before folding).
#[derive(Default)]
pub struct Md5Accumulator {
    hasher: Md5,
}

impl Md5Accumulator {
    /// Start a fresh accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next run of bytes into the digest
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finish and return the digest over everything fed so far
    #[must_use]
    pub fn finalize(self) -> Md5Digest {
        Md5Digest::from_bytes(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            Md5Digest::from_data(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            Md5Digest::from_data(b"hello world").to_hex(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_accumulator_matches_one_shot() {
        let mut acc = Md5Accumulator::new();
        acc.update(b"abcd");
        acc.update(b"efg");
        assert_eq!(acc.finalize(), Md5Digest::from_data(b"abcdefg"));
    }

    #[test]
    fn test_from_hex_is_case_insensitive() {
        let lower = Md5Digest::from_hex("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap();
        let upper = Md5Digest::from_hex("5EB63BBBE01EEED093CB22BB8F5ACDC3").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Md5Digest::from_hex("zz").is_err());
        assert!(Md5Digest::from_hex("abcd").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let digest = Md5Digest::from_data(b"test");
        let json = serde_json::to_string(&digest).unwrap();
        let back: Md5Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }
}
