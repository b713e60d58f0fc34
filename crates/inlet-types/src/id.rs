//! Content-derived identifiers for meta-ranges and commits.
//!
//! Both ids are 32-byte BLAKE3 digests. They are opaque to the import
//! pipeline: only the catalog that produced an id knows what it addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident, $debug:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap a pre-computed digest.
            pub const fn from_hash(hash: [u8; 32]) -> Self {
                Self(hash)
            }

            /// Digest arbitrary bytes.
            pub fn from_bytes(data: &[u8]) -> Self {
                Self(*blake3::hash(data).as_bytes())
            }

            /// The raw 32-byte digest.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Hex-encoded string representation.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Short hex representation (first 8 characters).
            pub fn short_hex(&self) -> String {
                hex::encode(&self.0[..4])
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
                let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    TypeError::InvalidLength {
                        expected: 32,
                        actual: bytes.len(),
                    }
                })?;
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($debug, "({})"), self.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl From<blake3::Hash> for $name {
            fn from(hash: blake3::Hash) -> Self {
                Self(*hash.as_bytes())
            }
        }
    };
}

content_id!(
    /// Identifier of an immutable, fully materialized entry set.
    ///
    /// Identical entry sets always produce the same `MetaRangeId`.
    MetaRangeId,
    "MetaRangeId"
);

content_id!(
    /// Identifier of an immutable commit record.
    CommitId,
    "CommitId"
);
