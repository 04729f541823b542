//! Fixed-size row fingerprints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A SHA-256 fingerprint of a row's effective state.
///
/// Digest-only replica responses carry one of these instead of full column
/// data; the resolver compares them byte-for-byte against digests computed
/// from the data-bearing rows. Displays as hex for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
