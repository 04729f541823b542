//! Replica read responses and their wire form.
//!
//! A [`ReplicaMessage`] is one fully-received transport message from one
//! replica: the sender's address plus the serialized [`ReadResponse`] body.
//! Decoding is a synchronous in-memory operation; by the time a message
//! reaches the resolver no network I/O remains.

pub mod errors;

pub use errors::ResponseError;

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::row::{Digest, Row};

/// One replica's reply to a read: full row data, or only a digest of it.
///
/// Digest-only responses let the coordinator avoid transferring full row
/// payloads from every replica; it is enough that the sampled full rows
/// agree with the fingerprint the other replicas reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReadResponse {
    /// A fingerprint of the replica's row, without column data.
    Digest(Digest),
    /// The replica's full row.
    Data(Row),
}

impl ReadResponse {
    /// Returns true if this response carries only a digest.
    pub fn is_digest(&self) -> bool {
        matches!(self, ReadResponse::Digest(_))
    }
}

/// One transport message as received from a replica.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaMessage {
    from: SocketAddr,
    body: Vec<u8>,
}

impl ReplicaMessage {
    /// Wrap an already-serialized response body received from `from`.
    pub fn new(from: SocketAddr, body: Vec<u8>) -> Self {
        Self { from, body }
    }

    /// Build a data-bearing message, serializing `row` into the body.
    pub fn data(from: SocketAddr, row: Row) -> Result<Self> {
        let body = serde_json::to_vec(&ReadResponse::Data(row))?;
        Ok(Self { from, body })
    }

    /// Build a digest-only message.
    pub fn digest(from: SocketAddr, digest: Digest) -> Result<Self> {
        let body = serde_json::to_vec(&ReadResponse::Digest(digest))?;
        Ok(Self { from, body })
    }

    /// The network origin of this message.
    pub fn origin(&self) -> SocketAddr {
        self.from
    }

    /// The raw serialized body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body into a [`ReadResponse`].
    pub fn decode(&self) -> std::result::Result<ReadResponse, ResponseError> {
        serde_json::from_slice(&self.body).map_err(|source| ResponseError::Decode {
            from: self.from,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Column, ColumnFamily};

    fn addr() -> SocketAddr {
        "10.0.0.1:7000".parse().unwrap()
    }

    #[test]
    fn test_data_message_decodes_to_same_row() {
        let mut columns = ColumnFamily::new();
        columns.insert("c1", Column::live(b"v1".to_vec(), 10));
        let row = Row::new("k1", columns);

        let msg = ReplicaMessage::data(addr(), row.clone()).unwrap();
        assert_eq!(msg.origin(), addr());
        match msg.decode().unwrap() {
            ReadResponse::Data(decoded) => assert_eq!(decoded, row),
            other => panic!("expected data response, got {other:?}"),
        }
    }

    #[test]
    fn test_digest_message_round_trip() {
        let row = Row::new("k1", ColumnFamily::new());
        let msg = ReplicaMessage::digest(addr(), row.digest()).unwrap();
        let decoded = msg.decode().unwrap();
        assert!(decoded.is_digest());
        assert_eq!(decoded, ReadResponse::Digest(row.digest()));
    }

    #[test]
    fn test_malformed_body_is_a_decode_error() {
        let msg = ReplicaMessage::new(addr(), b"not json".to_vec());
        let err = msg.decode().unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("10.0.0.1:7000"));
    }
}
