//! Binary snapshots of a [`MemoryStore`].
//!
//! A snapshot is a 32-byte fixed header followed by a bincode payload
//! holding the node arena and the rule table.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"RLIT"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly; the engine version is
//! informational.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MemoryStore, Node, Rule};

const MAGIC: &[u8; 4] = b"RLIT";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

/// Errors that can occur when writing a snapshot.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule store: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when reading a snapshot.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a ruleit snapshot: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    metadata: SnapshotMetadata,
    nodes: Vec<Node>,
    rules: Vec<Rule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMetadata {
    node_count: usize,
    rule_count: usize,
    last_id: u64,
}

fn store_to_snapshot(store: &MemoryStore) -> Snapshot {
    Snapshot {
        metadata: SnapshotMetadata {
            node_count: store.nodes.len(),
            rule_count: store.rules.len(),
            last_id: store.last_id,
        },
        nodes: store.nodes.clone(),
        rules: store.rules.values().cloned().collect(),
    }
}

fn snapshot_to_store(snapshot: Snapshot) -> Result<MemoryStore, DeserializeError> {
    validate(&snapshot)?;

    let names: HashMap<String, _> = snapshot
        .rules
        .iter()
        .filter_map(|rule| rule.name.clone().map(|name| (name, rule.id)))
        .collect();
    let rules: BTreeMap<_, _> = snapshot
        .rules
        .into_iter()
        .map(|rule| (rule.id, rule))
        .collect();

    Ok(MemoryStore {
        nodes: snapshot.nodes,
        rules,
        names,
        last_id: snapshot.metadata.last_id,
    })
}

// -- Validation -------------------------------------------------------------

fn validate(snapshot: &Snapshot) -> Result<(), DeserializeError> {
    let node_count = snapshot.nodes.len();

    if snapshot.metadata.node_count != node_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} nodes but payload has {}",
            snapshot.metadata.node_count, node_count
        )));
    }
    if snapshot.metadata.rule_count != snapshot.rules.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            snapshot.metadata.rule_count,
            snapshot.rules.len()
        )));
    }

    for (index, node) in snapshot.nodes.iter().enumerate() {
        validate_node(node, index)?;
    }

    let mut names = HashMap::new();
    let mut previous = 0;
    for rule in &snapshot.rules {
        if rule.id.0 <= previous || rule.id.0 > snapshot.metadata.last_id {
            return Err(DeserializeError::Validation(format!(
                "rule id {} out of order or beyond last id {}",
                rule.id, snapshot.metadata.last_id
            )));
        }
        previous = rule.id.0;

        if rule.root.index() >= node_count {
            return Err(DeserializeError::Validation(format!(
                "rule {} root {} out of bounds (max {node_count})",
                rule.id, rule.root
            )));
        }
        if let Some(name) = &rule.name {
            if let Some(other) = names.insert(name.as_str(), rule.id) {
                return Err(DeserializeError::Validation(format!(
                    "rules {other} and {} share the name '{name}'",
                    rule.id
                )));
            }
        }
    }

    Ok(())
}

/// Children must precede their parent, which also rules out cycles.
fn validate_node(node: &Node, index: usize) -> Result<(), DeserializeError> {
    if let Some((left, right)) = node.children() {
        for child in [left, right] {
            if child.index() >= index {
                return Err(DeserializeError::Validation(format!(
                    "node #{index} references {child}, which does not precede it"
                )));
            }
        }
    }
    Ok(())
}

// -- Header I/O -------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    #[allow(clippy::cast_possible_truncation)]
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash.as_bytes()[..16]);
}

#[allow(clippy::cast_possible_truncation)]
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// -- Encode / decode --------------------------------------------------------

pub(crate) fn encode(store: &MemoryStore) -> Result<Vec<u8>, SerializeError> {
    let snapshot = store_to_snapshot(store);
    let payload = bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    tracing::trace!(bytes = buf.len(), "encoded rule store");
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<MemoryStore, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;
    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (snapshot, _): (Snapshot, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    snapshot_to_store(snapshot)
}
