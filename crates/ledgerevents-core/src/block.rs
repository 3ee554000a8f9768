//! Block payload types delivered to the application.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::position::BlockPosition;

/// Header of a committed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: BlockPosition,
    pub previous_hash: String,
    pub data_hash: String,
}

/// A transaction inside a full block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Opaque transaction envelope as received from the peer.
    pub payload: Value,
}

/// A committed block with complete transaction payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullBlock {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

/// A transaction entry in a filtered block: identity and validation
/// outcome only, no payload bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredTransaction {
    pub id: String,
    pub validation_code: String,
}

/// A reduced block representation omitting transaction payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredBlock {
    pub channel: String,
    pub number: BlockPosition,
    pub filtered_transactions: Vec<FilteredTransaction>,
}

/// Private-data write-sets keyed by transaction index within the block.
pub type PrivateData = BTreeMap<u64, Value>;

/// The payload handed to the application alongside a block position key.
///
/// Private data never changes which position a block occupies; it only
/// enriches the full-block payload content.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload {
    Full {
        block: FullBlock,
        private_data: Option<PrivateData>,
    },
    Filtered(FilteredBlock),
}

impl BlockPayload {
    /// The position of the block this payload describes.
    pub fn position(&self) -> BlockPosition {
        match self {
            Self::Full { block, .. } => block.header.number,
            Self::Filtered(filtered) => filtered.number,
        }
    }
}
