//! Raw block notifications and their normalized form.
//!
//! Event sources deliver loosely-shaped [`RawBlockNotification`]s: any of
//! the payload fields may be present or absent depending on what the peer
//! was asked to stream. [`normalize`] resolves that shape exactly once at
//! ingress into a [`BlockPosition`] plus an explicit [`NotificationKind`]
//! variant, so the delivery path never inspects optional fields again.

use serde::{Deserialize, Serialize};

use crate::block::{BlockPayload, FilteredBlock, FullBlock, PrivateData};
use crate::error::{MalformedEvent, TransportError};
use crate::position::BlockPosition;

/// A block notification exactly as handed over by an event source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBlockNotification {
    /// Explicit position, when the source sends one out-of-band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<BlockPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<FullBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_block: Option<FilteredBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_data: Option<PrivateData>,
    /// Marks the end of a bounded historical replay.
    #[serde(default)]
    pub end_of_replay: bool,
}

/// One delivery from an event source: either a notification or a
/// transport-level failure.
#[derive(Debug)]
pub enum BlockEvent {
    Notification(RawBlockNotification),
    Failure(TransportError),
}

/// A normalized notification: the resolved position plus a tagged payload
/// variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub position: BlockPosition,
    pub kind: NotificationKind,
}

/// The payload shape of a normalized notification.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    Full(FullBlock),
    FullWithPrivateData {
        block: FullBlock,
        private_data: PrivateData,
    },
    Filtered(FilteredBlock),
    /// End-of-replay marker; carries no block data.
    EndOfReplay,
    /// A position arrived with no recognizable payload. Still deliverable,
    /// with an empty payload, so nothing is dropped silently.
    Unrecognized,
}

impl NotificationKind {
    /// The payload the application receives, if this kind carries one.
    pub fn into_payload(self) -> Option<BlockPayload> {
        match self {
            Self::Full(block) => Some(BlockPayload::Full {
                block,
                private_data: None,
            }),
            Self::FullWithPrivateData {
                block,
                private_data,
            } => Some(BlockPayload::Full {
                block,
                private_data: Some(private_data),
            }),
            Self::Filtered(filtered) => Some(BlockPayload::Filtered(filtered)),
            Self::EndOfReplay | Self::Unrecognized => None,
        }
    }
}

/// Resolve a raw notification into its normalized form.
///
/// Position resolution prefers the explicit `block_number`, then the full
/// block's header number, then the filtered block's number. Full-block
/// content wins over filtered content when both are present; attached
/// private data upgrades a full block to [`NotificationKind::FullWithPrivateData`]
/// without affecting the position.
pub fn normalize(raw: RawBlockNotification) -> Result<Notification, MalformedEvent> {
    let position = raw
        .block_number
        .or_else(|| raw.block.as_ref().map(|b| b.header.number))
        .or_else(|| raw.filtered_block.as_ref().map(|f| f.number))
        .ok_or(MalformedEvent)?;

    let kind = if raw.end_of_replay {
        NotificationKind::EndOfReplay
    } else if let Some(block) = raw.block {
        match raw.private_data {
            Some(private_data) => NotificationKind::FullWithPrivateData {
                block,
                private_data,
            },
            None => NotificationKind::Full(block),
        }
    } else if let Some(filtered) = raw.filtered_block {
        NotificationKind::Filtered(filtered)
    } else {
        NotificationKind::Unrecognized
    };

    Ok(Notification { position, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockHeader, Transaction};

    fn full_block(number: u64) -> FullBlock {
        FullBlock {
            header: BlockHeader {
                number: BlockPosition::new(number),
                previous_hash: "aa".into(),
                data_hash: "bb".into(),
            },
            transactions: vec![Transaction {
                id: "tx".into(),
                payload: serde_json::Value::Null,
            }],
        }
    }

    fn filtered_block(number: u64) -> FilteredBlock {
        FilteredBlock {
            channel: "trade".into(),
            number: BlockPosition::new(number),
            filtered_transactions: vec![],
        }
    }

    #[test]
    fn full_block_normalizes() {
        let note = normalize(RawBlockNotification {
            block: Some(full_block(10)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(note.position, BlockPosition::new(10));
        assert!(matches!(note.kind, NotificationKind::Full(_)));
    }

    #[test]
    fn private_data_attaches_to_full_block() {
        let mut private_data = PrivateData::new();
        private_data.insert(0, serde_json::json!({"collection": "secrets"}));
        let note = normalize(RawBlockNotification {
            block: Some(full_block(10)),
            private_data: Some(private_data),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(note.position, BlockPosition::new(10));
        assert!(matches!(
            note.kind,
            NotificationKind::FullWithPrivateData { .. }
        ));
    }

    #[test]
    fn full_content_wins_over_filtered() {
        let note = normalize(RawBlockNotification {
            block: Some(full_block(7)),
            filtered_block: Some(filtered_block(7)),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(note.kind, NotificationKind::Full(_)));
    }

    #[test]
    fn explicit_block_number_takes_precedence() {
        let note = normalize(RawBlockNotification {
            block_number: Some(BlockPosition::new(11)),
            filtered_block: Some(filtered_block(10)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(note.position, BlockPosition::new(11));
    }

    #[test]
    fn position_without_payload_is_unrecognized() {
        let note = normalize(RawBlockNotification {
            block_number: Some(BlockPosition::new(3)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(note.kind, NotificationKind::Unrecognized);
        assert!(note.kind.into_payload().is_none());
    }

    #[test]
    fn end_of_replay_marker() {
        let note = normalize(RawBlockNotification {
            block_number: Some(BlockPosition::new(10)),
            end_of_replay: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(note.kind, NotificationKind::EndOfReplay);
        assert!(note.kind.into_payload().is_none());
    }

    #[test]
    fn empty_notification_is_malformed() {
        let err = normalize(RawBlockNotification::default()).unwrap_err();
        assert_eq!(err, MalformedEvent);
    }

    #[test]
    fn end_of_replay_without_position_is_malformed() {
        let raw = RawBlockNotification {
            end_of_replay: true,
            ..Default::default()
        };
        assert!(normalize(raw).is_err());
    }
}
