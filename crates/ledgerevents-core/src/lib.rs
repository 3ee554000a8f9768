//! ledgerevents-core — data model and checkpoint contract for LedgerEvents.
//!
//! # Overview
//!
//! LedgerEvents is a client-side event-delivery layer for permissioned
//! ledgers: it consumes block-commit notifications pushed by peers,
//! deduplicates them across process restarts and hands each block to the
//! application exactly once per position. The core crate defines:
//!
//! - [`BlockPosition`] — 64-bit block height, decimal string at the edges
//! - [`RawBlockNotification`] / [`Notification`] — wire and normalized shapes
//! - [`BlockEvent`] / [`BlockPayload`] — what sources deliver, what apps see
//! - [`Checkpointer`] — the dedup store contract, with in-memory and
//!   file-backed reference implementations
//! - [`error`] module — transport, malformed-event and checkpoint errors

pub mod block;
pub mod checkpoint;
pub mod error;
pub mod notification;
pub mod position;

pub use block::{BlockHeader, BlockPayload, FilteredBlock, FilteredTransaction, FullBlock, PrivateData, Transaction};
pub use checkpoint::{Checkpointer, FileCheckpointStore, FileCheckpointer, InMemoryCheckpointer};
pub use error::{CheckpointError, MalformedEvent, TransportError};
pub use notification::{normalize, BlockEvent, Notification, NotificationKind, RawBlockNotification};
pub use position::{BlockPosition, InvalidPosition};
