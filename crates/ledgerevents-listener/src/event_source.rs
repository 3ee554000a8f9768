//! The consumed event-source seam.
//!
//! An [`EventService`] is an already-connected stream of block events from
//! one peer; an [`EventServiceManager`] owns the connection lifecycle and
//! hands out live or bounded-replay services. Both are implemented by the
//! transport layer — this crate only consumes them, and tests drive the
//! listener through in-memory implementations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use ledgerevents_core::{BlockEvent, BlockPosition, TransportError};

/// Identifier of one registration against an event service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The registration handle an [`EventService`] returns.
///
/// Events arrive on the wrapped channel in commit order, one at a time.
/// Dropping the subscription closes the channel, which is how the source
/// learns the listener detached.
pub struct EventSubscription {
    pub id: SubscriptionId,
    pub events: mpsc::UnboundedReceiver<BlockEvent>,
}

/// A connected source of block events from one peer.
#[async_trait]
pub trait EventService: Send + Sync {
    /// Attach a block listener and return its registration handle.
    async fn register_block_listener(&self) -> Result<EventSubscription, TransportError>;

    /// Identifier of the backing peer, for diagnostics.
    fn name(&self) -> &str;
}

/// Owner of the event-stream connections for one channel.
#[async_trait]
pub trait EventServiceManager: Send + Sync {
    /// Ensure the underlying event stream is connected and delivering.
    async fn start(&self) -> Result<(), TransportError>;

    /// Tear down the underlying event stream.
    async fn stop(&self);

    /// The live event service, following the current commit tip.
    fn event_service(&self) -> Arc<dyn EventService>;

    /// A historical-replay service over `[start, end]`; `end` is advisory
    /// for the source — the listener enforces the inclusive bound itself.
    fn replay_event_service(
        &self,
        start: Option<BlockPosition>,
        end: Option<BlockPosition>,
    ) -> Arc<dyn EventService>;
}
