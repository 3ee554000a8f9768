//! The checkpointed block-event listener.
//!
//! One listener owns one registration against an event source. A spawned
//! delivery task drains the subscription channel serially; every event goes
//! through [`BlockEventListener::on_event`], which normalizes the raw
//! notification, consults the checkpointer to suppress duplicates, hands
//! the block to the application handler and then records forward progress.
//! The transport may deliver at-least-once; the application sees each
//! position at most once while a checkpointer is configured.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::Span;

use ledgerevents_core::{
    normalize, BlockEvent, BlockPayload, BlockPosition, CheckpointError, Checkpointer,
    MalformedEvent, NotificationKind, TransportError,
};

use crate::event_source::{EventServiceManager, EventSubscription};

/// Registration options: live tail by default, or a bounded historical
/// replay when `replay` is set. `end_block` is inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    pub replay: bool,
    pub start_block: Option<BlockPosition>,
    pub end_block: Option<BlockPosition>,
}

/// One delivery to the application.
#[derive(Debug)]
pub enum Delivery {
    /// A block at `key` (the decimal position). The payload is `None` for
    /// forwarded end-of-replay markers and for notifications that carried
    /// a position but no recognizable block data.
    Block {
        key: String,
        payload: Option<BlockPayload>,
    },
    /// A transport-level failure, forwarded verbatim from the source.
    Failure(TransportError),
}

/// The application's seam. Errors returned here are logged and absorbed —
/// they never terminate the listener and never skip the checkpoint write.
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    async fn on_delivery(&self, delivery: Delivery) -> anyhow::Result<()>;
}

/// Errors surfaced by the listener to its own caller (never to the
/// application handler).
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `register` was called while a registration is active.
    #[error("listener is already registered")]
    AlreadyRegistered,

    /// The notification could not be resolved to a position.
    #[error(transparent)]
    Malformed(#[from] MalformedEvent),

    /// Binding to the event source failed.
    #[error("registration failed: {0}")]
    Registration(#[from] TransportError),

    /// The checkpoint store failed; the event is not settled.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// What the delivery loop should do after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The bounded replay reached its inclusive end; stop forwarding.
    Stop,
}

struct ActiveRegistration {
    shutdown: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

struct ListenerInner {
    manager: Arc<dyn EventServiceManager>,
    handler: Arc<dyn DeliveryHandler>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    options: ListenerOptions,
    span: Span,
    active: Mutex<Option<ActiveRegistration>>,
}

/// Builder for [`BlockEventListener`].
pub struct ListenerBuilder {
    manager: Arc<dyn EventServiceManager>,
    handler: Arc<dyn DeliveryHandler>,
    options: ListenerOptions,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    span: Option<Span>,
}

impl ListenerBuilder {
    /// Deduplicate deliveries through `checkpointer`. Without one, every
    /// notification reaches the handler, duplicates included.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Scope the listener's diagnostics to `span` instead of a fresh
    /// per-instance span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> BlockEventListener {
        BlockEventListener {
            inner: Arc::new(ListenerInner {
                manager: self.manager,
                handler: self.handler,
                checkpointer: self.checkpointer,
                options: self.options,
                span: self
                    .span
                    .unwrap_or_else(|| tracing::info_span!("block_listener")),
                active: Mutex::new(None),
            }),
        }
    }
}

/// A block-event listener bound to at most one registration at a time.
///
/// State machine: `Unregistered → Registered → Unregistered`. Cloning
/// shares the same listener.
#[derive(Clone)]
pub struct BlockEventListener {
    inner: Arc<ListenerInner>,
}

impl BlockEventListener {
    pub fn builder(
        manager: Arc<dyn EventServiceManager>,
        handler: Arc<dyn DeliveryHandler>,
        options: ListenerOptions,
    ) -> ListenerBuilder {
        ListenerBuilder {
            manager,
            handler,
            options,
            checkpointer: None,
            span: None,
        }
    }

    /// Bind to the event source and start the delivery task.
    ///
    /// Picks the live or replay service per [`ListenerOptions::replay`].
    /// Rejected with [`ListenerError::AlreadyRegistered`] while a previous
    /// registration is still active.
    pub async fn register(&self) -> Result<(), ListenerError> {
        let mut active = self.inner.active.lock().await;
        if let Some(registration) = active.as_ref() {
            if !registration.task.is_finished() {
                return Err(ListenerError::AlreadyRegistered);
            }
            // The delivery task already ended (bounded replay reached its
            // end, or the source closed the subscription); the stale
            // registration can be replaced.
            *active = None;
        }

        self.inner.manager.start().await?;
        let service = if self.inner.options.replay {
            self.inner
                .manager
                .replay_event_service(self.inner.options.start_block, self.inner.options.end_block)
        } else {
            self.inner.manager.event_service()
        };
        let subscription = service.register_block_listener().await?;
        tracing::debug!(
            parent: &self.inner.span,
            subscription = %subscription.id,
            peer = service.name(),
            replay = self.inner.options.replay,
            "listener registered"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(delivery_task(
            Arc::clone(&self.inner),
            subscription,
            shutdown_rx,
        ));
        *active = Some(ActiveRegistration {
            shutdown: shutdown_tx,
            task,
        });
        Ok(())
    }

    /// Detach from the event source. Safe to call repeatedly.
    ///
    /// This signals the delivery task rather than aborting it: an event
    /// already in flight completes, so the handler may see at most one
    /// more delivery after this returns.
    pub async fn unregister(&self) {
        let mut active = self.inner.active.lock().await;
        if let Some(registration) = active.take() {
            let _ = registration.shutdown.send(true);
            drop(registration.task);
            tracing::debug!(parent: &self.inner.span, "listener unregistered");
        }
    }

    /// `true` while a registration is active and its delivery task is
    /// still running. A bounded replay that reached its end detaches the
    /// listener without an explicit `unregister`.
    pub async fn is_registered(&self) -> bool {
        matches!(
            &*self.inner.active.lock().await,
            Some(registration) if !registration.task.is_finished()
        )
    }

    /// Process one raw delivery from the event source.
    ///
    /// This is the sole per-event entry point; the spawned delivery task
    /// drives it, and tests may drive it directly. Malformed notifications
    /// and checkpoint failures surface here, to the caller — the
    /// application handler never sees them.
    pub async fn on_event(&self, event: BlockEvent) -> Result<Flow, ListenerError> {
        self.inner.on_event(event).await
    }
}

impl ListenerInner {
    async fn on_event(&self, event: BlockEvent) -> Result<Flow, ListenerError> {
        let raw = match event {
            BlockEvent::Failure(err) => {
                self.deliver(Delivery::Failure(err)).await;
                return Ok(Flow::Continue);
            }
            BlockEvent::Notification(raw) => raw,
        };

        let note = normalize(raw)?;

        if note.kind == NotificationKind::EndOfReplay {
            if let Some(end) = self.options.end_block {
                if note.position >= end {
                    tracing::debug!(
                        parent: &self.span,
                        position = %note.position,
                        "bounded replay complete"
                    );
                    return Ok(Flow::Stop);
                }
            }
            // Below the bound (or unbounded): the marker is forwarded and
            // checkpointed like any other event.
        }

        let key = note.position.to_string();
        let already_seen = match &self.checkpointer {
            Some(checkpointer) => checkpointer.check(&key).await?,
            None => false,
        };

        if already_seen {
            tracing::debug!(parent: &self.span, block = %key, "suppressing duplicate delivery");
        } else {
            if note.kind == NotificationKind::Unrecognized {
                tracing::warn!(
                    parent: &self.span,
                    block = %key,
                    "notification carries no recognizable payload, delivering without one"
                );
            }
            self.deliver(Delivery::Block {
                key: key.clone(),
                payload: note.kind.into_payload(),
            })
            .await;
        }

        // Progress is recorded even when the delivery was skipped, so a
        // restart resumes strictly after the highest observed position.
        if let Some(checkpointer) = &self.checkpointer {
            checkpointer.save(&key).await?;
        }
        Ok(Flow::Continue)
    }

    async fn deliver(&self, delivery: Delivery) {
        let context = match &delivery {
            Delivery::Block { key, .. } => key.clone(),
            Delivery::Failure(_) => "transport failure".to_string(),
        };
        if let Err(err) = self.handler.on_delivery(delivery).await {
            tracing::warn!(
                parent: &self.span,
                delivery = %context,
                error = %format!("{err:#}"),
                "delivery handler failed"
            );
        }
    }
}

/// Drains one subscription until shutdown, channel close or end of replay.
async fn delivery_task(
    inner: Arc<ListenerInner>,
    mut subscription: EventSubscription,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            event = subscription.events.recv() => {
                let Some(event) = event else {
                    tracing::debug!(parent: &inner.span, "event source closed the subscription");
                    break;
                };
                match inner.on_event(event).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Stop) => break,
                    Err(ListenerError::Malformed(err)) => {
                        tracing::warn!(parent: &inner.span, error = %err, "dropping malformed notification");
                    }
                    Err(err) => {
                        tracing::error!(parent: &inner.span, error = %err, "delivery loop failed");
                        break;
                    }
                }
            }
        }
    }
    // Dropping the subscription closes the channel and detaches from the
    // source.
}
