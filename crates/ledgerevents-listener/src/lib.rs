//! ledgerevents-listener — checkpointed block-event delivery.
//!
//! # Features
//! - Registration against a live or bounded-replay event service
//! - Normalization of raw notifications once at ingress
//! - Checkpoint-based duplicate suppression across process restarts
//! - Inclusive end-block termination for historical replays
//! - Handler error isolation: application failures never stall the stream

pub mod event_source;
pub mod listener;

pub use event_source::{EventService, EventServiceManager, EventSubscription, SubscriptionId};
pub use listener::{
    BlockEventListener, Delivery, DeliveryHandler, Flow, ListenerBuilder, ListenerError,
    ListenerOptions,
};
