//! ledgerevents-query — peer-selection strategies for ledger queries.
//!
//! Two factory functions build a [`QueryHandler`] over the caller's
//! own-organization peer set:
//!
//! - [`single_query_handler`] — sticky affinity, failing over only when
//!   the current target errors
//! - [`round_robin_query_handler`] — fixed rotation, spreading load
//!   evenly across the set
//!
//! Either factory fails with [`QueryError::NoPeersAvailable`] when the
//! organization has no peers, so a handler that cannot select a target is
//! never constructed.

pub mod handler;
pub mod network;
pub mod round_robin;
pub mod single;

pub use handler::{QueryError, QueryHandler};
pub use network::{Network, Peer};
pub use round_robin::{round_robin_query_handler, RoundRobinQueryHandler};
pub use single::{single_query_handler, SingleQueryHandler};
