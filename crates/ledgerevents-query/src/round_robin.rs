//! Round-robin strategy: rotate through the peer set on every query.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::handler::{own_org_peers, QueryError, QueryHandler};
use crate::network::{Network, Peer};

/// Rotating peer selection over the caller's own organization.
///
/// Every `target` call advances a cursor through the fixed directory
/// order, regardless of how the previous query fared, spreading load
/// evenly across the set.
pub struct RoundRobinQueryHandler {
    peers: Vec<Arc<dyn Peer>>,
    cursor: AtomicUsize,
}

/// Build a round-robin query handler over the caller's own-organization
/// peers.
pub fn round_robin_query_handler(
    network: &dyn Network,
) -> Result<RoundRobinQueryHandler, QueryError> {
    Ok(RoundRobinQueryHandler {
        peers: own_org_peers(network)?,
        cursor: AtomicUsize::new(0),
    })
}

impl QueryHandler for RoundRobinQueryHandler {
    fn target(&self) -> Arc<dyn Peer> {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.peers.len();
        Arc::clone(&self.peers[idx])
    }

    fn report_failure(&self) {
        // The rotation already advances on every selection; a failure
        // simply means the next query lands on the next peer.
        tracing::debug!("query target failed, rotation continues");
    }
}
