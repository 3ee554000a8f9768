//! Single-sticky strategy: same peer every query, fail over on error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::handler::{own_org_peers, QueryError, QueryHandler};
use crate::network::{Network, Peer};

/// Sticky peer selection over the caller's own organization.
///
/// Successive queries hit the same peer; only a reported failure moves the
/// affinity to the next peer in the set, wrapping around.
pub struct SingleQueryHandler {
    peers: Vec<Arc<dyn Peer>>,
    current: AtomicUsize,
}

impl std::fmt::Debug for SingleQueryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleQueryHandler")
            .field(
                "peers",
                &self.peers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("current", &self.current)
            .finish()
    }
}

/// Build a sticky query handler over the caller's own-organization peers.
pub fn single_query_handler(network: &dyn Network) -> Result<SingleQueryHandler, QueryError> {
    Ok(SingleQueryHandler {
        peers: own_org_peers(network)?,
        current: AtomicUsize::new(0),
    })
}

impl QueryHandler for SingleQueryHandler {
    fn target(&self) -> Arc<dyn Peer> {
        let idx = self.current.load(Ordering::Relaxed) % self.peers.len();
        Arc::clone(&self.peers[idx])
    }

    fn report_failure(&self) {
        let idx = self.current.fetch_add(1, Ordering::Relaxed);
        let failed = &self.peers[idx % self.peers.len()];
        let next = &self.peers[(idx + 1) % self.peers.len()];
        tracing::debug!(
            failed = failed.name(),
            next = next.name(),
            "query target failed, moving affinity"
        );
    }
}
