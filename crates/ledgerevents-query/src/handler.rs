//! The peer-selection policy contract shared by both strategies.

use std::sync::Arc;

use thiserror::Error;

use crate::network::{Network, Peer};

/// Errors from query-handler construction.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The caller's organization has no endorsing peers on this channel.
    /// Construction fails fast rather than returning a policy that can
    /// never select a target.
    #[error("no peers available for organization {msp_id}")]
    NoPeersAvailable { msp_id: String },
}

/// A peer-selection policy consumed by the query-execution path.
///
/// `target` picks the peer for the next query; `report_failure` tells the
/// policy the current target errored so it can fail over.
pub trait QueryHandler: Send + Sync {
    fn target(&self) -> Arc<dyn Peer>;

    fn report_failure(&self);
}

/// Resolve the caller's own-organization peer set, failing fast when it is
/// empty.
pub(crate) fn own_org_peers(network: &dyn Network) -> Result<Vec<Arc<dyn Peer>>, QueryError> {
    let msp_id = network.msp_id();
    let peers = network.endorsers(msp_id);
    if peers.is_empty() {
        return Err(QueryError::NoPeersAvailable {
            msp_id: msp_id.to_string(),
        });
    }
    Ok(peers)
}
