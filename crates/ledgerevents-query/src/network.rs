//! Consumed membership seams: peers and the network directory.

use std::sync::Arc;

/// A ledger peer able to service queries.
pub trait Peer: Send + Sync {
    /// Endpoint name, for diagnostics.
    fn name(&self) -> &str;

    /// The organization (MSP) this peer belongs to.
    fn msp_id(&self) -> &str;
}

/// The channel/membership directory, implemented by the surrounding SDK.
pub trait Network: Send + Sync {
    /// The caller's own organization.
    fn msp_id(&self) -> &str;

    /// All endorsing peers belonging to `msp_id`, in directory order.
    fn endorsers(&self, msp_id: &str) -> Vec<Arc<dyn Peer>>;
}
