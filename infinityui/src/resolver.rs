//! Live node lookup and classification.

use tracing::trace;

use crate::address::NodeAddress;
use crate::scene::SceneHost;

/// What an address resolves to in the live tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<N, V> {
    /// Nothing lives at the address.
    Absent,

    /// A structured node the loader may manipulate.
    Node(N),

    /// Something lives at the address, but it is not a manipulable node.
    Incompatible(V),
}

impl<N, V> Resolution<N, V> {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Absent => "absent",
            Resolution::Node(_) => "node",
            Resolution::Incompatible(_) => "incompatible",
        }
    }
}

/// Resolution as produced for a given host.
pub type HostResolution<H> = Resolution<<H as SceneHost>::Node, <H as SceneHost>::Value>;

/// Resolves addresses against the current state of a host's scene graph.
///
/// Every lookup goes to the host; nothing is cached, so lookups see every
/// mutation made earlier in the same session.
#[derive(Debug)]
pub struct LiveNodeResolver<'a, H> {
    host: &'a H,
}

impl<'a, H: SceneHost> LiveNodeResolver<'a, H> {
    /// Create a resolver over `host`.
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Resolve and classify `address`.
    pub fn resolve(&self, address: &NodeAddress) -> HostResolution<H> {
        let resolution = match self.host.resolve(address) {
            None => Resolution::Absent,
            Some(value) => match self.host.as_node(&value) {
                Some(node) => Resolution::Node(node),
                None => Resolution::Incompatible(value),
            },
        };

        trace!(address = %address, kind = resolution.kind(), "Resolved address");
        resolution
    }
}
