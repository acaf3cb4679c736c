//! Live scene graph capability set.
//!
//! The loader never owns the scene graph it patches. It talks to the host
//! through [`SceneHost`], holding only short-lived, non-owning handles for the
//! duration of one patch operation.
//!
//! # Example
//!
//! ```
//! use infinityui::scene::{MemoryScene, SceneHost};
//! use infinityui::address::NodeAddress;
//!
//! let mut scene = MemoryScene::new();
//! let hud = scene.add_node(scene.root(), "HUDMenu", -16384);
//!
//! let value = scene.resolve(&NodeAddress::new("HUDMenu")).unwrap();
//! assert_eq!(scene.as_node(&value), Some(hud));
//! ```

pub mod memory;
mod snapshot;

use std::fmt;

use crate::address::NodeAddress;

pub use memory::{MemoryScene, MemoryValue, NodeId, ScalarValue};
pub use snapshot::{SceneSnapshot, SnapshotMember};

/// Capabilities the loader needs from the host's scene graph.
///
/// Host operation failures (an asset that fails to decode, a refused
/// removal) stay inside the host: these methods report nothing back and the
/// loader does not interpret them.
pub trait SceneHost {
    /// Handle to a structured display node.
    type Node: Clone + fmt::Debug;

    /// Any value the host can resolve at an address.
    type Value: Clone + fmt::Debug + fmt::Display;

    /// Resolve a dotted address against the current tree.
    fn resolve(&self, address: &NodeAddress) -> Option<Self::Value>;

    /// The node behind `value`, if it is a structured node the loader may
    /// manipulate.
    fn as_node(&self, value: &Self::Value) -> Option<Self::Node>;

    /// Create an empty child node named `name` under `parent` at `order`.
    fn create_child(&mut self, parent: &Self::Node, name: &str, order: i32) -> Self::Node;

    /// Load the asset at `relative_path` into `node`.
    fn load_asset_into(&mut self, node: &Self::Node, relative_path: &str);

    /// Next free stacking order among the children of `parent`.
    fn next_available_order(&self, parent: &Self::Node) -> i32;

    /// Move `node` to the stacking order `order`.
    fn set_order(&mut self, node: &Self::Node, order: i32);

    /// Remove `node` from its parent.
    fn remove(&mut self, node: &Self::Node);

    /// Members of `node` as (name, rendered value) pairs, for diagnostics.
    fn members(&self, _node: &Self::Node) -> Vec<(String, String)> {
        Vec::new()
    }
}
