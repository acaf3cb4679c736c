//! Per-asset create-or-replace decisions.
//!
//! For an asset targeting `A` with parent `P`:
//!
//! ```text
//! A empty ──────────────────────────────► skip
//! P absent ─────────────────────────────► skip
//! P not a node ─────────────────────────► abort
//! A absent ─────────────────────────────► create
//! A not a node ─────────────────────────► abort
//! A node ──► pre-replace, reorder, remove ► create
//! ```
//!
//! Every outcome is local to the asset. An abort never stops the batch, and
//! the only way one asset affects another is through the tree state it
//! leaves behind.

use std::fmt;

use tracing::{debug, trace, warn, Level};

use crate::messages::{PatchDispatcher, PatchMessage};
use crate::resolver::{LiveNodeResolver, Resolution};
use crate::scene::SceneHost;
use crate::surface::SceneSurfaceIdentity;
use crate::walker::OverrideAsset;

/// Stacking order a node is moved to before removal.
///
/// Hosts refuse to remove nodes left at the negative depths authoring tools
/// assign.
pub const REMOVABLE_ORDER: i32 = 1;

/// Why an asset was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file does not map to an address.
    NoTarget,

    /// Nothing to attach to yet.
    ParentAbsent,
}

/// Why an asset was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The parent address holds something that is not a node.
    ParentConflict,

    /// The target address holds something that is not a node.
    TargetConflict,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::ParentConflict => f.write_str("parent is not a display node"),
            AbortReason::TargetConflict => f.write_str("target is not a display node"),
        }
    }
}

/// Result of applying one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Skipped(SkipReason),
    Created,
    Replaced,
    Aborted(AbortReason),
}

impl PatchOutcome {
    /// Whether the asset was loaded into the tree.
    pub fn is_loaded(&self) -> bool {
        matches!(self, PatchOutcome::Created | PatchOutcome::Replaced)
    }
}

/// Applies override assets to a live scene graph.
pub struct PatchApplier<'a, H, D> {
    host: &'a mut H,
    dispatcher: &'a mut D,
    surface: &'a SceneSurfaceIdentity,
    dump_members: bool,
}

impl<'a, H, D> PatchApplier<'a, H, D>
where
    H: SceneHost,
    D: PatchDispatcher<H::Node, H::Value>,
{
    /// Create an applier patching `host` on behalf of `surface`.
    pub fn new(host: &'a mut H, dispatcher: &'a mut D, surface: &'a SceneSurfaceIdentity) -> Self {
        Self {
            host,
            dispatcher,
            surface,
            dump_members: false,
        }
    }

    /// Log node members at trace level around each mutation.
    pub fn with_member_dumps(mut self, enabled: bool) -> Self {
        self.dump_members = enabled;
        self
    }

    /// Apply one asset.
    pub fn apply(&mut self, asset: &OverrideAsset) -> PatchOutcome {
        if asset.address.is_empty() {
            trace!(path = %asset.path.display(), "No target address, skipping");
            return PatchOutcome::Skipped(SkipReason::NoTarget);
        }

        debug!(path = %asset.path.display(), address = %asset.address, "Patch found");

        let (parent_address, leaf) = asset.address.split_leaf();

        let parent = match LiveNodeResolver::new(&*self.host).resolve(&parent_address) {
            Resolution::Absent => {
                debug!(parent = %parent_address, asset = %asset.relative_path, "Parent absent, skipping");
                return PatchOutcome::Skipped(SkipReason::ParentAbsent);
            }
            Resolution::Incompatible(value) => {
                self.abort(value, asset);
                return PatchOutcome::Aborted(AbortReason::ParentConflict);
            }
            Resolution::Node(parent) => parent,
        };

        match LiveNodeResolver::new(&*self.host).resolve(&asset.address) {
            Resolution::Absent => {
                self.create(leaf, &parent, asset);
                PatchOutcome::Created
            }
            Resolution::Incompatible(value) => {
                self.abort(value, asset);
                PatchOutcome::Aborted(AbortReason::TargetConflict)
            }
            Resolution::Node(existing) => {
                self.replace(leaf, &existing, &parent, asset);
                PatchOutcome::Replaced
            }
        }
    }

    fn create(&mut self, name: &str, parent: &H::Node, asset: &OverrideAsset) {
        trace!(asset = %asset.relative_path, "Before loading node");

        let order = self.host.next_available_order(parent);
        let node = self.host.create_child(parent, name, order);
        self.host.load_asset_into(&node, &asset.relative_path);

        self.log_members(parent);
        self.log_members(&node);

        self.dispatcher.dispatch(PatchMessage::PostPatch {
            surface: self.surface.handle(),
            url: self.surface.url().to_string(),
            node,
        });
    }

    fn replace(&mut self, name: &str, existing: &H::Node, parent: &H::Node, asset: &OverrideAsset) {
        trace!(asset = %asset.relative_path, "Before removing node");

        self.dispatcher.dispatch(PatchMessage::PreReplace {
            surface: self.surface.handle(),
            url: self.surface.url().to_string(),
            node: existing.clone(),
        });

        self.log_members(parent);
        self.log_members(existing);

        self.host.set_order(existing, REMOVABLE_ORDER);
        self.host.remove(existing);

        trace!(asset = %asset.relative_path, "After removing node");
        self.log_members(parent);

        self.create(name, parent, asset);
    }

    fn abort(&mut self, value: H::Value, asset: &OverrideAsset) {
        warn!(
            "{} exists in the scene, but it is not a display node. Aborting patch for {}",
            value, asset.relative_path
        );

        self.dispatcher.dispatch(PatchMessage::AbortPatch {
            surface: self.surface.handle(),
            url: self.surface.url().to_string(),
            value,
            relative_path: asset.relative_path.clone(),
        });
    }

    fn log_members(&self, node: &H::Node) {
        if !self.dump_members || !tracing::enabled!(Level::TRACE) {
            return;
        }

        trace!(node = ?node, "Members:");
        for (name, value) in self.host.members(node) {
            trace!(node = ?node, "  {}: {}", name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::address::NodeAddress;
    use crate::messages::{HostMessage, MessageKind, SurfaceHandle};
    use crate::scene::{MemoryScene, MemoryValue, ScalarValue};

    fn surface() -> SceneSurfaceIdentity {
        SceneSurfaceIdentity::new(SurfaceHandle(42), "Interface/HUDMenu.swf")
    }

    fn asset(address: &str) -> OverrideAsset {
        let relative = format!("InfinityUI/HUDMenu/{}.swf", address.replace('.', "/"));
        OverrideAsset {
            path: PathBuf::from("/game/Data/Interface").join(&relative),
            relative_path: relative,
            address: NodeAddress::new(address),
        }
    }

    fn apply(scene: &mut MemoryScene, asset: &OverrideAsset) -> (PatchOutcome, Vec<HostMessage<MemoryScene>>) {
        let surface = surface();
        let mut messages = Vec::new();
        let outcome = PatchApplier::new(scene, &mut messages, &surface).apply(asset);
        (outcome, messages)
    }

    fn kinds(messages: &[HostMessage<MemoryScene>]) -> Vec<MessageKind> {
        messages.iter().map(|m| m.kind()).collect()
    }

    #[test]
    fn test_empty_address_is_skipped() {
        let mut scene = MemoryScene::new();
        let before = scene.node_count();

        let (outcome, messages) = apply(&mut scene, &asset(""));

        assert_eq!(outcome, PatchOutcome::Skipped(SkipReason::NoTarget));
        assert!(messages.is_empty());
        assert_eq!(scene.node_count(), before);
    }

    #[test]
    fn test_absent_parent_is_skipped() {
        let mut scene = MemoryScene::new();

        let (outcome, messages) = apply(&mut scene, &asset("HUDMenu.compass"));

        assert_eq!(outcome, PatchOutcome::Skipped(SkipReason::ParentAbsent));
        assert!(messages.is_empty());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_create_under_root() {
        let mut scene = MemoryScene::new();

        let (outcome, messages) = apply(&mut scene, &asset("compass"));

        assert_eq!(outcome, PatchOutcome::Created);
        let compass = scene.node_at("compass").expect("compass created");
        assert_eq!(scene.loaded_asset(compass), Some("InfinityUI/HUDMenu/compass.swf"));
        assert_eq!(kinds(&messages), vec![MessageKind::PostPatch]);
        assert!(matches!(
            &messages[0],
            PatchMessage::PostPatch { node, surface, .. } if *node == compass && *surface == SurfaceHandle(42)
        ));
    }

    #[test]
    fn test_create_uses_next_available_order() {
        let mut scene = MemoryScene::new();
        let hud = scene.add_node(scene.root(), "HUDMenu", -16384);
        scene.add_node(hud, "existing", 3);

        apply(&mut scene, &asset("HUDMenu.compass"));

        let compass = scene.node_at("HUDMenu.compass").unwrap();
        assert_eq!(scene.depth(compass), Some(4));
    }

    #[test]
    fn test_replace_negative_depth_node() {
        let mut scene = MemoryScene::new();
        let hud = scene.add_node(scene.root(), "HUDMenu", -16384);
        let original = scene.add_node(hud, "compass", -16383);

        let (outcome, messages) = apply(&mut scene, &asset("HUDMenu.compass"));

        assert_eq!(outcome, PatchOutcome::Replaced);
        assert_eq!(kinds(&messages), vec![MessageKind::PreReplace, MessageKind::PostPatch]);
        assert!(matches!(&messages[0], PatchMessage::PreReplace { node, .. } if *node == original));

        assert!(!scene.contains(original));
        assert_eq!(scene.refused_removals(), 0);
        let replacement = scene.node_at("HUDMenu.compass").unwrap();
        assert_ne!(replacement, original);
        assert_eq!(
            scene.loaded_asset(replacement),
            Some("InfinityUI/HUDMenu/HUDMenu/compass.swf")
        );
    }

    #[test]
    fn test_target_conflict_aborts_without_mutation() {
        let mut scene = MemoryScene::new();
        let hud = scene.add_node(scene.root(), "HUDMenu", 0);
        scene.set_scalar(hud, "compass", ScalarValue::Number(42.0));
        let before = scene.to_snapshot();

        let (outcome, messages) = apply(&mut scene, &asset("HUDMenu.compass"));

        assert_eq!(outcome, PatchOutcome::Aborted(AbortReason::TargetConflict));
        assert!(!outcome.is_loaded());
        assert_eq!(scene.to_snapshot(), before);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            PatchMessage::AbortPatch {
                value,
                relative_path,
                ..
            } => {
                assert_eq!(value.to_string(), "42");
                assert_eq!(relative_path, "InfinityUI/HUDMenu/HUDMenu/compass.swf");
            }
            other => panic!("expected AbortPatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_conflict_aborts_without_mutation() {
        let mut scene = MemoryScene::new();
        scene.set_scalar(scene.root(), "HUDMenu", ScalarValue::Text("loading".to_string()));
        let before = scene.to_snapshot();

        let (outcome, messages) = apply(&mut scene, &asset("HUDMenu.compass"));

        assert_eq!(outcome, PatchOutcome::Aborted(AbortReason::ParentConflict));
        assert_eq!(scene.to_snapshot(), before);
        assert!(matches!(
            &messages[..],
            [PatchMessage::AbortPatch { value: MemoryValue::Scalar(ScalarValue::Text(t)), .. }] if t == "loading"
        ));
    }

    #[test]
    fn test_outcome_is_loaded() {
        assert!(PatchOutcome::Created.is_loaded());
        assert!(PatchOutcome::Replaced.is_loaded());
        assert!(!PatchOutcome::Skipped(SkipReason::ParentAbsent).is_loaded());
        assert!(!PatchOutcome::Aborted(AbortReason::ParentConflict).is_loaded());
    }

    #[test]
    fn test_member_dumps_do_not_change_behavior() {
        let mut scene = MemoryScene::new();
        let surface = surface();
        let mut messages: Vec<HostMessage<MemoryScene>> = Vec::new();

        let outcome = PatchApplier::new(&mut scene, &mut messages, &surface)
            .with_member_dumps(true)
            .apply(&asset("compass"));

        assert_eq!(outcome, PatchOutcome::Created);
        assert!(scene.node_at("compass").is_some());
    }
}
