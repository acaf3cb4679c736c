//! Serializable scene trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::memory::ScalarValue;

/// A node and everything below it, as stored on disk.
///
/// ```json
/// {
///   "members": {
///     "HUDMenu": {
///       "depth": -16384,
///       "members": { "compass": { "depth": -16383 }, "version": 3 }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Stacking order within the parent.
    #[serde(default)]
    pub depth: i32,

    /// Asset last loaded into the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    /// Named members, nodes and scalars alike.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, SnapshotMember>,
}

/// A member of a snapshot node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotMember {
    Node(SceneSnapshot),
    Scalar(ScalarValue),
}

impl SceneSnapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::NodeAddress;
    use crate::scene::{MemoryScene, MemoryValue, SceneHost};

    const HUD_JSON: &str = r#"{
        "members": {
            "HUDMenu": {
                "depth": -16384,
                "members": {
                    "compass": { "depth": -16383 },
                    "version": 3,
                    "title": "Skyrim",
                    "visible": true
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_members() {
        let snapshot = SceneSnapshot::from_json(HUD_JSON).unwrap();

        let Some(SnapshotMember::Node(hud)) = snapshot.members.get("HUDMenu") else {
            panic!("HUDMenu should be a node");
        };
        assert_eq!(hud.depth, -16384);
        assert!(matches!(hud.members.get("compass"), Some(SnapshotMember::Node(_))));
        assert_eq!(
            hud.members.get("version"),
            Some(&SnapshotMember::Scalar(ScalarValue::Number(3.0)))
        );
        assert_eq!(
            hud.members.get("title"),
            Some(&SnapshotMember::Scalar(ScalarValue::Text("Skyrim".to_string())))
        );
        assert_eq!(
            hud.members.get("visible"),
            Some(&SnapshotMember::Scalar(ScalarValue::Bool(true)))
        );
    }

    #[test]
    fn test_memory_scene_from_snapshot() {
        let snapshot = SceneSnapshot::from_json(HUD_JSON).unwrap();
        let scene = MemoryScene::from_snapshot(&snapshot);

        let compass = scene.node_at("HUDMenu.compass").expect("compass node");
        assert_eq!(scene.depth(compass), Some(-16383));
        assert!(matches!(
            scene.resolve(&NodeAddress::new("HUDMenu.title")),
            Some(MemoryValue::Scalar(ScalarValue::Text(_)))
        ));
    }

    #[test]
    fn test_memory_scene_snapshot_preserves_tree() {
        let snapshot = SceneSnapshot::from_json(HUD_JSON).unwrap();
        let scene = MemoryScene::from_snapshot(&snapshot);

        assert_eq!(scene.to_snapshot(), snapshot);
    }
}
