//! Override asset paths to live node addresses.
//!
//! Override trees mirror the scene graph they patch: the file
//! `HUDMenu/compass/needle.swf` under a surface's override root targets the
//! node addressed `HUDMenu.compass.needle`. Everything here is pure string and
//! path manipulation; nothing touches the filesystem.

use std::borrow::Cow;
use std::fmt;
use std::path::{Component, Path};

use tracing::trace;

/// Address of the scene graph root.
pub const ROOT_ADDRESS: &str = "_root";

/// Dot-delimited address of a node in the live scene graph.
///
/// An empty address means "no target" and is produced for paths that are not
/// override assets. The root is addressed by [`ROOT_ADDRESS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddress(String);

impl NodeAddress {
    /// Create an address from its dotted form.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The root address.
    pub fn root() -> Self {
        Self(ROOT_ADDRESS.to_string())
    }

    /// The dotted form of the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address targets nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the root address.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ADDRESS
    }

    /// Member names along the address, root sentinel excluded.
    ///
    /// `_root.HUDMenu.compass` and `HUDMenu.compass` yield the same segments.
    /// Empty segments (`HUDMenu..compass`, `HUDMenu.`) are yielded as `""`,
    /// never skipped, so a malformed address cannot land on an ancestor.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let mut parts = self.0.split('.').peekable();
        if self.0.is_empty() || parts.peek() == Some(&ROOT_ADDRESS) {
            parts.next();
        }
        parts
    }

    /// Number of member hops from the root (0 for the root and the empty address).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Split into the parent address and the leaf member name.
    ///
    /// The leaf is everything after the last `.`, or the whole address when
    /// there is none; the parent is everything before it, or the root.
    pub fn split_leaf(&self) -> (NodeAddress, &str) {
        match self.0.rfind('.') {
            Some(dot) => (NodeAddress::new(&self.0[..dot]), &self.0[dot + 1..]),
            None => (NodeAddress::root(), self.0.as_str()),
        }
    }

    /// Address of the member `name` below this one.
    pub fn child(&self, name: &str) -> NodeAddress {
        if self.is_empty() {
            NodeAddress::new(name)
        } else {
            NodeAddress::new(format!("{}.{}", self.0, name))
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Normalize a configured extension (`.swf`, `SWF`, `swf`) for comparison.
pub(crate) fn normalize_extension(extension: &str) -> &str {
    extension.trim_start_matches('.')
}

/// Whether `path` carries the asset extension (ASCII case-insensitive).
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    let extension = normalize_extension(extension);
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Derive the node address an override asset targets.
///
/// The asset path is taken relative to `override_root`, the asset extension
/// is stripped and every path separator becomes a `.`. Paths that do not
/// carry the extension, do not live below the root, or would name an empty
/// member (`ammo..swf` strips to `ammo.`) yield the empty address: callers
/// treat that as "no target".
pub fn derive_node_address(asset_path: &Path, override_root: &Path, extension: &str) -> NodeAddress {
    if !matches_extension(asset_path, extension) {
        return NodeAddress::default();
    }

    let Ok(relative) = asset_path.strip_prefix(override_root) else {
        return NodeAddress::default();
    };

    let member_path = relative.with_extension("");
    let mut segments: Vec<Cow<'_, str>> = Vec::new();
    for component in member_path.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_string_lossy()),
            Component::CurDir => {}
            _ => return NodeAddress::default(),
        }
    }

    let address = segments.join(".");
    if address.split('.').any(str::is_empty) {
        trace!(path = %asset_path.display(), "Empty member name in override path");
        return NodeAddress::default();
    }

    NodeAddress::new(address)
}

/// Relative path from `base` to `path`, computed lexically with `/` separators.
///
/// Components of `base` not shared with `path` become `..`, so an asset under
/// `Data/Interface/InfinityUI` seen from `Data/Interface/Exported` comes out as
/// `../InfinityUI/...`.
pub fn lexically_relative(path: &Path, base: &Path) -> String {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<Cow<'_, str>> = Vec::new();
    for component in &base_parts[common..] {
        if !matches!(component, Component::CurDir) {
            parts.push(Cow::Borrowed(".."));
        }
    }
    for component in &path_parts[common..] {
        if !matches!(component, Component::CurDir) {
            parts.push(component.as_os_str().to_string_lossy());
        }
    }

    parts.join("/")
}
