//! Scene surface identity and its override layout on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::LoaderConfig;
use crate::messages::SurfaceHandle;

/// The scene surface (movie) a session patches.
///
/// Derived once from the surface's origin URL, e.g.
/// `Interface/Exported/HUDMenu.swf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSurfaceIdentity {
    handle: SurfaceHandle,
    url: String,
}

impl SceneSurfaceIdentity {
    /// Identify the surface loaded from `url`.
    pub fn new(handle: SurfaceHandle, url: impl Into<String>) -> Self {
        let url = url.into();
        debug!(url = %url, "Detected scene surface load");
        Self { handle, url }
    }

    /// Host handle of the surface.
    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    /// Origin URL of the surface.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Directory part of the URL, trailing `/` included.
    pub fn directory(&self) -> &str {
        match self.url.rfind('/') {
            Some(slash) => &self.url[..=slash],
            None => "",
        }
    }

    /// File name part of the URL.
    pub fn file_name(&self) -> &str {
        match self.url.rfind('/') {
            Some(slash) => &self.url[slash + 1..],
            None => &self.url,
        }
    }

    /// File name up to its first `.`.
    pub fn basename(&self) -> &str {
        let file_name = self.file_name();
        match file_name.find('.') {
            Some(dot) => &file_name[..dot],
            None => file_name,
        }
    }

    /// Whether the surface was loaded from the exported interface directory.
    pub fn is_exported(&self, interface_dir: &Path, exported_dir: &str) -> bool {
        let interface_name = interface_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Interface");
        let marker = format!("{}/{}/", interface_name, exported_dir);
        self.directory().contains(&marker)
    }
}

/// Where a surface's overrides live, and what their paths are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// `<game>/Data/Interface/InfinityUI/<basename>`.
    pub override_root: PathBuf,

    /// Base for the relative paths handed to the host: `<game>/Data/Interface`,
    /// or its `Exported` subdirectory for exported surfaces.
    pub interface_base: PathBuf,
}

impl SurfaceLayout {
    /// Lay out `surface` below `game_dir`.
    pub fn new(config: &LoaderConfig, game_dir: &Path, surface: &SceneSurfaceIdentity) -> Self {
        let interface_dir = game_dir.join(&config.interface_dir);

        let mut interface_base = interface_dir.clone();
        if surface.is_exported(&config.interface_dir, &config.exported_dir) {
            interface_base.push(&config.exported_dir);
        }
        trace!(
            surface = surface.basename(),
            base = %interface_base.display(),
            "Surface path detected"
        );

        let override_root = interface_dir
            .join(&config.override_dir)
            .join(surface.basename());

        Self {
            override_root,
            interface_base,
        }
    }

    /// Whether anything exists at the override root.
    ///
    /// A regular file there still opens a session; the walk simply finds no
    /// assets in it.
    pub fn has_overrides(&self) -> bool {
        self.override_root.exists()
    }
}
