//! Override tree enumeration.
//!
//! Override trees are authored by users and may be arbitrarily deep, so the
//! walk keeps its pending entries on an explicit heap stack instead of
//! recursing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::address::{derive_node_address, lexically_relative, matches_extension, NodeAddress};

/// Depth-first walker yielding every override asset below a root.
///
/// Siblings come out in the reverse of filesystem enumeration order (they are
/// popped off a stack); no sorting is applied. The walker is one-shot: once it
/// returns `None` it stays exhausted, and a fresh walk needs a new walker.
///
/// An enumeration error is yielded once and ends the walk.
#[derive(Debug)]
pub struct OverrideTreeWalker {
    stack: Vec<PathBuf>,
    extension: String,
    failed: bool,
}

impl OverrideTreeWalker {
    /// Start a walk at `root`, yielding files carrying `extension`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            stack: vec![root.into()],
            extension: extension.into(),
            failed: false,
        }
    }

    /// Number of entries discovered but not yet visited.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    fn push_children(&mut self, dir: &Path) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            // Symlinked directories could loop back on themselves
            if entry.file_type()?.is_symlink() && path.is_dir() {
                warn!(
                    path = %path.display(),
                    "Symlinked override directory is not followed; its assets are ignored"
                );
                continue;
            }

            self.stack.push(path);
        }
        Ok(())
    }
}

impl Iterator for OverrideTreeWalker {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(current) = self.stack.pop() {
            if current.is_dir() {
                if let Err(e) = self.push_children(&current) {
                    self.failed = true;
                    self.stack.clear();
                    return Some(Err(e));
                }
            } else if matches_extension(&current, &self.extension) {
                return Some(Ok(current));
            } else {
                trace!(path = %current.display(), "Skipping non-asset file");
            }
        }

        None
    }
}

/// One discovered override asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideAsset {
    /// Absolute path of the asset file.
    pub path: PathBuf,

    /// Path relative to the interface base, with `/` separators.
    ///
    /// This is what the host loads, and what diagnostics report.
    pub relative_path: String,

    /// Node the asset targets; empty when the file is not an asset.
    pub address: NodeAddress,
}

impl OverrideAsset {
    /// Describe the asset at `path` found below `override_root`.
    pub fn new(path: PathBuf, override_root: &Path, interface_base: &Path, extension: &str) -> Self {
        let relative_path = lexically_relative(&path, interface_base);
        let address = derive_node_address(&path, override_root, extension);
        Self {
            path,
            relative_path,
            address,
        }
    }
}
