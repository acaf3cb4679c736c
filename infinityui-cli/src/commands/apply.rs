//! Apply command - run a patch session against a scene snapshot.
//!
//! The snapshot stands in for the movie's live scene graph. Every lifecycle
//! message is printed as it would reach the host, and the patched tree is
//! written back out as JSON.

use std::path::{Path, PathBuf};

use clap::Args;
use infinityui::messages::{HostMessage, PatchMessage};
use infinityui::scene::{MemoryScene, SceneSnapshot};
use infinityui::{LoaderConfig, PatchSession};
use tracing::info;

use super::common::SurfaceArgs;
use crate::error::CliError;

/// Arguments for the apply command.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub surface: SurfaceArgs,

    /// JSON snapshot of the scene graph to patch
    #[arg(long)]
    pub scene: PathBuf,

    /// Write the patched snapshot here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Run the apply command.
pub fn run(args: ApplyArgs, config: LoaderConfig) -> Result<(), CliError> {
    let config = args.surface.configure(config);

    let snapshot = SceneSnapshot::from_json(&read(&args.scene)?)?;
    let mut scene = MemoryScene::from_snapshot(&snapshot);
    info!(scene = %args.scene.display(), nodes = scene.node_count(), "Scene loaded");

    let mut messages: Vec<HostMessage<MemoryScene>> = Vec::new();
    let report = PatchSession::new(&config, args.surface.identity()).run(&mut scene, &mut messages)?;

    for message in &messages {
        eprintln!("{}", describe(message));
    }
    eprintln!(
        "created {}, replaced {}, aborted {}, skipped {}",
        report.created, report.replaced, report.aborted, report.skipped
    );

    let json = scene.to_snapshot().to_json()?;
    match &args.out {
        Some(path) => std::fs::write(path, json).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?,
        None => println!("{}", json),
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn describe(message: &HostMessage<MemoryScene>) -> String {
    match message {
        PatchMessage::StartLoad { surface, url } => format!("[{}] start {}", surface, url),
        PatchMessage::PostPatch { surface, node, .. } => format!("[{}] patched {}", surface, node),
        PatchMessage::PreReplace { surface, node, .. } => {
            format!("[{}] replacing {}", surface, node)
        }
        PatchMessage::AbortPatch {
            surface,
            value,
            relative_path,
            ..
        } => format!("[{}] aborted {} ({})", surface, relative_path, value),
        PatchMessage::FinishLoad {
            surface,
            load_count,
            ..
        } => format!("[{}] finished, {} loaded", surface, load_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infinityui::messages::SurfaceHandle;
    use tempfile::TempDir;

    use crate::commands::common::SurfaceArgs;

    #[test]
    fn test_apply_writes_patched_snapshot() {
        let temp = TempDir::new().unwrap();
        let override_root = temp.path().join("Data/Interface/InfinityUI/HUDMenu");
        std::fs::create_dir_all(&override_root).unwrap();
        std::fs::write(override_root.join("compass.swf"), b"FWS").unwrap();

        let scene = temp.path().join("scene.json");
        std::fs::write(&scene, r#"{ "members": { "compass": { "depth": -16383 } } }"#).unwrap();
        let out = temp.path().join("patched.json");

        let args = ApplyArgs {
            surface: SurfaceArgs {
                surface: "Interface/HUDMenu.swf".to_string(),
                depth_sorted: false,
            },
            scene,
            out: Some(out.clone()),
        };
        run(args, LoaderConfig::new(temp.path())).unwrap();

        let patched = SceneSnapshot::from_json(&std::fs::read_to_string(out).unwrap()).unwrap();
        let scene = MemoryScene::from_snapshot(&patched);
        let compass = scene.node_at("compass").unwrap();
        assert_eq!(
            scene.loaded_asset(compass),
            Some("InfinityUI/HUDMenu/compass.swf")
        );
    }

    #[test]
    fn test_apply_missing_scene() {
        let temp = TempDir::new().unwrap();
        let args = ApplyArgs {
            surface: SurfaceArgs {
                surface: "Interface/HUDMenu.swf".to_string(),
                depth_sorted: false,
            },
            scene: temp.path().join("missing.json"),
            out: None,
        };
        let err = run(args, LoaderConfig::new(temp.path())).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_describe_finish() {
        let message: HostMessage<MemoryScene> = PatchMessage::FinishLoad {
            surface: SurfaceHandle(1),
            url: "Interface/HUDMenu.swf".to_string(),
            load_count: 2,
        };
        assert_eq!(describe(&message), "[surface-1] finished, 2 loaded");
    }
}
