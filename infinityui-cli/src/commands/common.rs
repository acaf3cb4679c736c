//! Options shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use infinityui::config::ApplyOrder;
use infinityui::messages::SurfaceHandle;
use infinityui::surface::SceneSurfaceIdentity;
use infinityui::LoaderConfig;

/// Selects the surface whose overrides are processed.
#[derive(Debug, Clone, Args)]
pub struct SurfaceArgs {
    /// Origin URL of the loaded movie (e.g. Interface/Exported/HUDMenu.swf)
    #[arg(long)]
    pub surface: String,

    /// Apply parents before children regardless of directory order
    #[arg(long)]
    pub depth_sorted: bool,
}

impl SurfaceArgs {
    /// Surface identity for the selected movie.
    pub fn identity(&self) -> SceneSurfaceIdentity {
        SceneSurfaceIdentity::new(SurfaceHandle(1), self.surface.as_str())
    }

    /// Apply the flags on top of the loaded configuration.
    pub fn configure(&self, config: LoaderConfig) -> LoaderConfig {
        if self.depth_sorted {
            config.with_apply_order(ApplyOrder::DepthSorted)
        } else {
            config
        }
    }
}

/// Resolve the loader configuration: file first, then CLI overrides.
pub fn load_config(
    path: Option<&PathBuf>,
    game_dir: Option<&PathBuf>,
) -> Result<LoaderConfig, infinityui::config::ConfigError> {
    let config = match path {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };

    Ok(match game_dir {
        Some(dir) => config.with_game_dir(dir),
        None => config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_game_dir_flag_overrides_file() {
        let temp = TempDir::new().unwrap();
        let ini = temp.path().join("InfinityUI.ini");
        std::fs::write(&ini, "[Paths]\ngame_dir = /from/file\n").unwrap();

        let flag = PathBuf::from("/from/flag");
        let config = load_config(Some(&ini), Some(&flag)).unwrap();
        assert_eq!(config.game_dir, Some(flag));

        let config = load_config(Some(&ini), None).unwrap();
        assert_eq!(config.game_dir, Some(PathBuf::from("/from/file")));
    }

    #[test]
    fn test_depth_sorted_flag() {
        let args = SurfaceArgs {
            surface: "Interface/HUDMenu.swf".to_string(),
            depth_sorted: true,
        };
        let config = args.configure(LoaderConfig::default());
        assert_eq!(config.apply_order, ApplyOrder::DepthSorted);
        assert_eq!(args.identity().basename(), "HUDMenu");
    }
}
