//! Loader configuration.
//!
//! Defaults reproduce the standard layout, so a missing config file is never
//! an error. An INI file can override any of them:
//!
//! ```ini
//! [Paths]
//! game_dir = C:\Games\Skyrim Special Edition
//! override_dir = InfinityUI
//! asset_extension = swf
//!
//! [Patching]
//! apply_order = depth
//! dump_members = true
//!
//! [Logging]
//! level = debug
//! file = InfinityUI.log
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, ParseOption, Properties};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Interface directory, relative to the game directory.
pub const DEFAULT_INTERFACE_DIR: &str = "Data/Interface";

/// Override directory, relative to the interface directory.
pub const DEFAULT_OVERRIDE_DIR: &str = "InfinityUI";

/// Subdirectory of the interface directory holding exported surfaces.
pub const DEFAULT_EXPORTED_DIR: &str = "Exported";

/// Extension of override assets.
pub const DEFAULT_ASSET_EXTENSION: &str = "swf";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed.
    #[error("Failed to load config file {path}: {source}")]
    Load { path: PathBuf, source: ini::Error },

    /// Config text could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// A key holds a value of the wrong shape.
    #[error("Invalid value for [{section}] {key}: {value:?}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// Order in which discovered assets are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyOrder {
    /// Apply each asset as the walk yields it. An asset whose parent has not
    /// been created yet is skipped.
    #[default]
    Walk,

    /// Collect the whole walk, then apply shallow addresses before deep ones
    /// so parents exist before their children are attached.
    DepthSorted,
}

impl FromStr for ApplyOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(ApplyOrder::Walk),
            "depth" | "depth-sorted" | "depth_sorted" => Ok(ApplyOrder::DepthSorted),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ApplyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOrder::Walk => f.write_str("walk"),
            ApplyOrder::DepthSorted => f.write_str("depth"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Maximum level written. `RUST_LOG` takes precedence when set.
    pub level: LevelFilter,

    /// Log file; `None` logs to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            file: None,
        }
    }
}

/// Configuration for patch sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Game directory. `None` uses the process working directory at session time.
    pub game_dir: Option<PathBuf>,

    /// Interface directory, relative to the game directory.
    pub interface_dir: PathBuf,

    /// Override directory, relative to the interface directory.
    pub override_dir: String,

    /// Subdirectory of the interface directory holding exported surfaces.
    pub exported_dir: String,

    /// Extension of override assets, matched case-insensitively.
    pub asset_extension: String,

    /// Order in which assets are applied.
    pub apply_order: ApplyOrder,

    /// Log node members at trace level around every mutation.
    pub dump_members: bool,

    /// Logging settings.
    pub logging: LogConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            game_dir: None,
            interface_dir: PathBuf::from(DEFAULT_INTERFACE_DIR),
            override_dir: DEFAULT_OVERRIDE_DIR.to_string(),
            exported_dir: DEFAULT_EXPORTED_DIR.to_string(),
            asset_extension: DEFAULT_ASSET_EXTENSION.to_string(),
            apply_order: ApplyOrder::Walk,
            dump_members: true,
            logging: LogConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Create a configuration rooted at `game_dir`.
    pub fn new(game_dir: impl Into<PathBuf>) -> Self {
        Self {
            game_dir: Some(game_dir.into()),
            ..Default::default()
        }
    }

    /// Load a configuration from an INI file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file_opt(path, parse_options()).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Load a configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str_opt(text, parse_options())?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(paths) = ini.section(Some("Paths")) {
            if let Some(dir) = non_empty(paths, "game_dir") {
                config.game_dir = Some(PathBuf::from(dir));
            }
            if let Some(dir) = non_empty(paths, "interface_dir") {
                config.interface_dir = PathBuf::from(dir);
            }
            if let Some(dir) = non_empty(paths, "override_dir") {
                config.override_dir = dir.to_string();
            }
            if let Some(dir) = non_empty(paths, "exported_dir") {
                config.exported_dir = dir.to_string();
            }
            if let Some(ext) = non_empty(paths, "asset_extension") {
                config.asset_extension = ext.trim_start_matches('.').to_string();
            }
        }

        if let Some(patching) = ini.section(Some("Patching")) {
            if let Some(order) = non_empty(patching, "apply_order") {
                config.apply_order = order.parse().map_err(|value| ConfigError::InvalidValue {
                    section: "Patching",
                    key: "apply_order",
                    value,
                })?;
            }
            if let Some(flag) = non_empty(patching, "dump_members") {
                config.dump_members = parse_bool(flag).ok_or_else(|| ConfigError::InvalidValue {
                    section: "Patching",
                    key: "dump_members",
                    value: flag.to_string(),
                })?;
            }
        }

        if let Some(logging) = ini.section(Some("Logging")) {
            if let Some(level) = non_empty(logging, "level") {
                config.logging.level = level.parse().map_err(|_| ConfigError::InvalidValue {
                    section: "Logging",
                    key: "level",
                    value: level.to_string(),
                })?;
            }
            if let Some(file) = non_empty(logging, "file") {
                config.logging.file = Some(PathBuf::from(file));
            }
        }

        Ok(config)
    }

    /// Set the game directory.
    pub fn with_game_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.game_dir = Some(dir.into());
        self
    }

    /// Set the override directory name.
    pub fn with_override_dir(mut self, dir: impl Into<String>) -> Self {
        self.override_dir = dir.into();
        self
    }

    /// Set the asset extension.
    pub fn with_asset_extension(mut self, extension: impl Into<String>) -> Self {
        self.asset_extension = extension.into();
        self
    }

    /// Set the apply order.
    pub fn with_apply_order(mut self, order: ApplyOrder) -> Self {
        self.apply_order = order;
        self
    }

    /// Enable or disable trace-level member dumps.
    pub fn with_member_dumps(mut self, enabled: bool) -> Self {
        self.dump_members = enabled;
        self
    }

    /// Resolve the game directory for a session.
    pub fn resolve_game_dir(&self) -> io::Result<PathBuf> {
        match &self.game_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Backslashes are kept literally so Windows paths survive.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
