//! InfinityUI - hot-patch loader for Scaleform interface movies
//!
//! When the game loads an interface movie, this library looks for override
//! assets in `Data/Interface/InfinityUI/<movie>/`, maps each file's path onto
//! a dotted node address in the movie's scene graph, and loads the asset
//! there. Existing display nodes are replaced, missing ones are created, and
//! anything else at the address makes the loader back off for that asset.
//!
//! # Overview
//!
//! - [`walker`] enumerates override assets depth-first without recursion
//! - [`address`] translates file paths into node addresses
//! - [`resolver`] classifies what currently lives at an address
//! - [`applier`] performs the create / replace / abort decision per asset
//! - [`session`] runs one full pass for a loaded surface
//! - [`messages`] carries the lifecycle notifications to the host
//!
//! The scene graph itself stays behind the [`scene::SceneHost`] trait, so the
//! same session runs against a live engine or the in-memory
//! [`scene::MemoryScene`].
//!
//! # Example
//!
//! ```no_run
//! use infinityui::config::LoaderConfig;
//! use infinityui::messages::{HostMessage, SurfaceHandle};
//! use infinityui::scene::MemoryScene;
//! use infinityui::session::PatchSession;
//! use infinityui::surface::SceneSurfaceIdentity;
//!
//! let config = LoaderConfig::new("/games/Skyrim");
//! let surface = SceneSurfaceIdentity::new(SurfaceHandle(1), "Interface/HUDMenu.swf");
//! let mut scene = MemoryScene::new();
//! let mut messages: Vec<HostMessage<MemoryScene>> = Vec::new();
//!
//! let report = PatchSession::new(&config, surface).run(&mut scene, &mut messages)?;
//! println!("loaded {} patches", report.load_count());
//! # Ok::<(), infinityui::error::SessionError>(())
//! ```

pub mod address;
pub mod applier;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod resolver;
pub mod scene;
pub mod session;
pub mod surface;
pub mod walker;

pub use address::NodeAddress;
pub use config::LoaderConfig;
pub use error::SessionError;
pub use session::{PatchSession, SessionReport};
