//! One patch run for a loaded scene surface.
//!
//! A session is triggered by a single surface load. It runs synchronously on
//! the calling thread, from the first directory read to the last mutation,
//! and borrows the host mutably for the whole run so nothing else can touch
//! the tree in between.

use tracing::{debug, error, info};

use crate::applier::{PatchApplier, PatchOutcome};
use crate::config::{ApplyOrder, LoaderConfig};
use crate::error::{SessionError, SessionResult};
use crate::messages::{PatchDispatcher, PatchMessage};
use crate::scene::SceneHost;
use crate::surface::{SceneSurfaceIdentity, SurfaceLayout};
use crate::walker::{OverrideAsset, OverrideTreeWalker};

/// What a session did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Assets loaded into new nodes.
    pub created: usize,

    /// Assets that replaced existing nodes.
    pub replaced: usize,

    /// Assets aborted on an address conflict.
    pub aborted: usize,

    /// Assets skipped for lack of a target or a parent.
    pub skipped: usize,

    /// Relative paths of the aborted assets, in processing order.
    pub aborted_assets: Vec<String>,
}

impl SessionReport {
    /// Assets loaded into the tree, created or replaced.
    pub fn load_count(&self) -> usize {
        self.created + self.replaced
    }

    fn record(&mut self, outcome: PatchOutcome, asset: &OverrideAsset) {
        match outcome {
            PatchOutcome::Created => self.created += 1,
            PatchOutcome::Replaced => self.replaced += 1,
            PatchOutcome::Skipped(_) => self.skipped += 1,
            PatchOutcome::Aborted(_) => {
                self.aborted += 1;
                self.aborted_assets.push(asset.relative_path.clone());
            }
        }
    }
}

/// Loads every override for one scene surface.
#[derive(Debug)]
pub struct PatchSession<'c> {
    config: &'c LoaderConfig,
    surface: SceneSurfaceIdentity,
}

impl<'c> PatchSession<'c> {
    /// Create a session for `surface`.
    pub fn new(config: &'c LoaderConfig, surface: SceneSurfaceIdentity) -> Self {
        Self { config, surface }
    }

    /// The surface being patched.
    pub fn surface(&self) -> &SceneSurfaceIdentity {
        &self.surface
    }

    /// Where this surface's overrides live.
    pub fn layout(&self) -> SessionResult<SurfaceLayout> {
        let game_dir = self.config.resolve_game_dir().map_err(SessionError::GameDir)?;
        Ok(SurfaceLayout::new(self.config, &game_dir, &self.surface))
    }

    /// List the override assets in the order they would be applied.
    ///
    /// Nothing is resolved or mutated. A surface without overrides yields an
    /// empty list.
    pub fn discover(&self) -> SessionResult<Vec<OverrideAsset>> {
        let layout = self.layout()?;
        if !layout.has_overrides() {
            return Ok(Vec::new());
        }
        self.collect_assets(&layout)
    }

    /// Apply every override to `host`, announcing progress to `dispatcher`.
    ///
    /// Address conflicts abort single assets and never fail the session. An
    /// enumeration failure ends it: the error is logged and returned, and no
    /// finish notification is sent.
    pub fn run<H, D>(&self, host: &mut H, dispatcher: &mut D) -> SessionResult<SessionReport>
    where
        H: SceneHost,
        D: PatchDispatcher<H::Node, H::Value>,
    {
        let url = self.surface.url();
        let layout = self.layout().map_err(|e| {
            error!(error = %e, surface = url, "Patch session aborted");
            e
        })?;
        let mut report = SessionReport::default();

        if !layout.has_overrides() {
            debug!("Patches loaded for {}: 0", url);
            return Ok(report);
        }

        debug!(
            root = %layout.override_root.display(),
            "Override root exists, loading patches"
        );

        dispatcher.dispatch(PatchMessage::StartLoad {
            surface: self.surface.handle(),
            url: url.to_string(),
        });

        let applied = {
            let mut applier = PatchApplier::new(&mut *host, &mut *dispatcher, &self.surface)
                .with_member_dumps(self.config.dump_members);
            self.apply_all(&layout, &mut applier, &mut report)
        };

        if let Err(e) = applied {
            error!(error = %e, surface = url, "Patch session aborted");
            return Err(e);
        }

        dispatcher.dispatch(PatchMessage::FinishLoad {
            surface: self.surface.handle(),
            url: url.to_string(),
            load_count: report.load_count(),
        });

        if report.load_count() > 0 {
            info!("Patches loaded for {}: {}", url, report.load_count());
        } else {
            debug!("Patches loaded for {}: 0", url);
        }

        Ok(report)
    }

    fn apply_all<H, D>(
        &self,
        layout: &SurfaceLayout,
        applier: &mut PatchApplier<'_, H, D>,
        report: &mut SessionReport,
    ) -> SessionResult<()>
    where
        H: SceneHost,
        D: PatchDispatcher<H::Node, H::Value>,
    {
        match self.config.apply_order {
            ApplyOrder::Walk => {
                for entry in self.walker(layout) {
                    let asset = self.asset(layout, entry)?;
                    report.record(applier.apply(&asset), &asset);
                }
            }
            ApplyOrder::DepthSorted => {
                for asset in self.collect_assets(layout)? {
                    report.record(applier.apply(&asset), &asset);
                }
            }
        }
        Ok(())
    }

    fn collect_assets(&self, layout: &SurfaceLayout) -> SessionResult<Vec<OverrideAsset>> {
        let mut assets = self
            .walker(layout)
            .map(|entry| self.asset(layout, entry))
            .collect::<SessionResult<Vec<_>>>()?;

        if self.config.apply_order == ApplyOrder::DepthSorted {
            assets.sort_by_key(|asset| asset.address.depth());
        }

        Ok(assets)
    }

    fn walker(&self, layout: &SurfaceLayout) -> OverrideTreeWalker {
        OverrideTreeWalker::new(&layout.override_root, &self.config.asset_extension)
    }

    fn asset(
        &self,
        layout: &SurfaceLayout,
        entry: std::io::Result<std::path::PathBuf>,
    ) -> SessionResult<OverrideAsset> {
        let path = entry.map_err(|source| SessionError::Enumeration {
            root: layout.override_root.clone(),
            source,
        })?;

        let asset = OverrideAsset::new(
            path,
            &layout.override_root,
            &layout.interface_base,
            &self.config.asset_extension,
        );
        debug!(relative_path = %asset.relative_path, "Relative path");
        Ok(asset)
    }
}
