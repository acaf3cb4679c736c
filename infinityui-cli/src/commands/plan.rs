//! Plan command - list the overrides a surface load would apply.

use clap::Args;
use infinityui::{LoaderConfig, PatchSession};

use super::common::SurfaceArgs;
use crate::error::CliError;

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

/// Run the plan command.
pub fn run(args: PlanArgs, config: LoaderConfig) -> Result<(), CliError> {
    let config = args.surface.configure(config);
    let session = PatchSession::new(&config, args.surface.identity());
    let layout = session.layout()?;

    println!("Surface:       {}", session.surface().url());
    println!("Override root: {}", layout.override_root.display());
    println!("Apply order:   {}", config.apply_order);
    println!();

    if !layout.has_overrides() {
        println!("No overrides found.");
        return Ok(());
    }

    let assets = session.discover()?;
    let mut targets = 0;
    for asset in &assets {
        if asset.address.is_empty() {
            println!("  (no target)  {}", asset.relative_path);
        } else {
            targets += 1;
            println!("  {:<32} {}", asset.address.as_str(), asset.relative_path);
        }
    }

    println!();
    println!("{} override(s), {} with a target address", assets.len(), targets);
    Ok(())
}
