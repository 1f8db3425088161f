//! Check command - validate a device config and build a snapshot from it

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use nether_drawstate::{DrawStateSnapshot, StateGroup};

use crate::device::load_config;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Device config (drawstate.toml); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start from zeroed state instead of the default command buffer state
    #[arg(long)]
    pub zeroed: bool,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let catalog = Arc::new(config.catalog());
    let mut state = DrawStateSnapshot::new(Arc::clone(&catalog), config.limits())
        .context("Failed to create draw-state snapshot")?;
    if !args.zeroed {
        state.apply_default_state();
    }

    println!("=== Device Config ===");
    println!("  Active groups: {:?}", catalog.active_groups());
    println!(
        "  Unused attachments ignored: {}",
        catalog.ignores_unused_attachments()
    );
    println!("  Arena: {} bytes", state.arena_size());
    println!();
    println!("=== Partial Hashes ===");
    for group in StateGroup::ALL {
        let marker = if catalog.is_group_active(group) { "" } else { " (inactive)" };
        println!(
            "  {:<28} {:#018x}{}",
            group.name(),
            state.partial_hash(group),
            marker
        );
    }
    println!();
    println!("  Cache hash: {:#018x}", state.cache_hash());

    Ok(())
}
