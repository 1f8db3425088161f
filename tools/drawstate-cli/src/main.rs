//! Nether DrawState CLI - inspect draw-state catalogs and device configs
//!
//! # Commands
//!
//! - `nether-drawstate catalog` - List tracked fields by group and subset
//! - `nether-drawstate layout` - Show the arena layout for a device config
//! - `nether-drawstate check` - Validate a device config and hash its default state
//!
//! # Device config (drawstate.toml)
//!
//! ```toml
//! [extensions]
//! extended_dynamic_state_3 = true
//! dynamic_rendering_unused_attachments = true
//!
//! [limits]
//! max_color_attachments = 8
//! max_viewports = 16
//! ```

mod catalog;
mod check;
mod device;
mod layout;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Nether DrawState CLI - inspect draw-state catalogs and device configs
#[derive(Parser)]
#[command(name = "nether-drawstate")]
#[command(about = "Inspect draw-state catalogs, arena layouts and device configs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked fields by group and pipeline subset
    Catalog(catalog::CatalogArgs),

    /// Show the arena layout for a device config
    Layout(layout::LayoutArgs),

    /// Validate a device config and hash its default state
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog(args) => catalog::execute(args),
        Commands::Layout(args) => layout::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
