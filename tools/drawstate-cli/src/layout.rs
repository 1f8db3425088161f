//! Layout command - show where each init-time array lands in the arena

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nether_drawstate::arena::ArenaLayout;

use crate::device::load_config;

/// Arguments for the layout command
#[derive(Args)]
pub struct LayoutArgs {
    /// Device config (drawstate.toml); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute the layout command
pub fn execute(args: LayoutArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let layout = ArenaLayout::reserve(&config.limits())?;
    let placement = layout.place();

    println!("=== Arena Layout ===");
    println!(
        "  {:<36} {:>8} {:>6} {:>6} {:>8}",
        "array", "offset", "count", "size", "bytes"
    );
    for record in layout.records() {
        let span = placement.span(record.field);
        println!(
            "  {:<36} {:>8} {:>6} {:>6} {:>8}",
            record.field.field().name(),
            span.offset,
            record.count,
            record.element_size,
            span.len_bytes
        );
    }
    println!();
    println!("  Reserved: {} bytes (align {})", layout.size(), layout.align());
    println!("  Placed:   {} bytes", placement.consumed());

    Ok(())
}
