//! Init command - creates the session table.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the init command.
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Run the init command.
pub fn run(_args: InitArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let layout = &store.options().layout;

    println!("{}", ctx.database.display());
    if ctx.verbose {
        println!(
            "  table {} ({}, {}, {})",
            layout.table, layout.id_column, layout.expiry_column, layout.value_column
        );
        if ctx.config_sources.is_empty() {
            println!("  no config files loaded (using defaults)");
        }
        for source in &ctx.config_sources {
            println!("  config {}", source.display());
        }
    }
    Ok(())
}
