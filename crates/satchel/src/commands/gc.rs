//! Gc command - removes expired session records.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use satchel_session::SessionStore;

use super::Context;

/// Arguments for the gc command.
#[derive(Args, Debug)]
pub struct GcArgs {
    /// Idle window in seconds (default: configured ttl)
    #[arg(long)]
    pub max_age: Option<u64>,
}

/// Run the gc command.
pub fn run(args: GcArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let max_age = args.max_age.map(Duration::from_secs).unwrap_or(store.ttl());

    let removed = store.gc(max_age)?;
    println!("removed {}", removed);
    Ok(())
}
