//! Put command - upserts a session value.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use satchel_session::SessionStore;

use super::Context;

/// Arguments for the put command.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Session id
    pub id: String,

    /// Value to store
    pub value: String,

    /// Time-to-live in seconds (default: configured ttl)
    #[arg(long)]
    pub ttl: Option<u64>,
}

/// Run the put command.
pub fn run(args: PutArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let ttl = args.ttl.map(Duration::from_secs).unwrap_or(store.ttl());

    store.write_with_ttl(&args.id, args.value.as_bytes(), ttl)?;
    Ok(())
}
