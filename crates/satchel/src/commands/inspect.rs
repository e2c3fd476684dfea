//! Inspect command - shows a raw record, expired or not.

use anyhow::{Result, bail};
use chrono::{SubsecRound, Utc};
use clap::Args;
use satchel_session::format_expiry;

use super::Context;

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Session id
    pub id: String,
}

/// Run the inspect command.
pub fn run(args: InspectArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    let Some(record) = store.record(&args.id)? else {
        bail!("not found");
    };
    let now = Utc::now().trunc_subsecs(0);

    println!("id: {}", record.id);
    println!("expires_at: {}", format_expiry(record.expires_at));
    println!("expired: {}", !record.is_live_at(now));
    println!("bytes: {}", record.value.len());
    Ok(())
}
