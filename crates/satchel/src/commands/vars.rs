//! Vars command - prints session variables.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the vars command.
#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Session id
    pub id: String,
}

/// Run the vars command.
pub fn run(args: VarsArgs, ctx: &Context) -> Result<()> {
    let variables = ctx.peek_session(&args.id)?;
    println!("{}", serde_json::to_string_pretty(&variables)?);
    Ok(())
}
