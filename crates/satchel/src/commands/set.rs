//! Set command - writes one session variable.

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::Context;

/// Arguments for the set command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Session id
    pub id: String,

    /// Variable name
    pub name: String,

    /// JSON value; anything that does not parse is stored as a string
    pub value: String,
}

/// Run the set command.
pub fn run(args: SetArgs, ctx: &Context) -> Result<()> {
    let value = parse_value(args.value);

    let mut session = ctx.start_session(&args.id)?;
    session.write(args.name, value);
    session.save()?;
    Ok(())
}

fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value_json() {
        assert_eq!(parse_value("42".into()), json!(42));
        assert_eq!(parse_value(r#"{"a":[1,2]}"#.into()), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_parse_value_falls_back_to_string() {
        assert_eq!(parse_value("alice".into()), json!("alice"));
    }
}
