//! Params command implementation.

use colored::Colorize;

use crate::config::LoadOptions;
use crate::error::{Error, Result};

/// Print the parameters a font would be written with, before any
/// `lib.plist` settings of that font are applied.
///
/// # Errors
///
/// Fails when an override is invalid.
pub fn execute(options: &LoadOptions, json: bool) -> Result<()> {
    let mut params = options.params.clone();
    options.apply_overrides(&mut params)?;
    params.validate()?;

    let value = serde_json::to_value(&params)?;
    if json {
        println!("{value}");
        return Ok(());
    }

    let serde_json::Value::Object(map) = value else {
        return Err(Error::Other("params did not serialize to an object".to_string()));
    };
    for (name, value) in map {
        let shown = match value {
            serde_json::Value::String(s) => format!("{s:?}"),
            serde_json::Value::Null => "none".to_string(),
            other => other.to_string(),
        };
        println!("{} {shown}", format!("{name}:").cyan());
    }
    Ok(())
}
