//! Command implementations.

pub mod completions;
pub mod filename;
pub mod normalize;
pub mod params;

use std::path::Path;

use crate::config::{LoadOptions, Params};
use crate::error::Result;

/// Resolve the params file and collect the command-line overrides.
///
/// # Errors
///
/// Fails when the params file cannot be read or is invalid.
pub fn load_options(params_file: Option<&Path>, overrides: &[(String, String)]) -> Result<LoadOptions> {
    Ok(LoadOptions {
        params: Params::load(params_file)?,
        overrides: overrides.to_vec(),
    })
}
