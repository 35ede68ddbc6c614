//! Filename command implementation.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::Result;
use crate::naming::make_file_name;

#[derive(Serialize)]
struct FileNameOutput {
    name: String,
    file: String,
}

/// Map glyph names to glif file names, in order, against one shared set
/// of used names, the way a layer assigns them.
#[must_use]
pub fn assign(names: &[String]) -> Vec<(String, String)> {
    let mut used = HashSet::new();
    names
        .iter()
        .map(|name| {
            let stem = make_file_name(name, &used);
            used.insert(stem.to_lowercase());
            (name.clone(), format!("{stem}.glif"))
        })
        .collect()
}

/// Execute the filename command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(names: &[String], json: bool) -> Result<()> {
    let assigned = assign(names);

    if json {
        let output: Vec<FileNameOutput> = assigned
            .into_iter()
            .map(|(name, file)| FileNameOutput { name, file })
            .collect();
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for (name, file) in assigned {
        println!("{name}\t{file}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_shares_used_names() {
        let names: Vec<String> = ["a", "A", "a", "con"].iter().map(ToString::to_string).collect();
        let files: Vec<String> = assign(&names).into_iter().map(|(_, f)| f).collect();
        assert_eq!(
            files,
            vec!["a.glif", "A_.glif", "a000000000000001.glif", "_con.glif"]
        );
    }
}
