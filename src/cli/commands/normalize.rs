//! Normalize command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::config::LoadOptions;
use crate::error::Result;
use crate::font::Font;
use crate::sync::SyncStats;

#[derive(Serialize)]
struct NormalizeOutput<'a> {
    input: &'a Path,
    output: &'a Path,
    ufo_version: i64,
    glyphs: usize,
    layers: usize,
    #[serde(flatten)]
    stats: &'a SyncStats,
}

/// Load `ufo` and write it to `output`, or back in place.
///
/// # Errors
///
/// Any load or write error for the font.
pub fn execute(
    ufo: &Path,
    output: Option<&PathBuf>,
    options: &LoadOptions,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut font = Font::load(ufo, options)?;
    let outdir = output.map_or(ufo, PathBuf::as_path);
    let stats = font.write(outdir)?;

    if json {
        let result = NormalizeOutput {
            input: ufo,
            output: outdir,
            ufo_version: font.output_version().number(),
            glyphs: font.layers().iter().map(crate::font::Layer::len).sum(),
            layers: font.layers().len(),
            stats: &stats,
        };
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    for path in &stats.written {
        println!("  {} {}", "wrote".green(), path.display());
    }
    for path in stats.deleted_files.iter().chain(&stats.deleted_dirs) {
        println!("  {} {}", "deleted".red(), path.display());
    }
    for warning in &stats.warnings {
        println!("  {} {warning}", "warning".yellow());
    }

    let summary = format!(
        "{} written, {} unchanged, {} deleted",
        stats.written.len(),
        stats.unchanged,
        stats.deleted_files.len() + stats.deleted_dirs.len()
    );
    if stats.is_empty() {
        println!("{} {} already normalized ({summary})", "✓".green(), outdir.display());
    } else {
        println!("{} Normalized {} ({summary})", "✓".green(), outdir.display());
    }
    Ok(())
}
