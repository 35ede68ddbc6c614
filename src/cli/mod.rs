//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// ufonorm - Normalize UFO fonts, rewriting only what changed
#[derive(Parser, Debug)]
#[command(name = "ufonorm", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Params file (JSON) with output settings
    #[arg(long, global = true, env = "UFONORM_PARAMS")]
    pub params_file: Option<PathBuf>,

    /// Override one parameter, e.g. `-p precision=2` (repeatable)
    #[arg(
        short = 'p',
        long = "param",
        value_name = "NAME=VALUE",
        value_parser = parse_param,
        global = true
    )]
    pub params: Vec<(String, String)>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a UFO, in place or into another directory
    Normalize {
        /// UFO directory to read
        ufo: PathBuf,

        /// Output directory (default: rewrite the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the glif file name each glyph name would get
    Filename {
        /// Glyph names, assigned in order against one shared name set
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the resolved output parameters
    Params,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn parse_param(arg: &str) -> Result<(String, String), String> {
    crate::config::parse_override(arg).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_param_overrides_parse() {
        let cli = Cli::parse_from([
            "ufonorm",
            "normalize",
            "Font.ufo",
            "-p",
            "precision=2",
            "--param",
            "UFOversion=2",
        ]);
        assert_eq!(
            cli.params,
            vec![
                ("precision".to_string(), "2".to_string()),
                ("UFOversion".to_string(), "2".to_string()),
            ]
        );
        assert!(matches!(cli.command, Commands::Normalize { output: None, .. }));
    }

    #[test]
    fn test_param_without_equals_rejected() {
        let result = Cli::try_parse_from(["ufonorm", "normalize", "Font.ufo", "-p", "precision"]);
        assert!(result.is_err());
    }
}
