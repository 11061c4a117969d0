//! Command-line argument definitions for the mapsift CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input and output maps, the symbols
//! to remove, overlap resolution, configuration file and logging verbosity.

use clap::Parser;

use mapsift::filter::HideMode;

/// Output file written by filter-only runs
pub const DEFAULT_OUTPUT: &str = "custom_map.omap";

/// Output file written when overlaps are resolved
pub const DEFAULT_OVERLAP_OUTPUT: &str = "custom_map_no_overlays.omap";

/// Command-line arguments for the mapsift map filter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input map file (.omap or .xmap)
    #[arg(help = "Path to the input map file")]
    pub input: String,

    /// Path to the output map file
    ///
    /// Defaults to `custom_map.omap`, or `custom_map_no_overlays.omap`
    /// with `--resolve-overlaps`.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Symbol name to remove, case-insensitive (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Detect overlapping objects and hide the lower-priority one
    #[arg(long)]
    pub resolve_overlaps: bool,

    /// How hidden objects are treated (remove, transparent)
    #[arg(long, value_name = "MODE")]
    pub hide_mode: Option<HideMode>,

    /// Print the priority of every symbol
    #[arg(long)]
    pub priorities: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The output path, falling back to the default for the run kind.
    pub fn output_path(&self) -> &str {
        match &self.output {
            Some(output) => output.as_str(),
            None if self.resolve_overlaps => DEFAULT_OVERLAP_OUTPUT,
            None => DEFAULT_OUTPUT,
        }
    }
}
