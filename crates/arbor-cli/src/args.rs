//! Command-line argument definitions for the Arbor CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, layout overrides, initial collapse state, and logging verbosity.

use clap::Parser;

use arbor::layout::{Alignment, Orientation};

/// Command-line arguments for the Arbor tree diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input tree document (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Sibling alignment (start, center); overrides the configuration
    #[arg(long)]
    pub align: Option<Alignment>,

    /// Growth direction (left-to-right, top-to-bottom); overrides the configuration
    #[arg(long)]
    pub orientation: Option<Orientation>,

    /// Collapse the first node with this name; may be repeated
    #[arg(long, value_name = "NAME")]
    pub collapse: Vec<String>,

    /// Output scale factor; overrides the configuration
    #[arg(long)]
    pub scale: Option<f32>,
}
