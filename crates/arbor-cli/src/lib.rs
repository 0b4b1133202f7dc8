//! CLI logic for the Arbor tree diagram tool.
//!
//! This module contains the core CLI logic for the Arbor tree diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use arbor::{ArborError, DiagramBuilder};

/// Run the Arbor CLI application
///
/// Loads the tree document, draws it, collapses every node named with
/// `--collapse` (letting each transition settle), and writes the resulting
/// SVG to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ArborError` for:
/// - File I/O errors
/// - Configuration loading or validation errors
/// - Malformed tree documents
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), ArborError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing tree"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    config::apply_overrides(&mut app_config, args);
    config::validate(&app_config)?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Process tree using DiagramBuilder API
    let builder = DiagramBuilder::new(app_config);
    let tree = builder.parse(&source)?;
    let mut rendered = builder.build(tree)?;

    for name in &args.collapse {
        rendered.collapse_named(name)?;
        rendered.settle();
    }

    // Write output file
    rendered.export(&args.output)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
