//! CLI logic for the mapsift map filter.
//!
//! This module contains the core CLI logic: configuration loading, the
//! filter run and reporting.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, DEFAULT_OUTPUT, DEFAULT_OVERLAP_OUTPUT};

use std::fs;

use log::{info, warn};
use miette::GraphicalReportHandler;

use mapsift::{MapSiftError, SiftOptions, Sifter, catalog::SymbolCatalog};

use error_adapter::{render, warnings_to_reportables};

/// Run the mapsift CLI application
///
/// Reads the input map, removes the excluded symbols, optionally resolves
/// overlaps, and writes the resulting map to the output file.
///
/// # Errors
///
/// Returns `MapSiftError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Documents that are not well-formed
pub fn run(args: &Args) -> Result<(), MapSiftError> {
    let output = args.output_path();
    info!(
        input_path = args.input,
        output_path = output;
        "Processing map"
    );

    let config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let sifter = Sifter::new(config.app_config());
    let mut document = sifter.parse(&source)?;

    if args.priorities {
        print!("{}", priority_table(&sifter.catalog(&document)));
    }

    let mut options = SiftOptions::new().with_overlap_resolution(args.resolve_overlaps);
    for name in config.filter().exclude().iter().chain(&args.exclude) {
        options = options.exclude(name.as_str());
    }
    if let Some(hide_mode) = args.hide_mode {
        options = options.with_hide_mode(hide_mode);
    }

    let report = sifter.sift(&mut document, &options);

    let reporter = GraphicalReportHandler::new();
    for reportable in warnings_to_reportables(report.warnings(), &source) {
        warn!("{}", render(&reporter, &reportable));
    }
    for name in report.unmatched_names() {
        warn!(name = name.as_str(); "Excluded symbol name matched nothing");
    }

    info!(
        deleted = report.deleted_count(),
        unparseable = report.unparseable_count(),
        kept = report.kept_count();
        "Amount of objects deleted: {}",
        report.deleted_count()
    );
    if let Some(hide_mode) = report.hide_mode() {
        info!(
            overlaps = report.overlaps().len(),
            hidden = report.hidden_count(),
            hide_mode = hide_mode.to_string();
            "Overlaps resolved"
        );
    }

    fs::write(output, document.to_xml())?;

    info!(output_file = output; "Map written successfully");

    Ok(())
}

/// Format the priority of every symbol, one per line, in document order.
fn priority_table(catalog: &SymbolCatalog) -> String {
    let mut table = format!("{:>8}  {:>8}  {}\n", "id", "priority", "name");
    for symbol in catalog.iter() {
        table.push_str(&format!(
            "{:>8}  {:>8}  {}\n",
            symbol.id().to_string(),
            symbol.priority(),
            symbol.name()
        ));
    }
    table
}
