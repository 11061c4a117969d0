use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use mapsift::{MapSiftError, filter::HideMode};
use mapsift_cli::{Args, run};
use mapsift_parser::MapDocument;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Collects all map files from a directory
fn collect_map_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("omap" | "xmap")
                    )
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        exclude: Vec::new(),
        resolve_overlaps: false,
        hide_mode: None,
        priorities: false,
        config: None,
        log_level: "off".to_string(),
    }
}

fn read_output(path: &Path) -> MapDocument {
    let xml = fs::read_to_string(path).expect("Output should exist");
    MapDocument::parse(&xml).expect("Output should be a well-formed map")
}

fn object_symbols(document: &MapDocument) -> Vec<String> {
    document
        .objects()
        .into_iter()
        .map(|record| record.symbol.unwrap_or_default())
        .collect()
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let fixtures = collect_map_files(&fixtures_dir());

    assert!(!fixtures.is_empty(), "No map fixtures found");

    let mut failed = Vec::new();
    for fixture in &fixtures {
        for resolve_overlaps in [false, true] {
            let output = temp_dir.path().join(format!(
                "{}_{resolve_overlaps}.omap",
                fixture.file_stem().unwrap().to_string_lossy()
            ));
            let mut args = args(fixture, &output);
            args.resolve_overlaps = resolve_overlaps;

            if let Err(e) = run(&args) {
                failed.push((fixture.clone(), e));
            } else {
                read_output(&output);
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nFixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} fixture run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let fixtures = collect_map_files(&fixtures_dir().join("errors"));

    assert!(!fixtures.is_empty(), "No error fixtures found in errors/");

    let mut unexpectedly_succeeded = Vec::new();
    for fixture in &fixtures {
        let output = temp_dir.path().join("error_output.omap");

        match run(&args(fixture, &output)) {
            Err(MapSiftError::Parse { err, .. }) => {
                assert!(
                    !err.diagnostics().is_empty(),
                    "{} failed without diagnostics",
                    fixture.display()
                );
            }
            Err(other) => panic!("{}: unexpected error {other}", fixture.display()),
            Ok(()) => unexpectedly_succeeded.push(fixture.clone()),
        }
        assert!(!output.exists(), "No output should be written on error");
    }

    assert!(
        unexpectedly_succeeded.is_empty(),
        "Error fixtures succeeded unexpectedly: {unexpectedly_succeeded:?}"
    );
}

#[test]
fn e2e_exclude_symbols() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.omap");

    let mut args = args(&fixtures_dir().join("forest_sprint.omap"), &output);
    args.exclude = vec!["building".to_string(), "DISTINCT TREE".to_string()];
    run(&args).unwrap();

    let document = read_output(&output);
    assert_eq!(object_symbols(&document), ["405", "12", "210", "302"]);
    assert_eq!(document.symbols().len(), 6);

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains(r#"<objects count="4">"#));
    assert!(xml.contains("<notes>Sprint training map &amp; course area</notes>"));
}

#[test]
fn e2e_resolve_overlaps_remove() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.omap");

    let mut args = args(&fixtures_dir().join("forest_sprint.omap"), &output);
    args.resolve_overlaps = true;
    run(&args).unwrap();

    // Forest and footpath give way to the building, the second building
    // to the tower; the contour is exempt.
    let document = read_output(&output);
    assert_eq!(object_symbols(&document), ["301", "12", "302", "88"]);
}

#[test]
fn e2e_resolve_overlaps_transparent_across_parts() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.xmap");

    let mut args = args(&fixtures_dir().join("two_parts.xmap"), &output);
    args.resolve_overlaps = true;
    args.hide_mode = Some(HideMode::Transparent);
    run(&args).unwrap();

    let xml = fs::read_to_string(&output).unwrap();
    assert_eq!(xml.matches(r#"opacity="0.5""#).count(), 1);
    assert_eq!(read_output(&output).objects().len(), 4);
}

#[test]
fn e2e_exclude_updates_every_part() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.xmap");

    let mut args = args(&fixtures_dir().join("two_parts.xmap"), &output);
    args.exclude = vec!["Vineyard".to_string()];
    run(&args).unwrap();

    let xml = fs::read_to_string(&output).unwrap();
    assert_eq!(xml.matches(r#"<objects count="1">"#).count(), 2);
    assert!(xml.starts_with("<?xml"));
}

#[test]
fn e2e_config_file_excludes() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.omap");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[filter]\nexclude = [\"Tower\"]\n").unwrap();

    let mut args = args(&fixtures_dir().join("forest_sprint.omap"), &output);
    args.config = Some(config.to_string_lossy().to_string());
    args.exclude = vec!["Contour".to_string()];
    run(&args).unwrap();

    let document = read_output(&output);
    assert_eq!(object_symbols(&document), ["301", "405", "210", "301", "88"]);
}

#[test]
fn e2e_missing_config_file_fails() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.omap");

    let mut args = args(&fixtures_dir().join("forest_sprint.omap"), &output);
    args.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());

    assert!(matches!(run(&args), Err(MapSiftError::Config(_))));
    assert!(!output.exists());
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("out.omap");

    let result = run(&args(&temp_dir.path().join("absent.omap"), &output));
    assert!(matches!(result, Err(MapSiftError::Io(_))));
}
