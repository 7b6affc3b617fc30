use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_swarm-catalog")
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("SWARM_CATALOG_DIR")
        .env_remove("SWARM_CATALOG_LENIENT")
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary should run")
}

fn write_record(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("fixture should be written");
}

#[test]
fn unknown_command_prints_usage() {
    let output = run(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: swarm-catalog <serve|list|preview|validate|normalize>"));
}

#[test]
fn list_command_prints_ids_in_catalog_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_record(dir.path(), "a.json", r#"{"product_id":"SW-B"}"#);
    write_record(dir.path(), "b.json", r#"{"product_id":"SW-A"}"#);

    let output = run(&["list", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "SW-B\nSW-A\n");
}

#[test]
fn list_command_fails_on_mismatching_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_record(dir.path(), "a.json", r#"{"product_id":"SW-B","colour":"red"}"#);

    let output = run(&["list", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("catalog load failed"));
    assert!(stderr.contains("colour"));
}

#[test]
fn preview_command_returns_usage_without_path() {
    let output = run(&["preview"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: swarm-catalog preview"));
}

#[test]
fn preview_command_prints_markdown_and_html() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_record(
        dir.path(),
        "record.json",
        r#"{"product_id":"SW-X","name":"Example","variables_table":"a,b\n1,2"}"#,
    );
    let path = dir.path().join("record.json");
    let path = path.to_str().unwrap();

    let markdown = run(&["preview", path]);
    assert_eq!(markdown.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&markdown.stdout);
    assert!(stdout.starts_with("# SW-X\n\nExample\n\nThematic areas: "));
    assert!(stdout.contains("## File contents\n\n|   a |   b |"));

    let html = run(&["preview", path, "--html"]);
    assert_eq!(html.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&html.stdout);
    assert!(stdout.contains("<h1>SW-X</h1>"));
    assert!(stdout.contains("<table>"));
}

#[test]
fn validate_command_fails_on_disallowed_thematic_area() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_record(
        dir.path(),
        "a.json",
        r#"{"product_id":"SW-A","name":"A","thematic_areas":["Astrology"]}"#,
    );

    let output = run(&["validate", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported thematic area 'Astrology'"));
    assert!(stderr.contains("validation failed"));
}

#[test]
fn validate_command_passes_bundled_catalog() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog");
    let output = run(&["validate", dir.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn normalize_command_writes_cleaned_records() {
    let source = tempfile::tempdir().expect("tempdir");
    let target = tempfile::tempdir().expect("tempdir");
    write_record(
        source.path(),
        "a.json",
        r#"{"product_id":"SW-A","thematic_areas":[" Space Weather","Astrology","Space Weather"]}"#,
    );

    let output = run(&[
        "normalize",
        source.path().to_str().unwrap(),
        target.path().to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("normalize complete: records=1, dropped_thematic_areas="));

    let written = fs::read_to_string(target.path().join("SW-A.json")).expect("normalized file");
    let record: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(record["thematic_areas"], serde_json::json!(["Space Weather"]));
}

#[test]
fn normalize_command_returns_usage_without_output_dir() {
    let output = run(&["normalize", "catalog"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("usage: swarm-catalog normalize <catalog_dir> <output_dir>"));
}
