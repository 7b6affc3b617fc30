use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::data::catalog::Catalog;
use crate::data::product::Product;
use crate::data::validate::{normalize_thematic_areas, validate_catalog, ValidationSeverity};
use crate::server;

const USAGE: &str = "usage: swarm-catalog <serve|list|preview|validate|normalize>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    List,
    Preview,
    Validate,
    Normalize,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("list") => Some(Command::List),
        Some("preview") => Some(Command::Preview),
        Some("validate") => Some(Command::Validate),
        Some("normalize") => Some(Command::Normalize),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = AppConfig::from_env();
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(&config),
        Some(Command::List) => handle_list(args, &config),
        Some(Command::Preview) => handle_preview(args),
        Some(Command::Validate) => handle_validate(args, &config),
        Some(Command::Normalize) => handle_normalize(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn catalog_dir(args: &[String], index: usize, config: &AppConfig) -> PathBuf {
    args.get(index)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.catalog_dir.clone())
}

fn handle_serve(config: &AppConfig) -> i32 {
    let catalog = if config.lenient_load {
        Catalog::load_lenient(&config.catalog_dir).map(|(catalog, _skipped)| catalog)
    } else {
        Catalog::load(&config.catalog_dir)
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("catalog load failed: {err}");
            return 1;
        }
    };

    match server::run_server(&config.bind_addr, &catalog) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_list(args: &[String], config: &AppConfig) -> i32 {
    let dir = catalog_dir(args, 2, config);
    match Catalog::load(&dir) {
        Ok(catalog) => {
            for product_id in catalog.product_ids() {
                println!("{product_id}");
            }
            0
        }
        Err(err) => {
            eprintln!("catalog load failed: {err}");
            1
        }
    }
}

fn handle_preview(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: swarm-catalog preview <record.json> [--html]");
        return 2;
    };
    let as_html = args.iter().skip(3).any(|arg| arg == "--html");

    match Product::from_json_file(path) {
        Ok(product) => {
            if as_html {
                print!("{}", product.html_preview());
            } else {
                println!("{}", product.markdown_preview());
            }
            0
        }
        Err(err) => {
            eprintln!("preview failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String], config: &AppConfig) -> i32 {
    let dir = catalog_dir(args, 2, config);
    let catalog = match Catalog::load(&dir) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let report = validate_catalog(&catalog);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    let errors = report.count(ValidationSeverity::Error);
    if errors > 0 {
        eprintln!(
            "validation failed: {errors} error(s), {} warning(s) across {} record(s)",
            report.count(ValidationSeverity::Warning),
            catalog.len()
        );
        1
    } else {
        println!(
            "validation passed: {} ({} record(s), {} warning(s))",
            dir.display(),
            catalog.len(),
            report.count(ValidationSeverity::Warning)
        );
        0
    }
}

fn handle_normalize(args: &[String]) -> i32 {
    let (Some(source), Some(output)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: swarm-catalog normalize <catalog_dir> <output_dir>");
        return 2;
    };
    match normalize_catalog(Path::new(source), Path::new(output)) {
        Ok((written, dropped)) => {
            println!("normalize complete: records={written}, dropped_thematic_areas={dropped}");
            0
        }
        Err(err) => {
            eprintln!("normalize failed: {err}");
            1
        }
    }
}

/// Write a copy of every record in `source` to `output` with cleaned thematic areas.
fn normalize_catalog(
    source: &Path,
    output: &Path,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(source)?;
    fs::create_dir_all(output)?;
    let mut dropped_total = 0;
    for product in catalog.iter() {
        let mut product = product.clone();
        let dropped = normalize_thematic_areas(&mut product);
        if !dropped.is_empty() {
            tracing::info!(
                product_id = %product.product_id,
                "dropped thematic areas: {}",
                dropped.join(", ")
            );
        }
        dropped_total += dropped.len();
        product.write_json_file(output)?;
    }
    Ok((catalog.len(), dropped_total))
}
