//! Derived-view benchmarks: markdown/html preview rendering and variables table formatting.
//!
//! Run with: `cargo bench`

use std::fs;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use swarm_catalog::data::catalog::Catalog;
use swarm_catalog::data::product::Product;

fn sample_product(rows: usize) -> Product {
    let mut variables_table = String::from("Variable,Unit,Dimension,Description\n");
    for row in 0..rows {
        variables_table.push_str(&format!("Var_{row},nT,{},Sample variable {row}\n", row % 3 + 1));
    }
    Product {
        product_id: "SW-MAGx_LR_1B".to_string(),
        name: "Magnetic field (1Hz) from VFM and ASM".to_string(),
        thematic_areas: vec!["Magnetic measurements".to_string(), "Core field".to_string()],
        description: "Magnetic vector and scalar data at **1 Hz** rate.".to_string(),
        link_files_http: "https://swarm-diss.eo.esa.int/#swarm/Level1b".to_string(),
        link_files_ftp: "ftp://swarm-diss.eo.esa.int/Level1b".to_string(),
        link_vires_gui: "https://vires.services".to_string(),
        link_notebook: "https://notebooks.vires.services".to_string(),
        link_hapi: "https://vires.services/hapi".to_string(),
        variables_table,
        related_resources: Vec::new(),
        details: "See the product handbook.".to_string(),
    }
}

fn bench_previews(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");
    for rows in [10_usize, 200] {
        let product = sample_product(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_function(format!("tabulate_{rows}_rows"), |b| {
            b.iter(|| black_box(&product).tabulate_variables())
        });
        group.bench_function(format!("markdown_{rows}_rows"), |b| {
            b.iter(|| black_box(&product).markdown_preview())
        });
        group.bench_function(format!("html_{rows}_rows"), |b| {
            b.iter(|| black_box(&product).html_preview())
        });
    }
    group.finish();
}

fn bench_catalog_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    for index in 0..100 {
        let mut product = sample_product(20);
        product.product_id = format!("SW-BENCH_{index:03}");
        product.write_json_file(dir.path()).expect("fixture should be written");
    }
    fs::write(dir.path().join("README.md"), "ignored").expect("fixture should be written");

    let mut group = c.benchmark_group("catalog");
    group.throughput(Throughput::Elements(100));
    group.bench_function("load_100_records", |b| {
        b.iter(|| Catalog::load(black_box(dir.path())).expect("catalog should load"))
    });
    group.finish();
}

criterion_group!(benches, bench_previews, bench_catalog_load);
criterion_main!(benches);
