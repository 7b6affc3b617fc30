//! Catalog of product records loaded once from a directory of JSON files.
//! Read-only after construction; callers own it and pass it by reference.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::product::{Product, ProductError};

pub const DEFAULT_CATALOG_DIR: &str = "catalog";

/// Directory entries whose file name contains this marker are treated as records.
const JSON_MARKER: &str = ".json";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to list catalog directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load {}: {source}", .path.display())]
    Product {
        path: PathBuf,
        #[source]
        source: ProductError,
    },
}

/// A record file left out of a lenient load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Products keyed by `product_id`, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    order: Vec<String>,
    products: HashMap<String, Product>,
}

impl Catalog {
    /// Load every record file in `dir`, in file-name order. The first unreadable or mismatching
    /// file aborts the load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Catalog::default();
        for path in record_paths(dir)? {
            let product = Product::from_json_file(&path)
                .map_err(|source| CatalogError::Product { path, source })?;
            catalog.insert(product);
        }
        tracing::info!(dir = %dir.display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Like [Catalog::load], but bad record files are logged and skipped instead of failing.
    /// An unreadable directory is still an error.
    pub fn load_lenient(dir: impl AsRef<Path>) -> Result<(Self, Vec<SkippedFile>), CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Catalog::default();
        let mut skipped = Vec::new();
        for path in record_paths(dir)? {
            match Product::from_json_file(&path) {
                Ok(product) => catalog.insert(product),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping record: {err}");
                    skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            dir = %dir.display(),
            products = catalog.len(),
            skipped = skipped.len(),
            "catalog loaded"
        );
        Ok((catalog, skipped))
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Catalog::default();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Last write wins; a replaced id keeps its original position.
    fn insert(&mut self, product: Product) {
        if self.products.contains_key(&product.product_id) {
            tracing::debug!(product_id = %product.product_id, "duplicate product id replaced");
        } else {
            self.order.push(product.product_id.clone());
        }
        self.products.insert(product.product_id.clone(), product);
    }

    pub fn product_ids(&self) -> &[String] {
        &self.order
    }

    pub fn get_product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.contains_key(product_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> + '_ {
        self.order.iter().filter_map(|id| self.products.get(id))
    }
}

fn record_paths(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let read_dir_err = |source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().contains(JSON_MARKER) && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
