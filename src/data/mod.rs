pub mod catalog;
pub mod fields;
pub mod preview;
pub mod product;
pub mod validate;
pub mod variables;

pub use catalog::{Catalog, CatalogError, DEFAULT_CATALOG_DIR};
pub use fields::{FieldError, FieldValue, FormUpdate, ProductField};
pub use product::{Product, ProductError, ALLOWED_THEMATIC_AREAS, FIELD_NAMES};
