use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::catalog::Catalog;
use crate::data::fields::{binding_table, FieldBinding, FieldError, FormUpdate};
use crate::data::product::{Product, ProductError, ALLOWED_THEMATIC_AREAS};
use crate::data::validate::{validate_product, ValidationDiagnostic};

#[derive(Debug)]
pub enum ApiError {
    Body(serde_json::Error),
    Product(ProductError),
    Field(FieldError),
    NotFound(String),
    Encode(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(err) => write!(f, "Invalid request body: {err}"),
            Self::Product(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "Product '{id}' not found"),
            Self::Encode(err) => write!(f, "failed to encode response: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        Self::Product(err)
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_fields: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Body(_) | Self::Product(_) | Self::Field(_) => (400, "Bad Request"),
            Self::NotFound(_) => (404, "Not Found"),
            Self::Encode(_) => (500, "Internal Server Error"),
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        let unknown_fields = match self {
            Self::Product(err) => err.unknown_fields().map(<[String]>::to_vec),
            _ => None,
        };
        ErrorResponse {
            status: "error",
            message: self.to_string(),
            unknown_fields,
        }
    }
}

fn encode(payload: &impl Serialize) -> Result<String, ApiError> {
    serde_json::to_string_pretty(payload).map_err(ApiError::Encode)
}

pub fn health_payload(catalog: &Catalog) -> Result<String, ApiError> {
    encode(&serde_json::json!({
        "status": "ok",
        "service": "swarm-catalog",
        "version": env!("CARGO_PKG_VERSION"),
        "products": catalog.len(),
    }))
}

pub fn product_ids_payload(catalog: &Catalog) -> Result<String, ApiError> {
    encode(&serde_json::json!({ "product_ids": catalog.product_ids() }))
}

pub fn product_payload(catalog: &Catalog, product_id: &str) -> Result<String, ApiError> {
    let product = catalog
        .get_product(product_id)
        .ok_or_else(|| ApiError::NotFound(product_id.to_string()))?;
    encode(product)
}

pub fn new_product_payload() -> Result<String, ApiError> {
    encode(&Product::default())
}

pub fn thematic_areas_payload() -> Result<String, ApiError> {
    encode(&serde_json::json!({ "thematic_areas": ALLOWED_THEMATIC_AREAS }))
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldsResponse {
    pub fields: Vec<FieldBinding>,
}

pub fn fields_payload() -> Result<String, ApiError> {
    encode(&FieldsResponse {
        fields: binding_table(),
    })
}

/// Raw bytes of a user-supplied file, decoded strictly.
pub fn import_payload(body: &str) -> Result<String, ApiError> {
    let product = Product::from_json(body)?;
    tracing::info!(product_id = %product.product_id, "imported record from upload");
    encode(&product)
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub status: &'static str,
    pub product: Product,
    pub markdown: String,
    pub html: String,
    pub variables_table: String,
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl PreviewResponse {
    fn for_product(product: Product) -> Self {
        let markdown = product.markdown_preview();
        let html = product.html_preview();
        let variables_table = product.tabulate_variables();
        let diagnostics = validate_product(&product).diagnostics;
        Self {
            status: "ok",
            product,
            markdown,
            html,
            variables_table,
            diagnostics,
        }
    }
}

pub fn preview_payload(body: &str) -> Result<String, ApiError> {
    let product = Product::from_json(body)?;
    encode(&PreviewResponse::for_product(product))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub product: Option<Value>,
    #[serde(default)]
    pub fields: FormUpdate,
}

/// Apply form values to the working copy and recompute its derived views.
pub fn refresh_payload(body: &str) -> Result<String, ApiError> {
    let request: RefreshRequest = serde_json::from_str(body).map_err(ApiError::Body)?;
    let mut product = match request.product {
        Some(value) => Product::from_value(value)?,
        None => Product::default(),
    };
    product.apply_form(&request.fields)?;
    encode(&PreviewResponse::for_product(product))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedProduct {
    pub filename: String,
    pub body: String,
}

pub fn export_payload(body: &str) -> Result<ExportedProduct, ApiError> {
    let product = Product::from_json(body)?;
    Ok(ExportedProduct {
        filename: product.export_filename(),
        body: product.to_json_pretty(),
    })
}
