use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::data::catalog::Catalog;
use crate::data::product::{is_allowed_thematic_area, Product};
use crate::data::variables::parse_variables_table;

/// Prefix shared by the ids of the Swarm catalog records.
pub const PRODUCT_ID_PREFIX: &str = "SW-";

const LINK_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.count(ValidationSeverity::Error) > 0
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn extend_with_context(&mut self, prefix: &str, other: ValidationReport) {
        for diag in other.diagnostics {
            self.diagnostics.push(ValidationDiagnostic {
                context: format!("{prefix}.{}", diag.context),
                ..diag
            });
        }
    }
}

/// Check a record against the catalog conventions. Nothing here blocks serialization.
pub fn validate_product(product: &Product) -> ValidationReport {
    let mut report = ValidationReport::default();

    if product.product_id.trim().is_empty() {
        report.push(
            ValidationSeverity::Warning,
            "product_id",
            "missing non-empty 'product_id'",
        );
    } else if !product.product_id.starts_with(PRODUCT_ID_PREFIX) {
        report.push(
            ValidationSeverity::Info,
            "product_id",
            format!("id '{}' lacks the '{PRODUCT_ID_PREFIX}' prefix", product.product_id),
        );
    }

    if product.name.trim().is_empty() {
        report.push(ValidationSeverity::Warning, "name", "missing non-empty 'name'");
    }

    let mut seen = HashSet::new();
    for (index, area) in product.thematic_areas.iter().enumerate() {
        let context = format!("thematic_areas[{index}]");
        let trimmed = area.trim();
        if trimmed != area {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!("'{area}' has surrounding whitespace"),
            );
        }
        if !is_allowed_thematic_area(trimmed) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("unsupported thematic area '{area}'"),
            );
        }
        if !seen.insert(trimmed) {
            report.push(
                ValidationSeverity::Warning,
                context,
                format!("duplicate thematic area '{trimmed}'"),
            );
        }
    }

    let links = [
        ("link_files_http", &product.link_files_http),
        ("link_files_ftp", &product.link_files_ftp),
        ("link_vires_gui", &product.link_vires_gui),
        ("link_notebook", &product.link_notebook),
        ("link_hapi", &product.link_hapi),
    ];
    for (field, link) in links {
        if !link.is_empty() && !LINK_SCHEMES.iter().any(|scheme| link.starts_with(scheme)) {
            report.push(
                ValidationSeverity::Warning,
                field,
                format!("'{link}' is not an http, https or ftp URL"),
            );
        }
    }

    if !product.variables_table.is_empty() {
        if let Err(err) = parse_variables_table(&product.variables_table) {
            report.push(
                ValidationSeverity::Warning,
                "variables_table",
                format!("table renders as INVALID TABLE: {err}"),
            );
        }
    }

    report
}

/// Validate every record, prefixing contexts with the record's id.
pub fn validate_catalog(catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    for product in catalog.iter() {
        let prefix = if product.product_id.is_empty() {
            "<missing-id>"
        } else {
            product.product_id.as_str()
        };
        report.extend_with_context(prefix, validate_product(product));
    }
    report
}

/// Trim thematic areas, dropping repeats and those outside the allowed set.
/// Returns the dropped entries.
pub fn normalize_thematic_areas(product: &mut Product) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(product.thematic_areas.len());
    let mut dropped = Vec::new();
    for area in product.thematic_areas.drain(..) {
        let trimmed = area.trim();
        if is_allowed_thematic_area(trimmed) && !kept.iter().any(|k| k == trimmed) {
            kept.push(trimmed.to_string());
        } else {
            dropped.push(area);
        }
    }
    product.thematic_areas = kept;
    dropped
}
