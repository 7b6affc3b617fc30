//! Product metadata record: the closed field schema, strict JSON decoding and JSON export.
//! Records live as one JSON object per file in the catalog directory (see [crate::data::catalog]).

use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::data::fields::ProductField;

/// Every key a serialized record may carry, in declared order.
pub const FIELD_NAMES: [&str; 12] = [
    "product_id",
    "name",
    "thematic_areas",
    "description",
    "link_files_http",
    "link_files_ftp",
    "link_vires_gui",
    "link_notebook",
    "link_hapi",
    "variables_table",
    "related_resources",
    "details",
];

/// Closed vocabulary offered by the editor's thematic-area choice widget.
pub const ALLOWED_THEMATIC_AREAS: [&str; 16] = [
    "Magnetic measurements",
    "Plasma measurements",
    "Space Weather",
    "Ionosphere/Magnetosphere",
    "Thermosphere",
    "Lithosphere",
    "Core field",
    "Ocean Tides",
    "Mantle",
    "Geodesy/Gravity",
    "Acceleration measurements",
    "Attitude information",
    "Orbit information",
    "Ephemeris",
    "GNSS measurements",
    "HK data",
];

pub fn is_allowed_thematic_area(area: &str) -> bool {
    ALLOWED_THEMATIC_AREAS.contains(&area)
}

/// One metadata entry describing a data product. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub thematic_areas: Vec<String>,
    pub description: String,
    pub link_files_http: String,
    pub link_files_ftp: String,
    pub link_vires_gui: String,
    pub link_notebook: String,
    pub link_hapi: String,
    pub variables_table: String,
    pub related_resources: Vec<String>,
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("mismatching product fields in supplied json: {}", .keys.join(", "))]
    SchemaMismatch { keys: Vec<String> },
    #[error("failed to parse product json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProductError {
    /// Offending keys of a [ProductError::SchemaMismatch]; `None` for every other kind.
    pub fn unknown_fields(&self) -> Option<&[String]> {
        match self {
            Self::SchemaMismatch { keys } => Some(keys),
            _ => None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Product {
    pub fn field_names() -> &'static [&'static str] {
        &FIELD_NAMES
    }

    /// Decode a record from raw JSON (an uploaded file body or a catalog file's contents).
    /// Keys outside [FIELD_NAMES] are rejected; omitted or `null` keys take their defaults.
    pub fn from_json(input: impl AsRef<[u8]>) -> Result<Self, ProductError> {
        let value: Value = serde_json::from_slice(input.as_ref())?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ProductError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ProductError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        let mut unknown: Vec<String> = object
            .keys()
            .filter(|key| !FIELD_NAMES.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ProductError::SchemaMismatch { keys: unknown });
        }

        object.retain(|_, value| !value.is_null());

        Ok(serde_json::from_value(Value::Object(object))?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProductError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| ProductError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(raw)
    }

    /// Field-by-field mapping onto a JSON object keyed by field name.
    pub fn as_map(&self) -> Map<String, Value> {
        ProductField::ALL
            .iter()
            .map(|field| (field.name().to_string(), Value::from(self.get(*field))))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.as_map())
    }

    /// Compact JSON with keys in declared order. Serialization never validates.
    pub fn to_json(&self) -> String {
        // Plain strings and string lists cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_else(|_| self.to_value().to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_value().to_string())
    }

    /// File name used for downloads and catalog files: `<product_id>.json`.
    pub fn export_filename(&self) -> String {
        let stem: String = self
            .product_id
            .chars()
            .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
            .collect();
        format!("{stem}.json")
    }

    pub fn write_json_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ProductError> {
        let path = dir.as_ref().join(self.export_filename());
        fs::write(&path, self.to_json()).map_err(|source| ProductError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Write the JSON export to a named temporary file, removed when the handle drops.
    pub fn to_temp_json_file(&self) -> Result<NamedTempFile, ProductError> {
        let write_err = |source| ProductError::Write {
            path: std::env::temp_dir(),
            source,
        };
        let mut file = NamedTempFile::new().map_err(write_err)?;
        file.write_all(self.to_json().as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        Ok(file)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, field) in ProductField::ALL.iter().enumerate() {
            if index > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}:\n{}", field.name(), self.get(*field))?;
        }
        Ok(())
    }
}
