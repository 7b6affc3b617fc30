//! Binding table between editor form fields and record fields.
//!
//! Each [ProductField] names one record attribute and the widget the editor renders for it.
//! Reads and writes go through exhaustive matches, so adding a record field without a binding
//! fails to compile.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::product::{is_allowed_thematic_area, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    ProductId,
    Name,
    ThematicAreas,
    Description,
    LinkFilesHttp,
    LinkFilesFtp,
    LinkViresGui,
    LinkNotebook,
    LinkHapi,
    VariablesTable,
    RelatedResources,
    Details,
}

/// Editor widget kind bound to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    RichTextEditor,
    MultiChoice,
    TextArea,
    List,
}

impl ProductField {
    pub const ALL: [ProductField; 12] = [
        ProductField::ProductId,
        ProductField::Name,
        ProductField::ThematicAreas,
        ProductField::Description,
        ProductField::LinkFilesHttp,
        ProductField::LinkFilesFtp,
        ProductField::LinkViresGui,
        ProductField::LinkNotebook,
        ProductField::LinkHapi,
        ProductField::VariablesTable,
        ProductField::RelatedResources,
        ProductField::Details,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ProductId => "product_id",
            Self::Name => "name",
            Self::ThematicAreas => "thematic_areas",
            Self::Description => "description",
            Self::LinkFilesHttp => "link_files_http",
            Self::LinkFilesFtp => "link_files_ftp",
            Self::LinkViresGui => "link_vires_gui",
            Self::LinkNotebook => "link_notebook",
            Self::LinkHapi => "link_hapi",
            Self::VariablesTable => "variables_table",
            Self::RelatedResources => "related_resources",
            Self::Details => "details",
        }
    }

    pub fn widget(self) -> Widget {
        match self {
            Self::ProductId | Self::Name => Widget::TextInput,
            Self::Description | Self::Details => Widget::RichTextEditor,
            Self::ThematicAreas => Widget::MultiChoice,
            Self::LinkFilesHttp
            | Self::LinkFilesFtp
            | Self::LinkViresGui
            | Self::LinkNotebook
            | Self::LinkHapi => Widget::TextInput,
            Self::VariablesTable => Widget::TextArea,
            Self::RelatedResources => Widget::List,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::ThematicAreas | Self::RelatedResources)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

/// Row of the binding table as exposed to the editor page.
#[derive(Debug, Clone, Serialize)]
pub struct FieldBinding {
    pub name: &'static str,
    pub widget: Widget,
}

pub fn binding_table() -> Vec<FieldBinding> {
    ProductField::ALL
        .iter()
        .map(|field| FieldBinding {
            name: field.name(),
            widget: field.widget(),
        })
        .collect()
}

/// Value carried by a form widget: a single string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => Value::String(text),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }
}

/// Form submission: field name to new widget value.
pub type FormUpdate = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("unknown product field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' expects {expected}")]
    WrongShape {
        field: ProductField,
        expected: &'static str,
    },
    #[error("thematic area '{0}' is not one of the allowed categories")]
    DisallowedThematicArea(String),
}

impl Product {
    pub fn get(&self, field: ProductField) -> FieldValue {
        match field {
            ProductField::ThematicAreas => FieldValue::List(self.thematic_areas.clone()),
            ProductField::RelatedResources => FieldValue::List(self.related_resources.clone()),
            ProductField::ProductId => FieldValue::Text(self.product_id.clone()),
            ProductField::Name => FieldValue::Text(self.name.clone()),
            ProductField::Description => FieldValue::Text(self.description.clone()),
            ProductField::LinkFilesHttp => FieldValue::Text(self.link_files_http.clone()),
            ProductField::LinkFilesFtp => FieldValue::Text(self.link_files_ftp.clone()),
            ProductField::LinkViresGui => FieldValue::Text(self.link_vires_gui.clone()),
            ProductField::LinkNotebook => FieldValue::Text(self.link_notebook.clone()),
            ProductField::LinkHapi => FieldValue::Text(self.link_hapi.clone()),
            ProductField::VariablesTable => FieldValue::Text(self.variables_table.clone()),
            ProductField::Details => FieldValue::Text(self.details.clone()),
        }
    }

    fn text_slot(&mut self, field: ProductField) -> Option<&mut String> {
        match field {
            ProductField::ProductId => Some(&mut self.product_id),
            ProductField::Name => Some(&mut self.name),
            ProductField::Description => Some(&mut self.description),
            ProductField::LinkFilesHttp => Some(&mut self.link_files_http),
            ProductField::LinkFilesFtp => Some(&mut self.link_files_ftp),
            ProductField::LinkViresGui => Some(&mut self.link_vires_gui),
            ProductField::LinkNotebook => Some(&mut self.link_notebook),
            ProductField::LinkHapi => Some(&mut self.link_hapi),
            ProductField::VariablesTable => Some(&mut self.variables_table),
            ProductField::Details => Some(&mut self.details),
            ProductField::ThematicAreas | ProductField::RelatedResources => None,
        }
    }

    /// Assign a widget value. Thematic areas outside the allowed set are refused here, unlike
    /// JSON decoding which accepts them.
    pub fn set(&mut self, field: ProductField, value: FieldValue) -> Result<(), FieldError> {
        match value {
            FieldValue::Text(text) => {
                let slot = self.text_slot(field).ok_or(FieldError::WrongShape {
                    field,
                    expected: "a list of strings",
                })?;
                *slot = text;
            }
            FieldValue::List(items) => match field {
                ProductField::ThematicAreas => {
                    if let Some(area) = items.iter().find(|area| !is_allowed_thematic_area(area)) {
                        return Err(FieldError::DisallowedThematicArea(area.clone()));
                    }
                    self.thematic_areas = items;
                }
                ProductField::RelatedResources => self.related_resources = items,
                _ => {
                    return Err(FieldError::WrongShape {
                        field,
                        expected: "a string",
                    })
                }
            },
        }
        Ok(())
    }

    /// Apply a whole form submission. Either every value is assigned or none is.
    pub fn apply_form(&mut self, update: &FormUpdate) -> Result<(), FieldError> {
        let mut staged = self.clone();
        for (name, value) in update {
            let field: ProductField = name.parse()?;
            staged.set(field, value.clone())?;
        }
        *self = staged;
        Ok(())
    }
}
