//! The response-shape descriptor sent alongside a generation request.
//!
//! Serializes to the OpenAPI subset understood by the generative service
//! (`type`, `description`, `items`, `properties`, `required`, `propertyOrdering`).

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Array,
    Object,
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
}

impl Schema {
    pub fn scalar(kind: SchemaType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: Some(description.into()),
            items: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    pub fn array_of(items: Schema, description: impl Into<String>) -> Self {
        Self {
            kind: SchemaType::Array,
            description: Some(description.into()),
            items: Some(Box::new(items)),
            properties: BTreeMap::new(),
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    pub fn object() -> Self {
        Self {
            kind: SchemaType::Object,
            description: None,
            items: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    /// Adds a required property, keeping declaration order in `propertyOrdering`.
    pub fn with_required(mut self, name: impl Into<String>, property: Schema) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), property);
        self.required.push(name.clone());
        self.property_ordering.push(name);
        self
    }
}
