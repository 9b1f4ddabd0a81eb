//! Schema type definitions
//!
//! A small typed model of the JSON Schema (draft-04) documents the REST
//! resources publish for their responses.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// Request context controlling which fields are returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    #[default]
    View,
    Edit,
    Embed,
}

impl Context {
    pub const VIEW_EDIT: &'static [Context] = &[Context::View, Context::Edit];
    pub const ALL: &'static [Context] = &[Context::View, Context::Edit, Context::Embed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Context::View => "view",
            Context::Edit => "edit",
            Context::Embed => "embed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Context::View),
            "edit" => Some(Context::Edit),
            "embed" => Some(Context::Embed),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
        }
    }

    /// Whether a non-null value is of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Integer => value.is_i64() || value.is_u64(),
            JsonType::Number => value.is_number(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
        }
    }
}

/// One property of a resource schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub description: String,
    pub kind: JsonType,
    /// Null is an allowed value
    pub nullable: bool,
    pub format: Option<&'static str>,
    pub context: Vec<Context>,
    pub readonly: bool,
    /// Nested properties of an object
    pub properties: BTreeMap<String, SchemaProperty>,
    /// Element schema of an array
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    pub fn new(kind: JsonType, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind,
            nullable: false,
            format: None,
            context: Context::VIEW_EDIT.to_vec(),
            readonly: false,
            properties: BTreeMap::new(),
            items: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(JsonType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(JsonType::Integer, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(JsonType::Boolean, description)
    }

    pub fn object(
        description: impl Into<String>,
        properties: impl IntoIterator<Item = (&'static str, SchemaProperty)>,
    ) -> Self {
        let mut prop = Self::new(JsonType::Object, description);
        prop.properties = properties
            .into_iter()
            .map(|(name, p)| (name.to_string(), p))
            .collect();
        prop
    }

    pub fn array(description: impl Into<String>, items: SchemaProperty) -> Self {
        let mut prop = Self::new(JsonType::Array, description);
        prop.items = Some(Box::new(items));
        prop
    }

    pub fn in_contexts(mut self, contexts: &[Context]) -> Self {
        self.context = contexts.to_vec();
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    pub fn allows(&self, context: Context) -> bool {
        self.context.contains(&context)
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("description".into(), json!(self.description));
        out.insert(
            "type".into(),
            if self.nullable {
                json!([self.kind.as_str(), "null"])
            } else {
                json!(self.kind.as_str())
            },
        );
        if let Some(format) = self.format {
            out.insert("format".into(), json!(format));
        }
        out.insert(
            "context".into(),
            Value::Array(self.context.iter().map(|c| json!(c.as_str())).collect()),
        );
        if self.readonly {
            out.insert("readonly".into(), json!(true));
        }
        if !self.properties.is_empty() {
            out.insert("properties".into(), properties_json(&self.properties));
        }
        if let Some(items) = &self.items {
            out.insert("items".into(), items.to_json());
        }
        Value::Object(out)
    }
}

fn properties_json(properties: &BTreeMap<String, SchemaProperty>) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(name, prop)| (name.clone(), prop.to_json()))
            .collect(),
    )
}

/// Top-level schema of a resource item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSchema {
    pub title: String,
    pub properties: BTreeMap<String, SchemaProperty>,
}

impl ItemSchema {
    pub fn new(
        title: impl Into<String>,
        properties: impl IntoIterator<Item = (&'static str, SchemaProperty)>,
    ) -> Self {
        Self {
            title: title.into(),
            properties: properties
                .into_iter()
                .map(|(name, p)| (name.to_string(), p))
                .collect(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// The schema as a draft-04 JSON document
    pub fn to_json(&self) -> Value {
        json!({
            "$schema": DRAFT_04,
            "title": self.title,
            "type": "object",
            "properties": properties_json(&self.properties),
        })
    }
}
