//! # Request Parameters
//!
//! Declared query parameters for the product routes, and the parser that
//! sanitizes, validates and types incoming values against those
//! declarations. Unknown query keys are ignored.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use super::errors::{RestError, RestResult};

/// Maximum page size for collection requests
pub const MAX_PER_PAGE: i64 = 100;

/// Default page size
pub const DEFAULT_PER_PAGE: i64 = 10;

pub type Sanitizer = fn(&str) -> String;

/// Lower-case a value and strip everything outside `[a-z0-9_-]`
pub fn sanitize_key(value: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^a-z0-9_\-]").expect("valid regex"));
    unsafe_chars
        .replace_all(&value.to_lowercase(), "")
        .into_owned()
}

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// Comma-separated list of positive integer ids
    IdList,
    /// RFC 3339 timestamp
    DateTime,
}

/// Declaration of one query parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub description: &'static str,
    pub kind: ParamType,
    pub enum_values: Vec<&'static str>,
    /// Raw default, parsed like a supplied value
    pub default: Option<&'static str>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub sanitize: Option<Sanitizer>,
}

impl ParamSpec {
    pub fn new(kind: ParamType, description: &'static str) -> Self {
        Self {
            description,
            kind,
            enum_values: Vec::new(),
            default: None,
            minimum: None,
            maximum: None,
            sanitize: None,
        }
    }

    pub fn string(description: &'static str) -> Self {
        Self::new(ParamType::String, description)
    }

    pub fn integer(description: &'static str) -> Self {
        Self::new(ParamType::Integer, description)
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.enum_values = values.to_vec();
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn range(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn sanitized(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitize = Some(sanitizer);
        self
    }

    /// Enumerated string sanitized to a key, the shape of every filter operator
    pub fn enumerated_key(description: &'static str, values: &[&'static str]) -> Self {
        Self::string(description).one_of(values).sanitized(sanitize_key)
    }

    /// Declaration as published in the route description
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("description".into(), json!(self.description));
        let type_name = match self.kind {
            ParamType::String | ParamType::DateTime => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::IdList => "array",
        };
        out.insert("type".into(), json!(type_name));
        match self.kind {
            ParamType::IdList => {
                out.insert("items".into(), json!({"type": "integer"}));
            }
            ParamType::DateTime => {
                out.insert("format".into(), json!("date-time"));
            }
            _ => {}
        }
        if !self.enum_values.is_empty() {
            out.insert("enum".into(), json!(self.enum_values));
        }
        if let Some(default) = self.default {
            let rendered = match self.kind {
                ParamType::Integer => default.parse::<i64>().map(Value::from).unwrap_or(json!(default)),
                ParamType::Boolean => json!(default == "true"),
                _ => json!(default),
            };
            out.insert("default".into(), rendered);
        }
        if let Some(min) = self.minimum {
            out.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.maximum {
            out.insert("maximum".into(), json!(max));
        }
        out.insert("required".into(), json!(false));
        Value::Object(out)
    }

    /// Sanitize then validate one raw value
    pub fn parse(&self, name: &str, raw: &str) -> RestResult<ParamValue> {
        let value = match self.sanitize {
            Some(sanitize) => sanitize(raw),
            None => raw.trim().to_string(),
        };

        match self.kind {
            ParamType::String => {
                if !self.enum_values.is_empty() && !self.enum_values.contains(&value.as_str()) {
                    return Err(RestError::invalid_param(
                        name,
                        format!("{} is not one of {}.", name, self.enum_values.join(", ")),
                    ));
                }
                Ok(ParamValue::String(value))
            }
            ParamType::Integer => {
                let number: i64 = value.parse().map_err(|_| {
                    RestError::invalid_param(name, format!("{} is not of type integer.", name))
                })?;
                if let Some(min) = self.minimum.filter(|min| number < *min) {
                    return Err(RestError::invalid_param(
                        name,
                        format!("{} must be greater than or equal to {}", name, min),
                    ));
                }
                if let Some(max) = self.maximum.filter(|max| number > *max) {
                    return Err(RestError::invalid_param(
                        name,
                        format!("{} must be between {} and {}", name, self.minimum.unwrap_or(0), max),
                    ));
                }
                Ok(ParamValue::Integer(number))
            }
            ParamType::Number => Decimal::from_str(&value)
                .map(ParamValue::Number)
                .map_err(|_| RestError::invalid_param(name, format!("{} is not of type number.", name))),
            ParamType::Boolean => match value.to_lowercase().as_str() {
                "true" | "1" => Ok(ParamValue::Boolean(true)),
                "false" | "0" => Ok(ParamValue::Boolean(false)),
                _ => Err(RestError::invalid_param(
                    name,
                    format!("{} is not of type boolean.", name),
                )),
            },
            ParamType::IdList => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u64>().map_err(|_| {
                        RestError::invalid_param(name, format!("{}[] is not of type integer.", name))
                    })
                })
                .collect::<RestResult<Vec<_>>>()
                .map(ParamValue::IdList),
            ParamType::DateTime => DateTime::parse_from_rfc3339(&value)
                .map(ParamValue::DateTime)
                .map_err(|_| RestError::invalid_param(name, "Invalid date.")),
        }
    }
}

/// A sanitized, validated value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Number(Decimal),
    Boolean(bool),
    IdList(Vec<u64>),
    DateTime(DateTime<FixedOffset>),
}

/// Parsed request parameters, defaults applied
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    values: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String value, treating empty strings as absent
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get_str(name).filter(|s| !s.is_empty())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_decimal(&self, name: &str) -> Option<Decimal> {
        match self.values.get(name) {
            Some(ParamValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ParamValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_ids(&self, name: &str) -> &[u64] {
        match self.values.get(name) {
            Some(ParamValue::IdList(ids)) => ids,
            _ => &[],
        }
    }

    pub fn get_datetime(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        match self.values.get(name) {
            Some(ParamValue::DateTime(d)) => Some(*d),
            _ => None,
        }
    }
}

/// The declared parameter set of a route
#[derive(Debug, Clone, Default)]
pub struct CollectionParams {
    specs: BTreeMap<&'static str, ParamSpec>,
}

impl CollectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the `context` parameter
    pub fn context_only() -> Self {
        let mut params = Self::new();
        params.insert(
            "context",
            ParamSpec::enumerated_key(
                "Scope under which the request is made; determines fields present in response.",
                &["view", "edit", "embed"],
            )
            .default_value("view"),
        );
        params
    }

    /// Parameters accepted by the default product listing
    pub fn base_products() -> Self {
        let mut params = Self::context_only();

        params.insert(
            "page",
            ParamSpec::integer("Current page of the collection.")
                .default_value("1")
                .range(Some(1), None),
        );
        params.insert(
            "per_page",
            ParamSpec::integer("Maximum number of items to be returned in result set.")
                .default_value("10")
                .range(Some(1), Some(MAX_PER_PAGE)),
        );
        params.insert(
            "search",
            ParamSpec::string("Limit results to those matching a string."),
        );
        params.insert(
            "after",
            ParamSpec::new(
                ParamType::DateTime,
                "Limit response to resources published after a given ISO8601 compliant date.",
            ),
        );
        params.insert(
            "before",
            ParamSpec::new(
                ParamType::DateTime,
                "Limit response to resources published before a given ISO8601 compliant date.",
            ),
        );
        params.insert(
            "exclude",
            ParamSpec::new(ParamType::IdList, "Ensure result set excludes specific IDs."),
        );
        params.insert(
            "include",
            ParamSpec::new(ParamType::IdList, "Limit result set to specific ids."),
        );
        params.insert(
            "offset",
            ParamSpec::integer("Offset the result set by a specific number of items.")
                .range(Some(0), None),
        );
        params.insert(
            "order",
            ParamSpec::string("Order sort attribute ascending or descending.")
                .one_of(&["asc", "desc"])
                .default_value("desc"),
        );
        params.insert(
            "orderby",
            ParamSpec::string("Sort collection by object attribute.")
                .one_of(&[
                    "date",
                    "id",
                    "include",
                    "title",
                    "slug",
                    "price",
                    "popularity",
                    "rating",
                ])
                .default_value("date"),
        );
        params.insert(
            "parent",
            ParamSpec::new(
                ParamType::IdList,
                "Limit result set to those of particular parent IDs.",
            ),
        );
        params.insert(
            "slug",
            ParamSpec::string("Limit result set to products with a specific slug."),
        );
        params.insert(
            "status",
            ParamSpec::string("Limit result set to products assigned a specific status.")
                .one_of(&["any", "draft", "pending", "private", "publish"])
                .default_value("any"),
        );
        params.insert(
            "type",
            ParamSpec::string("Limit result set to products assigned a specific type.")
                .one_of(&["simple", "grouped", "external", "variable"]),
        );
        params.insert(
            "sku",
            ParamSpec::string("Limit result set to products with specific SKU(s). Use commas to separate."),
        );
        params.insert(
            "featured",
            ParamSpec::new(ParamType::Boolean, "Limit result set to featured products."),
        );
        params.insert(
            "category",
            ParamSpec::new(ParamType::IdList, "Limit result set to products assigned a specific category ID."),
        );
        params.insert(
            "tag",
            ParamSpec::new(ParamType::IdList, "Limit result set to products assigned a specific tag ID."),
        );
        params.insert(
            "attribute",
            ParamSpec::string("Limit result set to products with a specific attribute. Use the taxonomy name/attribute slug."),
        );
        params.insert(
            "attribute_term",
            ParamSpec::new(
                ParamType::IdList,
                "Limit result set to products with a specific attribute term ID (requires an assigned attribute).",
            ),
        );
        params.insert(
            "on_sale",
            ParamSpec::new(ParamType::Boolean, "Limit result set to products on sale."),
        );
        params.insert(
            "min_price",
            ParamSpec::new(ParamType::Number, "Limit result set to products based on a minimum price."),
        );
        params.insert(
            "max_price",
            ParamSpec::new(ParamType::Number, "Limit result set to products based on a maximum price."),
        );
        params.insert(
            "stock_status",
            ParamSpec::string("Limit result set to products with specified stock status.")
                .one_of(&["instock", "outofstock", "onbackorder"]),
        );

        params
    }

    pub fn insert(&mut self, name: &'static str, spec: ParamSpec) {
        self.specs.insert(name, spec);
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.get(name)
    }

    /// Append values to an enumerated parameter
    pub fn extend_enum(&mut self, name: &str, values: &[&'static str]) {
        if let Some(spec) = self.specs.get_mut(name) {
            for value in values {
                if !spec.enum_values.contains(value) {
                    spec.enum_values.push(value);
                }
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.specs
                .iter()
                .map(|(name, spec)| (name.to_string(), spec.to_json()))
                .collect(),
        )
    }

    /// Validate raw query values against the declarations
    pub fn parse(&self, raw: &HashMap<String, String>) -> RestResult<RequestParams> {
        let mut values = BTreeMap::new();

        for (name, spec) in &self.specs {
            let parsed = match (raw.get(*name), spec.default) {
                (Some(value), _) => spec.parse(name, value)?,
                (None, Some(default)) => spec.parse(name, default)?,
                (None, None) => continue,
            };
            values.insert(name.to_string(), parsed);
        }

        Ok(RequestParams { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("NOT_IN"), "not_in");
        assert_eq!(sanitize_key(" a<n>d "), "and");
        assert_eq!(sanitize_key("exclude-from-search"), "exclude-from-search");
        assert_eq!(sanitize_key(""), "");
    }

    #[test]
    fn test_defaults_applied() {
        let params = CollectionParams::base_products().parse(&HashMap::new()).unwrap();
        assert_eq!(params.get_int("page"), Some(1));
        assert_eq!(params.get_int("per_page"), Some(10));
        assert_eq!(params.get_str("order"), Some("desc"));
        assert_eq!(params.get_str("context"), Some("view"));
        assert!(params.get("search").is_none());
    }

    #[test]
    fn test_per_page_bounds() {
        let params = CollectionParams::base_products();
        assert!(params.parse(&raw(&[("per_page", "100")])).is_ok());

        let err = params.parse(&raw(&[("per_page", "101")])).unwrap_err();
        assert!(matches!(err, RestError::InvalidParam { ref param, .. } if param == "per_page"));

        let err = params.parse(&raw(&[("page", "0")])).unwrap_err();
        assert!(matches!(err, RestError::InvalidParam { ref param, .. } if param == "page"));
    }

    #[test]
    fn test_enum_membership_after_sanitizing() {
        let mut params = CollectionParams::new();
        params.insert(
            "tag_operator",
            ParamSpec::enumerated_key("Operator", &["in", "not_in", "and"]).default_value("in"),
        );

        let parsed = params.parse(&raw(&[("tag_operator", "NOT_IN")])).unwrap();
        assert_eq!(parsed.get_str("tag_operator"), Some("not_in"));

        assert!(params.parse(&raw(&[("tag_operator", "")])).is_err());
        assert!(params.parse(&raw(&[("tag_operator", "or")])).is_err());
    }

    #[test]
    fn test_id_lists_and_booleans() {
        let params = CollectionParams::base_products();
        let parsed = params
            .parse(&raw(&[("include", "3, 5,8"), ("featured", "true")]))
            .unwrap();
        assert_eq!(parsed.get_ids("include"), &[3, 5, 8]);
        assert_eq!(parsed.get_bool("featured"), Some(true));

        assert!(params.parse(&raw(&[("exclude", "3,x")])).is_err());
        assert!(params.parse(&raw(&[("on_sale", "maybe")])).is_err());
    }

    #[test]
    fn test_dates_and_prices() {
        let params = CollectionParams::base_products();
        let parsed = params
            .parse(&raw(&[("after", "2024-01-01T00:00:00Z"), ("min_price", "9.50")]))
            .unwrap();
        assert!(parsed.get_datetime("after").is_some());
        assert_eq!(parsed.get_decimal("min_price"), Some(Decimal::new(950, 2)));

        assert!(params.parse(&raw(&[("before", "yesterday")])).is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = CollectionParams::base_products();
        assert!(params.parse(&raw(&[("utm_source", "newsletter")])).is_ok());
    }

    #[test]
    fn test_extend_enum_keeps_existing() {
        let mut params = CollectionParams::base_products();
        params.extend_enum("orderby", &["menu_order", "comment_count", "date"]);
        let orderby = params.get("orderby").unwrap();
        assert_eq!(orderby.enum_values.len(), 10);
        assert_eq!(orderby.enum_values.last(), Some(&"comment_count"));
    }

    #[test]
    fn test_declaration_json() {
        let params = CollectionParams::base_products().to_json();
        assert_eq!(params["per_page"]["maximum"], 100);
        assert_eq!(params["per_page"]["default"], 10);
        assert_eq!(params["include"]["type"], "array");
        assert_eq!(params["after"]["format"], "date-time");
    }
}
