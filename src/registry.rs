//! Field registry: the declarative table mapping external setting names to
//! validation metadata and underlying storage keys.
//!
//! The registry is built once at startup and shared read-only; there are no
//! mutation operations after construction.

use crate::error::{AppError, Result};
use crate::sanitize::Sanitizer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Declared value type of a setting, used for coercion on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
}

impl FieldKind {
    /// JSON Schema type name for this kind.
    pub fn schema_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    /// The type's zero value, returned when a setting has neither a stored
    /// value nor a declared default.
    pub fn zero(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Integer => json!(0),
            Self::Boolean => Value::Bool(false),
        }
    }

    /// Coerce an arbitrary stored value to this kind.
    ///
    /// Conversion rules match loose dynamic-language casts: integer coercion
    /// parses a leading numeric prefix (else 0), boolean coercion treats
    /// null, false, zero, `""` and `"0"` as false, string coercion renders
    /// true as `"1"` and false as `""`.
    pub fn coerce(self, value: &Value) -> Value {
        match self {
            Self::String => Value::String(coerce_string(value)),
            Self::Integer => json!(coerce_integer(value)),
            Self::Boolean => Value::Bool(is_truthy(value)),
        }
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn coerce_integer(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        _ => 0,
    }
}

/// Parse a leading integer prefix: optional sign followed by digits,
/// ignoring leading whitespace and any trailing garbage. Yields 0 when no
/// digits are present; values beyond the i64 range saturate.
fn leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut chars = trimmed.char_indices();
    let mut end = 0;
    let mut saw_digit = false;

    if let Some((_, c)) = chars.next() {
        if c == '+' || c == '-' {
            end = c.len_utf8();
        } else if c.is_ascii_digit() {
            saw_digit = true;
            end = c.len_utf8();
        } else {
            return 0;
        }
    }

    for (idx, c) in chars {
        if c.is_ascii_digit() {
            saw_digit = true;
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }

    if !saw_digit {
        return 0;
    }
    // The slice is sign+digits only, so the sole parse failure is overflow.
    trimmed[..end].parse().unwrap_or_else(|_| {
        if trimmed.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Loose truthiness: null, false, numeric zero, `""` and `"0"` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// A stored value counts as empty (triggering default substitution) when it
/// is falsy under [`is_truthy`].
pub fn is_empty_value(value: &Value) -> bool {
    !is_truthy(value)
}

/// Visibility tag for a field; documented per field but not enforced as an
/// access-control boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    View,
    Edit,
}

/// Registry entry describing one externally visible setting.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Stable public identifier, unique across the registry.
    pub name: String,
    /// Human-readable label, surfaced in the schema document.
    pub description: String,
    pub kind: FieldKind,
    /// JSON Schema `format` hint (e.g. `"uri"`); documentation only.
    pub format: Option<String>,
    /// Substituted when the stored value is absent or empty.
    pub default: Option<Value>,
    /// Applied to raw input before persistence; `None` stores input as-is.
    pub sanitizer: Option<Sanitizer>,
    pub contexts: Vec<Context>,
    /// Underlying store key. `None` marks an unmapped descriptor, which is
    /// skipped by the collection read path.
    pub storage_key: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind,
            format: None,
            default: None,
            sanitizer: None,
            contexts: vec![Context::View, Context::Edit],
            storage_key: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn storage_key(mut self, key: &str) -> Self {
        self.storage_key = Some(key.to_string());
        self
    }
}

/// Immutable table of field descriptors, indexed by external name.
///
/// Iteration order is registration order; stable for deterministic output.
#[derive(Debug)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build a registry from a descriptor table. Duplicate external names
    /// are a configuration error; an empty storage key counts as unmapped.
    pub fn new(mut fields: Vec<FieldDescriptor>) -> Result<Self> {
        for field in &mut fields {
            if field.storage_key.as_deref() == Some("") {
                field.storage_key = None;
            }
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(AppError::config_validation(
                    format!("duplicate field name '{}' in registry", field.name),
                    Some(field.name.clone()),
                ));
            }
        }
        Ok(Self { fields, by_name })
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of descriptors with a storage mapping; the collection read
    /// path yields exactly this many entries.
    pub fn mapped_len(&self) -> usize {
        self.fields.iter().filter(|f| f.storage_key.is_some()).count()
    }

    /// The registry rendered as a JSON Schema (draft-04) object for client
    /// discovery and validation.
    pub fn schema_document(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("description".into(), json!(field.description));
            prop.insert("type".into(), json!(field.kind.schema_type()));
            if let Some(format) = &field.format {
                prop.insert("format".into(), json!(format));
            }
            prop.insert("context".into(), json!(field.contexts));
            if let Some(default) = &field.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(field.name.clone(), Value::Object(prop));
        }

        json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "title": "site",
            "type": "object",
            "properties": properties,
        })
    }

    /// The canonical site settings table: thirteen mapped fields covering
    /// identity, membership, localization and permalink structure.
    pub fn site_defaults() -> Self {
        let fields = vec![
            FieldDescriptor::new("title", FieldKind::String)
                .description("Site Title")
                .sanitizer(Sanitizer::Text)
                .storage_key("blogname"),
            FieldDescriptor::new("tagline", FieldKind::String)
                .description("Tagline")
                .sanitizer(Sanitizer::Text)
                .storage_key("blogdescription"),
            FieldDescriptor::new("application_url", FieldKind::String)
                .description("Application Address (URL)")
                .format("uri")
                .storage_key("siteurl"),
            FieldDescriptor::new("url", FieldKind::String)
                .description("Site Address (URL)")
                .format("uri")
                .storage_key("home"),
            FieldDescriptor::new("users_can_register", FieldKind::Boolean)
                .description("Membership")
                .storage_key("users_can_register"),
            FieldDescriptor::new("timezone_string", FieldKind::String)
                .description("Timezone")
                .default_value(json!("UTC"))
                .storage_key("timezone_string"),
            FieldDescriptor::new("date_format", FieldKind::String)
                .description("Date Format")
                .storage_key("date_format"),
            FieldDescriptor::new("time_format", FieldKind::String)
                .description("Time Format")
                .storage_key("time_format"),
            FieldDescriptor::new("start_of_week", FieldKind::Integer)
                .description("Week Starts On")
                .sanitizer(Sanitizer::NonNegativeInt)
                .storage_key("start_of_week"),
            FieldDescriptor::new("locale", FieldKind::String)
                .description("Site Language")
                .default_value(json!("en_US"))
                .storage_key("WPLANG"),
            FieldDescriptor::new("permalink_structure", FieldKind::String)
                .description("Permalink Settings")
                .storage_key("permalink_structure"),
            FieldDescriptor::new("permalink_category_base", FieldKind::String)
                .description("Category base")
                .storage_key("category_base"),
            FieldDescriptor::new("permalink_tag_base", FieldKind::String)
                .description("Tag base")
                .storage_key("tag_base"),
        ];

        // The static table above has no duplicate names.
        Self::new(fields).expect("default registry is valid")
    }
}
