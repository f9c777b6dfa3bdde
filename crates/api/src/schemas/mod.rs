//! Structural validation of JSON payloads.
//!
//! A schema checks presence, JSON type, length and unknown keys, and collects
//! every problem before failing, so a client sees all of them at once. The
//! semantic checks (code shapes, email, phone) are left to the entity
//! validators in [`crate::models`].

pub mod address;
pub mod customer;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

pub use address::AddressSchema;
pub use customer::CustomerSchema;

use crate::error::WriteError;

/// Key for errors about the payload as a whole rather than one field.
pub const SCHEMA_KEY: &str = "_schema";

/// Messages keyed by field, in the shape returned to clients.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A payload failed structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub errors: FieldErrors,
}

impl SchemaValidationError {
    /// An error about the payload as a whole.
    #[must_use]
    pub fn whole(message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(SCHEMA_KEY.to_string(), vec![message.into()]);
        Self { errors }
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for SchemaValidationError {}

/// Parse a request body into a JSON object.
///
/// A missing, blank or empty body, and any JSON value that is "empty"
/// (`null`, `false`, `0`, `""`, `[]`, `{}`), counts as no input at all.
///
/// # Errors
///
/// - [`WriteError::NoInput`] for an empty payload
/// - [`WriteError::Schema`] under `_schema` for malformed JSON or a
///   non-object payload
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, WriteError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WriteError::NoInput);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SchemaValidationError::whole(format!("Invalid JSON: {e}")))?;

    if is_empty_value(&value) {
        return Err(WriteError::NoInput);
    }

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SchemaValidationError::whole("Invalid input type.").into()),
    }
}

/// `2.0` as `2`; `None` for fractions and values outside `i64`.
#[allow(clippy::cast_possible_truncation)]
fn integral(value: f64) -> Option<i64> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (value.fract() == 0.0 && (-BOUND..BOUND).contains(&value)).then(|| value as i64)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Reads declared fields out of a payload, accumulating errors.
///
/// Every read registers the field as declared; [`FieldReader::finish`]
/// flags any remaining key as unknown.
pub struct FieldReader<'a> {
    payload: &'a Map<String, Value>,
    declared: Vec<&'static str>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub const fn new(payload: &'a Map<String, Value>) -> Self {
        Self {
            payload,
            declared: Vec::new(),
            errors: FieldErrors::new(),
        }
    }

    /// A string that must be present and not null.
    ///
    /// Returns an empty string when the field is in error; the caller must
    /// not use it once [`FieldReader::finish`] fails.
    pub fn required_string(&mut self, field: &'static str, max_len: usize) -> String {
        self.declared.push(field);
        let payload = self.payload;
        match payload.get(field) {
            None => {
                self.add_error(field, "Missing data for required field.");
                String::new()
            }
            Some(Value::Null) => {
                self.add_error(field, "Field may not be null.");
                String::new()
            }
            Some(value) => self.string_value(field, value, max_len).unwrap_or_default(),
        }
    }

    /// A string that may be absent or null.
    pub fn optional_string(&mut self, field: &'static str, max_len: usize) -> Option<String> {
        self.declared.push(field);
        let payload = self.payload;
        match payload.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.string_value(field, value, max_len),
        }
    }

    /// An integer that may be absent or null.
    ///
    /// Numeric strings and floats without a fractional part are accepted.
    pub fn optional_integer(&mut self, field: &'static str) -> Option<i64> {
        self.declared.push(field);
        let payload = self.payload;
        let parsed = match payload.get(field)? {
            Value::Null => return None,
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.add_error(field, "Not a valid integer.");
        }
        parsed
    }

    /// Record an error against a field.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Flag undeclared keys and return every error collected.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError`] if any field failed.
    pub fn finish(mut self) -> Result<(), SchemaValidationError> {
        let unknown: Vec<String> = self
            .payload
            .keys()
            .filter(|key| !self.declared.iter().any(|declared| *declared == key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.add_error(&key, "Unknown field.");
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError {
                errors: self.errors,
            })
        }
    }

    fn string_value(&mut self, field: &str, value: &Value, max_len: usize) -> Option<String> {
        match value {
            Value::String(s) if s.chars().count() > max_len => {
                self.add_error(field, format!("Longer than maximum length {max_len}."));
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.add_error(field, "Not a valid string.");
                None
            }
        }
    }
}
