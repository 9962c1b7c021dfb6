//! Field rules checked before anything is written to the store.
//!
//! Each resource exposes a `validate_*` function which takes the raw JSON body
//! and returns either a draft ready for persistence or the per-field messages
//! that go verbatim into the error response.

pub mod city;
pub mod comment;
pub mod place;

pub use city::validate_city;
pub use comment::validate_comment;
pub use place::validate_place;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::database::DatabaseError;
use crate::error::ApiError;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_STRING: &str = "Not a valid string.";

/// Field name to list of messages, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Why a payload was not accepted
#[derive(Debug, thiserror::Error)]
pub enum Invalid {
    #[error("invalid fields")]
    Fields(FieldErrors),
    #[error("invalid request body: {0}")]
    Body(String),
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl Invalid {
    /// Attach the operation's failure message, e.g. "couldn't create city"
    pub fn into_api_error(self, msg: &str) -> ApiError {
        match self {
            Invalid::Fields(errors) => {
                tracing::debug!("{}: invalid {:?}", msg, errors.fields().collect::<Vec<_>>());
                ApiError::validation_failed(msg, errors)
            }
            Invalid::Body(detail) => ApiError::InvalidBody(detail),
            Invalid::Store(e) => ApiError::Store(e),
        }
    }
}

pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

pub fn missing_pk(id: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Accumulates errors while pulling typed values out of a JSON object
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(payload: &'a Value) -> Result<Self, Invalid> {
        match payload {
            Value::Object(map) => Ok(Self {
                map,
                errors: FieldErrors::new(),
            }),
            other => Err(Invalid::Body(format!(
                "expected a JSON object, received {}",
                type_name(other)
            ))),
        }
    }

    pub(crate) fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub(crate) fn has_error(&self, field: &str) -> bool {
        self.errors.get(field).is_some()
    }

    pub(crate) fn raw(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field)
    }

    /// Trimmed, non-blank string no longer than `max` characters
    pub(crate) fn required_str(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        let map = self.map;
        match map.get(field) {
            None => {
                self.error(field, REQUIRED);
                None
            }
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                None
            }
            Some(value) => match self.string(field, value, max) {
                Some(s) if s.is_empty() => {
                    self.error(field, NOT_BLANK);
                    None
                }
                other => other,
            },
        }
    }

    /// Missing, null and blank all become `None`
    pub(crate) fn optional_str(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        let map = self.map;
        match map.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.string(field, value, max).filter(|s| !s.is_empty()),
        }
    }

    /// Integer primary key, given as a JSON number or a numeric string
    pub(crate) fn required_pk(&mut self, field: &str) -> Option<i64> {
        let map = self.map;
        match map.get(field) {
            None => {
                self.error(field, REQUIRED);
                None
            }
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                None
            }
            Some(value) => {
                let pk = parse_pk(value);
                if pk.is_none() {
                    self.error(
                        field,
                        format!("Incorrect type. Expected pk value, received {}.", type_name(value)),
                    );
                }
                pk
            }
        }
    }

    fn string(&mut self, field: &str, value: &Value, max: Option<usize>) -> Option<String> {
        let s = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.error(field, NOT_STRING);
                return None;
            }
        };

        match max {
            Some(max) if s.chars().count() > max => {
                self.error(field, too_long(max));
                None
            }
            _ => Some(s),
        }
    }

    pub(crate) fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Invalid> {
        if !self.errors.is_empty() {
            return Err(Invalid::Fields(self.errors));
        }
        // every field yielded a value when no error was recorded
        build().ok_or_else(|| Invalid::Body("incomplete payload".to_string()))
    }
}

pub(crate) fn parse_pk(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
