use thiserror::Error;

use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum TabloError {
    #[error("Unsupported property type \"{0}\"")]
    UnsupportedPropertyType(String),

    #[error("\"{value}\" is not a choice for {field} (options: {options:?})")]
    InvalidChoice {
        field: String,
        value: String,
        options: Vec<String>,
    },

    #[error("{tag} ({field}) property is read-only")]
    ReadOnlyProperty { field: String, tag: &'static str },

    #[error("{field} holds {expected} values, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{field} is a {tag} property, {wanted} predicates do not apply")]
    InvalidFilterType {
        field: String,
        tag: String,
        wanted: &'static str,
    },

    #[error("No property named {0:?}")]
    UnknownField(String),

    #[error("Properties {first:?} and {second:?} both normalize to {name:?}")]
    DuplicateField {
        name: String,
        first: String,
        second: String,
    },

    #[error("Property name {0:?} normalizes to an empty key")]
    EmptyFieldName(String),

    #[error("Malformed {tag} payload: {reason}")]
    Malformed { tag: String, reason: String },

    #[error("Remote request failed ({context}): {source}")]
    Remote {
        context: String,
        source: BackendError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TabloError>;
