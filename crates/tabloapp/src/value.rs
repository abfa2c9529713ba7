//! Typed property values.

use std::fmt;

use chrono::{DateTime, Utc};

/// Runtime representation of a decoded property value.
///
/// This is the value domain shared by every property codec. The codec
/// selected by a field's type tag decides which variant a read produces
/// and which variant a write accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Plain text (title, rich text, select option names)
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean flag
    Checkbox(bool),

    /// List of strings (multi-select option names)
    List(Vec<String>),

    /// Point in time (dates, audit timestamps)
    ///
    /// Date-only wire values are anchored at midnight UTC.
    Date(DateTime<Utc>),
}

impl PropertyValue {
    /// Get the text if this is a Text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the number if this is a Number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the flag if this is a Checkbox.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Checkbox(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the list if this is a List.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Get the timestamp if this is a Date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Variant name used in type mismatch messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Number(_) => "number",
            PropertyValue::Checkbox(_) => "checkbox",
            PropertyValue::List(_) => "list",
            PropertyValue::Date(_) => "date",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Checkbox(b) => write!(f, "{}", b),
            PropertyValue::List(v) => write!(f, "{}", v.join(", ")),
            PropertyValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Checkbox(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_extracts_text() {
        assert_eq!(PropertyValue::Text("Done".into()).as_str(), Some("Done"));
        assert_eq!(PropertyValue::Number(1.0).as_str(), None);
    }

    #[test]
    fn as_number_extracts_number() {
        assert_eq!(PropertyValue::Number(4.5).as_number(), Some(4.5));
        assert_eq!(PropertyValue::Checkbox(true).as_number(), None);
    }

    #[test]
    fn as_bool_extracts_flag() {
        assert_eq!(PropertyValue::Checkbox(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::Text("true".into()).as_bool(), None);
    }

    #[test]
    fn as_list_extracts_names() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            PropertyValue::List(list.clone()).as_list(),
            Some(list.as_slice())
        );
        assert_eq!(PropertyValue::Checkbox(false).as_list(), None);
    }

    #[test]
    fn as_date_extracts_timestamp() {
        let now = Utc::now();
        assert_eq!(PropertyValue::Date(now).as_date(), Some(now));
        assert_eq!(PropertyValue::Number(0.0).as_date(), None);
    }

    #[test]
    fn from_conversions_pick_the_right_variant() {
        assert_eq!(PropertyValue::from("x"), PropertyValue::Text("x".into()));
        assert_eq!(PropertyValue::from(2.0), PropertyValue::Number(2.0));
        assert_eq!(PropertyValue::from(true), PropertyValue::Checkbox(true));
        assert_eq!(
            PropertyValue::from(vec!["t".to_string()]),
            PropertyValue::List(vec!["t".to_string()])
        );
    }

    #[test]
    fn display_joins_lists() {
        let value = PropertyValue::List(vec!["red".into(), "blue".into()]);
        assert_eq!(value.to_string(), "red, blue");
    }
}
