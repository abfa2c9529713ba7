//! Database schema: the declared property fields and their lookup keys.

use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use crate::codec::{codec_for, PropertyKind};
use crate::error::{Result, TabloError};
use crate::name;

/// Everything known about one declared property field.
///
/// Built once from the database schema (or from a page record, which
/// carries the same `id`/`type` envelope per property) and shared as
/// context by codecs, filters and error messages.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// Wire type tag, e.g. `"select"`
    pub tag: String,

    /// Resolved kind, `None` when the tag has no registered codec
    pub kind: Option<PropertyKind>,

    /// The database this field belongs to
    pub database_id: Uuid,

    /// Server-assigned field id, used as the key in update requests
    pub field_id: String,

    /// Display name exactly as configured remotely
    pub raw_name: String,

    /// Normalized lookup key derived from `raw_name`
    pub name: String,

    /// Declared option names for select-like fields, empty otherwise
    pub options: Vec<String>,
}

impl PropertyInfo {
    /// Build field info from one property payload, either a schema entry
    /// or a page property record. Both carry `id` and `type`; the schema
    /// entry additionally nests the declared options under the tag key.
    pub fn from_payload(database_id: Uuid, raw_name: &str, payload: &Value) -> Result<Self> {
        let field_id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| TabloError::Malformed {
                tag: "schema".to_string(),
                reason: format!("property {raw_name:?} has no id"),
            })?
            .to_string();
        let tag = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| TabloError::Malformed {
                tag: "schema".to_string(),
                reason: format!("property {raw_name:?} has no type"),
            })?
            .to_string();

        let options = payload
            .get(&tag)
            .and_then(|config| config.get("options"))
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|option| option.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            kind: codec_for(&tag).map(|codec| codec.kind),
            tag,
            database_id,
            field_id,
            raw_name: raw_name.to_string(),
            name: name::normalize(raw_name),
            options,
        })
    }
}

/// The property fields of one database, keyed by normalized name.
#[derive(Debug, Clone)]
pub struct Schema {
    database_id: Uuid,
    fields: BTreeMap<String, PropertyInfo>,
}

impl Schema {
    /// Build a schema from a database retrieve response.
    ///
    /// Every declared property must normalize to a distinct, non-empty
    /// key; a database that violates that is rejected outright rather
    /// than left with unreachable fields.
    pub fn from_payload(database_id: Uuid, payload: &Value) -> Result<Self> {
        let properties = payload
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| TabloError::Malformed {
                tag: "schema".to_string(),
                reason: "response has no properties object".to_string(),
            })?;

        let mut fields: BTreeMap<String, PropertyInfo> = BTreeMap::new();
        for (raw_name, property) in properties {
            let info = PropertyInfo::from_payload(database_id, raw_name, property)?;
            if info.name.is_empty() {
                return Err(TabloError::EmptyFieldName(raw_name.clone()));
            }
            if let Some(existing) = fields.get(&info.name) {
                return Err(TabloError::DuplicateField {
                    name: info.name.clone(),
                    first: existing.raw_name.clone(),
                    second: raw_name.clone(),
                });
            }
            fields.insert(info.name.clone(), info);
        }

        Ok(Self {
            database_id,
            fields,
        })
    }

    pub fn database_id(&self) -> Uuid {
        self.database_id
    }

    /// Look up a field by name. The input is normalized first, so
    /// `"Due Date"`, `"due date"` and `"due_date"` all resolve alike.
    pub fn field(&self, name: &str) -> Result<&PropertyInfo> {
        let key = name::normalize(name);
        self.fields
            .get(&key)
            .ok_or_else(|| TabloError::UnknownField(name.to_string()))
    }

    /// All fields in normalized-name order.
    pub fn fields(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(properties: Value) -> Result<Schema> {
        Schema::from_payload(Uuid::new_v4(), &json!({ "properties": properties }))
    }

    #[test]
    fn builds_fields_with_normalized_keys() {
        let schema = schema(json!({
            "Name": { "id": "title", "type": "title", "title": {} },
            "Due Date": { "id": "a%3Ab", "type": "date", "date": {} },
        }))
        .unwrap();

        assert_eq!(schema.len(), 2);
        let due = schema.field("Due Date").unwrap();
        assert_eq!(due.name, "due_date");
        assert_eq!(due.field_id, "a%3Ab");
        assert_eq!(due.kind, Some(PropertyKind::Date));
        assert_eq!(schema.field("due_date").unwrap().raw_name, "Due Date");
    }

    #[test]
    fn select_options_are_collected() {
        let schema = schema(json!({
            "Status": {
                "id": "s%40",
                "type": "select",
                "select": { "options": [
                    { "name": "Todo", "color": "red" },
                    { "name": "Done", "color": "green" },
                ]},
            },
        }))
        .unwrap();

        let status = schema.field("status").unwrap();
        assert_eq!(status.options, vec!["Todo", "Done"]);
    }

    #[test]
    fn unregistered_tags_keep_their_info() {
        let schema = schema(json!({
            "Link": { "id": "u", "type": "url", "url": {} },
        }))
        .unwrap();

        let link = schema.field("link").unwrap();
        assert_eq!(link.tag, "url");
        assert_eq!(link.kind, None);
    }

    #[test]
    fn unknown_field_lookup_fails() {
        let schema = schema(json!({
            "Name": { "id": "title", "type": "title", "title": {} },
        }))
        .unwrap();

        let err = schema.field("missing").unwrap_err();
        assert!(matches!(err, TabloError::UnknownField(name) if name == "missing"));
    }

    #[test]
    fn colliding_names_are_rejected() {
        let err = schema(json!({
            "Due Date": { "id": "a", "type": "date", "date": {} },
            "due-date": { "id": "b", "type": "date", "date": {} },
        }))
        .unwrap_err();

        match err {
            TabloError::DuplicateField { name, first, second } => {
                assert_eq!(name, "due_date");
                assert_ne!(first, second);
            }
            other => panic!("expected DuplicateField, got {other:?}"),
        }
    }

    #[test]
    fn all_punctuation_name_is_rejected() {
        let err = schema(json!({
            "!!!": { "id": "a", "type": "checkbox", "checkbox": {} },
        }))
        .unwrap_err();

        assert!(matches!(err, TabloError::EmptyFieldName(name) if name == "!!!"));
    }

    #[test]
    fn missing_type_is_malformed() {
        let err = schema(json!({
            "Name": { "id": "title" },
        }))
        .unwrap_err();

        assert!(matches!(err, TabloError::Malformed { .. }));
    }

    #[test]
    fn fields_iterate_in_name_order() {
        let schema = schema(json!({
            "Zeta": { "id": "z", "type": "number", "number": {} },
            "Alpha": { "id": "a", "type": "number", "number": {} },
        }))
        .unwrap();

        let names: Vec<_> = schema.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
