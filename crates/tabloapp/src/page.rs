//! Page records: identity, audit metadata and lazy property access.

use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::backend::ApiBackend;
use crate::codec::{self, PropertyKind};
use crate::database::Database;
use crate::error::{Result, TabloError};
use crate::props::Properties;
use crate::value::PropertyValue;

/// The account referenced by an audit stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
}

impl User {
    fn from_payload(payload: &Value) -> Result<Self> {
        if payload.get("object").and_then(Value::as_str) != Some("user") {
            return Err(malformed("payload is not a user object"));
        }
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| malformed("user has no id"))?;
        Ok(Self { id })
    }
}

/// Who touched a page and when, from the record envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditInfo {
    pub by: User,
    pub at: DateTime<Utc>,
}

impl EditInfo {
    fn from_record(record: &Value, prefix: &str) -> Result<Self> {
        let by = record
            .get(format!("{prefix}_by"))
            .ok_or_else(|| malformed(format!("record has no {prefix}_by")))
            .and_then(User::from_payload)?;
        let at = record
            .get(format!("{prefix}_time"))
            .and_then(Value::as_str)
            .and_then(codec::parse_timestamp)
            .ok_or_else(|| malformed(format!("record has no parseable {prefix}_time")))?;
        Ok(Self { by, at })
    }
}

/// One database record.
///
/// Carries the envelope (id, audit stamps) eagerly and the property
/// collection lazily: the raw properties JSON is kept as fetched and
/// only turned into typed [`Properties`] on first access.
#[derive(Debug)]
pub struct Page<'db, B: ApiBackend> {
    db: &'db Database<B>,
    id: Uuid,
    created: EditInfo,
    last_edited: EditInfo,
    properties_json: Map<String, Value>,
    props: OnceCell<Properties<'db, B>>,
}

impl<'db, B: ApiBackend> Page<'db, B> {
    pub(crate) fn from_record(db: &'db Database<B>, record: &Value) -> Result<Self> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| malformed("record has no page id"))?;
        let created = EditInfo::from_record(record, "created")?;
        let last_edited = EditInfo::from_record(record, "last_edited")?;
        let properties_json = record
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| malformed("record has no properties object"))?;
        Ok(Self {
            db,
            id,
            created,
            last_edited,
            properties_json,
            props: OnceCell::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> &EditInfo {
        &self.created
    }

    pub fn last_edited(&self) -> &EditInfo {
        &self.last_edited
    }

    /// The typed property collection, built on first access.
    pub fn props(&self) -> Result<&Properties<'db, B>> {
        self.props
            .get_or_try_init(|| Properties::from_payloads(self.db, self.id, &self.properties_json))
    }

    /// Read one property by name. `Ok(None)` means the field is unset.
    pub fn get(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.props()?.value(name)
    }

    /// Write one property by name and push the change remotely.
    pub fn set(&self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.props()?.set(name, value)
    }

    /// Unset one property by name and push the change remotely.
    pub fn clear(&self, name: &str) -> Result<()> {
        self.props()?.clear(name)
    }

    /// The page title, from whichever field holds the title kind.
    pub fn title(&self) -> Result<Option<String>> {
        for (_, property) in self.props()?.iter() {
            if property.info().kind == Some(PropertyKind::Title) {
                return Ok(match property.value()? {
                    Some(PropertyValue::Text(text)) => Some(text),
                    _ => None,
                });
            }
        }
        Ok(None)
    }
}

fn malformed(reason: impl Into<String>) -> TabloError {
    TabloError::Malformed {
        tag: "page".to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_payload_must_be_a_user_object() {
        let id = Uuid::new_v4();
        let user = User::from_payload(&json!({ "object": "user", "id": id })).unwrap();
        assert_eq!(user.id, id);

        let err = User::from_payload(&json!({ "object": "bot", "id": id })).unwrap_err();
        assert!(matches!(err, TabloError::Malformed { .. }));
    }

    #[test]
    fn edit_info_reads_envelope_pairs() {
        let id = Uuid::new_v4();
        let record = json!({
            "created_by": { "object": "user", "id": id },
            "created_time": "2023-01-05T18:34:00.000Z",
        });

        let info = EditInfo::from_record(&record, "created").unwrap();
        assert_eq!(info.by.id, id);
        assert_eq!(info.at.to_rfc3339(), "2023-01-05T18:34:00+00:00");

        assert!(EditInfo::from_record(&record, "last_edited").is_err());
    }
}
