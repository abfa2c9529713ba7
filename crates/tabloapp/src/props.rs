//! Typed property instances and the per-page collection.
//!
//! A [`Property`] wraps one field's raw JSON and decodes it on demand;
//! writes go through the codec, one remote update per field, and the
//! raw cache is refreshed from the server's response so reads always
//! reflect what the remote store actually persisted.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::backend::ApiBackend;
use crate::codec::{codec_for, Codec, PropertyKind};
use crate::database::Database;
use crate::error::{Result, TabloError};
use crate::schema::PropertyInfo;
use crate::value::PropertyValue;

/// One typed field on one page.
#[derive(Debug)]
pub struct Property<'db, B: ApiBackend> {
    info: PropertyInfo,
    raw: RefCell<Value>,
    db: &'db Database<B>,
    page_id: Uuid,
}

impl<'db, B: ApiBackend> Property<'db, B> {
    pub fn info(&self) -> &PropertyInfo {
        &self.info
    }

    fn codec(&self) -> Result<&'static Codec> {
        codec_for(&self.info.tag)
            .ok_or_else(|| TabloError::UnsupportedPropertyType(self.info.tag.clone()))
    }

    /// Decode the cached payload. `Ok(None)` means the field is unset;
    /// a null payload never reaches the codec.
    pub fn value(&self) -> Result<Option<PropertyValue>> {
        let raw = self.raw.borrow();
        match raw.get(&self.info.tag) {
            None | Some(Value::Null) => Ok(None),
            Some(payload) => self.codec()?.decode(&self.info, payload).map(Some),
        }
    }

    /// Encode a value and push it remotely as a single-field update.
    ///
    /// Select values are checked against the database's declared options
    /// first (which may trigger the memoized schema fetch); nothing goes
    /// over the wire for a value the schema would reject.
    pub fn set(&self, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        let encoded = self.codec()?.encode(&self.info, &value)?;
        if self.info.kind == Some(PropertyKind::Select) {
            self.check_choice(&value)?;
        }
        self.push(encoded)
    }

    /// Unset the field remotely. Sends a null payload directly, so this
    /// works for tags without an encoder too.
    pub fn clear(&self) -> Result<()> {
        self.push(Value::Null)
    }

    fn check_choice(&self, value: &PropertyValue) -> Result<()> {
        let choice = match value {
            PropertyValue::Text(choice) => choice,
            _ => return Ok(()),
        };
        let declared = self.db.schema()?.field(&self.info.name)?;
        if declared.options.iter().any(|option| option == choice) {
            return Ok(());
        }
        Err(TabloError::InvalidChoice {
            field: self.info.raw_name.clone(),
            value: choice.clone(),
            options: declared.options.clone(),
        })
    }

    /// One update round trip for this field, then refresh the cache from
    /// the response. The cache is untouched when the update fails.
    fn push(&self, payload: Value) -> Result<()> {
        let mut tagged = Map::new();
        tagged.insert(self.info.tag.clone(), payload);
        let mut request = Map::new();
        request.insert(self.info.field_id.clone(), Value::Object(tagged));
        let request = Value::Object(request);

        debug!("updating {:?} on page {}", self.info.raw_name, self.page_id);
        let response = self
            .db
            .backend()
            .update(self.page_id, &request)
            .map_err(|source| TabloError::Remote {
                context: format!("update page {} with {}", self.page_id, request),
                source,
            })?;

        let refreshed = response
            .get("properties")
            .and_then(|properties| properties.get(&self.info.raw_name))
            .and_then(|property| property.get(&self.info.tag))
            .cloned()
            .ok_or_else(|| TabloError::Malformed {
                tag: self.info.tag.clone(),
                reason: format!("update response is missing {:?}", self.info.raw_name),
            })?;

        let mut raw = self.raw.borrow_mut();
        let cached = raw.as_object_mut().ok_or_else(|| TabloError::Malformed {
            tag: self.info.tag.clone(),
            reason: "cached property is not an object".to_string(),
        })?;
        cached.insert(self.info.tag.clone(), refreshed);
        Ok(())
    }
}

/// The named property fields of one page, keyed by normalized name.
///
/// Structurally immutable: fields can change value through their own
/// setters, but nothing can be inserted, removed or replaced.
#[derive(Debug)]
pub struct Properties<'db, B: ApiBackend> {
    map: BTreeMap<String, Property<'db, B>>,
}

impl<'db, B: ApiBackend> Properties<'db, B> {
    pub(crate) fn from_payloads(
        db: &'db Database<B>,
        page_id: Uuid,
        payloads: &Map<String, Value>,
    ) -> Result<Self> {
        let mut map: BTreeMap<String, Property<'db, B>> = BTreeMap::new();
        for (raw_name, payload) in payloads {
            if !payload.is_object() {
                return Err(TabloError::Malformed {
                    tag: "page".to_string(),
                    reason: format!("property {raw_name:?} is not an object"),
                });
            }
            let info = PropertyInfo::from_payload(db.id(), raw_name, payload)?;
            if info.kind.is_none() {
                debug!("property {:?} has unregistered type {:?}", raw_name, info.tag);
            }
            if info.name.is_empty() {
                return Err(TabloError::EmptyFieldName(raw_name.clone()));
            }
            if let Some(existing) = map.get(&info.name) {
                return Err(TabloError::DuplicateField {
                    name: info.name.clone(),
                    first: existing.info.raw_name.clone(),
                    second: raw_name.clone(),
                });
            }
            map.insert(
                info.name.clone(),
                Property {
                    info,
                    raw: RefCell::new(payload.clone()),
                    db,
                    page_id,
                },
            );
        }
        Ok(Self { map })
    }

    /// Look up a field by name, normalized first.
    pub fn get(&self, name: &str) -> Result<&Property<'db, B>> {
        let key = crate::name::normalize(name);
        self.map
            .get(&key)
            .ok_or_else(|| TabloError::UnknownField(name.to_string()))
    }

    /// Read the named field's value.
    pub fn value(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.get(name)?.value()
    }

    /// Write the named field and push the change remotely.
    pub fn set(&self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.get(name)?.set(value)
    }

    /// Unset the named field remotely.
    pub fn clear(&self, name: &str) -> Result<()> {
        self.get(name)?.clear()
    }

    /// All fields as `(normalized_name, property)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property<'db, B>)> {
        self.map
            .iter()
            .map(|(name, property)| (name.as_str(), property))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemBackend;
    use serde_json::json;

    fn database() -> Database<MemBackend> {
        Database::new(Uuid::new_v4(), MemBackend::new())
    }

    fn payloads(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn collection(db: &Database<MemBackend>, value: Value) -> Result<Properties<'_, MemBackend>> {
        Properties::from_payloads(db, Uuid::new_v4(), &payloads(value))
    }

    #[test]
    fn lookup_normalizes_the_requested_name() {
        let db = database();
        let props = collection(
            &db,
            json!({
                "Due Date": { "id": "d", "type": "date", "date": { "start": "2024-01-05", "end": null } },
            }),
        )
        .unwrap();

        assert_eq!(props.get("Due Date").unwrap().info().name, "due_date");
        assert_eq!(props.get("due date").unwrap().info().raw_name, "Due Date");
        assert_eq!(props.get("DUE_DATE").unwrap().info().field_id, "d");
    }

    #[test]
    fn unset_field_reads_as_none() {
        let db = database();
        let props = collection(
            &db,
            json!({
                "Snooze": { "id": "s", "type": "select", "select": null },
            }),
        )
        .unwrap();

        assert_eq!(props.value("snooze").unwrap(), None);
    }

    #[test]
    fn unknown_name_is_reported_verbatim() {
        let db = database();
        let props = collection(
            &db,
            json!({
                "Done": { "id": "c", "type": "checkbox", "checkbox": false },
            }),
        )
        .unwrap();

        let err = props.value("Due Date").unwrap_err();
        assert!(matches!(err, TabloError::UnknownField(name) if name == "Due Date"));
    }

    #[test]
    fn colliding_raw_names_fail_construction() {
        let db = database();
        let err = collection(
            &db,
            json!({
                "Due Date": { "id": "a", "type": "checkbox", "checkbox": false },
                "due-date": { "id": "b", "type": "checkbox", "checkbox": true },
            }),
        )
        .unwrap_err();

        assert!(matches!(err, TabloError::DuplicateField { name, .. } if name == "due_date"));
    }

    #[test]
    fn unregistered_tag_is_opaque_but_present() {
        let db = database();
        let props = collection(
            &db,
            json!({
                "Done": { "id": "c", "type": "checkbox", "checkbox": true },
                "Link": { "id": "u", "type": "url", "url": "https://example.org" },
            }),
        )
        .unwrap();

        // The rest of the page decodes fine.
        assert_eq!(
            props.value("done").unwrap(),
            Some(PropertyValue::Checkbox(true))
        );

        let err = props.value("link").unwrap_err();
        assert!(matches!(err, TabloError::UnsupportedPropertyType(tag) if tag == "url"));
        let err = props.set("link", "https://example.com").unwrap_err();
        assert!(matches!(err, TabloError::UnsupportedPropertyType(tag) if tag == "url"));
    }

    #[test]
    fn iteration_is_name_ordered() {
        let db = database();
        let props = collection(
            &db,
            json!({
                "Zeta": { "id": "z", "type": "number", "number": 1 },
                "Alpha": { "id": "a", "type": "number", "number": 2 },
            }),
        )
        .unwrap();

        let names: Vec<_> = props.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(props.len(), 2);
    }
}
