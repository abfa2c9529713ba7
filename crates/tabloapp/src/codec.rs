//! Property codecs and the type registry.
//!
//! Every property carries a type tag ("title", "select", "date", ...) that
//! decides how its raw JSON payload maps to a [`PropertyValue`] and back.
//! The registry below is the single source of truth for that mapping:
//! adding support for a new tag means adding one entry and its codec
//! functions here. Tags with no entry stay opaque, the owning property
//! keeps its raw payload and refuses decode/encode.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::{Result, TabloError};
use crate::schema::PropertyInfo;
use crate::text;
use crate::value::PropertyValue;

/// The kind of value a property holds, one case per supported type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// The page title, stored as rich-text runs
    Title,

    /// Free-form rich text
    RichText,

    /// Numeric column
    Number,

    /// Boolean flag
    Checkbox,

    /// Single choice from a declared option list
    Select,

    /// Multiple choices from a declared option list
    MultiSelect,

    /// A point in time; ranges (non-null `end`) are not supported
    Date,

    /// Server-stamped creation time, never writable
    CreatedTime,

    /// Server-stamped last edit time, never writable
    LastEditedTime,
}

type DecodeFn = fn(&PropertyInfo, &Value) -> Result<PropertyValue>;
type EncodeFn = fn(&PropertyInfo, &PropertyValue) -> Result<Value>;

/// Write strategy for one codec.
enum Encode {
    /// Values of this kind can be serialized and pushed remotely.
    Fn(EncodeFn),

    /// The server computes this field; writes always fail.
    ReadOnly,

    /// Reading works but no write serialization exists.
    Unsupported,
}

/// Decode/encode strategies for one property type tag.
pub struct Codec {
    /// The kind of value this codec produces
    pub kind: PropertyKind,

    /// The wire type tag this codec is registered under
    pub tag: &'static str,

    decode: DecodeFn,
    encode: Encode,
}

impl Codec {
    /// Create a read-capable codec with no write support.
    const fn new(kind: PropertyKind, tag: &'static str, decode: DecodeFn) -> Self {
        Self {
            kind,
            tag,
            decode,
            encode: Encode::Unsupported,
        }
    }

    /// Register a write serializer.
    const fn writes(mut self, encode: EncodeFn) -> Self {
        self.encode = Encode::Fn(encode);
        self
    }

    /// Mark the field as server-computed.
    const fn read_only(mut self) -> Self {
        self.encode = Encode::ReadOnly;
        self
    }

    /// Decode a non-null raw payload into a typed value.
    pub fn decode(&self, info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
        (self.decode)(info, payload)
    }

    /// Encode a typed value into the raw payload for an update request.
    pub fn encode(&self, info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
        match self.encode {
            Encode::Fn(encode) => encode(info, value),
            Encode::ReadOnly => Err(TabloError::ReadOnlyProperty {
                field: info.raw_name.clone(),
                tag: self.tag,
            }),
            Encode::Unsupported => Err(TabloError::UnsupportedPropertyType(self.tag.to_string())),
        }
    }
}

/// Registry of all supported property type tags.
///
/// Exactly one codec per tag; `codecs_have_unique_tags` enforces it.
pub const CODECS: &[Codec] = &[
    Codec::new(PropertyKind::Title, "title", decode_runs).writes(encode_runs),
    Codec::new(PropertyKind::RichText, "rich_text", decode_runs).writes(encode_runs),
    Codec::new(PropertyKind::Number, "number", decode_number).writes(encode_number),
    Codec::new(PropertyKind::Checkbox, "checkbox", decode_checkbox).writes(encode_checkbox),
    Codec::new(PropertyKind::Select, "select", decode_select).writes(encode_select),
    Codec::new(PropertyKind::MultiSelect, "multi_select", decode_multi_select),
    Codec::new(PropertyKind::Date, "date", decode_date).writes(encode_date),
    Codec::new(PropertyKind::CreatedTime, "created_time", decode_time).read_only(),
    Codec::new(PropertyKind::LastEditedTime, "last_edited_time", decode_time).read_only(),
];

/// Look up the codec for a type tag. `None` means the tag is opaque.
pub fn codec_for(tag: &str) -> Option<&'static Codec> {
    CODECS.iter().find(|codec| codec.tag == tag)
}

/// Parse a wire timestamp. Full RFC 3339 strings keep their instant,
/// date-only strings are anchored at midnight UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a timestamp the way the service writes its own.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn malformed(info: &PropertyInfo, reason: impl Into<String>) -> TabloError {
    TabloError::Malformed {
        tag: info.tag.clone(),
        reason: reason.into(),
    }
}

fn mismatch(info: &PropertyInfo, expected: &'static str, got: &PropertyValue) -> TabloError {
    TabloError::TypeMismatch {
        field: info.raw_name.clone(),
        expected,
        got: got.kind_name(),
    }
}

fn decode_runs(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    text::runs_to_plain(payload)
        .map(PropertyValue::Text)
        .ok_or_else(|| malformed(info, "expected an array of rich text runs"))
}

fn encode_runs(info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Text(s) => Ok(text::plain_to_runs(s)),
        other => Err(mismatch(info, "text", other)),
    }
}

fn decode_number(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    payload
        .as_f64()
        .map(PropertyValue::Number)
        .ok_or_else(|| malformed(info, "expected a number"))
}

fn encode_number(info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Number(n) => Ok(json!(n)),
        other => Err(mismatch(info, "number", other)),
    }
}

fn decode_checkbox(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    payload
        .as_bool()
        .map(PropertyValue::Checkbox)
        .ok_or_else(|| malformed(info, "expected a boolean"))
}

fn encode_checkbox(info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Checkbox(b) => Ok(json!(b)),
        other => Err(mismatch(info, "checkbox", other)),
    }
}

fn decode_select(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    payload
        .get("name")
        .and_then(Value::as_str)
        .map(|name| PropertyValue::Text(name.to_string()))
        .ok_or_else(|| malformed(info, "expected an option with a name"))
}

fn encode_select(info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Text(name) => Ok(json!({ "name": name })),
        other => Err(mismatch(info, "text", other)),
    }
}

fn decode_multi_select(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    let options = payload
        .as_array()
        .ok_or_else(|| malformed(info, "expected an array of options"))?;
    let mut names = Vec::with_capacity(options.len());
    for option in options {
        let name = option
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(info, "expected an option with a name"))?;
        names.push(name.to_string());
    }
    Ok(PropertyValue::List(names))
}

fn decode_date(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    if !payload
        .get("end")
        .map(Value::is_null)
        .unwrap_or(true)
    {
        return Err(malformed(info, "date ranges are not supported"));
    }
    let start = payload
        .get("start")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(info, "expected a start timestamp"))?;
    parse_timestamp(start)
        .map(PropertyValue::Date)
        .ok_or_else(|| malformed(info, format!("unparseable timestamp {start:?}")))
}

fn encode_date(info: &PropertyInfo, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Date(at) => Ok(json!({
            "start": format_timestamp(*at),
            "end": null,
        })),
        other => Err(mismatch(info, "date", other)),
    }
}

fn decode_time(info: &PropertyInfo, payload: &Value) -> Result<PropertyValue> {
    let raw = payload
        .as_str()
        .ok_or_else(|| malformed(info, "expected a timestamp string"))?;
    parse_timestamp(raw)
        .map(PropertyValue::Date)
        .ok_or_else(|| malformed(info, format!("unparseable timestamp {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn info(tag: &str) -> PropertyInfo {
        PropertyInfo {
            tag: tag.to_string(),
            kind: codec_for(tag).map(|codec| codec.kind),
            database_id: Uuid::new_v4(),
            field_id: "%3Dd%3F".to_string(),
            raw_name: "Field".to_string(),
            name: "field".to_string(),
            options: Vec::new(),
        }
    }

    fn codec(tag: &str) -> &'static Codec {
        codec_for(tag).unwrap()
    }

    #[test]
    fn registry_has_expected_entries() {
        for tag in [
            "title",
            "rich_text",
            "number",
            "checkbox",
            "select",
            "multi_select",
            "date",
            "created_time",
            "last_edited_time",
        ] {
            assert!(codec_for(tag).is_some(), "missing codec for {tag}");
        }
    }

    #[test]
    fn unknown_tag_resolves_to_none() {
        assert!(codec_for("formula").is_none());
        assert!(codec_for("url").is_none());
        assert!(codec_for("").is_none());
    }

    #[test]
    fn codecs_have_unique_tags() {
        for (i, a) in CODECS.iter().enumerate() {
            for b in &CODECS[i + 1..] {
                assert_ne!(a.tag, b.tag, "duplicate codec registration");
            }
        }
    }

    #[test]
    fn title_concatenates_runs() {
        let payload = json!([
            { "plain_text": "Buy " },
            { "plain_text": "milk", "annotations": { "bold": true } },
        ]);
        let value = codec("title").decode(&info("title"), &payload).unwrap();
        assert_eq!(value, PropertyValue::Text("Buy milk".into()));
    }

    #[test]
    fn title_encodes_single_run() {
        let encoded = codec("title")
            .encode(&info("title"), &PropertyValue::Text("Buy milk".into()))
            .unwrap();
        assert_eq!(encoded, json!([{ "text": { "content": "Buy milk" } }]));
    }

    #[test]
    fn rich_text_round_trips_plain_content() {
        let codec = codec("rich_text");
        let info = info("rich_text");
        let value = PropertyValue::Text("no formatting here".into());
        let encoded = codec.encode(&info, &value).unwrap();
        assert_eq!(codec.decode(&info, &encoded).unwrap(), value);
    }

    #[test]
    fn number_and_checkbox_are_identity() {
        assert_eq!(
            codec("number").decode(&info("number"), &json!(4.5)).unwrap(),
            PropertyValue::Number(4.5)
        );
        assert_eq!(
            codec("number")
                .encode(&info("number"), &PropertyValue::Number(4.5))
                .unwrap(),
            json!(4.5)
        );
        assert_eq!(
            codec("checkbox")
                .decode(&info("checkbox"), &json!(true))
                .unwrap(),
            PropertyValue::Checkbox(true)
        );
        assert_eq!(
            codec("checkbox")
                .encode(&info("checkbox"), &PropertyValue::Checkbox(false))
                .unwrap(),
            json!(false)
        );
    }

    #[test]
    fn select_decodes_option_name() {
        let payload = json!({ "name": "Done", "id": "abc", "color": "green" });
        assert_eq!(
            codec("select").decode(&info("select"), &payload).unwrap(),
            PropertyValue::Text("Done".into())
        );
    }

    #[test]
    fn select_encodes_name_object() {
        let encoded = codec("select")
            .encode(&info("select"), &PropertyValue::Text("Done".into()))
            .unwrap();
        assert_eq!(encoded, json!({ "name": "Done" }));
    }

    #[test]
    fn multi_select_decodes_names() {
        let payload = json!([{ "name": "red" }, { "name": "blue" }]);
        assert_eq!(
            codec("multi_select")
                .decode(&info("multi_select"), &payload)
                .unwrap(),
            PropertyValue::List(vec!["red".into(), "blue".into()])
        );
    }

    #[test]
    fn multi_select_refuses_writes() {
        let err = codec("multi_select")
            .encode(
                &info("multi_select"),
                &PropertyValue::List(vec!["red".into()]),
            )
            .unwrap_err();
        assert!(matches!(err, TabloError::UnsupportedPropertyType(tag) if tag == "multi_select"));
    }

    #[test]
    fn date_only_decodes_to_midnight_utc() {
        let payload = json!({ "start": "2024-01-05", "end": null });
        let value = codec("date").decode(&info("date"), &payload).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(value, PropertyValue::Date(expected));
    }

    #[test]
    fn date_with_end_fails_decode() {
        let payload = json!({ "start": "2024-01-05", "end": "2024-01-06" });
        let err = codec("date").decode(&info("date"), &payload).unwrap_err();
        assert!(matches!(err, TabloError::Malformed { .. }));
    }

    #[test]
    fn date_round_trips() {
        let codec = codec("date");
        let info = info("date");
        let at = Utc.with_ymd_and_hms(2023, 1, 5, 18, 34, 0).unwrap();
        let encoded = codec.encode(&info, &PropertyValue::Date(at)).unwrap();
        assert_eq!(
            encoded,
            json!({ "start": "2023-01-05T18:34:00.000Z", "end": null })
        );
        assert_eq!(
            codec.decode(&info, &encoded).unwrap(),
            PropertyValue::Date(at)
        );
    }

    #[test]
    fn audit_timestamps_decode_and_refuse_writes() {
        let codec = codec("created_time");
        let info = info("created_time");
        let value = codec
            .decode(&info, &json!("2023-01-05T18:34:00.000Z"))
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 1, 5, 18, 34, 0).unwrap();
        assert_eq!(value, PropertyValue::Date(expected));

        let err = codec
            .encode(&info, &PropertyValue::Date(expected))
            .unwrap_err();
        assert!(matches!(err, TabloError::ReadOnlyProperty { .. }));
        assert_eq!(
            err.to_string(),
            "created_time (Field) property is read-only"
        );
    }

    #[test]
    fn wrong_variant_is_a_type_mismatch() {
        let err = codec("checkbox")
            .encode(&info("checkbox"), &PropertyValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            TabloError::TypeMismatch {
                expected: "checkbox",
                got: "number",
                ..
            }
        ));
    }

    #[test]
    fn timestamps_parse_with_and_without_offsets() {
        let utc = parse_timestamp("2023-01-05T18:34:00.000Z").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2023, 1, 5, 18, 34, 0).unwrap());

        let offset = parse_timestamp("2023-01-05T18:34:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2023, 1, 5, 16, 34, 0).unwrap());

        assert!(parse_timestamp("not a date").is_none());
    }
}
