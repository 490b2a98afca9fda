//! Conversion of wire values into JSON-safe trees.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Number, Value};

use crate::wire::{Opaque, Scalar, WireValue};

/// Converts one wire value into JSON, recursively.
///
/// Checked in order: enum, structured message, raw message, scalar, then
/// anything that can be walked as a sequence. A value that fits none of these
/// comes back as its own representation instead of failing the row.
pub fn normalize_value(value: &WireValue) -> Value {
    match value {
        WireValue::Enum(e) => Value::String(e.name.clone()),
        WireValue::Message(message) => Value::Object(message.to_map()),
        WireValue::RawMessage(raw) => Value::Object(raw.to_map()),
        WireValue::Scalar(scalar) => normalize_scalar(scalar),
        WireValue::Repeated(items) => Value::Array(items.iter().map(normalize_value).collect()),
        WireValue::Opaque(opaque) => normalize_opaque(opaque),
    }
}

fn normalize_scalar(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Int(i) => Value::from(*i),
        Scalar::UInt(u) => Value::from(*u),
        Scalar::Float(f) => float_value(*f),
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Bytes(bytes) => Value::String(STANDARD.encode(bytes)),
    }
}

// JSON has no NaN/Infinity; use the proto3 JSON spellings.
fn float_value(f: f64) -> Value {
    match Number::from_f64(f) {
        Some(n) => Value::Number(n),
        None if f.is_nan() => Value::String("NaN".to_string()),
        None if f > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}

fn normalize_opaque(opaque: &Opaque) -> Value {
    match &opaque.elements {
        Some(items) => Value::Array(items.iter().map(normalize_value).collect()),
        None => {
            tracing::debug!(
                type_name = %opaque.type_name,
                "Unrecognized wire value passed through unchanged"
            );
            opaque.repr.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::wire::{EnumValue, Message, RawMessage};

    #[test]
    fn enum_normalizes_to_its_name() {
        let value = WireValue::Enum(EnumValue::new("CampaignStatus", "ENABLED", 2));
        assert_eq!(normalize_value(&value), json!("ENABLED"));
    }

    #[test]
    fn nested_message_normalizes_to_mapping_of_normalized_values() {
        let network = Message::new("NetworkSettings")
            .with_field("target_search_network", WireValue::Scalar(Scalar::Bool(true)));
        let campaign = Message::new("Campaign")
            .with_field("name", WireValue::string("Summer Sale"))
            .with_field(
                "status",
                WireValue::Enum(EnumValue::new("CampaignStatus", "PAUSED", 3)),
            )
            .with_field("network_settings", WireValue::Message(network))
            .with_field(
                "labels",
                WireValue::Repeated(vec![WireValue::string("a"), WireValue::string("b")]),
            );

        assert_eq!(
            normalize_value(&WireValue::Message(campaign)),
            json!({
                "name": "Summer Sale",
                "status": "PAUSED",
                "network_settings": { "target_search_network": true },
                "labels": ["a", "b"]
            })
        );
    }

    #[test]
    fn raw_message_keeps_original_field_names() {
        let mut fields = Map::new();
        fields.insert("final_urls".to_string(), json!(["https://example.com"]));
        fields.insert("tracking_url_template".to_string(), json!(null));
        let raw = RawMessage::new("type.googleapis.com/google.ads.Ad", fields);

        assert_eq!(
            normalize_value(&WireValue::RawMessage(raw)),
            json!({
                "final_urls": ["https://example.com"],
                "tracking_url_template": null
            })
        );
    }

    #[test]
    fn scalar_sequence_keeps_length_and_values() {
        let items = vec![
            WireValue::Scalar(Scalar::Int(-3)),
            WireValue::Scalar(Scalar::UInt(u64::MAX)),
            WireValue::Scalar(Scalar::Float(1.5)),
            WireValue::string("x"),
            WireValue::null(),
        ];
        assert_eq!(
            normalize_value(&WireValue::Repeated(items)),
            json!([-3, u64::MAX, 1.5, "x", null])
        );
    }

    #[test]
    fn bytes_and_non_finite_floats_are_json_safe() {
        assert_eq!(
            normalize_value(&WireValue::Scalar(Scalar::Bytes(b"hi".to_vec()))),
            json!("aGk=")
        );
        assert_eq!(
            normalize_value(&WireValue::Scalar(Scalar::Float(f64::NAN))),
            json!("NaN")
        );
        assert_eq!(
            normalize_value(&WireValue::Scalar(Scalar::Float(f64::NEG_INFINITY))),
            json!("-Infinity")
        );
    }

    #[test]
    fn non_iterable_opaque_value_is_returned_unchanged() {
        let opaque = Opaque::new("Duration", json!({ "seconds": 5 }));
        assert_eq!(
            normalize_value(&WireValue::Opaque(opaque)),
            json!({ "seconds": 5 })
        );
    }

    #[test]
    fn iterable_opaque_value_is_walked() {
        let opaque = Opaque::new("RepeatedCompositeContainer", Value::Null).with_elements(vec![
            WireValue::Enum(EnumValue::new("Device", "MOBILE", 2)),
            WireValue::Enum(EnumValue::new("Device", "DESKTOP", 3)),
        ]);
        assert_eq!(
            normalize_value(&WireValue::Opaque(opaque)),
            json!(["MOBILE", "DESKTOP"])
        );
    }
}
