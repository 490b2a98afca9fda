//! Values as they arrive from the reporting API's decoding layer.

use serde_json::{Map, Value};

use crate::normalize::normalize_value;

/// Any value a response row can carry, prior to normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Named enum value (e.g. `CampaignStatus.ENABLED`)
    Enum(EnumValue),
    /// Schema-aware message with declared fields
    Message(Message),
    /// Message decoded without its schema; fields keep their proto names, unrenamed
    RawMessage(RawMessage),
    Scalar(Scalar),
    /// Repeated container (repeated scalar or composite field)
    Repeated(Vec<WireValue>),
    /// Anything the decoder did not recognize
    Opaque(Opaque),
}

impl WireValue {
    pub fn null() -> Self {
        WireValue::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        WireValue::Scalar(Scalar::String(value.into()))
    }

    /// Structural conversion of plain JSON. Objects become raw messages, so
    /// their keys are carried through as-is.
    pub fn from_raw_json(value: Value) -> Self {
        match value {
            Value::Null => WireValue::null(),
            Value::Bool(b) => WireValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => WireValue::Scalar(Scalar::from(n)),
            Value::String(s) => WireValue::string(s),
            Value::Array(items) => {
                WireValue::Repeated(items.into_iter().map(WireValue::from_raw_json).collect())
            }
            Value::Object(fields) => WireValue::RawMessage(RawMessage::new("", fields)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub name: String,
    pub number: i32,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, number: i32) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            number,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageField {
    /// Declared (snake_case) field name
    pub name: String,
    /// lowerCamelCase name used by JSON encodings
    pub json_name: String,
    pub value: WireValue,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub type_name: String,
    fields: Vec<MessageField>,
}

impl Message {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: WireValue) -> Self {
        self.push_field(name, value);
        self
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: WireValue) {
        let name = name.into();
        let json_name = to_lower_camel(&name);
        self.fields.push(MessageField {
            name,
            json_name,
            value,
        });
    }

    pub fn fields(&self) -> &[MessageField] {
        &self.fields
    }

    /// Looks a field up by declared name, then by JSON name.
    pub fn field(&self, name: &str) -> Option<&WireValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.json_name == name))
            .map(|f| &f.value)
    }

    /// Field name to normalized value, keyed by declared name.
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), normalize_value(&f.value)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Type URL when the wire carried one (`@type` in JSON encodings)
    pub type_url: String,
    fields: Map<String, Value>,
}

impl RawMessage {
    pub fn new(type_url: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            type_url: type_url.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.fields.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl From<serde_json::Number> for Scalar {
    fn from(n: serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Scalar::Int(i)
        } else if let Some(u) = n.as_u64() {
            Scalar::UInt(u)
        } else {
            Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A value of a kind the decoder does not know. `elements` is set when the
/// value can still be walked as a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    pub type_name: String,
    pub repr: Value,
    pub elements: Option<Vec<WireValue>>,
}

impl Opaque {
    pub fn new(type_name: impl Into<String>, repr: Value) -> Self {
        Self {
            type_name: type_name.into(),
            repr,
            elements: None,
        }
    }

    pub fn with_elements(mut self, elements: Vec<WireValue>) -> Self {
        self.elements = Some(elements);
        self
    }
}

/// `ad_group_ad` -> `adGroupAd`
pub fn to_lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `adGroupAd` -> `ad_group_ad`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
