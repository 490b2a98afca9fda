use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::normalize::normalize_value;
use crate::wire::WireValue;

/// One response row: attribute path (exactly as the field mask spells it) to
/// normalized value, in field-mask order.
pub type NormalizedRow = Map<String, Value>;

/// Walks a dotted attribute path. Any segment that cannot be followed ends
/// the walk with `None`.
pub fn resolve_path<'a>(row: &'a WireValue, path: &str) -> Option<Cow<'a, WireValue>> {
    let mut current = Cow::Borrowed(row);
    for segment in path.split('.') {
        current = match current {
            Cow::Borrowed(value) => step(value, segment)?,
            Cow::Owned(value) => Cow::Owned(step(&value, segment)?.into_owned()),
        };
    }
    Some(current)
}

fn step<'a>(value: &'a WireValue, segment: &str) -> Option<Cow<'a, WireValue>> {
    match value {
        WireValue::Message(message) => message.field(segment).map(Cow::Borrowed),
        WireValue::RawMessage(raw) => raw
            .field(segment)
            .map(|v| Cow::Owned(WireValue::from_raw_json(v.clone()))),
        _ => None,
    }
}

/// Applies a field mask to one row. Missing attributes project to null.
pub fn project_row<S: AsRef<str>>(row: &WireValue, paths: &[S]) -> NormalizedRow {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let value = resolve_path(row, path)
                .map(|resolved| normalize_value(&resolved))
                .unwrap_or(Value::Null);
            (path.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wire::{EnumValue, Message, RawMessage, Scalar};

    fn campaign_row() -> WireValue {
        let campaign = Message::new("Campaign")
            .with_field("name", WireValue::string("Summer Sale"))
            .with_field(
                "status",
                WireValue::Enum(EnumValue::new("CampaignStatus", "ENABLED", 2)),
            );
        let metrics = Message::new("Metrics").with_field("cost_micros", WireValue::string("1250000"));
        let mut ad_fields = Map::new();
        ad_fields.insert("final_urls".to_string(), json!(["https://example.com/sale"]));
        WireValue::Message(
            Message::new("GoogleAdsRow")
                .with_field("campaign", WireValue::Message(campaign))
                .with_field("metrics", WireValue::Message(metrics))
                .with_field("ad", WireValue::RawMessage(RawMessage::new("", ad_fields))),
        )
    }

    #[test]
    fn projects_dotted_paths_keyed_by_literal_path() {
        let row = project_row(&campaign_row(), &["campaign.name", "campaign.status"]);
        assert_eq!(
            Value::Object(row),
            json!({ "campaign.name": "Summer Sale", "campaign.status": "ENABLED" })
        );
    }

    #[test]
    fn keys_follow_field_mask_order() {
        let row = project_row(&campaign_row(), &["metrics.cost_micros", "campaign.name"]);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["metrics.cost_micros", "campaign.name"]);
    }

    #[test]
    fn missing_attributes_project_to_null() {
        let row = project_row(
            &campaign_row(),
            &["campaign.bidding_strategy", "ad_group.id", "campaign.name.length"],
        );
        assert_eq!(
            Value::Object(row),
            json!({
                "campaign.bidding_strategy": null,
                "ad_group.id": null,
                "campaign.name.length": null
            })
        );
    }

    #[test]
    fn json_field_names_resolve_too() {
        let row = project_row(&campaign_row(), &["metrics.costMicros"]);
        assert_eq!(row.get("metrics.costMicros"), Some(&json!("1250000")));
    }

    #[test]
    fn paths_walk_into_raw_messages() {
        let row = project_row(&campaign_row(), &["ad.final_urls", "ad"]);
        assert_eq!(
            Value::Object(row),
            json!({
                "ad.final_urls": ["https://example.com/sale"],
                "ad": { "final_urls": ["https://example.com/sale"] }
            })
        );
    }

    #[test]
    fn scalar_root_resolves_nothing() {
        let row = project_row(&WireValue::Scalar(Scalar::Int(1)), &["campaign.id"]);
        assert_eq!(row.get("campaign.id"), Some(&Value::Null));
    }
}
