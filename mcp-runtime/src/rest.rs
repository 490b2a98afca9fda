use ads_core::wire::{Message, RawMessage, Scalar, to_snake_case};
use ads_core::{FieldMask, SearchBatch, SearchTransport, TransportError, WireValue};
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::util::{AdsApiConfig, CachedToken, Credentials, client, refresh_access_token};

const ROW_TYPE_NAME: &str = "GoogleAdsRow";

/// `googleAds:searchStream` over the REST surface of the reporting API.
pub struct RestTransport {
    config: AdsApiConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl RestTransport {
    pub fn new(config: AdsApiConfig) -> Self {
        Self {
            config,
            http: client(),
            token: Mutex::new(None),
        }
    }

    fn search_stream_url(&self, customer_id: &str) -> String {
        format!(
            "{}/{}/customers/{}/googleAds:searchStream",
            self.config.api_url, self.config.api_version, customer_id
        )
    }

    async fn access_token(&self) -> Result<String, TransportError> {
        match &self.config.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => {
                let mut cached = self.token.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                    return Ok(token.access_token.clone());
                }
                let token =
                    refresh_access_token(&self.http, client_id, client_secret, refresh_token)
                        .await?;
                tracing::info!(expires_at = %token.expires_at, "Access token refreshed");
                let access_token = token.access_token.clone();
                *cached = Some(token);
                Ok(access_token)
            }
        }
    }
}

impl SearchTransport for RestTransport {
    async fn search_stream(
        &self,
        customer_id: &str,
        query: &str,
    ) -> Result<Vec<SearchBatch>, TransportError> {
        let token = self.access_token().await?;
        let mut request = self
            .http
            .post(self.search_stream_url(customer_id))
            .bearer_auth(token)
            .header("developer-token", &self.config.developer_token)
            .json(&json!({ "query": query }));
        if let Some(login_customer_id) = &self.config.login_customer_id {
            request = request.header("login-customer-id", login_customer_id);
        }

        let response = request.send().await.map_err(|e| {
            TransportError::Http(format!("{} ({e})", self.config.api_url))
        })?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Http(format!("failed to read response body: {e}")))?;
        let body = parse_response_body(&bytes);

        if !(200..=299).contains(&status) {
            return Err(TransportError::Status { status, body });
        }
        decode_search_stream(body)
    }
}

fn parse_response_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Decodes a searchStream response: a JSON array of
/// `{results, fieldMask, requestId}` chunks.
pub fn decode_search_stream(body: Value) -> Result<Vec<SearchBatch>, TransportError> {
    let chunks = match body {
        Value::Array(chunks) => chunks,
        Value::Object(_) => vec![body],
        Value::Null => Vec::new(),
        other => {
            return Err(TransportError::Decode(format!(
                "expected an array of result batches, got {}",
                json_kind(&other)
            )));
        }
    };

    chunks.into_iter().map(decode_batch).collect()
}

fn decode_batch(chunk: Value) -> Result<SearchBatch, TransportError> {
    let Value::Object(mut chunk) = chunk else {
        return Err(TransportError::Decode(
            "result batch must be an object".to_string(),
        ));
    };

    let results = match chunk.remove("results") {
        Some(Value::Array(rows)) => rows
            .into_iter()
            .map(|row| decode_message(ROW_TYPE_NAME, row))
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(TransportError::Decode(format!(
                "'results' must be an array, got {}",
                json_kind(&other)
            )));
        }
    };

    let field_mask = match chunk.remove("fieldMask") {
        Some(Value::String(mask)) => parse_field_mask(&mask),
        None | Some(Value::Null) => FieldMask::default(),
        Some(other) => {
            return Err(TransportError::Decode(format!(
                "'fieldMask' must be a string, got {}",
                json_kind(&other)
            )));
        }
    };

    Ok(SearchBatch {
        results,
        field_mask,
    })
}

/// `campaign.id,metrics.costMicros` -> `["campaign.id", "metrics.cost_micros"]`
pub fn parse_field_mask(mask: &str) -> FieldMask {
    let paths = mask
        .split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| {
            path.split('.')
                .map(to_snake_case)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect();
    FieldMask::new(paths)
}

fn decode_message(type_name: &str, value: Value) -> WireValue {
    match value {
        Value::Object(mut fields) => {
            if let Some(Value::String(type_url)) = fields.shift_remove("@type") {
                let fields = fields
                    .into_iter()
                    .map(|(json_name, v)| (to_snake_case(&json_name), snake_case_keys(v)))
                    .collect();
                return WireValue::RawMessage(RawMessage::new(type_url, fields));
            }
            let mut message = Message::new(type_name);
            for (json_name, field_value) in fields {
                let name = to_snake_case(&json_name);
                let decoded = decode_value(&name, field_value);
                message.push_field(name, decoded);
            }
            WireValue::Message(message)
        }
        other => decode_value(type_name, other),
    }
}

fn decode_value(field_name: &str, value: Value) -> WireValue {
    match value {
        Value::Null => WireValue::null(),
        Value::Bool(b) => WireValue::Scalar(Scalar::Bool(b)),
        Value::Number(n) => WireValue::Scalar(Scalar::from(n)),
        Value::String(s) => WireValue::string(s),
        Value::Array(items) => WireValue::Repeated(
            items
                .into_iter()
                .map(|item| decode_message(field_name, item))
                .collect(),
        ),
        object @ Value::Object(_) => decode_message(field_name, object),
    }
}

/// Renames object keys to proto field names at every depth. Nested `@type`
/// tags are dropped.
fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(key, _)| key != "@type")
                .map(|(key, v)| (to_snake_case(&key), snake_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
