use std::future::Future;

use crate::error::TransportError;
use crate::projector::{NormalizedRow, project_row};
use crate::query::SearchRequest;
use crate::wire::WireValue;

/// Attribute paths a batch declares as populated, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    pub paths: Vec<String>,
}

impl FieldMask {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

/// One streamed chunk of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBatch {
    pub results: Vec<WireValue>,
    pub field_mask: FieldMask,
}

/// Streaming search against the reporting API. Implementations own
/// credentials, retries and timeouts; the executor never retries.
pub trait SearchTransport {
    fn search_stream(
        &self,
        customer_id: &str,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchBatch>, TransportError>>;
}

/// Builds the query, runs it, and projects every row of every batch with
/// that batch's field mask. Rows keep streaming order.
pub async fn execute_search<T: SearchTransport>(
    transport: &T,
    request: &SearchRequest,
) -> Result<Vec<NormalizedRow>, TransportError> {
    let query = request.build_query();
    tracing::info!("ads_mcp.search query {query}");

    let batches = transport
        .search_stream(&request.customer_id, &query)
        .await?;

    let mut rows = Vec::new();
    for batch in &batches {
        for row in &batch.results {
            rows.push(project_row(row, &batch.field_mask.paths));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::wire::Message;

    struct RecordingTransport {
        batches: Vec<SearchBatch>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl SearchTransport for RecordingTransport {
        async fn search_stream(
            &self,
            customer_id: &str,
            query: &str,
        ) -> Result<Vec<SearchBatch>, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((customer_id.to_string(), query.to_string()));
            Ok(self.batches.clone())
        }
    }

    struct FailingTransport;

    impl SearchTransport for FailingTransport {
        async fn search_stream(
            &self,
            _customer_id: &str,
            _query: &str,
        ) -> Result<Vec<SearchBatch>, TransportError> {
            Err(TransportError::Status {
                status: 403,
                body: json!({ "error": { "status": "PERMISSION_DENIED" } }),
            })
        }
    }

    fn campaign(name: &str) -> WireValue {
        WireValue::Message(Message::new("GoogleAdsRow").with_field(
            "campaign",
            WireValue::Message(Message::new("Campaign").with_field("name", WireValue::string(name))),
        ))
    }

    fn request() -> SearchRequest {
        SearchRequest::new("1234567890", vec!["campaign.name".to_string()], "campaign").unwrap()
    }

    #[tokio::test]
    async fn rows_from_all_batches_keep_streaming_order() {
        let transport = RecordingTransport {
            batches: vec![
                SearchBatch {
                    results: vec![campaign("A"), campaign("B")],
                    field_mask: FieldMask::new(vec!["campaign.name".to_string()]),
                },
                SearchBatch {
                    results: vec![campaign("C")],
                    field_mask: FieldMask::new(vec!["campaign.name".to_string()]),
                },
            ],
            calls: Mutex::new(Vec::new()),
        };

        let rows = execute_search(&transport, &request()).await.unwrap();
        let names: Vec<Value> = rows
            .into_iter()
            .map(|row| row["campaign.name"].clone())
            .collect();
        assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(
                "1234567890".to_string(),
                "SELECT campaign.name FROM campaign".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn each_batch_uses_its_own_field_mask() {
        let transport = RecordingTransport {
            batches: vec![SearchBatch {
                results: vec![campaign("A")],
                field_mask: FieldMask::new(vec![
                    "campaign.name".to_string(),
                    "campaign.id".to_string(),
                ]),
            }],
            calls: Mutex::new(Vec::new()),
        };
        let rows = execute_search(&transport, &request()).await.unwrap();
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({ "campaign.name": "A", "campaign.id": null })
        );
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let err = execute_search(&FailingTransport, &request())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
