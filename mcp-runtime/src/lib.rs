use std::path::PathBuf;
use std::sync::Arc;

use ads_core::catalog::SchemaCatalog;
use ads_core::error::codes;
use ads_core::{
    Limit, RequestError, SearchRequest, SearchTransport, TransportError, execute_search,
};
use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

pub mod rest;
pub mod util;

use rest::RestTransport;
use util::{AdsApiConfig, default_resources_path, load_default_catalog, normalize_customer_id};

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const MCP_SERVER_NAME: &str = "ads-mcp";
const SEARCH_TOOL: &str = "search";
const RESOURCE_FIELDS_TOOL: &str = "get_resource_fields";
const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

const SEARCH_TOOL_DOC: &str = "Fetches data from the Google Ads API using the search method

    Args:
        customer_id: The id of the customer
        fields: The fields to fetch
        resource: The resource to return fields from
        conditions: List of conditions to filter the data, combined using AND clauses
        orderings: How the data is ordered
        limit: The maximum number of rows to return";

const SEARCH_TOOL_HINTS: &str = "### Hints
    Language Grammar can be found at https://developers.google.com/google-ads/api/docs/query/grammar
    All resources and descriptions are found at https://developers.google.com/google-ads/api/fields/v21/overview

    For Conversion issues try looking in offline_conversion_upload_conversion_action_summary

### Hint for customer_id
    should be a string of numbers without punctuation
    if presented in the form 123-456-7890 remove the hyphens and use 1234567890

### Hints for Dates
    All dates should be in the form YYYY-MM-DD and must include the dashes (-)
    Date literals from the Grammar must NEVER be used
    Date ranges should be finite and must include a start and end date

### Hints for limits
    Requests to resource change_event must specify a LIMIT of less than or equal to 10000

### Hints for conversions questions
    https://developers.google.com/google-ads/api/docs/conversions/upload-summaries

### Hints for fields
    IMPORTANT: Before calling search, use the get_resource_fields tool to look up
    the selectable, filterable, and sortable fields for your target resource.
    All fields must come from that tool and be prefixed with the resource being searched.
    Wildcards and partial fields are not allowed.

### Trust boundary
    conditions and orderings are inserted into the query verbatim, without escaping.";

#[derive(Subcommand)]
pub enum McpCommands {
    /// Run the MCP server over stdio
    Serve(McpServeArgs),
    /// Print the tool list (with the catalog-derived search description) and exit
    Tools(McpToolsArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CatalogArgs {
    /// Resource catalog (JSON array of {resource, selectable, filterable, sortable})
    #[arg(long, env = "ADS_MCP_RESOURCES_FILE")]
    pub resources_file: Option<PathBuf>,
}

impl CatalogArgs {
    /// An explicit file is loaded as-is; the default location falls back to
    /// the bundled catalog when nothing is installed there.
    fn load_catalog(&self) -> SchemaCatalog {
        match &self.resources_file {
            Some(path) => SchemaCatalog::load(path),
            None => load_default_catalog(&default_resources_path()),
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ApiArgs {
    /// Reporting API base URL
    #[arg(long, env = "GOOGLE_ADS_API_URL", default_value = util::DEFAULT_API_URL)]
    pub api_url: String,
    /// Reporting API version path segment
    #[arg(long, env = "GOOGLE_ADS_API_VERSION", default_value = util::DEFAULT_API_VERSION)]
    pub api_version: String,
    /// Developer token (required)
    #[arg(long, env = "GOOGLE_ADS_DEVELOPER_TOKEN", hide_env_values = true)]
    pub developer_token: Option<String>,
    /// Manager account the calls are made through
    #[arg(long, env = "GOOGLE_ADS_LOGIN_CUSTOMER_ID")]
    pub login_customer_id: Option<String>,
    /// Pre-issued OAuth access token (otherwise the refresh-token grant is used)
    #[arg(long, env = "GOOGLE_ADS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
    #[arg(long, env = "GOOGLE_ADS_CLIENT_ID")]
    pub client_id: Option<String>,
    #[arg(long, env = "GOOGLE_ADS_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    #[arg(long, env = "GOOGLE_ADS_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct McpServeArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Args, Clone, Debug)]
pub struct McpToolsArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

pub async fn run(command: McpCommands) -> i32 {
    match command {
        McpCommands::Serve(args) => {
            let config = match AdsApiConfig::resolve(args.api) {
                Ok(config) => config,
                Err(err) => {
                    let payload = json!({
                        "error": codes::MISSING_CONFIGURATION,
                        "message": err.to_string(),
                        "docs_hint": err.docs_hint(),
                    });
                    eprintln!("{}", to_pretty_json(&payload));
                    return 1;
                }
            };
            let catalog = Arc::new(args.catalog.load_catalog());
            let server = McpServer::new(RestTransport::new(config), catalog);
            tracing::info!(
                server = MCP_SERVER_NAME,
                version = env!("CARGO_PKG_VERSION"),
                "MCP server listening on stdio"
            );
            match server.serve_stdio().await {
                Ok(()) => 0,
                Err(err) => {
                    let payload = json!({
                        "error": "mcp_server_error",
                        "message": err,
                    });
                    eprintln!("{}", to_pretty_json(&payload));
                    1
                }
            }
        }
        McpCommands::Tools(args) => {
            let catalog = args.catalog.load_catalog();
            println!("{}", to_pretty_json(&tools_list_payload(&catalog)));
            0
        }
    }
}

/// MCP server over one search transport and one shared catalog.
pub struct McpServer<T> {
    transport: T,
    catalog: Arc<SchemaCatalog>,
    tools_list: Value,
}

impl<T: SearchTransport> McpServer<T> {
    pub fn new(transport: T, catalog: Arc<SchemaCatalog>) -> Self {
        let tools_list = tools_list_payload(&catalog);
        Self {
            transport,
            catalog,
            tools_list,
        }
    }

    pub async fn serve_stdio(&self) -> Result<(), String> {
        let reader = BufReader::new(io::stdin());
        self.serve(reader, io::stdout()).await
    }

    /// Reads messages until EOF and answers each in the framing it arrived in.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let incoming = read_message(&mut reader)
                .await
                .map_err(|e| format!("Failed to read MCP message: {e}"))?;
            let Some(incoming) = incoming else {
                break;
            };

            let response = match incoming.payload {
                Ok(message) => self.handle_incoming_message(message).await,
                Err(err) => Some(error_response(
                    Value::Null,
                    RpcError::parse_error(format!("Invalid JSON payload: {err}")),
                )),
            };
            if let Some(response) = response {
                write_message(&mut writer, incoming.framing, &response)
                    .await
                    .map_err(|e| format!("Failed to write MCP response: {e}"))?;
            }
        }

        Ok(())
    }

    pub async fn handle_incoming_message(&self, incoming: Value) -> Option<Value> {
        let Value::Array(batch) = incoming else {
            return self.handle_single_message(incoming).await;
        };

        if batch.is_empty() {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            ));
        }
        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = self.handle_single_message(item).await {
                responses.push(response);
            }
        }
        (!responses.is_empty()).then_some(Value::Array(responses))
    }

    async fn handle_single_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            // A client response; this server never issues requests.
            return None;
        };

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        if let Some(id) = obj.get("id").cloned() {
            let result = self.handle_request(method, params).await;
            Some(match result {
                Ok(payload) => success_response(id, payload),
                Err(err) => error_response(id, err),
            })
        } else {
            self.handle_notification(method);
            None
        }
    }

    fn handle_notification(&self, method: &str) {
        if !matches!(
            method,
            "notifications/initialized" | "notifications/cancelled"
        ) {
            tracing::debug!(method, "Ignoring unknown notification");
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list.clone()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Call get_resource_fields for the target resource first, then call search with fields taken from its answer. The search tool description lists every available resource."
        })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        Ok(match self.execute_tool(name, &args).await {
            Ok(outcome) => {
                let envelope = json!({
                    "status": outcome.status,
                    "tool": name,
                    "data": outcome.payload
                });
                build_tool_call_response(envelope, false)
            }
            Err(err) => {
                let envelope = json!({
                    "status": "error",
                    "tool": name,
                    "error": err.to_value()
                });
                build_tool_call_response(envelope, true)
            }
        })
    }

    async fn execute_tool(
        &self,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<ToolOutcome, ToolError> {
        match tool_name {
            SEARCH_TOOL => self.tool_search(args).await,
            RESOURCE_FIELDS_TOOL => self.tool_get_resource_fields(args),
            _ => Err(ToolError::new(
                codes::UNKNOWN_TOOL,
                format!("Unknown tool '{tool_name}'"),
            )
            .with_field("name")
            .with_docs_hint("Call tools/list to see the available tools.")),
        }
    }

    async fn tool_search(&self, args: &Map<String, Value>) -> Result<ToolOutcome, ToolError> {
        let customer_id = normalize_customer_id(&required_string(args, "customer_id")?);
        let fields = required_string_array(args, "fields")?;
        let resource = required_string(args, "resource")?;
        let request = SearchRequest::new(customer_id, fields, resource)?
            .with_conditions(arg_optional_string_array(args, "conditions")?.unwrap_or_default())
            .with_orderings(arg_optional_string_array(args, "orderings")?.unwrap_or_default())
            .with_limit(arg_optional_limit(args, "limit")?)?;

        let rows = execute_search(&self.transport, &request)
            .await
            .map_err(|err| {
                tracing::warn!(
                    error = %err,
                    customer_id = %request.customer_id,
                    "Search failed"
                );
                ToolError::from(err)
            })?;

        Ok(ToolOutcome::complete(Value::Array(
            rows.into_iter().map(Value::Object).collect(),
        )))
    }

    fn tool_get_resource_fields(&self, args: &Map<String, Value>) -> Result<ToolOutcome, ToolError> {
        let resource = required_string(args, "resource")?;
        Ok(match self.catalog.lookup(&resource) {
            Ok(schema) => ToolOutcome::complete(to_json(schema)),
            Err(miss) => ToolOutcome {
                status: codes::RESOURCE_NOT_FOUND,
                payload: to_json(&miss),
            },
        })
    }
}

#[derive(Debug)]
struct ToolOutcome {
    status: &'static str,
    payload: Value,
}

impl ToolOutcome {
    fn complete(payload: Value) -> Self {
        Self {
            status: "complete",
            payload,
        }
    }
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct ToolError {
    code: String,
    message: String,
    field: Option<String>,
    docs_hint: Option<String>,
    details: Option<Value>,
}

impl ToolError {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            docs_hint: None,
            details: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    fn with_docs_hint(mut self, docs_hint: impl Into<String>) -> Self {
        self.docs_hint = Some(docs_hint.into());
        self
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn to_value(&self) -> Value {
        let mut payload = json!({
            "error": self.code,
            "message": self.message
        });
        if let Some(field) = &self.field {
            payload["field"] = Value::String(field.clone());
        }
        if let Some(docs_hint) = &self.docs_hint {
            payload["docs_hint"] = Value::String(docs_hint.clone());
        }
        if let Some(details) = &self.details {
            payload["details"] = details.clone();
        }
        payload
    }
}

impl From<RequestError> for ToolError {
    fn from(err: RequestError) -> Self {
        let field = err.field();
        ToolError::new(codes::VALIDATION_FAILED, err.to_string()).with_field(field)
    }
}

impl From<TransportError> for ToolError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        match err {
            TransportError::Status { status, body } => {
                ToolError::new(codes::TRANSPORT_ERROR, message)
                    .with_details(json!({ "status": status, "body": body }))
            }
            TransportError::Http(_) => ToolError::new(codes::TRANSPORT_ERROR, message)
                .with_docs_hint("Check network access and GOOGLE_ADS_API_URL."),
            TransportError::Auth(_) => ToolError::new(codes::TRANSPORT_ERROR, message)
                .with_docs_hint("Check the OAuth credentials configured for the server."),
            TransportError::Decode(_) => ToolError::new(codes::TRANSPORT_ERROR, message),
        }
    }
}

#[derive(Debug)]
struct ToolDefinition {
    name: &'static str,
    title: &'static str,
    description: String,
    input_schema: Value,
}

/// Search description generated from the catalog: usage, hints, and every
/// resource name available for discovery.
pub fn search_tool_description(catalog: &SchemaCatalog) -> String {
    let resource_names = catalog.resource_names().collect::<Vec<_>>().join(", ");
    format!(
        "\n{SEARCH_TOOL_DOC}\n\n{SEARCH_TOOL_HINTS}\n\n### Available resources\n    {resource_names}\n"
    )
}

fn tool_definitions(catalog: &SchemaCatalog) -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SEARCH_TOOL,
            title: "Fetches data from the Google Ads API using the search method",
            description: search_tool_description(catalog),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "customer_id": { "type": "string" },
                    "fields": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1
                    },
                    "resource": { "type": "string" },
                    "conditions": { "type": "array", "items": { "type": "string" } },
                    "orderings": { "type": "array", "items": { "type": "string" } },
                    "limit": { "type": ["integer", "string"] }
                },
                "required": ["customer_id", "fields", "resource"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: RESOURCE_FIELDS_TOOL,
            title: "Looks up the queryable fields of a resource",
            description: "Returns the selectable, filterable, and sortable fields for a Google Ads API resource.\n\nCall this tool before using the search tool to discover valid field names.\n\nArgs:\n    resource: The resource name (e.g. 'campaign', 'ad_group', 'ad_group_ad').\n              Use the search tool description to see all available resource names.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resource": { "type": "string" }
                },
                "required": ["resource"],
                "additionalProperties": false
            }),
        },
    ]
}

pub fn tools_list_payload(catalog: &SchemaCatalog) -> Value {
    let tools: Vec<Value> = tool_definitions(catalog)
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "title": tool.title,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}

fn build_tool_call_response(envelope: Value, is_error: bool) -> Value {
    let text = to_pretty_json(&envelope);
    if is_error {
        json!({
            "isError": true,
            "content": [{ "type": "text", "text": text }],
            "structuredContent": envelope
        })
    } else {
        json!({
            "content": [{ "type": "text", "text": text }],
            "structuredContent": envelope
        })
    }
}

fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    let value = args.get(key).ok_or_else(|| {
        ToolError::new(
            codes::VALIDATION_FAILED,
            format!("Missing required field '{key}'"),
        )
        .with_field(key)
    })?;
    match value {
        Value::String(v) if !v.trim().is_empty() => Ok(v.clone()),
        Value::String(_) => Err(ToolError::new(
            codes::VALIDATION_FAILED,
            format!("'{key}' must not be empty"),
        )
        .with_field(key)),
        _ => Err(
            ToolError::new(codes::VALIDATION_FAILED, format!("'{key}' must be a string"))
                .with_field(key),
        ),
    }
}

fn required_string_array(args: &Map<String, Value>, key: &str) -> Result<Vec<String>, ToolError> {
    arg_optional_string_array(args, key)?.ok_or_else(|| {
        ToolError::new(
            codes::VALIDATION_FAILED,
            format!("Missing required field '{key}'"),
        )
        .with_field(key)
    })
}

/// Items are kept verbatim: query fragments must reach the builder untouched.
fn arg_optional_string_array(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, ToolError> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let items = value.as_array().ok_or_else(|| {
        ToolError::new(
            codes::VALIDATION_FAILED,
            format!("'{key}' must be an array of strings"),
        )
        .with_field(key)
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ToolError::new(
                    codes::VALIDATION_FAILED,
                    format!("'{key}' items must be strings"),
                )
                .with_field(key)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn arg_optional_limit(args: &Map<String, Value>, key: &str) -> Result<Option<Limit>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(|n| Some(Limit::Count(n))).ok_or_else(|| {
            ToolError::new(
                codes::VALIDATION_FAILED,
                format!("'{key}' must be a non-negative integer"),
            )
            .with_field(key)
        }),
        Some(Value::String(s)) => Ok(Some(Limit::Text(s.trim().to_string()))),
        Some(_) => Err(ToolError::new(
            codes::VALIDATION_FAILED,
            format!("'{key}' must be an integer or a digit string"),
        )
        .with_field(key)),
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Framing {
    /// `Content-Length` headers, blank line, body
    ContentLength,
    /// One JSON document per line
    LineDelimited,
}

struct IncomingMessage {
    framing: Framing,
    payload: Result<Value, serde_json::Error>,
}

async fn read_message<R>(reader: &mut R) -> Result<Option<IncomingMessage>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            if !saw_header {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Unexpected EOF while reading MCP headers",
            ));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if saw_header {
                break;
            }
            continue;
        }
        if !saw_header && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return Ok(Some(IncomingMessage {
                framing: Framing::LineDelimited,
                payload: serde_json::from_str(trimmed),
            }));
        }

        saw_header = true;
        if trimmed.to_ascii_lowercase().starts_with("content-length:") {
            let raw_len = trimmed
                .split_once(':')
                .map(|(_, right)| right.trim())
                .unwrap_or_default();
            let parsed = raw_len.parse::<usize>().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Invalid Content-Length header",
                )
            })?;
            content_length = Some(parsed);
        }
    }

    let content_length = content_length.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        )
    })?;
    if content_length > MAX_MESSAGE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Content-Length {content_length} exceeds the {MAX_MESSAGE_BYTES} byte limit"),
        ));
    }
    let mut payload = vec![0_u8; content_length];
    reader.read_exact(&mut payload).await?;

    Ok(Some(IncomingMessage {
        framing: Framing::ContentLength,
        payload: serde_json::from_slice(&payload),
    }))
}

async fn write_message<W>(
    writer: &mut W,
    framing: Framing,
    value: &Value,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON: {e}"),
        )
    })?;
    match framing {
        Framing::ContentLength => {
            let header = format!(
                "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n",
                body.len()
            );
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
        Framing::LineDelimited => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

fn to_json<S: serde::Serialize>(value: &S) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
