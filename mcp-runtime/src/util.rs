use std::path::{Path, PathBuf};

use ads_core::{ResourceSchema, SchemaCatalog, TransportError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::ApiArgs;

pub const RESOURCES_FILENAME: &str = "gaql_resources.json";
pub const DEFAULT_API_URL: &str = "https://googleads.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v21";
const BUNDLED_RESOURCES: &str = include_str!("../data/gaql_resources.json");
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} environment variable not set.")]
    MissingEnv { name: &'static str },
    #[error("{name} is set but {missing} is not; refresh-token credentials need all three.")]
    IncompleteRefreshCredentials {
        name: &'static str,
        missing: &'static str,
    },
}

impl ConfigError {
    pub fn docs_hint(&self) -> &'static str {
        match self {
            ConfigError::MissingEnv { .. } => {
                "Set the variable in the environment or in a .env file next to the server."
            }
            ConfigError::IncompleteRefreshCredentials { .. } => {
                "Set GOOGLE_ADS_CLIENT_ID, GOOGLE_ADS_CLIENT_SECRET and GOOGLE_ADS_REFRESH_TOKEN together, or set GOOGLE_ADS_ACCESS_TOKEN."
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    /// Pre-issued OAuth access token, used as-is
    AccessToken(String),
    /// Refresh-token grant, exchanged for access tokens on demand
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

/// Everything the REST transport needs to talk to the reporting API.
#[derive(Clone, Debug)]
pub struct AdsApiConfig {
    pub api_url: String,
    pub api_version: String,
    pub developer_token: String,
    pub login_customer_id: Option<String>,
    pub credentials: Credentials,
}

impl AdsApiConfig {
    pub fn resolve(args: ApiArgs) -> Result<Self, ConfigError> {
        let developer_token =
            non_empty(args.developer_token).ok_or(ConfigError::MissingEnv {
                name: "GOOGLE_ADS_DEVELOPER_TOKEN",
            })?;
        let login_customer_id = non_empty(args.login_customer_id).map(|id| normalize_customer_id(&id));
        let credentials = resolve_credentials(
            non_empty(args.access_token),
            non_empty(args.client_id),
            non_empty(args.client_secret),
            non_empty(args.refresh_token),
        )?;

        Ok(Self {
            api_url: args.api_url.trim_end_matches('/').to_string(),
            api_version: args.api_version,
            developer_token,
            login_customer_id,
            credentials,
        })
    }
}

fn resolve_credentials(
    access_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
) -> Result<Credentials, ConfigError> {
    if let Some(token) = access_token {
        return Ok(Credentials::AccessToken(token));
    }

    match (client_id, client_secret, refresh_token) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => {
            Ok(Credentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            })
        }
        (None, None, None) => Err(ConfigError::MissingEnv {
            name: "GOOGLE_ADS_ACCESS_TOKEN",
        }),
        (client_id, client_secret, _) => {
            let name = if client_id.is_some() {
                "GOOGLE_ADS_CLIENT_ID"
            } else if client_secret.is_some() {
                "GOOGLE_ADS_CLIENT_SECRET"
            } else {
                "GOOGLE_ADS_REFRESH_TOKEN"
            };
            let missing = if client_id.is_none() {
                "GOOGLE_ADS_CLIENT_ID"
            } else if client_secret.is_none() {
                "GOOGLE_ADS_CLIENT_SECRET"
            } else {
                "GOOGLE_ADS_REFRESH_TOKEN"
            };
            Err(ConfigError::IncompleteRefreshCredentials { name, missing })
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `123-456-7890` -> `1234567890`
pub fn normalize_customer_id(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '-').collect()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("ads-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub fn default_resources_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ads-mcp");
    config_dir.join(RESOURCES_FILENAME)
}

/// Catalog shipped with the server.
pub fn bundled_catalog() -> SchemaCatalog {
    match serde_json::from_str::<Vec<ResourceSchema>>(BUNDLED_RESOURCES) {
        Ok(resources) => SchemaCatalog::from_resources(resources),
        Err(err) => {
            tracing::error!(error = %err, "Bundled resource catalog is malformed");
            SchemaCatalog::default()
        }
    }
}

/// Loads the catalog at the default location, or the bundled one when no
/// file has been installed there.
pub fn load_default_catalog(path: &Path) -> SchemaCatalog {
    if path.exists() {
        return SchemaCatalog::load(path);
    }
    tracing::info!(
        path = %path.display(),
        "No resource catalog installed, using the bundled catalog"
    );
    bundled_catalog()
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES) < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub async fn refresh_access_token(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<CachedToken, TransportError> {
    let resp = http
        .post(OAUTH_TOKEN_URL)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| TransportError::Auth(format!("token endpoint unreachable: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Auth(format!(
            "token refresh failed ({status}): {body}"
        )));
    }

    let token_resp: TokenResponse = resp
        .json()
        .await
        .map_err(|e| TransportError::Auth(format!("invalid token response: {e}")))?;
    Ok(CachedToken {
        access_token: token_resp.access_token,
        expires_at: Utc::now() + chrono::Duration::seconds(token_resp.expires_in),
    })
}
