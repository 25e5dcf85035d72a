//! Remote user search
//!
//! The mention engine only needs one endpoint: the network search, which
//! returns a paginated list of users filtered by name:
//!
//! ```text
//! GET {base_url}{search_path}?name=<query>&page=<n>&limit=<n>
//! -> { "items": [NetworkUser...], "meta": { ... } }
//! ```
//!
//! [`UserSearch`] is the seam the fetcher depends on, so tests and other
//! hosts can plug in their own source of candidates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::mention::NetworkUser;

/// Parameters of one search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: String,
    pub page: u32,
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: name.into(),
            page: 1,
            limit,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

/// Pagination counters returned next to the items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub items: Vec<NetworkUser>,
    pub meta: SearchMeta,
}

impl SearchPage {
    /// Interpret a response body.
    ///
    /// Anything that is not an object with an `items` array is treated as
    /// "no results". Items that do not look like users are skipped.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut body) = value else {
            tracing::debug!("search response is not an object");
            return Self::default();
        };

        let items = match body.remove("items") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<NetworkUser>(item) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping malformed search item");
                        None
                    }
                })
                .collect(),
            _ => {
                tracing::debug!("search response has no items array");
                Vec::new()
            }
        };

        let meta = body
            .remove("meta")
            .and_then(|meta| serde_json::from_value(meta).ok())
            .unwrap_or_default();

        Self { items, meta }
    }
}

/// Source of mention candidates
#[async_trait]
pub trait UserSearch: Send + Sync {
    /// Search users whose name matches `query.name`
    async fn search_users(&self, query: &SearchQuery) -> Result<SearchPage>;
}

/// [`UserSearch`] backed by the Wingman REST API
#[derive(Debug, Clone)]
pub struct HttpUserSearch {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpUserSearch {
    /// Build a client from API configuration
    ///
    /// # Arguments
    /// * `config` - API section of the configuration
    ///
    /// # Returns
    /// * `Result<Self>` - Client or an error if the URL is invalid
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint = join_endpoint(&config.base_url, &config.search_path)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("wingman-mentions/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UserSearch for HttpUserSearch {
    async fn search_users(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = search_url(&self.endpoint, query);
        tracing::debug!(%url, "searching network users");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: truncate(&message, 200),
            }
            .into());
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(SearchPage::from_value(value))
    }
}

/// Join base URL and endpoint path, tolerating missing or doubled slashes
fn join_endpoint(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|_| ApiError::InvalidUrl(joined).into())
}

/// Full request URL for a query
fn search_url(endpoint: &Url, query: &SearchQuery) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("name", &query.name)
        .append_pair("page", &query.page.to_string())
        .append_pair("limit", &query.limit.to_string());
    url
}

fn truncate(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}
