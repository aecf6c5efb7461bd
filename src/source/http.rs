//! JSON HTTP object source
//!
//! Reads records from a cursor-paged JSON API (e.g. Stripe, Slack, Google
//! APIs with `pageToken`). Each fetch is one GET carrying a limit parameter
//! and, when resuming, the cursor parameter. Common response shapes:
//! - `{ "data": [...], "next_cursor": "abc" }`
//! - `{ "items": [...], "nextPageToken": "abc" }`

use super::types::{Batch, FetchStart, ObjectSource};
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for an HTTP cursor source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint URL
    pub url: String,

    /// Path to the records array: a dot path or a bracketed JSONPath (omit
    /// when the body is the array)
    #[serde(default)]
    pub records_path: Option<String>,

    /// Dot path to the next cursor (omit for offset-only APIs)
    #[serde(default)]
    pub cursor_path: Option<String>,

    /// Query parameter carrying the cursor
    #[serde(default = "default_cursor_param")]
    pub cursor_param: String,

    /// Query parameter carrying the batch size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Query parameter for raw offsets, if the API accepts one
    #[serde(default)]
    pub offset_param: Option<String>,

    /// Static query parameters (filters, ordering)
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_cursor_param() -> String {
    "cursor".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpSourceConfig {
    /// Create a config for a cursor-paged endpoint
    pub fn new(url: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            records_path: None,
            cursor_path: Some(cursor_path.into()),
            cursor_param: default_cursor_param(),
            limit_param: default_limit_param(),
            offset_param: None,
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set the cursor query parameter
    #[must_use]
    pub fn with_cursor_param(mut self, param: impl Into<String>) -> Self {
        self.cursor_param = param.into();
        self
    }

    /// Set the limit query parameter
    #[must_use]
    pub fn with_limit_param(mut self, param: impl Into<String>) -> Self {
        self.limit_param = param.into();
        self
    }

    /// Set the offset query parameter
    #[must_use]
    pub fn with_offset_param(mut self, param: impl Into<String>) -> Self {
        self.offset_param = Some(param.into());
        self
    }

    /// Add a static query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::missing_field("source.url"));
        }
        Url::parse(&self.url)?;
        if self.cursor_path.is_none() && self.offset_param.is_none() {
            return Err(Error::config(
                "HTTP source needs a cursor_path or an offset_param to page through results",
            ));
        }
        if self.limit_param.is_empty() {
            return Err(Error::invalid_value("source.limit_param", "cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Source
// ============================================================================

/// Object source backed by a JSON HTTP API
#[derive(Debug, Clone)]
pub struct HttpCursorSource {
    config: HttpSourceConfig,
    client: Client,
}

impl HttpCursorSource {
    /// Create a source from a validated config
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("cursor-pages/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// The source configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// One GET against the endpoint
    async fn request(
        &self,
        cursor: Option<&Cursor>,
        offset: Option<u64>,
        limit: usize,
    ) -> Result<Batch<Value>> {
        let mut url = Url::parse(&self.config.url)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.config.params {
                query.append_pair(key, value);
            }
            query.append_pair(&self.config.limit_param, &limit.to_string());
            if let Some(cursor) = cursor {
                query.append_pair(&self.config.cursor_param, cursor.as_str());
            }
            if let (Some(param), Some(offset)) = (&self.config.offset_param, offset) {
                query.append_pair(param, &offset.to_string());
            }
        }

        debug!("GET {}", url);
        let mut request = self.client.get(url);
        for (name, value) in &self.config.headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        self.parse_body(&body)
    }

    fn parse_body(&self, body: &Value) -> Result<Batch<Value>> {
        let items = match &self.config.records_path {
            Some(path) => extract_records(body, path)?,
            None => body
                .as_array()
                .cloned()
                .ok_or_else(|| Error::extraction("$", "expected an array of records"))?,
        };

        // The cursor follows the last record returned, even when the API sent
        // more than asked for, so oversized batches are kept whole.
        let next_cursor = self
            .config
            .cursor_path
            .as_deref()
            .and_then(|path| extract_string(body, path))
            .filter(|c| !c.is_empty())
            .map(Cursor::from);

        Ok(Batch { items, next_cursor })
    }

    /// Walk forward with cursors until `offset` raw items have been skipped,
    /// then gather up to `limit` records from there.
    async fn skip_to(&self, offset: u64, limit: usize) -> Result<Batch<Value>> {
        let mut cursor: Option<Cursor> = None;
        let mut skip = offset;
        let mut items = Vec::new();

        loop {
            let want = if skip > 0 {
                skip.min(limit as u64) as usize
            } else {
                limit - items.len()
            };
            let page = self.request(cursor.as_ref(), None, want).await?;
            let short = page.len() < want;

            let mut records = page.items;
            let dropped = usize::try_from(skip).unwrap_or(usize::MAX).min(records.len());
            records.drain(..dropped);
            skip -= dropped as u64;
            items.extend(records);

            match page.next_cursor {
                Some(next) if !short && (skip > 0 || items.len() < limit) => cursor = Some(next),
                next_cursor => {
                    debug!(
                        "Skipped to offset {offset} with {} records gathered",
                        items.len()
                    );
                    return Ok(Batch { items, next_cursor });
                }
            }
        }
    }
}

#[async_trait]
impl ObjectSource for HttpCursorSource {
    type Item = Value;

    fn cache_key(&self) -> String {
        let pairs = |map: &BTreeMap<String, String>| {
            map.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        };
        format!(
            "{}?{}#records={}&cursor={}&limit={}&offset={}&headers=[{}]",
            self.config.url,
            pairs(&self.config.params),
            self.config.records_path.as_deref().unwrap_or("$"),
            self.config.cursor_param,
            self.config.limit_param,
            self.config.offset_param.as_deref().unwrap_or(""),
            pairs(&self.config.headers),
        )
    }

    fn supports_cursors(&self) -> bool {
        self.config.cursor_path.is_some()
    }

    async fn fetch(&self, start: FetchStart, limit: usize) -> Result<Batch<Value>> {
        match start {
            FetchStart::Cursor(cursor) => self.request(Some(&cursor), None, limit).await,
            FetchStart::Offset(0) => self.request(None, None, limit).await,
            FetchStart::Offset(offset) if self.config.offset_param.is_some() => {
                self.request(None, Some(offset), limit).await
            }
            FetchStart::Offset(offset) => self.skip_to(offset, limit).await,
        }
    }
}

// ============================================================================
// JSON Path Helpers
// ============================================================================

/// Follow a dot path (`$.a.b` or `a.b`) into a JSON value
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Follow a dot path and render a scalar as a string
pub fn extract_string(value: &Value, path: &str) -> Option<String> {
    match extract_path(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Pull the records array out of a response body.
///
/// Plain dot paths are walked directly. Bracketed paths (`$.data[*]`,
/// `$.results[0].items`) go through jsonpath-rust: a path ending in `[*]`
/// yields its matches as the records, any other path must match one array.
pub fn extract_records(body: &Value, path: &str) -> Result<Vec<Value>> {
    if !path.contains('[') {
        return match extract_path(body, path) {
            Some(Value::Array(records)) => Ok(records.clone()),
            Some(_) => Err(Error::extraction(path, "expected an array of records")),
            None => Err(Error::extraction(path, "path not found in response")),
        };
    }

    let matches = extract_with_jsonpath(body, path)?;
    if let Some(parent) = path.strip_suffix("[*]") {
        // An empty array is a last batch; a missing one is a bad path
        if matches.is_empty() && extract_with_jsonpath(body, parent)?.is_empty() {
            return Err(Error::extraction(path, "path not found in response"));
        }
        return Ok(matches);
    }
    match matches.as_slice() {
        [Value::Array(records)] => Ok(records.clone()),
        [] => Err(Error::extraction(path, "path not found in response")),
        _ => Err(Error::extraction(path, "expected an array of records")),
    }
}

fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::extraction(path, format!("Invalid JSONPath: {e}")))?;

    match jp.find(value) {
        Value::Array(matches) => Ok(matches),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}
