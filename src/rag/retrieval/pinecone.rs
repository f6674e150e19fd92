// Pinecone records-search client (integrated embedding + hosted rerank)
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::errors::{retrieval_transport_error, RetrievalError};
use crate::rag::retrieval::engine::{QueryParams, RerankSpec, VectorStore};
use crate::types::{Match, RetrievalResult};

/// Control plane used to resolve index hosts
pub const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Default index name for vectorized logs
pub const DEFAULT_INDEX_NAME: &str = "logs-vectorized";

/// Pinned REST API version
const API_VERSION: &str = "2025-01";

/// Namespace name Pinecone uses when none is given
const DEFAULT_NAMESPACE: &str = "__default__";

/// Request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one index
#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub index_name: String,
    /// Data-plane host; resolved through the control plane when absent
    pub host: Option<String>,
    pub namespace: String,
    pub api_key: String,
    pub timeout: Duration,
    pub params: QueryParams,
    pub control_plane_url: String,
}

impl PineconeSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            host: None,
            namespace: String::new(),
            api_key: api_key.into(),
            timeout: REQUEST_TIMEOUT,
            params: QueryParams::default(),
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
        }
    }
}

/// Vector index client backed by Pinecone's REST API
///
/// Cheap to share behind an `Arc`: the only interior state is the index
/// host, written once on first use and read-only afterwards.
#[derive(Debug)]
pub struct PineconeClient {
    client: Client,
    settings: PineconeSettings,
    host: OnceCell<String>,
}

impl PineconeClient {
    /// Create client; no network traffic happens here
    pub fn new(settings: PineconeSettings) -> Result<Self, RetrievalError> {
        if settings.api_key.trim().is_empty() {
            return Err(RetrievalError::Config(
                "Pinecone API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RetrievalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let host = match settings.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => OnceCell::new_with(Some(normalize_host(host))),
            _ => OnceCell::new(),
        };

        Ok(Self {
            client,
            settings,
            host,
        })
    }

    /// Index name this client queries
    pub fn index_name(&self) -> &str {
        &self.settings.index_name
    }

    /// Query parameters sent with every search
    pub fn params(&self) -> &QueryParams {
        &self.settings.params
    }

    fn timeout_ms(&self) -> u64 {
        self.settings.timeout.as_millis() as u64
    }

    fn namespace(&self) -> &str {
        if self.settings.namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            &self.settings.namespace
        }
    }

    /// Data-plane host, resolving it on first use
    async fn index_host(&self) -> Result<&str, RetrievalError> {
        self.host
            .get_or_try_init(|| self.describe_index())
            .await
            .map(String::as_str)
    }

    /// Look up the index host through the control plane
    async fn describe_index(&self) -> Result<String, RetrievalError> {
        let url = endpoint_url(
            &self.settings.control_plane_url,
            &["indexes", self.settings.index_name.as_str()],
        )?;
        debug!(index = %self.settings.index_name, "resolving index host");

        let response = self
            .client
            .get(url)
            .header("Api-Key", &self.settings.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| retrieval_transport_error(e, self.timeout_ms()))?;

        let response = self.check_status(response).await?;
        let description: IndexDescription = response
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse(e.to_string()))?;

        Ok(normalize_host(&description.host))
    }

    async fn check_status(&self, response: Response) -> Result<Response, RetrievalError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(RetrievalError::IndexNotFound {
                index: self.settings.index_name.clone(),
            });
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RetrievalError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Build the search body for one query text
    pub(crate) fn build_request<'a>(&'a self, text: &'a str) -> SearchRequest<'a> {
        SearchRequest {
            query: SearchQuery {
                top_k: self.settings.params.top_k,
                inputs: SearchInputs { text },
            },
            rerank: self.settings.params.rerank.as_ref(),
        }
    }
}

#[async_trait]
impl VectorStore for PineconeClient {
    async fn query(&self, text: &str) -> Result<RetrievalResult, RetrievalError> {
        let host = self.index_host().await?;
        let url = endpoint_url(host, &["records", "namespaces", self.namespace(), "search"])?;

        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.settings.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| retrieval_transport_error(e, self.timeout_ms()))?;

        let response = self.check_status(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| retrieval_transport_error(e, self.timeout_ms()))?;

        let result = parse_search_response(&body, self.settings.params.result_limit())?;
        debug!(matches = result.len(), "index query complete");
        Ok(result)
    }
}

/// Decode a search response into ranked matches
pub(crate) fn parse_search_response(
    body: &str,
    limit: usize,
) -> Result<RetrievalResult, RetrievalError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| RetrievalError::InvalidResponse(e.to_string()))?;

    let matches = response
        .result
        .hits
        .into_iter()
        .map(|hit| Match {
            id: hit.id,
            score: hit.score,
            metadata: flatten_fields(hit.fields),
        })
        .collect();

    Ok(RetrievalResult::ranked(matches, limit))
}

/// Render record fields as plain strings; nulls are dropped
fn flatten_fields(fields: Map<String, Value>) -> BTreeMap<String, String> {
    fields
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

/// Append path segments to a base URL, percent-encoding each one
fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, RetrievalError> {
    let mut url = Url::parse(base)
        .map_err(|e| RetrievalError::Config(format!("Invalid index URL '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| RetrievalError::Config(format!("Index URL '{}' cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Records search request body
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    query: SearchQuery<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rerank: Option<&'a RerankSpec>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    top_k: usize,
    inputs: SearchInputs<'a>,
}

#[derive(Debug, Serialize)]
struct SearchInputs<'a> {
    text: &'a str,
}

/// Records search response body
#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResultBody,
}

#[derive(Debug, Deserialize)]
struct SearchResultBody {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: f32,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Control-plane index description (only the host is used)
#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}
