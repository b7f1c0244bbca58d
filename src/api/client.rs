//! Resilient Graph API client
//!
//! All engine traffic goes through [`GraphClient`]: a thin transport seam
//! (`GraphTransport`) wrapped with the retry policy and the client-side rate
//! limiter. The production transport speaks JSON-over-HTTPS with form-encoded
//! writes; tests substitute an in-process transport.

use super::constants::{self, STATUS_PAUSED};
use super::error::RemoteError;
use super::resilience::{RateLimiter, ResilienceConfig, RetryPolicy};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// HTTP method of a Graph request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request against the Graph API: a versioned path plus key/value params.
/// GET params become the query string; POST params are form-encoded.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl GraphRequest {
    pub fn get(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            params,
        }
    }

    pub fn post(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            params,
        }
    }

    /// Value of a param, if present (used by tests and logging)
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport seam between the engine and the wire. Exactly one method: issue
/// a single request, classify the outcome. Retries and rate limiting live
/// above this seam.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    async fn execute(&self, request: &GraphRequest) -> Result<Value, RemoteError>;
}

/// Production transport backed by a pooled reqwest client
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpTransport {
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, constants::GRAPH_BASE_URL.to_string())
    }

    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adclone/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url,
            access_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", constants::api_base(&self.base_url), path)
    }
}

#[async_trait]
impl GraphTransport for HttpTransport {
    async fn execute(&self, request: &GraphRequest) -> Result<Value, RemoteError> {
        let url = self.url(&request.path);

        let response = match request.method {
            Method::Get => {
                self.http_client
                    .get(&url)
                    .bearer_auth(&self.access_token)
                    .header("Accept", "application/json")
                    .query(&request.params)
                    .send()
                    .await
            }
            Method::Post => {
                self.http_client
                    .post(&url)
                    .bearer_auth(&self.access_token)
                    .form(&request.params)
                    .send()
                    .await
            }
        };

        let response = response.map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(json) => json,
            Err(_) if (200..300).contains(&status) && text.is_empty() => Value::Null,
            Err(_) => {
                return Err(RemoteError::Object {
                    code: 0,
                    status: Some(status),
                    message: format!("non-JSON response: {}", text),
                });
            }
        };

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(RemoteError::from_graph_payload(status, &body))
        }
    }
}

/// Graph API client combining transport, retry policy and rate limiter.
///
/// Cheap to clone; clones share the transport and limiter. Each destination
/// account's pipeline holds its own client instance so throttling backoff in
/// one account never stalls another (the platform scopes limits per token /
/// per account).
#[derive(Clone)]
pub struct GraphClient {
    transport: Arc<dyn GraphTransport>,
    retry_policy: RetryPolicy,
    rate_limiter: RateLimiter,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::new(access_token)),
            &ResilienceConfig::default(),
        )
    }

    pub fn with_resilience(access_token: String, resilience: &ResilienceConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(access_token)), resilience)
    }

    /// Build a client over any transport (tests use an in-process one)
    pub fn with_transport(transport: Arc<dyn GraphTransport>, resilience: &ResilienceConfig) -> Self {
        Self {
            transport,
            retry_policy: RetryPolicy::new(resilience.retry.clone()),
            rate_limiter: RateLimiter::new(resilience.rate_limit.clone()),
        }
    }

    /// A fresh client over the same transport with its own rate limiter,
    /// for per-account pipelines.
    pub fn isolated(&self, resilience: &ResilienceConfig) -> Self {
        Self::with_transport(self.transport.clone(), resilience)
    }

    /// Issue a request with rate limiting and rate-limit retries applied
    pub async fn call(&self, request: GraphRequest) -> Result<Value, RemoteError> {
        self.retry_policy
            .execute(|| async {
                self.rate_limiter.acquire().await;
                self.transport.execute(&request).await
            })
            .await
    }

    /// Field-projected read of a single object
    pub async fn get_object(&self, id: &str, fields: &str) -> Result<Value, RemoteError> {
        self.call(GraphRequest::get(
            constants::object_path(id),
            vec![("fields".to_string(), fields.to_string())],
        ))
        .await
    }

    /// Read an object's edge, following pagination cursors, returning the
    /// flattened `data` array.
    pub async fn get_edge(
        &self,
        object_id: &str,
        edge: &str,
        fields: &str,
    ) -> Result<Vec<Value>, RemoteError> {
        let path = constants::edge_path(object_id, edge);
        let mut results = Vec::new();
        let mut after: Option<String> = None;

        // Hard page cap so a misbehaving paging cursor cannot loop forever
        for _ in 0..100 {
            let mut params = vec![
                ("fields".to_string(), fields.to_string()),
                ("limit".to_string(), "100".to_string()),
            ];
            if let Some(cursor) = &after {
                params.push(("after".to_string(), cursor.clone()));
            }

            let page = self.call(GraphRequest::get(path.clone(), params)).await?;

            if let Some(data) = page["data"].as_array() {
                results.extend(data.iter().cloned());
            }

            let next_cursor = page["paging"]["cursors"]["after"].as_str();
            let has_next = page["paging"]["next"].as_str().is_some();
            match (has_next, next_cursor) {
                (true, Some(cursor)) if Some(cursor) != after.as_deref() => {
                    after = Some(cursor.to_string());
                }
                _ => break,
            }
        }

        Ok(results)
    }

    /// Create a remote object via form-encoded POST.
    ///
    /// Delivery-bearing objects (campaigns, ad sets, ads, deep copies) are
    /// always created paused; the caller cannot override this.
    pub async fn create(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<Value, RemoteError> {
        let params = enforce_paused(path, params);
        let correlation_id = uuid::Uuid::new_v4();
        debug!("create {} [{}]", path, correlation_id);

        let result = self.call(GraphRequest::post(path, params)).await;
        if let Err(e) = &result {
            warn!("create {} [{}] failed: {}", path, correlation_id, e);
        }
        result
    }
}

/// Force the paused delivery state onto create params for objects that can
/// spend. Creatives carry no delivery status and pass through untouched.
pub(crate) fn enforce_paused(
    path: &str,
    mut params: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let status_key = if path.ends_with("/copies") {
        "status_option"
    } else if path.ends_with("/campaigns") || path.ends_with("/adsets") || path.ends_with("/ads") {
        "status"
    } else {
        return params;
    };

    match params.iter_mut().find(|(k, _)| k == status_key) {
        Some((_, value)) => *value = STATUS_PAUSED.to_string(),
        None => params.push((status_key.to_string(), STATUS_PAUSED.to_string())),
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce_paused_overrides_active_status() {
        let params = vec![
            ("name".to_string(), "Summer Sale".to_string()),
            ("status".to_string(), "ACTIVE".to_string()),
        ];
        let params = enforce_paused("/act_1/campaigns", params);
        assert_eq!(
            params.iter().find(|(k, _)| k == "status").map(|(_, v)| v.as_str()),
            Some("PAUSED")
        );
    }

    #[test]
    fn test_enforce_paused_inserts_missing_status() {
        for path in ["/act_1/campaigns", "/act_1/adsets", "/act_1/ads"] {
            let params = enforce_paused(path, vec![("name".to_string(), "x".to_string())]);
            assert_eq!(
                params.iter().find(|(k, _)| k == "status").map(|(_, v)| v.as_str()),
                Some("PAUSED"),
                "missing status must be inserted for {}",
                path
            );
        }
    }

    #[test]
    fn test_enforce_paused_uses_status_option_for_copies() {
        let params = enforce_paused("/123/copies", vec![]);
        assert_eq!(
            params
                .iter()
                .find(|(k, _)| k == "status_option")
                .map(|(_, v)| v.as_str()),
            Some("PAUSED")
        );
    }

    #[test]
    fn test_enforce_paused_leaves_creatives_alone() {
        let params = enforce_paused("/act_1/adcreatives", vec![("name".to_string(), "c".to_string())]);
        assert!(params.iter().all(|(k, _)| k != "status"));
    }
}
