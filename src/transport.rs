//! HTTP transport backed by reqwest

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{MuninnError, Result};
use crate::traits::{Transport, WireRequest, WireResponse};
use crate::types::Method;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// [`Transport`] implementation over a shared reqwest client.
///
/// Single attempt per dispatch, no transparent caching. The resolution
/// engine already sends `Cache-Control: no-cache` by default; beyond
/// that, this client performs no response caching of its own, so the
/// engine's disk cache is the only cache in play.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }

    /// Wrap an existing client, sharing its connection pool.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: WireRequest) -> Result<WireResponse> {
        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect::<BTreeMap<_, _>>();
        let body = response
            .bytes()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?
            .to_vec();

        Ok(WireResponse {
            status,
            headers,
            body,
            url,
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    }
}
