//! Async HTTP request executor with call-scoped transports.

use std::future::Future;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::auth::AuthStrategy;
use super::error::ExternalRequestError;
use super::response::json_response;

/// Delay between connect retry attempts in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// HTTP methods supported for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for an [`HttpClient`], immutable after construction.
pub struct ClientConfig {
    /// Prefix for every request path. Empty means callers pass absolute URLs.
    pub base_url: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Auth strategy applied to every request from this client.
    pub auth: Option<Arc<dyn AuthStrategy>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            verify: true,
            auth: None,
        }
    }
}

/// Per-call request options, created for one call and discarded after it.
pub struct RequestOptions {
    /// JSON body to send.
    pub json: Option<Value>,
    /// Query parameters appended to the URL.
    pub params: Vec<(String, String)>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection-establishment retries performed by the transport.
    pub retries: usize,
    /// Extra headers passed through verbatim.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            json: None,
            params: Vec::new(),
            timeout: Duration::from_secs(5),
            retries: 0,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Counts transport acquisitions and releases per client, for tests.
#[cfg(test)]
#[derive(Default)]
struct TransportStats {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// A transport scoped to one call; dropping it releases the transport.
struct ScopedTransport {
    client: Client,
    #[cfg(test)]
    stats: Arc<TransportStats>,
}

impl Drop for ScopedTransport {
    fn drop(&mut self) {
        #[cfg(test)]
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Async HTTP client issuing requests against a base URL.
///
/// Application-specific clients hold an `HttpClient` and expose typed
/// endpoint methods delegating to [`request_json`](HttpClient::request_json),
/// [`request_raw`](HttpClient::request_raw) or
/// [`request_with`](HttpClient::request_with).
pub struct HttpClient {
    config: ClientConfig,
    #[cfg(test)]
    stats: Arc<TransportStats>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            #[cfg(test)]
            stats: Arc::default(),
        }
    }

    /// Issues a request and parses the response as JSON (default parser).
    #[tracing::instrument(skip(self, opts))]
    pub async fn request_json(
        &self,
        method: HttpMethod,
        path: &str,
        opts: RequestOptions,
    ) -> Result<Value, ExternalRequestError> {
        let response = self.send(method, path, &opts).await?;
        json_response(response).await
    }

    /// Issues a request and returns the raw response without any parsing.
    #[tracing::instrument(skip(self, opts))]
    pub async fn request_raw(
        &self,
        method: HttpMethod,
        path: &str,
        opts: RequestOptions,
    ) -> Result<Response, ExternalRequestError> {
        self.send(method, path, &opts).await
    }

    /// Issues a request and hands the raw response to a caller-supplied
    /// parser.
    pub async fn request_with<T, F, Fut>(
        &self,
        method: HttpMethod,
        path: &str,
        opts: RequestOptions,
        parser: F,
    ) -> Result<T, ExternalRequestError>
    where
        F: FnOnce(Response) -> Fut,
        Fut: Future<Output = Result<T, ExternalRequestError>>,
    {
        let response = self.send(method, path, &opts).await?;
        parser(response).await
    }

    /// Performs one call with a transport scoped strictly to that call.
    ///
    /// The transport is built with the call's timeout and the client's
    /// TLS-verification flag, and is dropped on every exit path, including
    /// cancellation of the returned future.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<Response, ExternalRequestError> {
        let transport = self.acquire_transport(opts)?;

        let url = format!("{}{}", self.config.base_url, path);

        debug!("Sending {} request to {}...", method, url);

        with_connect_retry(&url, opts.retries, || {
            self.build_request(&transport.client, method, &url, opts)
                .send()
        })
        .await
    }

    fn acquire_transport(
        &self,
        opts: &RequestOptions,
    ) -> Result<ScopedTransport, ExternalRequestError> {
        // Redirects are surfaced to the parser, not followed.
        let client = Client::builder()
            .timeout(opts.timeout)
            .danger_accept_invalid_certs(!self.config.verify)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(ExternalRequestError::transport)?;

        #[cfg(test)]
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);

        Ok(ScopedTransport {
            client,
            #[cfg(test)]
            stats: Arc::clone(&self.stats),
        })
    }

    fn build_request(
        &self,
        transport: &Client,
        method: HttpMethod,
        url: &str,
        opts: &RequestOptions,
    ) -> RequestBuilder {
        let mut request = transport.request(method.as_reqwest(), url);
        if let Some(json) = &opts.json {
            request = request.json(json);
        }
        if !opts.params.is_empty() {
            request = request.query(&opts.params);
        }
        for (key, value) in &opts.headers {
            request = request.header(key, value);
        }
        if let Some(auth) = &self.config.auth {
            request = auth.apply(request);
        }
        request
    }
}

/// Runs a send operation, retrying connection-establishment failures.
///
/// Only `is_connect` errors are retried; timeouts, read errors and received
/// responses (whatever their status) are surfaced immediately.
async fn with_connect_retry<F, Fut>(
    url: &str,
    retries: usize,
    send: F,
) -> Result<Response, ExternalRequestError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        match send().await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_connect() && attempt < retries => {
                attempt += 1;
                warn!(
                    "Connect attempt {}/{} to {} failed ({}), retrying...",
                    attempt, retries, url, e
                );
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            }
            Err(e) => return Err(ExternalRequestError::transport(e)),
        }
    }
}
