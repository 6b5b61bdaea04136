//! Authenticated HTTP client with retry and pagination.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, LINK};
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::sleep;
use tracing::{debug, instrument, trace, warn};

use crate::auth::{Credentials, TokenManager};
use crate::error::{AuthError, InvalidRequestError, ProtocolError, TransientError};
use crate::types::ServerUrl;

use super::config::ClientConfig;

/// Statuses that earn a backoff retry.
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Authenticated client for the classification service.
///
/// One `ApiClient` owns the HTTP connection pool, the token manager, and the
/// retry policy shared by every resource wrapper. Requests carry a bearer
/// token; a 401 triggers one token renewal and one retry, and 429/5xx
/// responses are retried with exponential backoff up to the configured bound.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use an internal `Arc`) and safe to share
/// across tasks. Token renewal is serialized internally.
///
/// # Example
///
/// ```no_run
/// use sortera::{ApiClient, Credentials};
///
/// let creds = Credentials::new("client-id", "client-secret");
/// let client = ApiClient::new(creds);
/// ```
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    server_url: ServerUrl,
    tokens: TokenManager,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client with the default configuration.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with a custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sortera/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");

        let server_url = credentials.server_url().clone();
        let tokens = TokenManager::new(credentials, http.clone(), config.clone());

        Self {
            inner: Arc::new(ClientInner {
                http,
                server_url,
                tokens,
                config,
            }),
        }
    }

    /// Returns the server URL this client talks to.
    pub fn server_url(&self) -> &ServerUrl {
        &self.inner.server_url
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// GET a JSON resource.
    #[instrument(skip(self), fields(server = %self.inner.server_url))]
    pub async fn get<R>(&self, path: &str) -> crate::Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        Self::parse_json(response).await
    }

    /// POST a JSON body and parse the response.
    #[instrument(skip(self, body), fields(server = %self.inner.server_url))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> crate::Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Self::parse_json(response).await
    }

    /// PUT a JSON body and parse the response.
    #[instrument(skip(self, body), fields(server = %self.inner.server_url))]
    pub async fn put<B, R>(&self, path: &str, body: &B) -> crate::Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Self::parse_json(response).await
    }

    /// PUT a JSON body, discarding any response body.
    #[instrument(skip(self, body), fields(server = %self.inner.server_url))]
    pub async fn put_no_response<B>(&self, path: &str, body: &B) -> crate::Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    /// DELETE a resource, discarding any response body.
    #[instrument(skip(self), fields(server = %self.inner.server_url))]
    pub async fn delete(&self, path: &str) -> crate::Result<()> {
        self.execute::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// GET every page of a list endpoint, following `Link: rel="next"`
    /// headers, and return the concatenated items in server order.
    ///
    /// Stops on an empty page or a page without a next link, whichever comes
    /// first; server-reported totals are never consulted. An error on any
    /// page discards the accumulated prefix.
    #[instrument(skip(self), fields(server = %self.inner.server_url))]
    pub async fn get_all<R>(&self, path: &str) -> crate::Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());
        let mut pages: u32 = 0;

        while let Some(page_path) = next {
            let response = self.execute::<()>(Method::GET, &page_path, None).await?;
            next = next_link(response.headers());
            let page: Vec<R> = Self::parse_json(response).await?;
            pages += 1;

            trace!(pages, page_len = page.len(), "fetched page");

            if page.is_empty() {
                break;
            }
            items.extend(page);
        }

        debug!(pages, total = items.len(), "listing complete");
        Ok(items)
    }

    /// One authenticated exchange: attach the bearer header, send, renew
    /// and retry once on 401, back off and retry on 429/5xx or network
    /// failure up to the configured bound. Returns the successful response
    /// for the caller to parse.
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> crate::Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.request_url(path);
        let mut renewed = false;
        let mut attempt: u32 = 0;

        loop {
            let auth = self.inner.tokens.authorization_header().await?;
            let mut request = self
                .inner
                .http
                .request(method.clone(), &url)
                .header(AUTHORIZATION, auth);
            if let Some(body) = body {
                request = request.json(body);
            }

            trace!(%method, %url, attempt, "sending request");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        if renewed {
                            return Err(AuthError::TokenRejected.into());
                        }
                        debug!(%url, "401 response, renewing token");
                        self.inner.tokens.force_renew().await?;
                        renewed = true;
                        continue;
                    }

                    if !is_retryable_status(status) {
                        let body = response.text().await.unwrap_or_default();
                        return Err(InvalidRequestError::new(status.as_u16(), body).into());
                    }

                    if attempt >= self.inner.config.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(TransientError::RetriesExhausted {
                            status: status.as_u16(),
                            attempts: attempt + 1,
                            body,
                        }
                        .into());
                    }
                    warn!(status = %status, attempt, %url, "retryable response, backing off");
                }
                Err(err) => {
                    if attempt >= self.inner.config.max_retries {
                        return Err(TransientError::Network(err).into());
                    }
                    warn!(error = %err, attempt, %url, "request failed, backing off");
                }
            }

            sleep(self.inner.config.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Resolve a path against the server URL. Pagination next-links may
    /// already be absolute.
    fn request_url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            self.inner.server_url.url_for(path)
        }
    }

    /// Parse a successful response's JSON body.
    async fn parse_json<R: DeserializeOwned>(response: reqwest::Response) -> crate::Result<R> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(TransientError::Network)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::new(status, e.to_string()).into())
    }
}

/// Extract the `rel="next"` target from a `Link` header, if any.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(LINK)?.to_str().ok()?;
    for part in header.split(',') {
        let mut sections = part.split(';');
        let target = match sections.next() {
            Some(target) => target.trim(),
            None => continue,
        };
        let is_next = sections
            .map(str::trim)
            .any(|param| param == "rel=\"next\"" || param == "rel=next");
        if is_next {
            return Some(
                target
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string(),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn client_creation() {
        let creds = Credentials::new("id", "secret");
        let client = ApiClient::new(creds);
        assert_eq!(client.server_url().as_str(), "https://www.sortera.dev");
    }

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let creds = Credentials::with_server_url("id", "secret", "http://localhost:5000").unwrap();
        let client = ApiClient::new(creds);
        assert_eq!(
            client.request_url("v1/functions"),
            "http://localhost:5000/v1/functions"
        );
        assert_eq!(
            client.request_url("http://localhost:5000/v1/functions?batchSize=2"),
            "http://localhost:5000/v1/functions?batchSize=2"
        );
    }

    #[test]
    fn next_link_present() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "</v1/functions/abc/samples?batchSize=2&offset=2>; rel=\"next\"",
            ),
        );
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("/v1/functions/abc/samples?batchSize=2&offset=2")
        );
    }

    #[test]
    fn next_link_among_multiple_relations() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static("</first>; rel=\"first\", </page3>; rel=\"next\""),
        );
        assert_eq!(next_link(&headers).as_deref(), Some("/page3"));
    }

    #[test]
    fn next_link_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_static("</first>; rel=\"first\""));
        assert_eq!(next_link(&headers), None);
        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
    }
}
