//! Single outbound HTTP gateway.
//!
//! Every backend call goes through [`ApiClient`]. Authenticated calls
//! re-read the stored token and attach it as a bearer header; unauthorized
//! responses tear the session down (clear token, broadcast session-changed)
//! and surface at most one sign-in notice per cooldown window, so a burst
//! of concurrent 401s produces a single notice.
//!
//! Login and registration use the raw path: no token attach and no
//! teardown, since a failed login must not rip out an unrelated session.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::events::{EventHub, Notice};
use crate::storage::TokenStore;

/// View authenticated frontends send the user to after session teardown.
const SIGN_IN_REDIRECT: &str = "/signin";

/// Gateway to the REST backend.
///
/// Cheaply cloneable; all clones share the connection pool, the token
/// store, and the notice cooldown state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    api_root: String,
    tokens: TokenStore,
    events: Arc<EventHub>,
    auth_notice_cooldown: Duration,
    last_auth_notice: Mutex<Option<Instant>>,
}

impl ApiClient {
    /// Build the gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(
        config: &ClientConfig,
        tokens: TokenStore,
        events: Arc<EventHub>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                api_root: config.api_root(),
                tokens,
                events,
                auth_notice_cooldown: config.auth_notice_cooldown,
                last_auth_notice: Mutex::new(None),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.api_root)
    }

    // =========================================================================
    // Authenticated calls
    // =========================================================================

    /// GET a JSON payload.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.inner.http.get(self.endpoint(path))).await?;
        Self::decode(response).await
    }

    /// GET a binary payload, returning the bytes and the content type.
    pub async fn get_bytes(&self, path: &str) -> ApiResult<(Bytes, Option<String>)> {
        let response = self.send(self.inner.http.get(self.endpoint(path))).await?;

        // The backend sets a literal `ContentType` header on image
        // responses instead of the standard one; accept either.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .or_else(|| response.headers().get("ContentType"))
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await?;
        Ok((bytes, content_type))
    }

    /// POST a multipart form, decoding the JSON response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ApiResult<T> {
        let response = self
            .send(self.inner.http.post(self.endpoint(path)).multipart(form))
            .await?;
        Self::decode(response).await
    }

    /// PUT a multipart form, decoding the JSON response.
    pub async fn put_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        let response = self
            .send(self.inner.http.put(self.endpoint(path)).multipart(form))
            .await?;
        Self::decode(response).await
    }

    /// DELETE a resource, ignoring the response body.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.inner.http.delete(self.endpoint(path)))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Raw calls (no token, no teardown)
    // =========================================================================

    /// POST a JSON body outside the authenticated path, returning the
    /// response body as text. Used by login and registration, where a 401
    /// means "wrong credentials", not "tear down the session".
    pub async fn post_json_raw(&self, path: &str, body: &impl Serialize) -> ApiResult<String> {
        let response = self
            .inner
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            return Ok(text);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth);
        }
        Err(ApiError::from_status(status.as_u16(), text))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        // Token is read fresh per request so another process's login or
        // logout takes effect without restarting.
        let request = match self.inner.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Auth);
        }
        Err(ApiError::from_status(status.as_u16(), body))
    }

    /// Session teardown after a 401: clear the token (broadcasting the
    /// session change) and surface at most one sign-in notice per cooldown
    /// window.
    fn handle_unauthorized(&self) {
        if self.inner.tokens.is_present()
            && let Err(e) = self.inner.tokens.clear()
        {
            tracing::warn!(error = %e, "Failed to clear rejected token");
        }

        let mut last = self
            .inner
            .last_auth_notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if cooldown_elapsed(*last, Instant::now(), self.inner.auth_notice_cooldown) {
            *last = Some(Instant::now());
            self.inner.events.notify(Notice::SignInRequired {
                redirect: SIGN_IN_REDIRECT,
            });
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Whether enough time has passed since the last notice to show another.
fn cooldown_elapsed(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    last.is_none_or(|t| now.duration_since(t) >= cooldown)
}
