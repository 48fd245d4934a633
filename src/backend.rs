//! Connection to the sanatorium REST API.

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

/// Default API root when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// HTTP client bound to the API root. Carries no credentials of its own;
/// see [`crate::session::SessionStore::authorize`].
#[derive(Clone, Debug)]
pub struct Backend {
    http: reqwest::Client,
    api_base: String,
}

impl Backend {
    pub fn new(api_base: &Url) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(http: reqwest::Client, api_base: &Url) -> Self {
        Self {
            http,
            api_base: api_base.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL for a path relative to the API root, e.g. `users/7`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Read the backend's `{ "message": ... }` error body, if any.
pub(crate) async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}
