// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration, authentication, and HTTP transport layer.
//!
//! [`MetadataClient`] owns the base URL, HTTP client, credentials and timeout.
//! The metadata endpoints used by autocomplete are defined as an
//! `impl MetadataClient` block in [`crate::metadata`].

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{ClusterInfo, ErrorResponse};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Authentication method for connecting to a cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Auth {
    /// No authentication (local development, trusted networks).
    #[default]
    None,
    /// API key passed via the `Authorization: ApiKey <key>` header.
    ApiKey(String),
    /// Bearer token passed via the `Authorization: Bearer <token>` header.
    Bearer(String),
    /// HTTP Basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

// ---------------------------------------------------------------------------
// MetadataClient
// ---------------------------------------------------------------------------

/// HTTP client for index, mapping and value-sampling requests.
///
/// # Examples
///
/// ```rust,no_run
/// use ppl_metadata_client::client::MetadataClient;
///
/// # #[tokio::main]
/// # async fn main() -> ppl_metadata_client::error::Result<()> {
/// let client = MetadataClient::new("http://localhost:9200")?;
/// for entry in client.list_indices().await? {
///     println!("{}", entry.index);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MetadataClient {
    /// Parsed base URL of the cluster (e.g. `http://localhost:9200`).
    base_url: Url,
    /// Underlying `reqwest` HTTP client (connection-pooled, TLS-capable).
    http: reqwest::Client,
    auth: Auth,
    timeout: Duration,
    value_sample_size: usize,
}

impl MetadataClient {
    // -- Constructors -------------------------------------------------------

    /// Create an unauthenticated client pointing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if `base_url` cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    /// Create a client that authenticates with an API key.
    pub fn with_api_key(base_url: &str, key: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_auth(Auth::ApiKey(key.to_owned())))
    }

    /// Create a client that authenticates via a bearer token.
    pub fn with_bearer(base_url: &str, token: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_auth(Auth::Bearer(token.to_owned())))
    }

    /// Create a client that authenticates via HTTP Basic credentials.
    pub fn with_basic(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_auth(Auth::Basic {
            username: username.to_owned(),
            password: password.to_owned(),
        }))
    }

    /// Build a client from a full [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Validation(format!("Invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            base_url,
            http,
            auth: config.auth.clone(),
            timeout,
            value_sample_size: config.value_sample_size,
        })
    }

    // -- Accessors ----------------------------------------------------------

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn value_sample_size(&self) -> usize {
        self.value_sample_size
    }

    // -- Cluster ------------------------------------------------------------

    /// Returns `true` if the cluster answers its root endpoint successfully.
    pub async fn health(&self) -> Result<bool> {
        let url = self.url("/")?;
        let response = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(response.status().is_success())
    }

    /// Cluster name and version from `GET /`.
    pub async fn info(&self) -> Result<ClusterInfo> {
        self.get(self.url("/")?).await
    }

    // -- Internal HTTP helpers ----------------------------------------------

    /// Build a full URL by joining `path` onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Validation(format!("Invalid request path {path}: {e}")))
    }

    /// URL of `/{index}/{endpoint}` under the base URL. The index name is
    /// percent-encoded as a single path segment.
    pub(crate) fn index_url(&self, index: &str, endpoint: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Validation(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push(index)
            .push(endpoint);
        Ok(url)
    }

    /// Attach authentication headers to an outgoing request builder.
    pub(crate) fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => builder,
            Auth::ApiKey(key) => builder.header(AUTHORIZATION, format!("ApiKey {key}")),
            Auth::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    /// Perform a GET request and deserialize the JSON response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Perform a POST request with a JSON body and deserialize the response.
    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        debug!(url = %url, "POST");
        let response = self
            .apply_auth(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    // -- Response handling --------------------------------------------------

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ClientError::Network(err)
        }
    }

    /// Deserialize a successful response or extract an error from the body.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            serde_json::from_str(&body).map_err(ClientError::Serialization)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Turn a non-2xx response into the appropriate [`ClientError`] variant.
    async fn extract_error(&self, response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.message(),
            Err(_) => format!("HTTP {status}"),
        };

        match status {
            404 => ClientError::NotFound(message),
            401 | 403 => ClientError::Unauthorized(message),
            _ => ClientError::Server { status, message },
        }
    }
}
