//! iFinD quant API client implementation.

use crate::{
    Result,
    error::IfindError,
    types::{DateSequenceBody, DateSequenceResponse, TokenResponse},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::env;
use std::time::Duration;
use tracing::{debug, info};
use vantage_traits::{DataRequest, MarketDataProvider, RawBatch};

/// Base URL for the iFinD quant HTTP API.
const IFIND_BASE_URL: &str = "https://quantapi.51ifind.com/api/v1";

/// Environment variable holding the refresh token.
pub const REFRESH_TOKEN_VAR: &str = "IFIND_REFRESH_TOKEN";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Logged-in iFinD session.
///
/// Holds a short-lived access token obtained from a refresh token. Every
/// [`MarketDataProvider::fetch`] is one `date_sequence` round trip; nothing
/// is retried.
#[derive(Debug, Clone)]
pub struct IfindClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl IfindClient {
    /// Create a client around an access token that was obtained elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_access_token(access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            access_token: access_token.into(),
            base_url: IFIND_BASE_URL.to_string(),
        })
    }

    /// Exchange a refresh token for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no token comes back.
    pub async fn login(refresh_token: &str, timeout: Duration) -> Result<Self> {
        Self::login_at(IFIND_BASE_URL, refresh_token, timeout).await
    }

    /// Log in with the refresh token from `IFIND_REFRESH_TOKEN`.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or login fails.
    pub async fn from_env(timeout: Duration) -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let refresh_token =
            env::var(REFRESH_TOKEN_VAR).map_err(|_| IfindError::MissingRefreshToken)?;

        Self::login(&refresh_token, timeout).await
    }

    async fn login_at(base_url: &str, refresh_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let response = client
            .post(format!("{base_url}/get_access_token"))
            .header("Content-Type", "application/json")
            .header("refresh_token", refresh_token)
            .send()
            .await?;
        let token: TokenResponse = parse_response(response).await?;

        if token.errorcode != 0 {
            return Err(IfindError::Api {
                code: token.errorcode,
                message: token.errmsg,
            });
        }
        let access_token = token
            .data
            .map(|d| d.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IfindError::Login("no access token in response".to_string()))?;

        info!("iFinD session established");
        Ok(Self {
            client,
            access_token,
            base_url: base_url.to_string(),
        })
    }

    /// Point the client at another API root, such as a proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build an endpoint URL.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }

    /// Make an authenticated POST request and parse the JSON response.
    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header("access_token", &self.access_token)
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }

    /// Fetch a date sequence for one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports an error.
    pub async fn date_sequence(&self, request: &DataRequest) -> Result<DateSequenceResponse> {
        let body = DateSequenceBody::from_request(request);
        debug!(
            code = %body.codes,
            indicators = body.indipara.len(),
            start = %body.startdate,
            end = %body.enddate,
            "requesting date sequence"
        );
        let response: DateSequenceResponse = self.post("date_sequence", &body).await?;
        response.check()
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(IfindError::Api {
            code: i64::from(status.as_u16()),
            message: text,
        });
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl MarketDataProvider for IfindClient {
    fn name(&self) -> &str {
        "ifind"
    }

    async fn fetch(&self, request: &DataRequest) -> vantage_traits::Result<RawBatch> {
        let response = self.date_sequence(request).await?;
        let batch = response.into_raw_batch(request)?;
        info!(code = %request.code, rows = batch.len(), "fetched iFinD batch");
        Ok(batch)
    }
}
