//! Thin HTTP client for the Ikigai endpoints, for use by front-ends and
//! scripts. Every request carries the bearer token kept in local storage.

pub mod token;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::models::ikigai::IkigaiData;
use crate::store::UpsertOutcome;

pub use token::{FileTokenStore, TokenSource};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token storage error: {0}")]
    Token(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct SaveBody<'a> {
    email: &'a str,
    #[serde(flatten)]
    data: &'a IkigaiData,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SavedIkigai {
    pub email: String,
    #[serde(flatten)]
    pub data: IkigaiData,
    pub outcome: UpsertOutcome,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: format!("{}/api", base_url.trim_end_matches('/')),
            tokens,
        })
    }

    /// Adds `Authorization: Bearer` when a token is stored.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        Ok(match self.tokens.token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        error!("API request failed ({status}): {message}");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// GET /api/ikigai/:email. A user without an entry gets an empty one.
    pub async fn get_ikigai(&self, email: &str) -> Result<IkigaiData, ClientError> {
        let url = format!("{}/ikigai/{}", self.base_url, email);
        debug!("Fetching ikigai for {email}");
        self.send(self.client.get(url)).await
    }

    /// POST /api/ikigai. Creates or replaces the entry for `email`.
    pub async fn save_ikigai(&self, email: &str, data: &IkigaiData) -> Result<SavedIkigai, ClientError> {
        let url = format!("{}/ikigai", self.base_url);
        self.send(self.client.post(url).json(&SaveBody { email, data }))
            .await
    }

    /// DELETE /api/ikigai/:email
    pub async fn delete_ikigai(&self, email: &str) -> Result<(), ClientError> {
        let url = format!("{}/ikigai/{}", self.base_url, email);
        let response = self.authorized(self.client.delete(url))?.send().await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            status => Err(ClientError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
