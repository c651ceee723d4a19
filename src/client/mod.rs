//! HTTP client for the avatar query, command, and subscription surfaces.
//!
//! Configuration is via environment variables:
//! - `CORTEX_TREE_URL` - Default avatar URL (default: `http://localhost:8001/cortex`)
//! - `CORTEX_TREE_API_KEY` - API key for authentication (optional for local)

mod query_url;

pub use query_url::{DeepLink, QueryUrl};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    Neuron, NeuronQuery, QueryResult, ReceiverInfo, ServerConfiguration, SubscriptionInfo,
};
use crate::subscriptions::SubscriptionSurface;
use crate::sync::{NeuronCommands, NeuronSource};

/// Default avatar for local development.
const DEFAULT_URL: &str = "http://localhost:8001/cortex";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for an avatar service.
///
/// The avatar URL is passed per call rather than held by the client so a single
/// client can serve several collections, matching the query surface contract.
#[derive(Debug, Clone)]
pub struct NeuronClient {
    api_key: Option<String>,
    client: Client,
}

impl NeuronClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let api_key = std::env::var("CORTEX_TREE_API_KEY").ok();
        Self::new(api_key)
    }

    /// Create with explicit configuration.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }

    /// Default avatar URL from the environment.
    pub fn default_avatar_url() -> String {
        std::env::var("CORTEX_TREE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string())
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, avatar_url: &str, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", avatar_url.trim_end_matches('/'), path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Handle response that may return empty body (204 No Content).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Build the query string for a neuron filter.
    fn query_params(query: &NeuronQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![];
        for id in &query.ids {
            params.push(("id", id.clone()));
        }
        if let Some(ref region_id) = query.region_id {
            params.push(("regionid", region_id.clone()));
        }
        for id in &query.postsynaptic {
            params.push(("postsynaptic", id.clone()));
        }
        params
    }
}

impl NeuronSource for NeuronClient {
    /// Get the current ordered neuron sequence for an avatar.
    async fn get_ordered_neurons(
        &self,
        avatar_url: &str,
        external: bool,
    ) -> Result<Vec<Neuron>, ClientError> {
        let mut req = self.request(reqwest::Method::GET, avatar_url, "/neurons");
        if external {
            req = req.query(&[("external", "true")]);
        }
        let response = req.send().await?;
        let result: QueryResult = self.handle_response(response).await?;
        Ok(result.items)
    }

    /// Get a neuron by id; the filter selects which relatives come with it.
    async fn get_neuron_by_id(
        &self,
        avatar_url: &str,
        id: &str,
        query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, avatar_url, &format!("/neurons/{}", id))
            .query(&Self::query_params(query))
            .send()
            .await?;
        let result: QueryResult = self.handle_response(response).await?;
        Ok(result.items)
    }

    /// Get the neurons matching a filter.
    async fn get_neurons(
        &self,
        avatar_url: &str,
        query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, avatar_url, "/neurons")
            .query(&Self::query_params(query))
            .send()
            .await?;
        let result: QueryResult = self.handle_response(response).await?;
        Ok(result.items)
    }
}

impl NeuronCommands for NeuronClient {
    /// Deactivate a neuron.
    async fn deactivate_neuron(
        &self,
        avatar_url: &str,
        id: &str,
        version: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, avatar_url, &format!("/neurons/{}", id))
            .json(&serde_json::json!({ "version": version }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    /// Deactivate a terminal.
    async fn deactivate_terminal(
        &self,
        avatar_url: &str,
        id: &str,
        version: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, avatar_url, &format!("/terminals/{}", id))
            .json(&serde_json::json!({ "version": version }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    /// Create a link between two neurons.
    async fn create_link(
        &self,
        avatar_url: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, avatar_url, "/terminals")
            .json(&serde_json::json!({
                "presynapticNeuronId": source_id,
                "postsynapticNeuronId": target_id
            }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}

impl SubscriptionSurface for NeuronClient {
    /// Get the push configuration published by the avatar server.
    async fn get_server_configuration(
        &self,
        avatar_url: &str,
    ) -> Result<ServerConfiguration, ClientError> {
        let response = self
            .request(reqwest::Method::GET, avatar_url, "/subscriptions/configuration")
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Register a subscription receiver for an avatar.
    async fn subscribe(
        &self,
        avatar_url: &str,
        info: &SubscriptionInfo,
        receiver: &ReceiverInfo,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, avatar_url, "/subscriptions")
            .json(&serde_json::json!({
                "subscriptionInfo": info,
                "receiverInfo": receiver
            }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
