use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{DispatchError, TransportError};

const USER_AGENT: &str = concat!("commander/", env!("CARGO_PKG_VERSION"));

/// Status and body of a worker response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The two requests the dispatcher makes to a worker.
///
/// Implementations are shared read-only by all worker tasks.
#[async_trait]
pub trait WorkerTransport: Send + Sync {
    /// Send the start request carrying the opaque run payload.
    async fn post(&self, url: &Url, payload: &[u8]) -> Result<RawResponse, TransportError>;

    /// Fetch a run's result.
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError>;
}

/// Transport backed by a single shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpWorkerTransport {
    client: reqwest::Client,
}

impl HttpWorkerTransport {
    /// Build the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend or client cannot be initialised.
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|source| DispatchError::BuildClient { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WorkerTransport for HttpWorkerTransport {
    async fn post(&self, url: &Url, payload: &[u8]) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .body(payload.to_vec())
            .send()
            .await?;
        read_response(response).await
    }

    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(RawResponse { status, body })
}
