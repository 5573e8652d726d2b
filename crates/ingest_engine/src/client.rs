use ingest_core::{descriptor, JobKind, KnowledgeBaseSnapshot, StartResponse, StatusPayload};
use serde::de::DeserializeOwned;

use crate::{ClientError, FailureKind, MonitorSettings};

/// The three backend calls the monitor needs. One request per call, no retries.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn start(&self, kind: JobKind) -> Result<StartResponse, ClientError>;

    async fn status(&self, kind: JobKind) -> Result<StatusPayload, ClientError>;

    async fn snapshot(&self) -> Result<KnowledgeBaseSnapshot, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    client: reqwest::Client,
    base_url: String,
    snapshot_path: String,
}

impl ReqwestJobClient {
    pub fn new(settings: &MonitorSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        // Fail on a bad base URL now rather than on the first click.
        reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            snapshot_path: settings.snapshot_path.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&joined)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn start(&self, kind: JobKind) -> Result<StartResponse, ClientError> {
        let url = self.url(descriptor(kind).start_path)?;
        self.send_json(self.client.post(url)).await
    }

    async fn status(&self, kind: JobKind) -> Result<StatusPayload, ClientError> {
        let url = self.url(descriptor(kind).status_path)?;
        self.send_json(self.client.get(url)).await
    }

    async fn snapshot(&self) -> Result<KnowledgeBaseSnapshot, ClientError> {
        let url = self.url(&self.snapshot_path)?;
        self.send_json(self.client.get(url)).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::MalformedBody, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
