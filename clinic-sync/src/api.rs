//! The server side of sync.

use crate::config::ApiConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{DataPullResponse, DataPushRequest, DataPushResponse};
use async_trait::async_trait;
use clinic_model::RecordPayload;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;

/// Push and pull endpoints of one resource.
#[async_trait]
pub trait SyncApi<P: RecordPayload>: Send + Sync {
    /// Uploads a batch of records.
    async fn push(&self, payloads: &[P]) -> SyncResult<DataPushResponse>;

    /// Downloads up to `batch_size` records changed after `process_token`,
    /// sent back as `processed_since`. `None` starts from the beginning.
    async fn pull(
        &self,
        batch_size: usize,
        process_token: Option<&str>,
    ) -> SyncResult<DataPullResponse<P>>;
}

/// [`SyncApi`] over the HTTP sync endpoints.
pub struct HttpSyncApi<P> {
    client: Client,
    config: ApiConfig,
    resource: &'static str,
    version: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P: RecordPayload> HttpSyncApi<P> {
    /// Creates a client for `{base_url}/api/{version}/{resource}/sync`.
    pub fn new(
        config: ApiConfig,
        resource: &'static str,
        version: &'static str,
    ) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            resource,
            version,
            _payload: PhantomData,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/{}/{}/sync",
            self.config.base_url.trim_end_matches('/'),
            self.version,
            self.resource
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(user_id) = &self.config.user_id {
            request = request.header("X-USER-ID", user_id);
        }
        if let Some(facility_id) = &self.config.facility_id {
            request = request.header("X-FACILITY-ID", facility_id);
        }
        if let Some(region) = &self.config.sync_region_id {
            request = request.header("X-SYNC-REGION-ID", region);
        }
        request
    }

    async fn read_body(&self, response: Response, action: &str) -> SyncResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("{} {action} failed: {e}", self.resource)))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::Unauthenticated);
        }
        if status.is_server_error() {
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl<P: RecordPayload> SyncApi<P> for HttpSyncApi<P> {
    async fn push(&self, payloads: &[P]) -> SyncResult<DataPushResponse> {
        debug!("Pushing {} {} records", payloads.len(), self.resource);

        let request = DataPushRequest {
            resource: self.resource,
            payloads,
        };
        let response = self
            .authorize(self.client.post(self.endpoint()))
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{} push failed: {e}", self.resource)))?;

        let body = self.read_body(response, "push").await?;
        if body.trim().is_empty() {
            return Ok(DataPushResponse::accepted());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn pull(
        &self,
        batch_size: usize,
        process_token: Option<&str>,
    ) -> SyncResult<DataPullResponse<P>> {
        debug!(
            "Pulling {} {} records (resuming: {})",
            batch_size,
            self.resource,
            process_token.is_some()
        );

        let mut query = vec![("limit", batch_size.to_string())];
        if let Some(token) = process_token {
            query.push(("processed_since", token.to_string()));
        }
        let response = self
            .authorize(self.client.get(self.endpoint()))
            .query(&query)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{} pull failed: {e}", self.resource)))?;

        let body = self.read_body(response, "pull").await?;
        DataPullResponse::from_json(self.resource, &body)
    }
}
