use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::collections::BTreeMap;
use std::path::Path;

use super::wire::{self, ClustersResponse, FeedbackRequest, MoveRequest, NoiseBucketResponse};
use crate::error::{FeedbackError, GatewayError, LoadError, MoveError, UploadError};
use crate::state::data::{Cluster, ClusterId, NoiseItem, Snapshot, UploadResult, ViewMode};
use crate::state::drag::{FeedbackCommand, MoveCommand};

const USER_AGENT: &str = concat!("shot-curator/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the classification service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base: Url,
}

impl Gateway {
    /// `base` must end with a slash so relative paths resolve under it
    pub fn new(base: Url) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Decode(format!("invalid path '{}': {}", path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Service {
            status: status.as_u16(),
            body: wire::error_detail(&body),
        })
    }

    /// `GET /api/clusters?view_type=...`
    pub async fn list_clusters(
        &self,
        mode: ViewMode,
    ) -> Result<BTreeMap<ClusterId, Cluster>, GatewayError> {
        let url = self.endpoint("api/clusters")?;
        tracing::debug!(url = %url, mode = %mode, "Fetching clusters");

        let response = self
            .send(self.http.get(url).query(&[("view_type", mode.as_str())]))
            .await?;
        let status = response.status().as_u16();
        let body: ClustersResponse = response.json().await?;
        if !body.success {
            return Err(GatewayError::Service {
                status,
                body: "cluster listing reported failure".to_string(),
            });
        }
        Ok(body.clusters)
    }

    /// `GET /api/noise_bucket`
    pub async fn list_noise_pool(&self) -> Result<Vec<NoiseItem>, GatewayError> {
        let url = self.endpoint("api/noise_bucket")?;
        tracing::debug!(url = %url, "Fetching noise bucket");

        let response = self.send(self.http.get(url)).await?;
        let status = response.status().as_u16();
        let body: NoiseBucketResponse = response.json().await?;
        if !body.success {
            return Err(GatewayError::Service {
                status,
                body: "noise bucket listing reported failure".to_string(),
            });
        }
        Ok(body.noise_shots)
    }

    /// Fetch both collections concurrently; either failing fails the load
    pub async fn load_snapshot(&self, mode: ViewMode) -> Result<Snapshot, LoadError> {
        let (clusters, noise) = tokio::try_join!(self.list_clusters(mode), self.list_noise_pool())?;
        Ok(Snapshot::assemble(mode, clusters, noise))
    }

    /// `POST /api/move_to_cluster`. Only the status is looked at; the new
    /// membership comes from the next load.
    pub async fn move_to_cluster(&self, command: &MoveCommand) -> Result<(), MoveError> {
        let url = self.endpoint("api/move_to_cluster")?;
        let body = MoveRequest {
            shot_id: &command.shot_id,
            target_cluster_id: &command.target_cluster_id,
        };
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    /// `POST /api/upload` with the file as multipart field `file`
    pub async fn upload_asset(&self, path: &Path) -> Result<UploadResult, UploadError> {
        let url = self.endpoint("api/upload")?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        // Streamed from disk; videos can be far larger than memory allows
        let file = tokio::fs::File::open(path).await.map_err(GatewayError::from)?;
        let size = file.metadata().await.map_err(GatewayError::from)?.len();
        tracing::info!(file = %filename, size, "Uploading video");

        let part = Part::stream_with_length(reqwest::Body::from(file), size).file_name(filename);
        let form = Form::new().part("file", part);
        let response = self.send(self.http.post(url).multipart(form)).await?;
        let status = response.status().as_u16();
        let result: UploadResult = response.json().await.map_err(GatewayError::from)?;
        if !result.success {
            return Err(UploadError(GatewayError::Service {
                status,
                body: format!("{} was not processed", result.filename),
            }));
        }
        Ok(result)
    }

    /// `POST /api/log_feedback`
    pub async fn submit_feedback(&self, feedback: &FeedbackCommand) -> Result<(), FeedbackError> {
        let url = self.endpoint("api/log_feedback")?;
        let body = FeedbackRequest {
            anchor_id: &feedback.anchor_id,
            positive_id: &feedback.positive_id,
            label: feedback.label,
        };
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    /// Raw bytes of a keyframe served relative to the service origin
    pub async fn fetch_keyframe(&self, keyframe_path: &str) -> Result<Vec<u8>, GatewayError> {
        let url = self.endpoint(keyframe_path)?;
        let response = self.send(self.http.get(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
