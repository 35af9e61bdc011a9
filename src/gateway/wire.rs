//! Request and response bodies of the classification service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::data::{Cluster, ClusterId, FeedbackLabel, NoiseItem, ShotId};

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ClustersResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub clusters: BTreeMap<ClusterId, Cluster>,
}

#[derive(Debug, Deserialize)]
pub struct NoiseBucketResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub noise_shots: Vec<NoiseItem>,
}

#[derive(Debug, Serialize)]
pub struct MoveRequest<'a> {
    pub shot_id: &'a ShotId,
    pub target_cluster_id: &'a ClusterId,
}

#[derive(Debug, Serialize)]
pub struct FeedbackRequest<'a> {
    pub anchor_id: &'a str,
    pub positive_id: &'a str,
    pub label: FeedbackLabel,
}

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull a readable message out of an error response body
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
