//! Shared data structures for the application state
//!
//! These structs mirror what the classification service sends and
//! flow unchanged from the gateway into the store and the UI layer.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub type ShotId = String;
pub type ClusterId = String;

/// A classified shot belonging to exactly one cluster
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Item {
    pub id: ShotId,
    /// Path of the keyframe image, relative to the service origin
    pub keyframe_path: String,
    /// Closeness to the cluster representative in [0, 1], if computed
    #[serde(default)]
    pub similarity: Option<f32>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A named group of shots, scoped to one view mode
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Cluster {
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub shots: Vec<Item>,
}

/// A shot the classifier could not confidently assign
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NoiseItem {
    pub shot_id: ShotId,
    pub keyframe_path: String,
    #[serde(default)]
    pub scene_vector: Vec<f32>,
    #[serde(default)]
    pub character_vectors: Vec<Vec<f32>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Which clustering dimension the service groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Scene,
    Character,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Scene, ViewMode::Character];

    /// Value of the `view_type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Scene => "scene",
            ViewMode::Character => "character",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Scene => "Scene Clusters",
            ViewMode::Character => "Character Clusters",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scene" => Ok(ViewMode::Scene),
            "character" => Ok(ViewMode::Character),
            other => Err(format!("unknown view mode '{}' (expected scene or character)", other)),
        }
    }
}

/// Training signal attached to a feedback pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLabel {
    Negative,
    Neutral,
    Positive,
}

impl FeedbackLabel {
    pub fn value(&self) -> i8 {
        match self {
            FeedbackLabel::Negative => -1,
            FeedbackLabel::Neutral => 0,
            FeedbackLabel::Positive => 1,
        }
    }
}

// The service expects the bare integer
impl Serialize for FeedbackLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

/// Per-shot line of an upload report
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedShot {
    pub shot_id: ShotId,
    #[serde(default)]
    pub cluster_type: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<ClusterId>,
    #[serde(default)]
    pub similarity_score: Option<f32>,
}

/// What the service reports after ingesting a video
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub filename: String,
    pub shots_processed: usize,
    #[serde(default)]
    pub shots: Vec<UploadedShot>,
    #[serde(default)]
    pub clusters: BTreeMap<ClusterId, Cluster>,
}

/// Where a dragged shot can be released
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Cluster(ClusterId),
    /// The pool every draggable shot comes from
    NoisePool,
}

/// Complete copy of clusters and noise pool as of one successful load
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub mode: ViewMode,
    pub clusters: Vec<Cluster>,
    pub noise_pool: Vec<NoiseItem>,
}

impl Snapshot {
    /// Build a snapshot from the two service collections.
    ///
    /// Cluster ids and shot ids must be unique, and a shot is either in
    /// a cluster or in the noise pool. Offending entries are dropped:
    /// the first occurrence of an id wins and cluster membership wins
    /// over the noise pool.
    pub fn assemble(
        mode: ViewMode,
        clusters: BTreeMap<ClusterId, Cluster>,
        noise_pool: Vec<NoiseItem>,
    ) -> Self {
        let mut seen_shots: HashSet<ShotId> = HashSet::new();
        let mut out_clusters = Vec::with_capacity(clusters.len());

        for (key, mut cluster) in clusters {
            if cluster.cluster_id != key {
                tracing::warn!(key = %key, cluster_id = %cluster.cluster_id, "Cluster key does not match its id, using key");
                cluster.cluster_id = key;
            }
            cluster.shots.retain(|shot| {
                let fresh = seen_shots.insert(shot.id.clone());
                if !fresh {
                    tracing::warn!(shot_id = %shot.id, "Dropping duplicate clustered shot");
                }
                fresh
            });
            out_clusters.push(cluster);
        }

        let mut out_noise = Vec::with_capacity(noise_pool.len());
        for item in noise_pool {
            if seen_shots.insert(item.shot_id.clone()) {
                out_noise.push(item);
            } else {
                tracing::warn!(shot_id = %item.shot_id, "Dropping noise shot that is already clustered or duplicated");
            }
        }

        Self {
            mode,
            clusters: out_clusters,
            noise_pool: out_noise,
        }
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.cluster_id == cluster_id)
    }

    pub fn noise_item(&self, shot_id: &str) -> Option<&NoiseItem> {
        self.noise_pool.iter().find(|n| n.shot_id == shot_id)
    }

    /// Number of classified shots across all clusters
    pub fn clustered_count(&self) -> usize {
        self.clusters.iter().map(|c| c.shots.len()).sum()
    }

    /// Every keyframe the snapshot refers to, collapsed clusters included
    pub fn keyframe_paths(&self) -> impl Iterator<Item = &str> + '_ {
        let clustered = self
            .clusters
            .iter()
            .flat_map(|c| c.shots.iter().map(|s| s.keyframe_path.as_str()));
        self.noise_pool
            .iter()
            .map(|n| n.keyframe_path.as_str())
            .chain(clustered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            keyframe_path: format!("keyframes/{}.jpg", id),
            similarity: None,
            timestamp: None,
        }
    }

    fn noise(id: &str) -> NoiseItem {
        NoiseItem {
            shot_id: id.to_string(),
            keyframe_path: format!("keyframes/{}.jpg", id),
            scene_vector: vec![],
            character_vectors: vec![],
            timestamp: None,
        }
    }

    fn cluster(id: &str, shots: &[&str]) -> (ClusterId, Cluster) {
        (
            id.to_string(),
            Cluster {
                cluster_id: id.to_string(),
                shots: shots.iter().map(|s| item(s)).collect(),
            },
        )
    }

    #[test]
    fn test_item_without_similarity() {
        let json = r#"{"id":"a_0","keyframe_path":"keyframes/a_0.jpg","similarity":null,"timestamp":"2024-05-01T10:00:00"}"#;
        let parsed: Item = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.similarity, None);
        assert_eq!(parsed.timestamp.as_deref(), Some("2024-05-01T10:00:00"));

        let bare: Item = serde_json::from_str(r#"{"id":"a_1","keyframe_path":"k.jpg"}"#).unwrap();
        assert_eq!(bare.similarity, None);
        assert_eq!(bare.timestamp, None);
    }

    #[test]
    fn test_noise_item_vectors() {
        let json = r#"{
            "shot_id": "clip.mp4_3",
            "keyframe_path": "keyframes/clip_3.jpg",
            "scene_vector": [0.1, 0.2],
            "character_vectors": [[1.0], [0.5, 0.5]],
            "timestamp": "2024-05-01T10:00:00"
        }"#;
        let parsed: NoiseItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.scene_vector.len(), 2);
        assert_eq!(parsed.character_vectors.len(), 2);
    }

    #[test]
    fn test_view_mode_parsing() {
        assert_eq!("scene".parse::<ViewMode>().unwrap(), ViewMode::Scene);
        assert_eq!("Character".parse::<ViewMode>().unwrap(), ViewMode::Character);
        assert!("faces".parse::<ViewMode>().is_err());
        assert_eq!(ViewMode::Character.to_string(), "character");
        assert_eq!(serde_json::to_string(&ViewMode::Scene).unwrap(), "\"scene\"");
    }

    #[test]
    fn test_feedback_label_is_integer() {
        assert_eq!(serde_json::to_string(&FeedbackLabel::Positive).unwrap(), "1");
        assert_eq!(serde_json::to_string(&FeedbackLabel::Negative).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&FeedbackLabel::Neutral).unwrap(), "0");
    }

    #[test]
    fn test_upload_result_parsing() {
        let json = r#"{
            "success": true,
            "filename": "clip.mp4",
            "shots_processed": 2,
            "shots": [
                {"shot_id": "clip.mp4_0", "cluster_type": "scene", "cluster_id": "scene_1", "similarity_score": 0.9},
                {"shot_id": "clip.mp4_1", "cluster_type": "noise", "cluster_id": null, "similarity_score": 0.2}
            ],
            "clusters": {"scene_1": {"cluster_id": "scene_1", "shots": []}}
        }"#;
        let parsed: UploadResult = serde_json::from_str(json).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.shots_processed, 2);
        assert_eq!(parsed.shots[1].cluster_id, None);
        assert!(parsed.clusters.contains_key("scene_1"));
    }

    #[test]
    fn test_assemble_keeps_noise_and_clusters_disjoint() {
        let clusters: BTreeMap<_, _> = [cluster("c1", &["a", "b"]), cluster("c2", &["c"])]
            .into_iter()
            .collect();
        let pool = vec![noise("b"), noise("d"), noise("d"), noise("e")];

        let snapshot = Snapshot::assemble(ViewMode::Scene, clusters, pool);

        let clustered: HashSet<&str> = snapshot
            .clusters
            .iter()
            .flat_map(|c| c.shots.iter().map(|s| s.id.as_str()))
            .collect();
        let pooled: Vec<&str> = snapshot.noise_pool.iter().map(|n| n.shot_id.as_str()).collect();

        assert_eq!(pooled, vec!["d", "e"]);
        assert!(pooled.iter().all(|id| !clustered.contains(id)));
        assert_eq!(snapshot.clustered_count(), 3);
    }

    #[test]
    fn test_assemble_orders_clusters_by_id() {
        let clusters: BTreeMap<_, _> = [cluster("scene_2", &[]), cluster("scene_1", &[])]
            .into_iter()
            .collect();
        let snapshot = Snapshot::assemble(ViewMode::Scene, clusters, vec![]);
        let ids: Vec<&str> = snapshot.clusters.iter().map(|c| c.cluster_id.as_str()).collect();
        assert_eq!(ids, vec!["scene_1", "scene_2"]);
        assert!(snapshot.cluster("scene_2").is_some());
        assert!(snapshot.cluster("scene_3").is_none());
    }

    #[test]
    fn test_assemble_drops_duplicate_shots_across_clusters() {
        let clusters: BTreeMap<_, _> = [cluster("c1", &["a"]), cluster("c2", &["a", "b"])]
            .into_iter()
            .collect();
        let snapshot = Snapshot::assemble(ViewMode::Character, clusters, vec![]);
        assert_eq!(snapshot.cluster("c1").unwrap().shots.len(), 1);
        assert_eq!(snapshot.cluster("c2").unwrap().shots.len(), 1);
        assert_eq!(snapshot.mode, ViewMode::Character);
        assert_eq!(snapshot.keyframe_paths().count(), 2);
    }
}
