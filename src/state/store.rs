use std::collections::HashSet;

use super::data::{Cluster, ClusterId, NoiseItem, Snapshot, ViewMode};
use crate::error::LoadError;

/// Identifies one load cycle.
///
/// Issued by [`ViewStore::begin_load`]; only the most recent ticket is
/// allowed to replace the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) seq: u64,
    pub mode: ViewMode,
}

/// What happened to a load result handed back to the store
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied,
    Failed(LoadError),
    /// A newer load was requested meanwhile; the result was discarded
    Stale,
}

/// The View-State Store holds everything the surfaces render.
///
/// Fields are private: every mutation goes through one of the
/// transitions below, all of which run on the update loop.
#[derive(Debug)]
pub struct ViewStore {
    snapshot: Snapshot,
    view_mode: ViewMode,
    /// Newest load still in flight
    in_flight: Option<LoadTicket>,
    uploading: bool,
    expanded: HashSet<ClusterId>,
    drag_preview: Option<NoiseItem>,
    latest_load: u64,
}

impl ViewStore {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            snapshot: Snapshot {
                mode: view_mode,
                ..Snapshot::default()
            },
            view_mode,
            in_flight: None,
            uploading: false,
            expanded: HashSet::new(),
            drag_preview: None,
            latest_load: 0,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The mode the operator asked for; may differ from `snapshot().mode`
    /// until the next load lands
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The load whose result will be applied, if one is running
    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.in_flight
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn drag_preview(&self) -> Option<&NoiseItem> {
        self.drag_preview.as_ref()
    }

    /// Start a load cycle for the current view mode.
    ///
    /// Any earlier ticket still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        tracing::debug!(seq = self.latest_load, mode = %self.view_mode, "Load started");
        let ticket = LoadTicket {
            seq: self.latest_load,
            mode: self.view_mode,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    /// Hand back the result of a load cycle.
    ///
    /// On success the whole snapshot is replaced; on failure the previous
    /// snapshot stays untouched. Results for superseded tickets are dropped
    /// without touching the load in flight.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Snapshot, LoadError>,
    ) -> LoadOutcome {
        if ticket.seq != self.latest_load {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_load,
                mode = %ticket.mode,
                "Discarding stale load result"
            );
            return LoadOutcome::Stale;
        }

        self.in_flight = None;
        match result {
            Ok(mut snapshot) => {
                snapshot.mode = ticket.mode;
                tracing::info!(
                    mode = %ticket.mode,
                    clusters = snapshot.clusters.len(),
                    noise = snapshot.noise_pool.len(),
                    "Snapshot replaced"
                );
                self.snapshot = snapshot;
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(mode = %ticket.mode, error = %err, "Load failed, keeping previous snapshot");
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Switch the requested view mode. Returns false if it was already set.
    ///
    /// The snapshot keeps showing the old mode until a load completes.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if self.view_mode == mode {
            return false;
        }
        self.view_mode = mode;
        true
    }

    pub fn toggle_expanded(&mut self, cluster_id: &str) {
        if !self.expanded.remove(cluster_id) {
            self.expanded.insert(cluster_id.to_string());
        }
    }

    pub fn is_expanded(&self, cluster_id: &str) -> bool {
        self.expanded.contains(cluster_id)
    }

    /// Clusters of the current snapshot with their expansion flag.
    /// Expanded ids absent from the snapshot are simply not yielded.
    pub fn visible_clusters(&self) -> impl Iterator<Item = (&Cluster, bool)> + '_ {
        self.snapshot
            .clusters
            .iter()
            .map(move |c| (c, self.expanded.contains(&c.cluster_id)))
    }

    /// Keyframes the surfaces will actually draw: the whole noise pool
    /// plus the shots of expanded clusters
    pub fn keyframes_in_view(&self) -> Vec<&str> {
        let pool = self.snapshot.noise_pool.iter().map(|n| n.keyframe_path.as_str());
        let clustered = self
            .visible_clusters()
            .filter(|(_, expanded)| *expanded)
            .flat_map(|(c, _)| c.shots.iter().map(|s| s.keyframe_path.as_str()));
        pool.chain(clustered).collect()
    }

    /// Set the drag preview. Unknown shot ids leave it absent.
    pub fn begin_drag(&mut self, shot_id: &str) -> bool {
        match self.snapshot.noise_item(shot_id) {
            Some(item) => {
                self.drag_preview = Some(item.clone());
                true
            }
            None => {
                tracing::debug!(shot_id = %shot_id, "Ignoring drag of unknown shot");
                false
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_preview = None;
    }

    /// Mark an upload as in flight. Returns false if one already is.
    pub fn begin_upload(&mut self) -> bool {
        if self.uploading {
            return false;
        }
        self.uploading = true;
        true
    }

    pub fn finish_upload(&mut self) {
        self.uploading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::state::data::Item;
    use std::collections::BTreeMap;

    fn snapshot(mode: ViewMode, clusters: &[(&str, &[&str])], noise: &[&str]) -> Snapshot {
        let clusters: BTreeMap<_, _> = clusters
            .iter()
            .map(|(id, shots)| {
                (
                    id.to_string(),
                    Cluster {
                        cluster_id: id.to_string(),
                        shots: shots
                            .iter()
                            .map(|s| Item {
                                id: s.to_string(),
                                keyframe_path: format!("keyframes/{}.jpg", s),
                                similarity: Some(0.8),
                                timestamp: None,
                            })
                            .collect(),
                    },
                )
            })
            .collect();
        let noise = noise
            .iter()
            .map(|s| NoiseItem {
                shot_id: s.to_string(),
                keyframe_path: format!("keyframes/{}.jpg", s),
                scene_vector: vec![0.0; 4],
                character_vectors: vec![],
                timestamp: None,
            })
            .collect();
        Snapshot::assemble(mode, clusters, noise)
    }

    fn load_error() -> LoadError {
        LoadError(GatewayError::Network("connection refused".to_string()))
    }

    fn loaded_store() -> ViewStore {
        let mut store = ViewStore::new(ViewMode::Scene);
        let ticket = store.begin_load();
        let snap = snapshot(
            ViewMode::Scene,
            &[("s1", &["a"]), ("s2", &["b"]), ("s3", &["c"])],
            &["n1", "n2", "n3", "n4", "n5"],
        );
        assert_eq!(store.finish_load(ticket, Ok(snap)), LoadOutcome::Applied);
        store
    }

    #[test]
    fn test_load_toggles_loading_flag() {
        let mut store = ViewStore::new(ViewMode::Scene);
        assert!(!store.is_loading());

        let ticket = store.begin_load();
        assert!(store.is_loading());
        assert_eq!(ticket.mode, ViewMode::Scene);

        store.finish_load(ticket, Ok(snapshot(ViewMode::Scene, &[("s1", &[])], &[])));
        assert!(!store.is_loading());
        assert_eq!(store.snapshot().clusters.len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let mut store = loaded_store();
        let before = store.snapshot().clone();

        store.set_view_mode(ViewMode::Character);
        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Err(load_error()));

        assert_eq!(outcome, LoadOutcome::Failed(load_error()));
        assert!(!store.is_loading());
        assert_eq!(store.snapshot(), &before);
        assert_eq!(store.snapshot().clusters.len(), 3);
        assert_eq!(store.snapshot().noise_pool.len(), 5);
        assert_eq!(store.snapshot().mode, ViewMode::Scene);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = ViewStore::new(ViewMode::Scene);
        let scene = store.begin_load();

        store.set_view_mode(ViewMode::Character);
        let character = store.begin_load();

        let character_snap = snapshot(ViewMode::Character, &[("ch1", &["a"])], &["n1"]);
        let scene_snap = snapshot(ViewMode::Scene, &[("s1", &["a"]), ("s2", &[])], &["n1"]);

        assert_eq!(store.finish_load(character, Ok(character_snap.clone())), LoadOutcome::Applied);
        assert!(!store.is_loading());
        assert_eq!(store.finish_load(scene, Ok(scene_snap)), LoadOutcome::Stale);

        assert_eq!(store.snapshot(), &character_snap);
        assert_eq!(store.snapshot().mode, ViewMode::Character);
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut store = ViewStore::new(ViewMode::Scene);
        let first = store.begin_load();
        let second = store.begin_load();

        assert_eq!(store.finish_load(first, Err(load_error())), LoadOutcome::Stale);
        assert!(store.is_loading());
        assert_eq!(store.pending_load(), Some(second));
    }

    #[test]
    fn test_pending_load_tracks_newest_ticket() {
        let mut store = loaded_store();
        assert_eq!(store.pending_load(), None);

        store.set_view_mode(ViewMode::Character);
        let ticket = store.begin_load();
        assert_eq!(store.pending_load().map(|t| t.mode), Some(ViewMode::Character));

        store.finish_load(ticket, Err(load_error()));
        assert_eq!(store.pending_load(), None);
        // The requested mode stays selected for the next refresh
        assert_eq!(store.view_mode(), ViewMode::Character);
    }

    #[test]
    fn test_view_mode_switch_does_not_relabel_snapshot() {
        let mut store = loaded_store();
        assert!(store.set_view_mode(ViewMode::Character));
        assert!(!store.set_view_mode(ViewMode::Character));

        assert_eq!(store.view_mode(), ViewMode::Character);
        assert_eq!(store.snapshot().mode, ViewMode::Scene);
    }

    #[test]
    fn test_toggle_expanded() {
        let mut store = loaded_store();
        store.toggle_expanded("s2");
        assert!(store.is_expanded("s2"));
        store.toggle_expanded("s2");
        assert!(!store.is_expanded("s2"));

        // Unknown ids can be marked too; they just never render
        store.toggle_expanded("s9");
        assert!(store.is_expanded("s9"));
        assert_eq!(store.visible_clusters().filter(|(_, e)| *e).count(), 0);
    }

    #[test]
    fn test_expansion_survives_reload() {
        let mut store = loaded_store();
        store.toggle_expanded("s2");

        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(snapshot(ViewMode::Scene, &[("s2", &["a", "n1"])], &[])));
        let visible: Vec<(&str, bool)> = store
            .visible_clusters()
            .map(|(c, e)| (c.cluster_id.as_str(), e))
            .collect();
        assert_eq!(visible, vec![("s2", true)]);

        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(snapshot(ViewMode::Scene, &[("s1", &[])], &[])));
        let visible: Vec<(&str, bool)> = store
            .visible_clusters()
            .map(|(c, e)| (c.cluster_id.as_str(), e))
            .collect();
        assert_eq!(visible, vec![("s1", false)]);
        // Still marked, so it reappears expanded if the service brings it back
        assert!(store.is_expanded("s2"));
    }

    #[test]
    fn test_keyframes_in_view_skips_collapsed_clusters() {
        let mut store = loaded_store();
        assert_eq!(store.keyframes_in_view().len(), 5);

        store.toggle_expanded("s3");
        let paths = store.keyframes_in_view();
        assert_eq!(paths.len(), 6);
        assert!(paths.contains(&"keyframes/c.jpg"));
        assert!(!paths.contains(&"keyframes/a.jpg"));
    }

    #[test]
    fn test_begin_drag_unknown_shot_is_noop() {
        let mut store = loaded_store();
        assert!(!store.begin_drag("nope"));
        assert!(store.drag_preview().is_none());

        assert!(store.begin_drag("n2"));
        assert_eq!(store.drag_preview().map(|n| n.shot_id.as_str()), Some("n2"));
        store.end_drag();
        assert!(store.drag_preview().is_none());
    }

    #[test]
    fn test_upload_gate() {
        let mut store = ViewStore::new(ViewMode::Scene);
        assert!(store.begin_upload());
        assert!(!store.begin_upload());
        store.finish_upload();
        assert!(!store.is_uploading());
        assert!(store.begin_upload());
    }
}
