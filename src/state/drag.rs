//! Drag-Interaction Controller
//!
//! Turns pointer gestures into at most one "move shot X to cluster Y"
//! command per gesture. The gesture phases are a closed state machine;
//! anything that does not make sense in the current phase is ignored.
//! Commands waiting on the service are tracked apart from the gesture,
//! so the operator can start the next drag while a move is in flight.

use super::data::{ClusterId, DropTarget, FeedbackLabel, ShotId, ViewMode};
use super::store::ViewStore;
use crate::error::MoveError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        shot_id: ShotId,
        hover: Option<DropTarget>,
    },
}

/// Command for the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    pub shot_id: ShotId,
    pub target_cluster_id: ClusterId,
}

/// Training pair sent after a confirmed move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackCommand {
    pub anchor_id: ShotId,
    pub positive_id: ClusterId,
    pub label: FeedbackLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Not dragging; nothing happened
    Ignored,
    /// Released outside any cluster or onto the shot's own location
    Cancelled,
    /// Released onto something that cannot take the shot
    Rejected(MoveError),
    Commit(MoveCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Reload with `mode`; send `feedback` if present
    Resync {
        mode: ViewMode,
        feedback: Option<FeedbackCommand>,
    },
    Failed(MoveError),
    /// The command was not pending
    Ignored,
}

#[derive(Debug, Default)]
pub struct DragController {
    phase: DragPhase,
    /// Moves sent to the service and not answered yet, oldest first
    pending: Vec<MoveCommand>,
    send_feedback: bool,
}

impl DragController {
    pub fn new(send_feedback: bool) -> Self {
        Self {
            phase: DragPhase::Idle,
            pending: Vec::new(),
            send_feedback,
        }
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn pending(&self) -> &[MoveCommand] {
        &self.pending
    }

    fn is_pending(&self, shot_id: &str) -> bool {
        self.pending.iter().any(|c| c.shot_id == shot_id)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Target under the pointer, if a drag is in progress
    pub fn hovered(&self) -> Option<&DropTarget> {
        match &self.phase {
            DragPhase::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// Idle -> Dragging, only for a shot currently in the noise pool.
    /// A shot whose move is still in flight cannot be picked up again.
    pub fn pick_up(&mut self, store: &mut ViewStore, shot_id: &str) -> bool {
        if self.phase != DragPhase::Idle {
            tracing::debug!(shot_id = %shot_id, phase = ?self.phase, "Pick-up ignored, gesture in progress");
            return false;
        }
        if self.is_pending(shot_id) {
            tracing::debug!(shot_id = %shot_id, "Pick-up ignored, move already in flight");
            return false;
        }
        if !store.begin_drag(shot_id) {
            return false;
        }
        tracing::debug!(shot_id = %shot_id, "Drag started");
        self.phase = DragPhase::Dragging {
            shot_id: shot_id.to_string(),
            hover: None,
        };
        true
    }

    pub fn enter(&mut self, target: DropTarget) {
        if let DragPhase::Dragging { hover, .. } = &mut self.phase {
            *hover = Some(target);
        }
    }

    /// Enter/leave may arrive in either order when moving between two
    /// adjacent targets, so only clear the hover we are leaving
    pub fn leave(&mut self, target: &DropTarget) {
        if let DragPhase::Dragging { hover, .. } = &mut self.phase {
            if hover.as_ref() == Some(target) {
                *hover = None;
            }
        }
    }

    /// Release the pointer over whatever is hovered.
    ///
    /// The drag preview is cleared whatever the outcome.
    pub fn drop(&mut self, store: &mut ViewStore) -> DropOutcome {
        let (shot_id, hover) = match std::mem::take(&mut self.phase) {
            DragPhase::Dragging { shot_id, hover } => (shot_id, hover),
            DragPhase::Idle => return DropOutcome::Ignored,
        };
        store.end_drag();

        let target = match hover {
            Some(DropTarget::Cluster(id)) if id != shot_id => id,
            _ => {
                tracing::debug!(shot_id = %shot_id, "Drop without a new location, no move");
                return DropOutcome::Cancelled;
            }
        };

        if store.snapshot().cluster(&target).is_none() {
            tracing::warn!(shot_id = %shot_id, target = %target, "Drop onto cluster outside the current view");
            return DropOutcome::Rejected(MoveError::UnknownCluster(target));
        }

        tracing::info!(shot_id = %shot_id, target = %target, in_flight = self.pending.len(), "Committing move");
        let command = MoveCommand {
            shot_id,
            target_cluster_id: target,
        };
        self.pending.push(command.clone());
        DropOutcome::Commit(command)
    }

    /// Abort the gesture: no command, no reload
    pub fn cancel(&mut self, store: &mut ViewStore) {
        if self.is_dragging() {
            tracing::debug!("Drag cancelled");
            self.phase = DragPhase::Idle;
            store.end_drag();
        }
    }

    /// Settle a pending command once the gateway has answered.
    ///
    /// Success never moves anything locally: the caller reloads and the
    /// service decides where the shot ended up. The gesture phase and the
    /// drag preview belong to whatever drag is running now and are left alone.
    pub fn finish_commit(
        &mut self,
        store: &ViewStore,
        command: &MoveCommand,
        result: Result<(), MoveError>,
    ) -> CommitOutcome {
        let Some(index) = self.pending.iter().position(|c| c == command) else {
            tracing::debug!(shot_id = %command.shot_id, "Answer for a move that is not pending");
            return CommitOutcome::Ignored;
        };
        let MoveCommand {
            shot_id,
            target_cluster_id: target,
        } = self.pending.remove(index);

        match result {
            Ok(()) => {
                tracing::info!(shot_id = %shot_id, target = %target, "Move accepted, resyncing");
                let feedback = self.send_feedback.then(|| FeedbackCommand {
                    anchor_id: shot_id,
                    positive_id: target,
                    label: FeedbackLabel::Positive,
                });
                CommitOutcome::Resync {
                    mode: store.view_mode(),
                    feedback,
                }
            }
            Err(err) => {
                tracing::warn!(shot_id = %shot_id, target = %target, error = %err, "Move failed");
                CommitOutcome::Failed(err)
            }
        }
    }
}
