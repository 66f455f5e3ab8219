//! The job state machine, kept free of I/O so transitions can be tested in
//! isolation. Each checkpoint is a [`JobPatch`] computed from the previous
//! job snapshot; [`advance`] validates the transition and returns the next
//! snapshot, and the engine persists the patch as a side effect.

use crate::meta::{Job, JobPatch, JobStatus};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Progress may not regress within a run: {from} -> {to}")]
    ProgressRegression { from: u8, to: u8 },
}

impl JobStatus {
    /// Whether this status may move to `next`.
    ///
    /// `ProcessingStarted` is reachable from anywhere: it begins a fresh
    /// run, including retries of Done or Failed jobs. `Failed` is reachable
    /// from every non-terminal state. `CreatingCollage` self-loops once per
    /// tile placement.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if next == JobStatus::ProcessingStarted {
            return true;
        }
        match (self, next) {
            (JobStatus::ProcessingStarted, JobStatus::ImageResized) => true,
            (JobStatus::ImageResized, JobStatus::CreatingCollage) => true,
            (JobStatus::CreatingCollage, JobStatus::CreatingCollage) => true,
            (JobStatus::CreatingCollage, JobStatus::Done) => true,
            (from, JobStatus::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Validate a checkpoint against the current snapshot and return the next
/// snapshot with the patch applied.
///
/// Progress must be non-decreasing within a run; the check is skipped when
/// the patch starts a new run (ProcessingStarted) or aborts one (Failed,
/// which leaves the last good progress in place).
pub fn advance(current: &Job, patch: &JobPatch) -> Result<Job, StateError> {
    if let Some(next_status) = patch.status {
        if !current.status.can_transition_to(next_status) {
            return Err(StateError::InvalidTransition {
                from: current.status,
                to: next_status,
            });
        }
    }

    let run_boundary = matches!(
        patch.status,
        Some(JobStatus::ProcessingStarted) | Some(JobStatus::Failed)
    );
    if !run_boundary {
        if let Some(next_progress) = patch.progress {
            if next_progress < current.progress {
                return Err(StateError::ProgressRegression {
                    from: current.progress,
                    to: next_progress,
                });
            }
        }
    }

    Ok(patch.apply(current))
}

/// Checkpoint after the job record is loaded and a run begins
pub fn processing_started() -> JobPatch {
    JobPatch {
        status: Some(JobStatus::ProcessingStarted),
        progress: Some(10),
        ..JobPatch::default()
    }
}

/// Checkpoint after the resized artifact is uploaded. Records the source
/// image's natural dimensions, discovered at decode time.
pub fn image_resized(natural_width: u32, natural_height: u32) -> JobPatch {
    JobPatch {
        status: Some(JobStatus::ImageResized),
        progress: Some(20),
        natural_width: Some(natural_width),
        natural_height: Some(natural_height),
        ..JobPatch::default()
    }
}

/// Per-tile checkpoint during collage composition.
///
/// Progress runs linearly from 50 to 100 over the tile placements. The jump
/// from 20 (post-resize) straight to the 50s is intentional reserved
/// headroom, kept for compatibility with existing progress consumers.
pub fn collage_tile(completed: u32, total: u32) -> JobPatch {
    JobPatch {
        status: Some(JobStatus::CreatingCollage),
        progress: Some(collage_progress(completed, total)),
        ..JobPatch::default()
    }
}

/// `50 + floor(completed / total * 50)`
pub fn collage_progress(completed: u32, total: u32) -> u8 {
    (50 + completed as u64 * 50 / total as u64) as u8
}

/// Terminal checkpoint of a successful run
pub fn done() -> JobPatch {
    JobPatch {
        status: Some(JobStatus::Done),
        progress: Some(100),
        ..JobPatch::default()
    }
}

/// Terminal checkpoint of a failed run. Progress is deliberately left
/// untouched so the last durable checkpoint remains observable.
pub fn failed() -> JobPatch {
    JobPatch {
        status: Some(JobStatus::Failed),
        ..JobPatch::default()
    }
}
