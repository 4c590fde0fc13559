//! Render-ready view state.
//!
//! The view owns the timeline; every other component only produces
//! inputs to it. All mutation happens on the single consumer task, so no
//! locking is involved anywhere in this module.

use serde_json::Value;

use crate::api::SubmitError;
use crate::channel::ChannelEvent;
use crate::progress::{self, Progress};
use crate::timeline::Timeline;
use crate::types::{JobResult, JobStatus};

/// Where the current run stands from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Submitting,
    /// The backend simulated the run.
    Demo,
    /// The real automation ran to completion.
    Success,
    /// The backend reported failure (or the submission itself failed).
    Failed,
}

impl From<JobStatus> for RunStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Demo => RunStatus::Demo,
            JobStatus::Success => RunStatus::Success,
            JobStatus::Error => RunStatus::Failed,
        }
    }
}

/// Aggregate of the submission result and the live timeline.
#[derive(Debug, Default)]
pub struct ViewState {
    pub status: RunStatus,
    pub message: String,
    pub error: Option<String>,
    pub timeline: Timeline,
    /// True while the push channel is open. Independent of completion:
    /// trailing events may still arrive after the terminal status is
    /// known.
    pub is_live: bool,
    /// True as soon as a terminal `JobResult` status is known.
    pub is_complete: bool,
    pub generated_content: Option<Value>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipe everything for a new submission. The previous session's
    /// timeline is discarded, not persisted.
    pub fn reset_for_submission(&mut self) {
        *self = Self {
            status: RunStatus::Submitting,
            ..Self::default()
        };
    }

    /// Fold the one-shot submission result in. A synchronous snapshot
    /// seeds the timeline directly.
    pub fn apply_result(&mut self, result: JobResult) {
        self.status = result.status.into();
        self.message = result.message;
        self.generated_content = result.generated_content;
        if result.status == JobStatus::Error {
            self.error = Some("Automation failed. Please check the reported steps for details.".to_string());
        }
        if let Some(snapshot) = result.snapshot {
            self.timeline.seed(snapshot);
        }
        self.is_complete = true;
    }

    /// Fold a submission failure in. Nothing else is mutated: the
    /// timeline stays empty and no channel was ever opened.
    pub fn apply_error(&mut self, error: &SubmitError) {
        self.status = RunStatus::Failed;
        self.error = Some(error.to_string());
        self.is_complete = true;
    }

    /// Fold one channel event in. Anomalies degrade silently: malformed
    /// frames and duplicates are dropped inside the timeline, and a
    /// dropped channel just freezes the view at its last state.
    pub fn apply_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => self.is_live = true,
            ChannelEvent::Frame(raw) => {
                self.timeline.ingest_raw(&raw);
            }
            ChannelEvent::Closed => self.is_live = false,
        }
    }

    /// Current progress projection.
    pub fn progress(&self, expected_steps: usize) -> Progress {
        progress::project(&self.timeline, expected_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepEvent;

    fn step(filename: &str, step: &str) -> StepEvent {
        StepEvent {
            filename: filename.to_string(),
            step: step.to_string(),
            description: String::new(),
            timestamp: String::new(),
            image_ref: String::new(),
        }
    }

    fn frame(filename: &str, name: &str) -> ChannelEvent {
        ChannelEvent::Frame(serde_json::to_string(&step(filename, name)).unwrap())
    }

    #[test]
    fn test_snapshot_result_completes_immediately() {
        let mut view = ViewState::new();
        view.reset_for_submission();
        view.apply_result(JobResult {
            status: JobStatus::Demo,
            message: "simulated".to_string(),
            session_id: None,
            snapshot: Some(vec![step("e1.png", "start"), step("e2.png", "login")]),
            generated_content: None,
        });

        assert_eq!(view.status, RunStatus::Demo);
        assert_eq!(view.timeline.len(), 2);
        assert!(view.is_complete);
        assert!(!view.is_live);
    }

    #[test]
    fn test_complete_while_still_live() {
        let mut view = ViewState::new();
        view.reset_for_submission();
        view.apply_result(JobResult {
            status: JobStatus::Success,
            message: "sent".to_string(),
            session_id: Some("s1".to_string()),
            snapshot: None,
            generated_content: None,
        });
        view.apply_channel_event(ChannelEvent::Opened);
        view.apply_channel_event(frame("f1.png", "start"));

        assert!(view.is_complete);
        assert!(view.is_live);
        assert_eq!(view.timeline.len(), 1);

        view.apply_channel_event(ChannelEvent::Closed);
        assert!(!view.is_live);
        assert!(view.is_complete);
        assert_eq!(view.timeline.len(), 1);
    }

    #[test]
    fn test_error_result_sets_user_visible_error() {
        let mut view = ViewState::new();
        view.reset_for_submission();
        view.apply_result(JobResult {
            status: JobStatus::Error,
            message: "login rejected".to_string(),
            session_id: None,
            snapshot: None,
            generated_content: None,
        });
        assert_eq!(view.status, RunStatus::Failed);
        assert!(view.error.is_some());
        assert!(view.is_complete);
    }

    #[test]
    fn test_submit_error_leaves_timeline_empty() {
        let mut view = ViewState::new();
        view.reset_for_submission();
        view.apply_error(&SubmitError::Unreachable("connection refused".to_string()));

        assert_eq!(view.status, RunStatus::Failed);
        assert!(view.error.as_deref().unwrap().starts_with("Network Error:"));
        assert!(view.timeline.is_empty());
    }

    #[test]
    fn test_reset_discards_previous_session() {
        let mut view = ViewState::new();
        view.apply_channel_event(frame("f1.png", "start"));
        view.reset_for_submission();

        assert_eq!(view.status, RunStatus::Submitting);
        assert!(view.timeline.is_empty());
        assert!(view.error.is_none());
        assert!(!view.is_complete);
    }

    #[test]
    fn test_malformed_frame_changes_nothing() {
        let mut view = ViewState::new();
        view.apply_channel_event(frame("f1.png", "start"));
        let before = view.progress(10);

        view.apply_channel_event(ChannelEvent::Frame("garbage".to_string()));
        assert_eq!(view.timeline.len(), 1);
        assert_eq!(view.progress(10), before);
    }
}
