//! Progress projection: a pure function of the timeline.

use crate::timeline::Timeline;

/// Fallback step estimate when the configured value is unusable.
pub const DEFAULT_EXPECTED_STEPS: usize = 10;

/// Render-ready progress indicator derived from the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Bounded percentage in `[0, 100]`. Saturates when the run takes
    /// more steps than estimated; saturation does not mean completion.
    pub percent: u8,
    /// Humanized label of the most recent step, `None` when nothing has
    /// happened yet.
    pub current_step: Option<String>,
}

/// Project the timeline onto a progress indicator.
///
/// `expected_steps` is a configured estimate, not a hard bound. A zero
/// estimate falls back to [`DEFAULT_EXPECTED_STEPS`].
pub fn project(timeline: &Timeline, expected_steps: usize) -> Progress {
    let expected = if expected_steps == 0 {
        DEFAULT_EXPECTED_STEPS
    } else {
        expected_steps
    };
    let percent = ((timeline.len() as f32 / expected as f32) * 100.0).round() as u8;

    Progress {
        percent: percent.min(100),
        current_step: timeline.last().map(|event| humanize_step(&event.step)),
    }
}

/// `content_generation` -> `CONTENT GENERATION`.
pub fn humanize_step(step: &str) -> String {
    step.replace('_', " ").to_uppercase()
}
