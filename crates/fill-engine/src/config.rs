//! Engine tuning knobs.

use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration for one run.
///
/// The durations are polling bounds, not sleeps added unconditionally:
/// every wait is a fixed-interval poll cut short by its success signal.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// The issue-form URL the readiness gate navigates to and returns to.
    pub target_url: String,

    /// Accessible label of the title input, the canonical readiness marker.
    pub title_label: String,

    /// Visible text of the create action.
    pub submit_label: String,

    /// Upper bound on the readiness gate, inclusive of a manual sign-in.
    pub login_wait: Duration,
    /// Readiness poll interval.
    pub ready_poll: Duration,

    /// Bound on waiting for a dropdown menu to appear after opening.
    pub menu_wait: Duration,
    /// Bound on the dropdown confirmation poll.
    pub confirm_wait: Duration,
    /// Interval for the menu and confirmation polls.
    pub widget_poll: Duration,

    /// Human-verification pause between fill completion and the first click.
    pub pause_before_submit: Duration,
    /// Per-attempt window for the success-URL poll.
    pub submit_wait: Duration,
    /// Success-URL poll interval.
    pub submit_poll: Duration,
    /// Total create-click attempts.
    pub max_submit_attempts: u32,

    /// Fill and snapshot, but never click the create action.
    pub no_submit: bool,

    /// Where failure snapshots land.
    pub diagnostics_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(target_url: impl Into<String>, diagnostics_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_url: target_url.into(),
            title_label: "Add a title".to_string(),
            submit_label: "Create".to_string(),
            login_wait: Duration::from_secs(600),
            ready_poll: Duration::from_secs(2),
            menu_wait: Duration::from_secs(3),
            confirm_wait: Duration::from_secs(2),
            widget_poll: Duration::from_millis(250),
            pause_before_submit: Duration::from_secs(10),
            submit_wait: Duration::from_secs(20),
            submit_poll: Duration::from_millis(500),
            max_submit_attempts: 3,
            no_submit: false,
            diagnostics_dir: diagnostics_dir.into(),
        }
    }
}
