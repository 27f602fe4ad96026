//! Failure-state capture.
//!
//! Snapshots are fire-and-forget: they must never turn a diagnosable
//! failure into a different failure. Capture errors are observed at `warn`
//! and discarded.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, warn};

use crate::ports::BrowserPort;

/// Writes timestamped screenshot + HTML pairs into one directory.
#[derive(Clone, Debug)]
pub struct DiagnosticsSink {
    dir: PathBuf,
}

impl DiagnosticsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(err) = std::fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), %err, "could not create diagnostics directory");
        }
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Capture a screenshot and an HTML dump tagged with `tag`.
    pub async fn capture(&self, port: &dyn BrowserPort, tag: &str) {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let base = format!("{stamp}_{tag}");

        let png = self.dir.join(format!("{base}.png"));
        if let Err(err) = port.screenshot(&png).await {
            warn!(path = %png.display(), %err, "screenshot capture failed");
        } else {
            debug!(path = %png.display(), "screenshot captured");
        }

        let html = self.dir.join(format!("{base}.html"));
        match port.dump_html().await {
            Ok(contents) => {
                if let Err(err) = std::fs::write(&html, contents) {
                    warn!(path = %html.display(), %err, "HTML dump write failed");
                }
            }
            Err(err) => warn!(%err, "HTML dump failed"),
        }
    }
}
