//! Bounded submission loop.
//!
//! Success has exactly one oracle: the current URL taking the
//! created-resource shape (`…/issues/<number>`). Toasts and inline DOM
//! feedback are transient and unreliable to poll, so they are ignored.

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use issueform_core_types::created_issue_number;

use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::errors::EngineError;
use crate::model::FillOutcome;
use crate::ports::BrowserPort;

/// Click the create action and confirm, retrying a bounded number of times.
///
/// A still-on-form state after the poll window is retried identically
/// whether it came from server-side validation or a UI glitch; each failed
/// attempt leaves a tagged snapshot behind.
pub async fn submit_with_retries(
    port: &dyn BrowserPort,
    cfg: &EngineConfig,
    diagnostics: &DiagnosticsSink,
) -> Result<FillOutcome, EngineError> {
    for attempt in 1..=cfg.max_submit_attempts {
        info!(attempt, max = cfg.max_submit_attempts, "clicking create");

        match port
            .find_by_role(&["button"], Some(cfg.submit_label.as_str()))
            .await?
        {
            Some(button) => port.click(button).await?,
            None => {
                warn!(attempt, label = %cfg.submit_label, "create action not found");
                diagnostics
                    .capture(port, &format!("submit_attempt_{attempt}"))
                    .await;
                continue;
            }
        }

        if let Some((url, number)) = poll_for_created(port, cfg).await? {
            info!(%url, number, "submission confirmed");
            return Ok(FillOutcome::Submitted {
                issue_url: url,
                issue_number: number,
            });
        }

        warn!(attempt, "still on the form after the confirmation window");
        diagnostics
            .capture(port, &format!("submit_attempt_{attempt}"))
            .await;
    }

    Err(EngineError::SubmitNotConfirmed {
        attempts: cfg.max_submit_attempts,
        diagnostics_dir: cfg.diagnostics_dir.clone(),
    })
}

/// Poll the URL for the created-resource shape within the attempt window.
async fn poll_for_created(
    port: &dyn BrowserPort,
    cfg: &EngineConfig,
) -> Result<Option<(String, String)>, EngineError> {
    let deadline = Instant::now() + cfg.submit_wait;
    loop {
        let url = port.current_url().await?;
        if let Some(number) = created_issue_number(&url) {
            return Ok(Some((url, number)));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(cfg.submit_poll).await;
    }
}
