//! Run orchestration.
//!
//! Order matters here: the idempotency guard and preflight validation both
//! run before any browser exists, because a session launch is expensive
//! and may park on a human sign-in.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use cdp_adapter::{CdpConfig, CdpDriver};
use fill_engine::{BrowserPort, EngineConfig, FillEngine, FillOutcome};
use issueform_core_types::{FieldPayload, FormError, IssueType, SUPPORTED_REPO};

use crate::config::RunConfig;
use crate::errors::RunError;
use crate::{guard, preflight, schema, work_order};

/// How long a visible browser lingers on the result page after success.
const SUCCESS_LINGER: Duration = Duration::from_secs(10);

/// What a completed run did.
#[derive(Clone, Debug, PartialEq)]
pub enum RunSummary {
    /// The work order already records an issue; nothing was touched.
    AlreadySubmitted {
        number: Option<String>,
        url: Option<String>,
    },
    Submitted {
        number: String,
        url: String,
    },
    DryRun,
}

/// Snapshot of what the run intends to fill, written next to the other
/// diagnostics before the browser stage starts.
#[derive(Serialize)]
struct FillPlan<'a> {
    target_url: &'a str,
    issue_type: IssueType,
    title: &'a str,
    fields: &'a [FieldPayload],
    attachments: &'a [String],
}

pub async fn run(cfg: RunConfig) -> Result<RunSummary, RunError> {
    let raw = work_order::read_raw(&cfg.work_order_path)?;

    if !cfg.force_resubmit {
        if let Some(existing) = guard::existing_issue(&raw) {
            info!(
                number = existing.number.as_deref().unwrap_or("?"),
                url = existing.url.as_deref().unwrap_or("?"),
                "work order already records a submitted issue, skipping"
            );
            return Ok(RunSummary::AlreadySubmitted {
                number: existing.number,
                url: existing.url,
            });
        }
    }

    let order = work_order::normalize(&raw);
    if order.owner_repo != SUPPORTED_REPO {
        return Err(FormError::UnsupportedRepo(order.owner_repo).into());
    }

    if cfg.write_back {
        // Baking the inferred defaults back in is cosmetic; a failed write
        // must not kill a run that can still submit.
        let mut updated = raw.clone();
        work_order::apply_to_raw(&order, &mut updated);
        if let Err(err) = work_order::persist(&cfg.work_order_path, &updated) {
            warn!(%err, "could not write normalized defaults back to the work order");
        }
    }

    let schema = schema::load(order.issue_type, cfg.templates_dir.as_deref())?;
    preflight::validate(&schema, &order, &cfg.artifacts_dir)?;

    let payloads = work_order::build_payloads(&schema, &order);
    let target_url = order.form_url();
    write_fill_plan(&cfg, &target_url, &order.issue_type, &order.title, &payloads, &order.attachments);

    if !order.attachments.is_empty() {
        warn!(
            count = order.attachments.len(),
            "attachments are not uploaded automatically; add them to the issue manually"
        );
    }

    info!(issue_type = %order.issue_type, %target_url, "starting browser stage");
    let driver = CdpDriver::launch(CdpConfig {
        headless: cfg.headless,
        executable: cfg.browser_binary.clone(),
        user_data_dir: cfg.user_data_dir.clone(),
    })
    .await?;
    let port: Arc<dyn BrowserPort> = Arc::new(driver);

    let mut engine_cfg = EngineConfig::new(target_url, &cfg.artifacts_dir);
    engine_cfg.login_wait = cfg.login_wait;
    engine_cfg.pause_before_submit = cfg.pause_before_submit;
    engine_cfg.no_submit = cfg.no_submit;

    let engine = FillEngine::new(Arc::clone(&port), engine_cfg);
    let result = engine.run(&order.title, &payloads).await;

    let summary = match result {
        Ok(FillOutcome::Submitted {
            issue_url,
            issue_number,
        }) => {
            if let Err(err) =
                guard::record_success(&cfg.work_order_path, &issue_url, &issue_number)
            {
                // The issue exists either way; surface the broken guard
                // loudly instead of failing a successful submission.
                error!(
                    %err,
                    "could not record issue identifiers; re-running will submit a duplicate"
                );
            }
            if !cfg.headless {
                tokio::time::sleep(SUCCESS_LINGER).await;
            }
            Ok(RunSummary::Submitted {
                number: issue_number,
                url: issue_url,
            })
        }
        Ok(FillOutcome::DryRun) => Ok(RunSummary::DryRun),
        Err(err) => Err(RunError::from(err)),
    };

    if let Err(err) = port.close().await {
        warn!(%err, "browser close failed");
    }
    summary
}

fn write_fill_plan(
    cfg: &RunConfig,
    target_url: &str,
    issue_type: &IssueType,
    title: &str,
    fields: &[FieldPayload],
    attachments: &[String],
) {
    let plan = FillPlan {
        target_url,
        issue_type: *issue_type,
        title,
        fields,
        attachments,
    };
    let path = cfg.artifacts_dir.join("fill_plan.json");
    let write = || -> std::io::Result<()> {
        std::fs::create_dir_all(&cfg.artifacts_dir)?;
        let text = serde_json::to_string_pretty(&plan)
            .expect("fill plan always serializes");
        std::fs::write(&path, text + "\n")
    };
    if let Err(err) = write() {
        warn!(path = %path.display(), %err, "could not write fill plan");
    }
}
