//! Run orchestration: readiness gate, schema-ordered fill, submission.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use issueform_core_types::FieldPayload;

use crate::apply::apply_field;
use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::errors::EngineError;
use crate::model::{FillOutcome, MissingField};
use crate::ports::BrowserPort;
use crate::readiness::wait_until_ready;
use crate::resolver::resolve_control;
use crate::submit::submit_with_retries;

/// The single fill/submit engine, generic over its browser backend.
pub struct FillEngine {
    port: Arc<dyn BrowserPort>,
    cfg: EngineConfig,
    diagnostics: DiagnosticsSink,
}

impl FillEngine {
    pub fn new(port: Arc<dyn BrowserPort>, cfg: EngineConfig) -> Self {
        let diagnostics = DiagnosticsSink::new(cfg.diagnostics_dir.clone());
        Self {
            port,
            cfg,
            diagnostics,
        }
    }

    /// Fill the form and (unless configured dry-run) submit it.
    ///
    /// Fields are applied strictly in schema order; dropdowns and other
    /// focus-sensitive widgets do not tolerate interleaving. Failures on
    /// required fields are collected across the whole pass so the report
    /// is complete in one run.
    pub async fn run(
        &self,
        title: &str,
        fields: &[FieldPayload],
    ) -> Result<FillOutcome, EngineError> {
        let port = self.port.as_ref();

        wait_until_ready(port, &self.cfg).await?;

        let mut missing: Vec<MissingField> = Vec::new();

        match resolve_control(port, &self.cfg.title_label).await {
            Some(control) => {
                port.click(control).await?;
                port.set_text(control, title).await?;
            }
            None => missing.push(MissingField {
                id: "title".to_string(),
                label: self.cfg.title_label.clone(),
                kind: issueform_core_types::FieldKind::Input,
            }),
        }

        for payload in fields {
            match apply_field(port, payload, &self.cfg).await {
                Ok(()) => {}
                Err(err) if payload.required => {
                    warn!(id = %payload.id, %err, "required field failed");
                    missing.push(MissingField {
                        id: payload.id.clone(),
                        label: payload.label.clone(),
                        kind: payload.kind,
                    });
                }
                Err(err) => {
                    info!(id = %payload.id, %err, "optional field skipped");
                }
            }
        }

        if !missing.is_empty() {
            self.diagnostics.capture(port, "missing_required").await;
            return Err(EngineError::MissingControls(missing));
        }

        if self.cfg.no_submit {
            info!("dry run: form filled, create action not clicked");
            self.diagnostics.capture(port, "filled_no_submit").await;
            return Ok(FillOutcome::DryRun);
        }

        if !self.cfg.pause_before_submit.is_zero() {
            info!(
                "pausing {}s before submitting for human verification",
                self.cfg.pause_before_submit.as_secs()
            );
            sleep(self.cfg.pause_before_submit).await;
        }

        submit_with_retries(port, &self.cfg, &self.diagnostics).await
    }

    pub fn diagnostics(&self) -> &DiagnosticsSink {
        &self.diagnostics
    }
}
