//! The chromiumoxide-backed driver.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use fill_engine::{BrowserPort, ControlId, PortError};

use crate::config::CdpConfig;
use crate::error::AdapterError;
use crate::queries;

/// One Chromium session implementing the engine's browser port.
pub struct CdpDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    /// Set when the CDP event loop ends; every later call fails fast.
    closed: Arc<AtomicBool>,
    next_ref: AtomicU64,
}

impl CdpDriver {
    /// Launch the browser and open the working tab.
    pub async fn launch(cfg: CdpConfig) -> Result<Self, AdapterError> {
        std::fs::create_dir_all(&cfg.user_data_dir)
            .map_err(|e| AdapterError::launch(format!("profile directory: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&cfg.user_data_dir)
            .window_size(1280, 960)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-infobars");
        if !cfg.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &cfg.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(AdapterError::launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AdapterError::launch(e.to_string()))?;
        info!(profile = %cfg.user_data_dir.display(), headless = cfg.headless, "browser launched");

        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = Arc::clone(&closed);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(%err, "CDP event loop error");
                }
            }
            closed_flag.store(true, Ordering::SeqCst);
            debug!("CDP event loop ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AdapterError::launch(format!("could not open a tab: {e}")))?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
            closed,
            next_ref: AtomicU64::new(1),
        })
    }

    fn ensure_alive(&self) -> Result<(), PortError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PortError::Session(
                "browser event loop has ended".to_string(),
            ));
        }
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, js: String) -> Result<T, PortError> {
        self.ensure_alive()?;
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| PortError::Call(format!("evaluate: {e}")))?;
        result
            .into_value::<T>()
            .map_err(|e| PortError::Call(format!("evaluation result: {e}")))
    }

    /// Run a locate-and-tag script; `Some` when the script tagged a node.
    async fn locate(&self, reference: u64, js: String) -> Result<Option<ControlId>, PortError> {
        let found: bool = self.eval(js).await?;
        Ok(found.then_some(ControlId(reference)))
    }

    fn mint_ref(&self) -> u64 {
        self.next_ref.fetch_add(1, Ordering::Relaxed)
    }

    async fn element(&self, control: ControlId) -> Result<chromiumoxide::element::Element, PortError> {
        self.ensure_alive()?;
        self.page
            .find_element(queries::selector_for(control.0))
            .await
            .map_err(|e| PortError::Call(format!("{control} no longer addressable: {e}")))
    }
}

#[async_trait]
impl BrowserPort for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<(), PortError> {
        self.ensure_alive()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| PortError::Call(format!("navigate: {e}")))?;
        // Best effort; the callers poll for their own readiness signals.
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PortError> {
        self.ensure_alive()?;
        let url = self
            .page
            .url()
            .await
            .map_err(|e| PortError::Call(format!("url: {e}")))?;
        Ok(url.unwrap_or_default())
    }

    async fn control_for_label(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError> {
        let reference = self.mint_ref();
        self.locate(reference, queries::control_for_label(label, exact, reference))
            .await
    }

    async fn control_by_accessible_name(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError> {
        let reference = self.mint_ref();
        self.locate(
            reference,
            queries::control_by_accessible_name(label, exact, reference),
        )
        .await
    }

    async fn control_following_label(
        &self,
        label: &str,
    ) -> Result<Option<ControlId>, PortError> {
        let reference = self.mint_ref();
        self.locate(reference, queries::control_following_label(label, reference))
            .await
    }

    async fn find_by_role(
        &self,
        roles: &[&str],
        text: Option<&str>,
    ) -> Result<Option<ControlId>, PortError> {
        let reference = self.mint_ref();
        let text_lower = text.map(str::to_lowercase);
        self.locate(
            reference,
            queries::find_by_role(roles, text_lower.as_deref(), reference),
        )
        .await
    }

    async fn control_by_attr(
        &self,
        attribute: &str,
        value: &str,
    ) -> Result<Option<ControlId>, PortError> {
        let reference = self.mint_ref();
        self.locate(reference, queries::control_by_attr(attribute, value, reference))
            .await
    }

    async fn option_items(
        &self,
        within: Option<ControlId>,
    ) -> Result<Vec<(ControlId, String)>, PortError> {
        let base = self
            .next_ref
            .fetch_add(queries::MAX_OPTIONS, Ordering::Relaxed);
        let texts: Vec<String> = self
            .eval(queries::option_items(within.map(|c| c.0), base))
            .await?;
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| (ControlId(base + i as u64), text))
            .collect())
    }

    async fn click(&self, control: ControlId) -> Result<(), PortError> {
        let element = self.element(control).await?;
        element
            .click()
            .await
            .map_err(|e| PortError::Call(format!("click {control}: {e}")))?;
        Ok(())
    }

    async fn set_text(&self, control: ControlId, text: &str) -> Result<(), PortError> {
        let element = self.element(control).await?;
        element
            .call_js_fn(
                r#"function() {
                    if ('value' in this) { this.value = ''; } else { this.textContent = ''; }
                    this.dispatchEvent(new Event('input', { bubbles: true }));
                }"#,
                false,
            )
            .await
            .map_err(|e| PortError::Call(format!("clear {control}: {e}")))?;
        element
            .type_str(text)
            .await
            .map_err(|e| PortError::Call(format!("type into {control}: {e}")))?;
        Ok(())
    }

    async fn read_value(&self, control: ControlId) -> Result<String, PortError> {
        self.eval(queries::read_value(control.0)).await
    }

    async fn read_text(&self, control: ControlId) -> Result<String, PortError> {
        self.eval(queries::read_text(control.0)).await
    }

    async fn attribute(
        &self,
        control: ControlId,
        name: &str,
    ) -> Result<Option<String>, PortError> {
        self.eval(queries::read_attribute(control.0, name)).await
    }

    async fn screenshot(&self, path: &Path) -> Result<(), PortError> {
        self.ensure_alive()?;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| PortError::Call(format!("screenshot: {e}")))?;
        std::fs::write(path, bytes)
            .map_err(|e| PortError::Call(format!("screenshot write: {e}")))?;
        Ok(())
    }

    async fn dump_html(&self) -> Result<String, PortError> {
        self.ensure_alive()?;
        match self.page.content().await {
            Ok(html) => Ok(html),
            Err(err) => {
                // Some page states refuse the DOM serializer; go through the
                // evaluator instead.
                warn!(%err, "page content failed, falling back to outerHTML");
                self.eval("document.documentElement.outerHTML".to_string())
                    .await
            }
        }
    }

    async fn close(&self) -> Result<(), PortError> {
        let mut browser = self.browser.lock().await;
        if let Err(err) = browser.close().await {
            warn!(%err, "browser close failed");
        }
        if let Err(err) = browser.wait().await {
            debug!(%err, "browser wait failed");
        }
        self.handler_task.abort();
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
