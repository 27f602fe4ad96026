//! Form-readiness gate.
//!
//! Authentication is entirely outside this system's control: a human may
//! have to sign in using the very browser window the run opened. The gate
//! polls until the form's title input shows up, tolerating a login page in
//! between, and re-navigates when the session lands somewhere else entirely
//! (typically the post-login redirect).

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::errors::{EngineError, PortError};
use crate::ports::BrowserPort;
use crate::resolver::resolve_control;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadyState {
    Unknown,
    LoginRequired,
    Ready,
}

/// Block until the target form is interactable or the deadline passes.
///
/// Never submits credentials; the human completes authentication in the
/// same window while this keeps polling.
pub async fn wait_until_ready(
    port: &dyn BrowserPort,
    cfg: &EngineConfig,
) -> Result<(), EngineError> {
    port.navigate(&cfg.target_url).await?;

    let deadline = Instant::now() + cfg.login_wait;
    let mut state = ReadyState::Unknown;
    let mut hinted = false;

    loop {
        if resolve_control(port, &cfg.title_label).await.is_some() {
            debug!("title input present, form is ready");
            return Ok(());
        }

        let url = port.current_url().await?;
        if looks_like_login(port, &url).await? {
            state = ReadyState::LoginRequired;
            if !hinted {
                info!(
                    "sign-in required: please complete the login in the opened browser \
                     window (waiting up to {}s)",
                    cfg.login_wait.as_secs()
                );
                hinted = true;
            }
            // Keep polling without navigating; navigation would discard the
            // human's half-finished login.
        } else if url != cfg.target_url {
            // Somewhere else entirely, e.g. the post-login landing page.
            // Go back to the form.
            debug!(?state, %url, "page is neither form nor login, re-navigating");
            port.navigate(&cfg.target_url).await?;
        }

        if Instant::now() >= deadline {
            return Err(EngineError::ReadinessTimeout(cfg.login_wait));
        }
        sleep(cfg.ready_poll).await;
    }
}

/// Login signals: URL pattern, the username input, or a sign-in heading.
async fn looks_like_login(port: &dyn BrowserPort, url: &str) -> Result<bool, PortError> {
    if url.contains("/login") || url.contains("/session") {
        return Ok(true);
    }
    if port.control_by_attr("id", "login_field").await?.is_some() {
        return Ok(true);
    }
    Ok(port
        .find_by_role(&["heading"], Some("Sign in"))
        .await?
        .is_some())
}
