//! Run configuration resolved from the command line.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::errors::RunError;

/// Everything a run needs, with paths fully resolved.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub work_order_path: PathBuf,
    /// Diagnostics directory; resolved next to the work order when the
    /// given path is relative.
    pub artifacts_dir: PathBuf,
    pub headless: bool,
    pub login_wait: Duration,
    pub pause_before_submit: Duration,
    pub no_submit: bool,
    pub force_resubmit: bool,
    pub write_back: bool,
    pub templates_dir: Option<PathBuf>,
    pub browser_binary: Option<PathBuf>,
    pub user_data_dir: PathBuf,
    pub verbose: u8,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, RunError> {
        let work_order_path = cli
            .work_order_path()
            .ok_or(RunError::MissingWorkOrderPath)?;

        let artifacts_dir = if cli.artifacts_dir.is_absolute() {
            cli.artifacts_dir.clone()
        } else {
            work_order_path
                .parent()
                .map(|parent| parent.join(&cli.artifacts_dir))
                .unwrap_or_else(|| cli.artifacts_dir.clone())
        };

        let user_data_dir = cli
            .user_data_dir
            .clone()
            .unwrap_or_else(default_user_data_dir);

        Ok(Self {
            work_order_path,
            artifacts_dir,
            headless: cli.headless,
            login_wait: Duration::from_secs(cli.login_wait_sec.max(30)),
            pause_before_submit: Duration::from_secs(cli.pause_before_submit_sec),
            no_submit: cli.no_submit,
            force_resubmit: cli.force_resubmit,
            write_back: !cli.no_write_back,
            templates_dir: cli.templates_dir,
            browser_binary: cli.browser_binary,
            user_data_dir,
            verbose: cli.verbose,
        })
    }
}

/// Default persistent profile location, under the platform config
/// directory, so login state survives across runs.
fn default_user_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("AionUi")
        .join("chrome_user_data")
}
