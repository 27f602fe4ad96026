//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Fill and submit an AionUi GitHub issue form from a work order.
#[derive(Parser, Debug)]
#[command(name = "issueform", version, about)]
pub struct Cli {
    /// Path to work_order.json
    #[arg(long)]
    pub work_order: Option<PathBuf>,

    /// Alias of --work-order
    #[arg(long)]
    pub work_order_file: Option<PathBuf>,

    /// Run the browser headless (manual sign-in needs a visible window)
    #[arg(long)]
    pub headless: bool,

    /// Max seconds to wait for the form, inclusive of a manual sign-in
    #[arg(long, default_value_t = 600)]
    pub login_wait_sec: u64,

    /// Where debug artifacts are written; relative paths resolve next to
    /// the work order
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Fill the form but do not click Create
    #[arg(long)]
    pub no_submit: bool,

    /// Pause after filling, before clicking Create
    #[arg(long, default_value_t = 10)]
    pub pause_before_submit_sec: u64,

    /// Submit even when the work order already records an issue
    #[arg(long)]
    pub force_resubmit: bool,

    /// Do not write normalized defaults back into the work order
    #[arg(long)]
    pub no_write_back: bool,

    /// Load issue templates from this directory instead of the embedded ones
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// Path to a Chrome/Chromium binary if discovery fails
    #[arg(long)]
    pub browser_binary: Option<PathBuf>,

    /// Chrome user data dir, reused across runs to keep login state
    #[arg(long)]
    pub user_data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// `--work-order` with `--work-order-file` accepted as an alias.
    pub fn work_order_path(&self) -> Option<PathBuf> {
        self.work_order
            .clone()
            .or_else(|| self.work_order_file.clone())
    }
}
