//! Browser launch configuration.

use std::path::PathBuf;

/// How to bring up the Chromium session.
#[derive(Clone, Debug)]
pub struct CdpConfig {
    /// Headless runs skip the visible window; manual sign-in needs a head.
    pub headless: bool,
    /// Explicit browser binary; `None` lets the driver discover one.
    pub executable: Option<PathBuf>,
    /// Persistent profile directory. Reusing it across runs keeps the
    /// GitHub session alive and spares repeated sign-ins.
    pub user_data_dir: PathBuf,
}
