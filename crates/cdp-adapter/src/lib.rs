//! Chromium DevTools Protocol backend for the fill engine.
//!
//! Implements [`fill_engine::BrowserPort`] over `chromiumoxide`. Located
//! controls are tagged in the page with a private attribute and addressed by
//! selector afterwards, so handles stay valid across the DOM re-renders
//! GitHub's form widgets like to perform.

pub mod config;
pub mod driver;
pub mod error;
mod queries;

pub use config::CdpConfig;
pub use driver::CdpDriver;
pub use error::AdapterError;
