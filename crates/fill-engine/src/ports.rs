//! Browser capability port.
//!
//! The engine never talks to a driver library directly; it consumes this
//! trait. Controls cross the boundary as opaque ids minted by the adapter,
//! so the adapter decides how a control stays addressable between calls.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::errors::PortError;

/// Opaque handle to an on-screen control, valid for the current page state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ControlId(pub u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// The capability surface one browser session exposes to the engine.
///
/// Locator methods return `Ok(None)` when nothing matched; `Err` is reserved
/// for the session or the call itself failing.
#[async_trait]
pub trait BrowserPort: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), PortError>;

    async fn current_url(&self) -> Result<String, PortError>;

    /// Control bound to a label element through the label's `for` attribute.
    /// `exact` matches the whole trimmed label text; otherwise containment.
    async fn control_for_label(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError>;

    /// Control carrying the label as its accessible name
    /// (`aria-label` or `aria-labelledby`).
    async fn control_by_accessible_name(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError>;

    /// Nearest interactive control (text area, text input or button) after
    /// the label text in document order.
    async fn control_following_label(&self, label: &str)
        -> Result<Option<ControlId>, PortError>;

    /// First visible element with one of the given ARIA roles, optionally
    /// filtered by case-insensitive text containment.
    async fn find_by_role(
        &self,
        roles: &[&str],
        text: Option<&str>,
    ) -> Result<Option<ControlId>, PortError>;

    /// First element with `attribute == value`.
    async fn control_by_attr(
        &self,
        attribute: &str,
        value: &str,
    ) -> Result<Option<ControlId>, PortError>;

    /// Visible option items (`option` / `menuitem` roles) with their visible
    /// text, scoped to `within` when given, otherwise page-wide.
    async fn option_items(
        &self,
        within: Option<ControlId>,
    ) -> Result<Vec<(ControlId, String)>, PortError>;

    async fn click(&self, control: ControlId) -> Result<(), PortError>;

    /// Clear the control, then enter the text.
    async fn set_text(&self, control: ControlId, text: &str) -> Result<(), PortError>;

    /// Form value of the control (input/textarea `value`).
    async fn read_value(&self, control: ControlId) -> Result<String, PortError>;

    /// Visible text of the control.
    async fn read_text(&self, control: ControlId) -> Result<String, PortError>;

    async fn attribute(
        &self,
        control: ControlId,
        name: &str,
    ) -> Result<Option<String>, PortError>;

    async fn screenshot(&self, path: &Path) -> Result<(), PortError>;

    async fn dump_html(&self) -> Result<String, PortError>;

    async fn close(&self) -> Result<(), PortError>;
}
