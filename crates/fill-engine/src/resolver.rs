//! Label-to-control resolution with a layered fallback chain.
//!
//! Form markup is rarely standards-clean, so resolution tries progressively
//! looser strategies and takes the first hit. "Not found" is a value, not an
//! error: whether a miss matters depends on the field's required flag, which
//! the caller judges.

use tracing::{debug, warn};

use crate::errors::PortError;
use crate::ports::{BrowserPort, ControlId};

/// One way of binding a label to its control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveStrategy {
    /// Exact label text, `for`-attribute binding.
    ForBindingExact,
    /// Exact label text as accessible name.
    AccessibleNameExact,
    /// Substring label text, `for`-attribute binding.
    ForBindingContains,
    /// Substring label text as accessible name.
    AccessibleNameContains,
    /// Nearest following interactive element in document order.
    FollowingControl,
}

impl ResolveStrategy {
    /// Fallback order; first match wins.
    pub fn fallback_chain() -> [ResolveStrategy; 5] {
        [
            ResolveStrategy::ForBindingExact,
            ResolveStrategy::AccessibleNameExact,
            ResolveStrategy::ForBindingContains,
            ResolveStrategy::AccessibleNameContains,
            ResolveStrategy::FollowingControl,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ResolveStrategy::ForBindingExact => "for-binding-exact",
            ResolveStrategy::AccessibleNameExact => "accessible-name-exact",
            ResolveStrategy::ForBindingContains => "for-binding-contains",
            ResolveStrategy::AccessibleNameContains => "accessible-name-contains",
            ResolveStrategy::FollowingControl => "following-control",
        }
    }

    async fn attempt(
        self,
        port: &dyn BrowserPort,
        label: &str,
    ) -> Result<Option<ControlId>, PortError> {
        match self {
            ResolveStrategy::ForBindingExact => port.control_for_label(label, true).await,
            ResolveStrategy::AccessibleNameExact => {
                port.control_by_accessible_name(label, true).await
            }
            ResolveStrategy::ForBindingContains => port.control_for_label(label, false).await,
            ResolveStrategy::AccessibleNameContains => {
                port.control_by_accessible_name(label, false).await
            }
            ResolveStrategy::FollowingControl => port.control_following_label(label).await,
        }
    }
}

/// Resolve the control a label describes.
///
/// Strategy errors are logged and the chain continues; a fully exhausted
/// chain is simply `None`.
pub async fn resolve_control(port: &dyn BrowserPort, label: &str) -> Option<ControlId> {
    for strategy in ResolveStrategy::fallback_chain() {
        match strategy.attempt(port, label).await {
            Ok(Some(control)) => {
                debug!(
                    label,
                    strategy = strategy.name(),
                    %control,
                    "resolved control"
                );
                return Some(control);
            }
            Ok(None) => {
                debug!(label, strategy = strategy.name(), "no match");
            }
            Err(err) => {
                warn!(label, strategy = strategy.name(), %err, "strategy failed");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_chain_order() {
        let chain = ResolveStrategy::fallback_chain();
        assert_eq!(chain[0], ResolveStrategy::ForBindingExact);
        assert_eq!(chain[1], ResolveStrategy::AccessibleNameExact);
        assert_eq!(chain[4], ResolveStrategy::FollowingControl);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(ResolveStrategy::ForBindingExact.name(), "for-binding-exact");
        assert_eq!(ResolveStrategy::FollowingControl.name(), "following-control");
    }
}
