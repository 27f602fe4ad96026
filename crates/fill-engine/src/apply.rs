//! Per-field value application.
//!
//! Two interaction protocols, selected by the field kind: plain text entry
//! for text-like controls, and the open/select/confirm sequence for the
//! composite dropdown widgets GitHub renders in place of native selects.

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use issueform_core_types::{pick_option, FieldKind, FieldPayload};

use crate::config::EngineConfig;
use crate::errors::ApplyError;
use crate::ports::{BrowserPort, ControlId};
use crate::resolver::resolve_control;

/// Apply one field's value to the form.
///
/// An empty value on an optional field is a no-op. Every failure mode maps
/// to [`ApplyError`]; the engine decides whether that escalates.
pub async fn apply_field(
    port: &dyn BrowserPort,
    payload: &FieldPayload,
    cfg: &EngineConfig,
) -> Result<(), ApplyError> {
    if payload.value.trim().is_empty() && payload.kind != FieldKind::Dropdown {
        if payload.required {
            return Err(ApplyError::ValueNotSet);
        }
        debug!(id = %payload.id, "empty optional field, skipping");
        return Ok(());
    }

    let Some(control) = resolve_control(port, &payload.label).await else {
        return Err(ApplyError::ControlNotFound(payload.label.clone()));
    };

    match payload.kind {
        FieldKind::Dropdown => select_dropdown(port, control, payload, cfg).await,
        FieldKind::Input | FieldKind::Textarea | FieldKind::Other => {
            enter_text(port, control, payload).await
        }
    }
}

/// Text-like protocol: focus, clear, enter. Success is the value being
/// non-empty afterwards; an empty required value after the attempt fails.
async fn enter_text(
    port: &dyn BrowserPort,
    control: ControlId,
    payload: &FieldPayload,
) -> Result<(), ApplyError> {
    port.click(control).await?;
    port.set_text(control, &payload.value).await?;

    let value = port.read_value(control).await?;
    if payload.required && value.trim().is_empty() {
        return Err(ApplyError::ValueNotSet);
    }
    debug!(id = %payload.id, chars = value.len(), "text entered");
    Ok(())
}

/// Dropdown protocol: coerce the value into the option list, then
/// open, select, confirm.
async fn select_dropdown(
    port: &dyn BrowserPort,
    control: ControlId,
    payload: &FieldPayload,
    cfg: &EngineConfig,
) -> Result<(), ApplyError> {
    // The control must never be asked for an option it does not have.
    let Some(wanted) = pick_option(&payload.value, &payload.options) else {
        warn!(id = %payload.id, "dropdown declares no options, skipping");
        return Ok(());
    };
    if !wanted.eq_ignore_ascii_case(payload.value.trim()) && !payload.value.trim().is_empty() {
        warn!(
            id = %payload.id,
            supplied = %payload.value,
            coerced = %wanted,
            "value is not a declared option, coerced"
        );
    }
    let wanted_lower = wanted.to_lowercase();

    // Idempotent no-op when the control already shows the option.
    let shown = port.read_text(control).await?;
    if shown.to_lowercase().contains(&wanted_lower) {
        debug!(id = %payload.id, option = %wanted, "already selected");
        return Ok(());
    }

    // Open and wait for the menu to materialize.
    port.click(control).await?;
    let menu = wait_for_menu(port, cfg).await?;

    // Scan option items, preferring the opened menu over a page-wide scan.
    let mut items = port.option_items(menu).await?;
    if items.is_empty() && menu.is_some() {
        items = port.option_items(None).await?;
    }
    let Some((item, text)) = items
        .into_iter()
        .find(|(_, text)| text.to_lowercase().contains(&wanted_lower))
    else {
        return Err(ApplyError::OptionNotMatched { wanted });
    };
    debug!(id = %payload.id, option = %text, "clicking option");
    port.click(item).await?;

    confirm_selection(port, control, &wanted_lower, cfg).await;
    Ok(())
}

async fn wait_for_menu(
    port: &dyn BrowserPort,
    cfg: &EngineConfig,
) -> Result<Option<ControlId>, ApplyError> {
    let deadline = Instant::now() + cfg.menu_wait;
    loop {
        if let Some(menu) = port.find_by_role(&["menu", "listbox"], None).await? {
            return Ok(Some(menu));
        }
        if Instant::now() >= deadline {
            // Some widgets render options without a menu-role container;
            // the page-wide option scan still gets a chance.
            return Ok(None);
        }
        sleep(cfg.widget_poll).await;
    }
}

/// Poll for either the control text reflecting the selection or the widget
/// reporting itself collapsed; either counts as confirmed. Timing out here
/// is logged, not fatal, since the option click already succeeded.
async fn confirm_selection(
    port: &dyn BrowserPort,
    control: ControlId,
    wanted_lower: &str,
    cfg: &EngineConfig,
) {
    let deadline = Instant::now() + cfg.confirm_wait;
    loop {
        match port.read_text(control).await {
            Ok(text) if text.to_lowercase().contains(wanted_lower) => {
                debug!("selection reflected in control text");
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "could not re-read control during confirmation");
                return;
            }
        }
        match port.attribute(control, "aria-expanded").await {
            Ok(Some(state)) if state == "false" => {
                debug!("menu collapsed, treating selection as confirmed");
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "could not read expanded state during confirmation");
                return;
            }
        }
        if Instant::now() >= deadline {
            warn!("selection not visibly confirmed within the window");
            return;
        }
        sleep(cfg.widget_poll).await;
    }
}
