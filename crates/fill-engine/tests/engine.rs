//! Engine protocol tests against a scriptable in-memory browser port.
//!
//! The fixtures pin the exact interaction sequences the engine promises:
//! bounded submission, complete missing-required reporting, the dropdown
//! open/select/confirm protocol and the login-tolerant readiness gate.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fill_engine::{
    BrowserPort, ControlId, EngineConfig, EngineError, FillEngine, FillOutcome, PortError,
};
use issueform_core_types::{FieldKind, FieldPayload, FieldSchema};

const TARGET: &str = "https://github.com/iOfficeAI/AionUi/issues/new?template=bug_report.yml";
const CREATED: &str = "https://github.com/iOfficeAI/AionUi/issues/42";

#[derive(Default)]
struct FakeState {
    url: String,
    /// The next navigation lands here instead of its target, as a login
    /// wall or post-login redirect would.
    redirect_once: Option<String>,
    navigations: Vec<String>,
    /// label -> control id, hit by both binding strategies.
    labeled: HashMap<String, u64>,
    values: HashMap<u64, String>,
    texts: HashMap<u64, String>,
    attrs: HashMap<(u64, String), String>,
    clicks: Vec<u64>,
    menu_open: bool,
    /// (control id, visible text) exposed while the menu is open.
    menu_options: Vec<(u64, String)>,
    /// Selecting this option id writes its text onto this control id.
    dropdown_control: Option<u64>,
    submit_button: Option<u64>,
    submit_clicks: u32,
    /// Flip the URL to the created shape on this click of the create action.
    succeed_on_click: Option<u32>,
    /// The title control only appears after this many readiness probes.
    ready_after_probes: u32,
    probes: u32,
}

#[derive(Clone)]
struct FakePort {
    state: Arc<Mutex<FakeState>>,
}

impl FakePort {
    fn new(state: FakeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn lookup(&self, label: &str, exact: bool) -> Option<ControlId> {
        let mut state = self.lock();
        if state.probes < state.ready_after_probes {
            state.probes += 1;
            return None;
        }
        state
            .labeled
            .iter()
            .find(|(known, _)| {
                if exact {
                    known.as_str() == label
                } else {
                    known.contains(label)
                }
            })
            .map(|(_, id)| ControlId(*id))
    }
}

#[async_trait]
impl BrowserPort for FakePort {
    async fn navigate(&self, url: &str) -> Result<(), PortError> {
        let mut state = self.lock();
        state.navigations.push(url.to_string());
        state.url = state
            .redirect_once
            .take()
            .unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PortError> {
        Ok(self.lock().url.clone())
    }

    async fn control_for_label(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError> {
        Ok(self.lookup(label, exact))
    }

    async fn control_by_accessible_name(
        &self,
        label: &str,
        exact: bool,
    ) -> Result<Option<ControlId>, PortError> {
        Ok(self.lookup(label, exact))
    }

    async fn control_following_label(
        &self,
        _label: &str,
    ) -> Result<Option<ControlId>, PortError> {
        Ok(None)
    }

    async fn find_by_role(
        &self,
        roles: &[&str],
        text: Option<&str>,
    ) -> Result<Option<ControlId>, PortError> {
        let state = self.lock();
        if roles.contains(&"button") {
            if let Some(label) = text {
                if label == "Create" {
                    return Ok(state.submit_button.map(ControlId));
                }
            }
            return Ok(None);
        }
        if roles.contains(&"menu") || roles.contains(&"listbox") {
            return Ok(state.menu_open.then_some(ControlId(9000)));
        }
        Ok(None)
    }

    async fn control_by_attr(
        &self,
        _attribute: &str,
        _value: &str,
    ) -> Result<Option<ControlId>, PortError> {
        Ok(None)
    }

    async fn option_items(
        &self,
        _within: Option<ControlId>,
    ) -> Result<Vec<(ControlId, String)>, PortError> {
        let state = self.lock();
        if !state.menu_open {
            return Ok(Vec::new());
        }
        Ok(state
            .menu_options
            .iter()
            .map(|(id, text)| (ControlId(*id), text.clone()))
            .collect())
    }

    async fn click(&self, control: ControlId) -> Result<(), PortError> {
        let mut state = self.lock();
        state.clicks.push(control.0);

        if state.dropdown_control == Some(control.0) {
            state.menu_open = true;
        }
        if let Some((_, text)) = state
            .menu_options
            .iter()
            .find(|(id, _)| *id == control.0)
            .cloned()
        {
            let owner = state.dropdown_control.expect("option without dropdown");
            state.texts.insert(owner, text);
            state.menu_open = false;
            state
                .attrs
                .insert((owner, "aria-expanded".to_string()), "false".to_string());
        }
        if state.submit_button == Some(control.0) {
            state.submit_clicks += 1;
            if state.succeed_on_click == Some(state.submit_clicks) {
                state.url = CREATED.to_string();
            }
        }
        Ok(())
    }

    async fn set_text(&self, control: ControlId, text: &str) -> Result<(), PortError> {
        self.lock().values.insert(control.0, text.to_string());
        Ok(())
    }

    async fn read_value(&self, control: ControlId) -> Result<String, PortError> {
        Ok(self.lock().values.get(&control.0).cloned().unwrap_or_default())
    }

    async fn read_text(&self, control: ControlId) -> Result<String, PortError> {
        Ok(self.lock().texts.get(&control.0).cloned().unwrap_or_default())
    }

    async fn attribute(
        &self,
        control: ControlId,
        name: &str,
    ) -> Result<Option<String>, PortError> {
        Ok(self
            .lock()
            .attrs
            .get(&(control.0, name.to_string()))
            .cloned())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), PortError> {
        std::fs::write(path, b"png").map_err(|e| PortError::Call(e.to_string()))
    }

    async fn dump_html(&self) -> Result<String, PortError> {
        Ok("<html></html>".to_string())
    }

    async fn close(&self) -> Result<(), PortError> {
        Ok(())
    }
}

fn fast_config(diag: &Path) -> EngineConfig {
    let mut cfg = EngineConfig::new(TARGET, diag);
    cfg.pause_before_submit = std::time::Duration::ZERO;
    cfg.submit_wait = std::time::Duration::from_millis(100);
    cfg.submit_poll = std::time::Duration::from_millis(20);
    cfg.menu_wait = std::time::Duration::from_millis(100);
    cfg.confirm_wait = std::time::Duration::from_millis(100);
    cfg.widget_poll = std::time::Duration::from_millis(20);
    cfg.ready_poll = std::time::Duration::from_millis(20);
    cfg.login_wait = std::time::Duration::from_secs(5);
    cfg
}

fn text_field(id: &str, label: &str, required: bool, value: &str) -> FieldPayload {
    FieldPayload::new(
        &FieldSchema {
            id: id.to_string(),
            label: label.to_string(),
            kind: FieldKind::Textarea,
            options: Vec::new(),
            required,
        },
        value,
    )
}

fn base_state() -> FakeState {
    let mut state = FakeState {
        url: TARGET.to_string(),
        ..FakeState::default()
    };
    state.labeled.insert("Add a title".to_string(), 1);
    state
}

#[tokio::test(start_paused = true)]
async fn submission_is_bounded_to_three_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.submit_button = Some(50);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    let err = engine.run("a title", &[]).await.unwrap_err();
    match err {
        EngineError::SubmitNotConfirmed { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(port.lock().submit_clicks, 3);
}

#[tokio::test(start_paused = true)]
async fn submission_succeeds_on_second_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.submit_button = Some(50);
    state.succeed_on_click = Some(2);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    let outcome = engine.run("a title", &[]).await.unwrap();
    assert_eq!(
        outcome,
        FillOutcome::Submitted {
            issue_url: CREATED.to_string(),
            issue_number: "42".to_string(),
        }
    );
    assert_eq!(port.lock().submit_clicks, 2);

    // The failed first attempt left a tagged snapshot pair behind.
    let tagged: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .contains("submit_attempt_1")
        })
        .collect();
    assert_eq!(tagged.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn dry_run_never_clicks_create() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.submit_button = Some(50);
    let mut cfg = fast_config(dir.path());
    cfg.no_submit = true;

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), cfg);

    let outcome = engine.run("a title", &[]).await.unwrap();
    assert_eq!(outcome, FillOutcome::DryRun);
    assert_eq!(port.lock().submit_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn missing_required_fields_are_reported_completely() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.labeled.insert("Bug Description".to_string(), 2);
    state.submit_button = Some(50);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    let fields = vec![
        text_field("bug_description", "Bug Description", true, "it crashes"),
        text_field("steps_to_reproduce", "Steps To Reproduce", true, "1. save"),
        text_field("additional_context", "Additional Context", false, "notes"),
    ];
    let err = engine.run("a title", &fields).await.unwrap_err();
    match err {
        EngineError::MissingControls(missing) => {
            let ids: Vec<_> = missing.iter().map(|m| m.id.as_str()).collect();
            assert_eq!(ids, vec!["steps_to_reproduce"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The resolvable field was still filled; the pass is not fail-fast.
    assert_eq!(port.lock().values.get(&2).map(String::as_str), Some("it crashes"));
    // The optional miss never escalated.
    assert_eq!(port.lock().submit_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn dropdown_selects_coerced_option_through_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.labeled.insert("Platform".to_string(), 20);
    state.dropdown_control = Some(20);
    state.menu_options = vec![(30, "Windows".to_string()), (31, "Linux".to_string())];
    state.submit_button = Some(50);
    state.succeed_on_click = Some(1);

    let schema = FieldSchema {
        id: "platform".to_string(),
        label: "Platform".to_string(),
        kind: FieldKind::Dropdown,
        options: vec!["Windows".to_string(), "Linux".to_string()],
        required: true,
    };
    // Case-insensitive member: coerced to the canonical "Linux", not the
    // first option.
    let fields = vec![FieldPayload::new(&schema, "linux")];

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    engine.run("a title", &fields).await.unwrap();
    let state = port.lock();
    assert!(state.clicks.contains(&20), "dropdown was opened");
    assert!(state.clicks.contains(&31), "Linux option was clicked");
    assert!(!state.clicks.contains(&30), "Windows option was not clicked");
    assert_eq!(state.texts.get(&20).map(String::as_str), Some("Linux"));
}

#[tokio::test(start_paused = true)]
async fn dropdown_already_showing_option_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.labeled.insert("Platform".to_string(), 20);
    state.dropdown_control = Some(20);
    state.texts.insert(20, "Linux".to_string());
    state.menu_options = vec![(30, "Windows".to_string()), (31, "Linux".to_string())];
    state.submit_button = Some(50);
    state.succeed_on_click = Some(1);

    let schema = FieldSchema {
        id: "platform".to_string(),
        label: "Platform".to_string(),
        kind: FieldKind::Dropdown,
        options: vec!["Windows".to_string(), "Linux".to_string()],
        required: true,
    };
    let fields = vec![FieldPayload::new(&schema, "Linux")];

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    engine.run("a title", &fields).await.unwrap();
    let state = port.lock();
    assert!(
        !state.clicks.contains(&20),
        "already-selected dropdown must not be reopened"
    );
}

#[tokio::test(start_paused = true)]
async fn readiness_gate_waits_out_the_login_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.redirect_once = Some("https://github.com/login?return_to=issues".to_string());
    // Each gate tick probes the title label once per binding strategy; ten
    // probes keep the gate on the login page for a couple of ticks.
    state.ready_after_probes = 10;
    state.submit_button = Some(50);
    state.succeed_on_click = Some(1);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    engine.run("a title", &[]).await.unwrap();
    let state = port.lock();
    // Only the initial navigation: polling on the login page never
    // re-navigates while the human signs in.
    assert_eq!(state.navigations, vec![TARGET.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn readiness_gate_returns_to_the_form_after_a_redirect() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    // Post-login landing page: not the form, not a login page.
    state.redirect_once = Some("https://github.com/".to_string());
    state.ready_after_probes = 10;
    state.submit_button = Some(50);
    state.succeed_on_click = Some(1);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port.clone()), fast_config(dir.path()));

    engine.run("a title", &[]).await.unwrap();
    let state = port.lock();
    // Initial navigation, plus exactly one re-navigation off the landing
    // page; once back on the form URL the gate only polls.
    assert_eq!(state.navigations, vec![TARGET.to_string(), TARGET.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn readiness_gate_times_out_without_a_form() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = base_state();
    state.redirect_once = Some("https://github.com/login".to_string());
    state.ready_after_probes = u32::MAX;
    let mut cfg = fast_config(dir.path());
    cfg.login_wait = std::time::Duration::from_millis(200);

    let port = FakePort::new(state);
    let engine = FillEngine::new(Arc::new(port), cfg);

    let err = engine.run("a title", &[]).await.unwrap_err();
    assert!(matches!(err, EngineError::ReadinessTimeout(_)));
}
