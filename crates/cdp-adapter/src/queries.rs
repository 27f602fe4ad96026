//! In-page location scripts.
//!
//! Every locator runs as one evaluation that finds its element and tags it
//! with [`REF_ATTR`]; later interactions address the tag by selector. The
//! scripts normalize whitespace the way the resolver's containment rules
//! expect and only ever consider elements that actually render.

/// Private attribute used to keep located controls addressable.
pub const REF_ATTR: &str = "data-issueform-ref";

/// Most option items a single scan will tag.
pub const MAX_OPTIONS: u64 = 64;

pub fn selector_for(reference: u64) -> String {
    format!("[{REF_ATTR}=\"{reference}\"]")
}

fn js_str(value: &str) -> String {
    serde_json::to_string(value).expect("string serialization is infallible")
}

const HELPERS: &str = r#"
    const norm = (t) => (t || '').replace(/\s+/g, ' ').trim();
    const visible = (el) => {
        const r = el.getBoundingClientRect();
        return r.width > 0 && r.height > 0;
    };
"#;

/// Label element matched by text, control bound through its `for` attribute.
pub fn control_for_label(label: &str, exact: bool, reference: u64) -> String {
    format!(
        r#"(() => {{
            {HELPERS}
            const want = {want};
            const hit = Array.from(document.querySelectorAll('label')).find((l) =>
                {exact} ? norm(l.textContent) === want : norm(l.textContent).includes(want));
            if (!hit) return false;
            const id = hit.getAttribute('for');
            if (!id) return false;
            const el = document.getElementById(id);
            if (!el) return false;
            el.setAttribute('{REF_ATTR}', '{reference}');
            return true;
        }})()"#,
        want = js_str(label),
    )
}

/// Control whose accessible name (aria-label / aria-labelledby) matches.
pub fn control_by_accessible_name(label: &str, exact: bool, reference: u64) -> String {
    format!(
        r#"(() => {{
            {HELPERS}
            const want = {want};
            const accName = (el) => {{
                const aria = el.getAttribute('aria-label');
                if (aria) return norm(aria);
                const refs = el.getAttribute('aria-labelledby');
                if (refs) {{
                    return norm(refs.split(/\s+/).map((id) => {{
                        const node = document.getElementById(id);
                        return node ? node.textContent : '';
                    }}).join(' '));
                }}
                return '';
            }};
            const candidates = Array.from(document.querySelectorAll(
                'input, textarea, select, button, [role="combobox"], [contenteditable="true"]'));
            const hit = candidates.find((el) => {{
                const name = accName(el);
                if (!name) return false;
                return {exact} ? name === want : name.includes(want);
            }});
            if (!hit) return false;
            hit.setAttribute('{REF_ATTR}', '{reference}');
            return true;
        }})()"#,
        want = js_str(label),
    )
}

/// Nearest following interactive control after the label text in document
/// order. The deepest node containing the text anchors the scan, so a
/// page-wide wrapper does not shadow the actual label.
pub fn control_following_label(label: &str, reference: u64) -> String {
    format!(
        r#"(() => {{
            {HELPERS}
            const want = {want};
            const anchors = Array.from(document.querySelectorAll(
                'label, legend, h1, h2, h3, h4, p, span, div, dt'))
                .filter((n) => norm(n.textContent).includes(want));
            const leaves = anchors.filter((n) =>
                !anchors.some((m) => m !== n && n.contains(m)));
            const anchor = leaves[0];
            if (!anchor) return false;
            const controls = Array.from(document.querySelectorAll(
                'textarea, input[type="text"], input:not([type]), button'));
            const after = controls.find((c) =>
                (anchor.compareDocumentPosition(c) & Node.DOCUMENT_POSITION_FOLLOWING) !== 0);
            if (!after) return false;
            after.setAttribute('{REF_ATTR}', '{reference}');
            return true;
        }})()"#,
        want = js_str(label),
    )
}

/// First visible element in one of the roles, optionally filtered by
/// lowercase text containment.
pub fn find_by_role(roles: &[&str], text_lower: Option<&str>, reference: u64) -> String {
    let selector = roles
        .iter()
        .flat_map(|role| match *role {
            // Native elements carry these roles implicitly.
            "button" => vec![
                "[role=\"button\"]".to_string(),
                "button".to_string(),
                "input[type=\"submit\"]".to_string(),
            ],
            "heading" => vec![
                "[role=\"heading\"]".to_string(),
                "h1".to_string(),
                "h2".to_string(),
                "h3".to_string(),
            ],
            other => vec![format!("[role=\"{other}\"]")],
        })
        .collect::<Vec<_>>()
        .join(", ");
    let want = match text_lower {
        Some(text) => js_str(text),
        None => "null".to_string(),
    };
    format!(
        r#"(() => {{
            {HELPERS}
            const want = {want};
            const matches = Array.from(document.querySelectorAll({selector_json}))
                .filter(visible);
            const hit = want === null
                ? matches[0]
                : matches.find((el) => norm(el.textContent).toLowerCase().includes(want)
                    || norm(el.value).toLowerCase().includes(want));
            if (!hit) return false;
            hit.setAttribute('{REF_ATTR}', '{reference}');
            return true;
        }})()"#,
        selector_json = js_str(&selector),
    )
}

/// First element carrying `attribute == value`.
pub fn control_by_attr(attribute: &str, value: &str, reference: u64) -> String {
    let selector = format!("[{attribute}={}]", js_str(value));
    format!(
        r#"(() => {{
            const el = document.querySelector({selector_json});
            if (!el) return false;
            el.setAttribute('{REF_ATTR}', '{reference}');
            return true;
        }})()"#,
        selector_json = js_str(&selector),
    )
}

/// Tag visible option items and return their texts, scoped to the tagged
/// container when one is given. Item i gets reference `base + i`.
pub fn option_items(scope: Option<u64>, base: u64) -> String {
    let scope_expr = match scope {
        Some(reference) => format!(
            "document.querySelector({}) || document",
            js_str(&selector_for(reference))
        ),
        None => "document".to_string(),
    };
    format!(
        r#"(() => {{
            {HELPERS}
            const scope = {scope_expr};
            const items = Array.from(scope.querySelectorAll(
                '[role="option"], [role="menuitem"], [role="menuitemradio"]'))
                .filter(visible)
                .slice(0, {MAX_OPTIONS});
            return items.map((el, i) => {{
                el.setAttribute('{REF_ATTR}', String({base} + i));
                return norm(el.textContent);
            }});
        }})()"#,
    )
}

/// Form value of the tagged control, falling back to visible text.
pub fn read_value(reference: u64) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            if (!el) return '';
            const v = el.value;
            return (v === undefined || v === null) ? (el.textContent || '') : String(v);
        }})()"#,
        selector = js_str(&selector_for(reference)),
    )
}

/// Normalized visible text of the tagged control.
pub fn read_text(reference: u64) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            return el ? (el.textContent || '').replace(/\s+/g, ' ').trim() : '';
        }})()"#,
        selector = js_str(&selector_for(reference)),
    )
}

/// Attribute of the tagged control, `null` when absent.
pub fn read_attribute(reference: u64, name: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            return el ? el.getAttribute({name}) : null;
        }})()"#,
        selector = js_str(&selector_for(reference)),
        name = js_str(name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_json_escaped() {
        let js = control_for_label("What's \"wrong\"?", true, 7);
        assert!(js.contains(r#""What's \"wrong\"?""#));
        assert!(js.contains("data-issueform-ref"));
        assert!(js.contains("'7'"));
    }

    #[test]
    fn test_role_selector_expands_native_elements() {
        let js = find_by_role(&["button"], Some("create"), 1);
        assert!(js.contains("input[type=\\\"submit\\\"]"));
        let js = find_by_role(&["menu", "listbox"], None, 2);
        assert!(js.contains("[role=\\\"menu\\\"]"));
        assert!(js.contains("[role=\\\"listbox\\\"]"));
    }

    #[test]
    fn test_option_scan_is_bounded() {
        let js = option_items(Some(3), 100);
        assert!(js.contains("slice(0, 64)"));
        assert!(js.contains("100 + i"));
    }
}
