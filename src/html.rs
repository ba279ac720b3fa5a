//! Shared helpers for the standalone HTML artifacts.
//!
//! Pages are const templates with `__NAME__` placeholders. We avoid `format!()`
//! for whole pages because embedded CSS and JS are full of `{}`.

use serde::Serialize;

/// JSON safe to place inside a `<script>` element.
pub fn json_for_script<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/").replace("<!--", "\\u003c!--"))
}

/// Script source safe to place between `<script>` and `</script>`.
///
/// Only `</script` (any case) is rewritten, to `<\/script`. Other `</`
/// sequences are left as they are.
pub fn script_body(js: &str) -> String {
    const END_TAG: &str = "</script";
    let lower = js.to_ascii_lowercase();
    let mut out = String::with_capacity(js.len());
    let mut last = 0;
    for (at, _) in lower.match_indices(END_TAG) {
        out.push_str(&js[last..at]);
        out.push_str("<\\/");
        out.push_str(&js[at + 2..at + END_TAG.len()]);
        last = at + END_TAG.len();
    }
    out.push_str(&js[last..]);
    out
}

/// Substitute each `(placeholder, value)` pair in order.
pub fn fill_template(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in pairs {
        out = out.replace(key, value);
    }
    out
}
