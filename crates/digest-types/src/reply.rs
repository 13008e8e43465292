//! Cleanup of raw model replies before they are parsed.

use std::sync::OnceLock;

use regex::Regex;

fn opening_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```(?:json)?\s*\n?").expect("fence pattern is valid"))
}

fn closing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n?```\s*$").expect("fence pattern is valid"))
}

/// Trim the reply and strip a surrounding markdown code fence, if any.
pub fn clean_response(response: &str) -> String {
    let cleaned = response.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }
    let without_open = opening_fence().replace(cleaned, "");
    closing_fence().replace(&without_open, "").into_owned()
}
