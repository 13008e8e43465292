//! Detection of skill requests in model output.

use serde::Deserialize;
use serde_json::Value;

use digest_types::clean_response;

/// Documentation the model asked for before producing its final answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    pub skills_needed: Vec<String>,
    /// Partial chat text sent alongside the request (chat variant)
    #[serde(default)]
    pub text: Option<String>,
}

/// Parse a reply of the form `{"skillsNeeded": [...]}` or the chat variant
/// `{"text": "", "updates": null, "skillsNeeded": [...]}`.
///
/// Returns `None` when the reply is not a skill request or names no skills.
/// Markdown code fences around the JSON are tolerated.
pub fn parse_skill_request(reply: &str) -> Option<SkillRequest> {
    let value: Value = serde_json::from_str(&clean_response(reply)).ok()?;
    value.get("skillsNeeded")?;

    let request: SkillRequest = serde_json::from_value(value).ok()?;
    if request.skills_needed.is_empty() {
        None
    } else {
        Some(request)
    }
}
