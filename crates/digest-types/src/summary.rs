//! The structured summary document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trade-offs discussed by the content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProsAndCons {
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

/// Canonical output of summarization.
///
/// Required fields are always present (empty when the model omitted them);
/// only the `Option` fields may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    #[serde(default)]
    pub tldr: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    /// Markdown
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notable_quotes: Vec<String>,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pros_and_cons: Option<ProsAndCons>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_highlights: Option<Vec<String>>,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Custom sections added through chat refinement (title -> markdown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_sections: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
}

impl SummaryDocument {
    /// Build a document from loosely-shaped model output.
    ///
    /// Missing or wrongly-typed fields fall back to their empty value
    /// instead of failing the whole document.
    pub fn from_value(value: &Value) -> Self {
        Self {
            tldr: string_field(value, "tldr"),
            key_takeaways: string_list(value.get("keyTakeaways")).unwrap_or_default(),
            summary: string_field(value, "summary"),
            notable_quotes: string_list(value.get("notableQuotes")).unwrap_or_default(),
            conclusion: string_field(value, "conclusion"),
            pros_and_cons: pros_and_cons(value.get("prosAndCons")),
            fact_check: optional_string(value, "factCheck"),
            comments_highlights: string_list(value.get("commentsHighlights")),
            related_topics: string_list(value.get("relatedTopics")).unwrap_or_default(),
            tags: string_list(value.get("tags")).unwrap_or_default(),
            extra_sections: extra_sections(value.get("extraSections")),
            source_language: optional_string(value, "sourceLanguage"),
            summary_language: optional_string(value, "summaryLanguage"),
            translated_title: optional_string(value, "translatedTitle"),
            inferred_title: optional_string(value, "inferredTitle"),
            inferred_author: optional_string(value, "inferredAuthor"),
            inferred_publish_date: optional_string(value, "inferredPublishDate"),
            llm_provider: optional_string(value, "llmProvider"),
            llm_model: optional_string(value, "llmModel"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    optional_string(value, key).unwrap_or_default()
}

fn optional_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Array of strings; non-string entries are skipped, non-arrays yield `None`.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn pros_and_cons(value: Option<&Value>) -> Option<ProsAndCons> {
    let value = value?;
    if !value.is_object() {
        return None;
    }
    Some(ProsAndCons {
        pros: string_list(value.get("pros")).unwrap_or_default(),
        cons: string_list(value.get("cons")).unwrap_or_default(),
    })
}

fn extra_sections(value: Option<&Value>) -> Option<BTreeMap<String, String>> {
    let map = value?.as_object()?;
    let sections: BTreeMap<String, String> = map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|text| (clean_section_key(k), text.to_string())))
        .collect();

    if sections.is_empty() {
        None
    } else {
        Some(sections)
    }
}

/// Strip markdown bold markers the model sometimes wraps section titles in.
fn clean_section_key(key: &str) -> String {
    let trimmed = key.trim();
    for marker in ["**", "__"] {
        if let Some(inner) = trimmed
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
        {
            if !inner.is_empty() {
                return inner.trim().to_string();
            }
        }
    }
    trimmed.to_string()
}
