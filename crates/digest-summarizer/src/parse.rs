//! Parsing model output into a [`SummaryDocument`].

use serde_json::Value;

use digest_types::{clean_response, SummaryDocument};

use crate::error::SummarizeError;

/// Parse the cleaned reply as a JSON object, or `None` when it is not one.
pub(crate) fn parse_json_object(response: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(&clean_response(response)).ok()?;
    value.is_object().then_some(value)
}

/// Parse a summarization reply.
///
/// Anything that is not a JSON object is reported as
/// [`SummarizeError::TextResponse`] carrying the cleaned text, so callers
/// can show it as conversational output.
pub fn parse_summary_response(response: &str) -> Result<SummaryDocument, SummarizeError> {
    match parse_json_object(response) {
        Some(value) => Ok(SummaryDocument::from_value(&value)),
        None => Err(SummarizeError::TextResponse(clean_response(response))),
    }
}
