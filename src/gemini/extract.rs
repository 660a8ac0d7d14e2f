use tracing::warn;

use super::types::GenerateContentResponse;

/// Text of the first candidate, parts concatenated as returned.
/// `None` when the model produced nothing (safety block or empty response).
pub fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.as_ref().and_then(|c| c.first());

    let text = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty());

    if text.is_none() {
        let block_reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref());
        let finish_reason = candidate.and_then(|c| c.finish_reason.as_deref());
        warn!(
            block_reason = block_reason.unwrap_or("none"),
            finish_reason = finish_reason.unwrap_or("none"),
            "Gemini returned empty text"
        );
    }

    text
}
