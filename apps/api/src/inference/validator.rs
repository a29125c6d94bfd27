//! Structural validation of the raw model output.
//!
//! The validator enforces schema conformance only: a JSON object with a
//! `tags` array of `{tag, evidence}` string pairs. Tag-vocabulary membership
//! and evidence length are prompt-level contracts and are not re-checked
//! here.

use crate::errors::AppError;
use crate::models::response::InferenceResult;

/// Parses raw model output into an `InferenceResult`.
/// Malformed JSON, missing fields, or type mismatches fail with a schema error.
pub fn parse_result(raw: &str) -> Result<InferenceResult, AppError> {
    let cleaned = strip_json_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| AppError::Schema(format!("출력 파싱 실패: {e}")))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
