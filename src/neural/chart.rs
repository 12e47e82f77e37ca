//! Chart config extraction from model output.

use serde_json::Value;

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

/// Body of the first ```json fenced block, if any and non-empty.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    let block = &rest[..end];
    (!block.is_empty()).then_some(block)
}

/// Parse the fenced chart config; malformed JSON is logged and dropped.
pub fn parse_chart_config(text: &str) -> Option<Value> {
    let block = extract_json_block(text)?;
    match serde_json::from_str(block) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = %e, "Model returned an unparsable chart config");
            None
        }
    }
}
