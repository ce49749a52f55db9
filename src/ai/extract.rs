//! Pulls the JSON payload out of a free-form model reply.
//!
//! Models asked for JSON still wrap it in prose or markdown fences, so the
//! reply is searched for a fenced ```json block first and for the widest
//! `{ ... }` span second.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::AiError;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fenced block regex"));

static BRACED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("braced span regex"));

pub fn extract_json_block(text: &str) -> Result<Value, AiError> {
    if let Some(block) = FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(block.as_str()) {
            return Ok(value);
        }
    }

    let span = BRACED_SPAN
        .find(text)
        .ok_or_else(|| AiError::MalformedResponse("no JSON object in model reply".to_string()))?;

    serde_json::from_str(span.as_str()).map_err(|e| AiError::MalformedResponse(e.to_string()))
}
