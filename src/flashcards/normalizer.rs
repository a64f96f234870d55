//! Recovery of a flashcard array from raw model output.
//!
//! Models are asked for a bare JSON array but regularly wrap it in a
//! markdown code fence, sometimes with a language tag. This module peels
//! that known wrapper and parses what is left. It is not a markdown parser:
//! prose around the array, wrong counts or missing fields are left alone
//! and either fail the parse or pass straight through.

use super::CardRecord;

/// Opening fence markers, longest first so `json` wins over a bare fence.
const FENCE_MARKERS: &[&str] = &["```javascript", "```json", "```js", "```"];

const CLOSING_FENCE: &str = "```";

/// Remove one known opening fence and a trailing closing fence.
///
/// Input that does not start with a fence comes back trimmed but otherwise
/// unchanged.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = FENCE_MARKERS
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
    else {
        return trimmed;
    };

    let rest = rest.trim();
    rest.strip_suffix(CLOSING_FENCE).unwrap_or(rest).trim()
}

/// Turn a model reply into flashcard records. Never fails.
///
/// A reply that is not a JSON array after fence stripping yields an empty
/// vector. Elements of a valid array are returned as parsed, whatever their
/// number or shape.
pub fn normalize(raw: &str, requested_count: u32) -> Vec<CardRecord> {
    let cleaned = strip_fences(raw);

    match serde_json::from_str::<Vec<CardRecord>>(cleaned) {
        Ok(cards) => {
            if cards.len() != requested_count as usize {
                tracing::debug!(
                    requested = requested_count,
                    returned = cards.len(),
                    "Model returned a different number of cards than requested"
                );
            }
            cards
        }
        Err(e) => {
            tracing::warn!(
                name: "normalizer.parse_failed",
                error = %e,
                requested = requested_count,
                reply_len = raw.len(),
                "Model reply is not a JSON array; returning no cards"
            );
            Vec::new()
        }
    }
}
