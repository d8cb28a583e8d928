//! Query tokenizer: splits on spaces outside parentheses

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Treatment of a `)` that has no matching `(` before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParenPolicy {
    /// Depth goes negative; spaces stay unsplit until a later `(` brings it back to zero.
    #[default]
    Preserve,
    /// Depth never drops below zero; a stray `)` is an ordinary character.
    Clamp,
}

/// Splits `input` on depth-0 spaces with the default [`ParenPolicy::Preserve`].
pub fn split_query_text(input: &str) -> DomainResult<Vec<&str>> {
    split_query_text_with(input, ParenPolicy::Preserve)
}

/// Splits `input` on spaces that are not inside a parenthesized span.
///
/// Parentheses are kept verbatim in the terms. Every split point yields a
/// boundary, so consecutive spaces produce empty terms and an empty input
/// yields a single empty term.
#[instrument(level = "trace")]
pub fn split_query_text_with(input: &str, policy: ParenPolicy) -> DomainResult<Vec<&str>> {
    let mut split_points: Vec<usize> = Vec::new();
    let mut depth: i64 = 0;

    for (position, byte) in input.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                if depth > 0 || policy == ParenPolicy::Preserve {
                    depth -= 1;
                }
            }
            b' ' if depth == 0 => {
                split_points
                    .try_reserve(1)
                    .map_err(|source| DomainError::AllocationFailure {
                        what: "split points",
                        source,
                    })?;
                split_points.push(position);
            }
            _ => {}
        }
    }

    let mut terms = Vec::new();
    terms
        .try_reserve_exact(split_points.len() + 1)
        .map_err(|source| DomainError::AllocationFailure {
            what: "terms",
            source,
        })?;

    let mut start = 0;
    for &split in &split_points {
        terms.push(&input[start..split]);
        start = split + 1;
    }
    terms.push(&input[start..]);

    Ok(terms)
}

/// Validates `bytes` as UTF-8 and splits the text like [`split_query_text_with`].
pub fn split_query_bytes(bytes: &[u8], policy: ParenPolicy) -> DomainResult<Vec<&str>> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        DomainError::InvalidArgument(format!("query text is not valid UTF-8: {e}"))
    })?;
    split_query_text_with(text, policy)
}
