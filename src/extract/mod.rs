//! Fenced-JSON extraction from free-form model output.
//!
//! Chat models that cannot be constrained to a schema are asked to wrap their
//! answer in a fenced block:
//!
//! ````text
//! Here you go:
//! ```json
//! {"name": "Ada"}
//! ```
//! ````
//!
//! [`extract`] finds every such block, in order, and decodes each one. It is
//! all-or-nothing: one bad block fails the whole call with
//! [`StructuraError::MalformedPayload`].

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, StructuraError};

/// Opening marker of a JSON code fence.
pub const JSON_FENCE_OPEN: &str = "```json";
/// Closing marker of any code fence.
pub const FENCE_CLOSE: &str = "```";

static DEFAULT_EXTRACTOR: LazyLock<FenceExtractor> = LazyLock::new(|| {
    FenceExtractor::new(FenceMarkers::default()).expect("default fence markers must compile")
});

/// A literal delimiter pair around an embedded structured block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceMarkers {
    pub open: String,
    pub close: String,
}

impl FenceMarkers {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for FenceMarkers {
    fn default() -> Self {
        Self::new(JSON_FENCE_OPEN, FENCE_CLOSE)
    }
}

/// Extracts blocks delimited by a fixed pair of markers.
///
/// Matching is non-overlapping and lazy: each block ends at the nearest close
/// marker after its opener, and blocks may span any number of lines.
#[derive(Debug, Clone)]
pub struct FenceExtractor {
    markers: FenceMarkers,
    pattern: Regex,
}

impl FenceExtractor {
    /// Build an extractor for the given markers. Markers are matched literally.
    pub fn new(markers: FenceMarkers) -> Result<Self> {
        if markers.open.is_empty() || markers.close.is_empty() {
            return Err(StructuraError::InvalidArgument(
                "fence markers must not be empty".into(),
            ));
        }
        let source = format!(
            "(?s){}(.*?){}",
            regex::escape(&markers.open),
            regex::escape(&markers.close)
        );
        let pattern = Regex::new(&source)
            .map_err(|e| StructuraError::InvalidArgument(format!("fence markers: {e}")))?;
        Ok(Self { markers, pattern })
    }

    pub fn markers(&self) -> &FenceMarkers {
        &self.markers
    }

    /// Raw contents of every fenced block, trimmed, in source order.
    pub fn blocks<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    }

    /// Decode every fenced block as a JSON value.
    pub fn extract(&self, text: &str) -> Result<Vec<Value>> {
        self.extract_as(text)
    }

    /// Decode every fenced block straight into `T`.
    pub fn extract_as<T: DeserializeOwned>(&self, text: &str) -> Result<Vec<T>> {
        self.blocks(text)
            .into_iter()
            .enumerate()
            .map(|(index, block)| {
                serde_json::from_str::<T>(block).map_err(|e| {
                    warn!(index, error = %e, "fenced block is not valid JSON");
                    StructuraError::malformed(text, e)
                })
            })
            .collect()
    }
}

/// Contents of every `` ```json `` block in `text`, trimmed, without decoding.
pub fn fenced_blocks(text: &str) -> Vec<&str> {
    DEFAULT_EXTRACTOR.blocks(text)
}

/// Decode every `` ```json `` block in `text`.
///
/// Returns an empty vector when there are no blocks. Fails with
/// `MalformedPayload` (carrying `text`) if any block is not valid JSON.
pub fn extract(text: &str) -> Result<Vec<Value>> {
    DEFAULT_EXTRACTOR.extract(text)
}

/// Like [`extract`], decoding each block into `T`.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    DEFAULT_EXTRACTOR.extract_as(text)
}

/// Decode a single JSON document from a model response.
///
/// The whole trimmed response is tried first, so a bare JSON answer whose
/// strings happen to mention a fence is taken as-is. Failing that, the first
/// `` ```json `` block is used, or the inside of a bare code fence wrapping
/// the whole response.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let whole_error = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let fallback = fenced_blocks(text)
        .first()
        .copied()
        .or_else(|| strip_bare_fence(trimmed));
    let error = match fallback {
        Some(candidate) => match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        },
        None => whole_error,
    };

    warn!(error = %error, "model response is not valid JSON");
    Err(StructuraError::malformed(text, error))
}

fn strip_bare_fence(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix(FENCE_CLOSE)
        .and_then(|rest| rest.strip_suffix(FENCE_CLOSE))
        .map(str::trim)
}
