// ABOUTME: Knowledge-base file discovery and load-once caching
// ABOUTME: Resolves an ordered candidate-path list and degrades silently to an empty document
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base loading
//!
//! The service consults a single static text document when composing the
//! system prompt. The document is resolved from an explicit override or an
//! ordered list of relative candidate locations, read once at startup, and
//! shared read-only for the process lifetime. Any failure degrades to an
//! empty document; loading never fails outward.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Candidate locations tried in order, relative to the working directory
const CANDIDATE_PATHS: &[&str] = &["data/kb.txt", "../data/kb.txt", "../../data/kb.txt"];

/// Resolve the knowledge-base file path
///
/// Tries the explicit override first, then the fixed candidate list.
/// Returns the first path that exists as a regular file.
#[must_use]
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_owned());
        }
        warn!(path = %path.display(), "configured knowledge-base path is not a regular file");
    }

    CANDIDATE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Load the knowledge-base text, degrading to an empty string on any failure
#[must_use]
pub fn load(explicit: Option<&Path>) -> String {
    let Some(path) = resolve_path(explicit) else {
        warn!("knowledge base not found at any candidate path, continuing with empty document");
        return String::new();
    };

    match fs::read_to_string(&path) {
        Ok(text) => {
            info!(path = %path.display(), bytes = text.len(), "knowledge base loaded");
            text
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read knowledge base, continuing with empty document");
            String::new()
        }
    }
}

/// Health-report status string for a cached knowledge-base document
#[must_use]
pub fn status(kb_text: &str) -> &'static str {
    if kb_text.is_empty() {
        "not_found"
    } else {
        "loaded"
    }
}
