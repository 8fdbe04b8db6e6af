//! Form 4 extraction core: structural pass with a regex recovery tier.

pub mod cleaner;
pub mod paths;
pub mod pattern;
pub mod structural;

use roxmltree::Document;
use tracing::debug;

use crate::error::DocumentError;
use crate::models::Extraction;

/// Extract everything recoverable from one filing's text.
///
/// The structural pass runs first. The pattern tier only fires when the
/// parse succeeded but produced zero transactions — a parse failure skips
/// the document outright, so the two tiers never double-count.
pub fn parse_document(text: &str) -> Result<Extraction, DocumentError> {
    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    let doc = Document::parse(text)?;
    let extraction = structural::extract(&doc);
    if !extraction.transactions.is_empty() {
        return Ok(extraction);
    }

    debug!("structural pass found no transactions, trying pattern recovery");
    Ok(pattern::extract(text))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
