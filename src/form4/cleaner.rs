//! Normalization of raw field strings and assembly of final records.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{IssuerInfo, OwnerInfo, RawTransaction, TransactionRecord};

/// Parse a loosely formatted numeric string: strip everything except
/// digits, dot, minus. "1,234.50" → 1234.5 | "$25" → 25.0 | garbage → 0.0
///
/// Total function: filings carry partial or garbled numeric text often
/// enough that an error path would just get swallowed upstream anyway.
pub fn clean_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Parse dates as filings actually write them: ISO or a handful of
/// locale-dependent forms.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%b %d, %Y", "%d %b %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// Assemble a final record from extracted raw fields. Returns `None` for
/// shares ≤ 0 — a cancelled or zero row is not a transaction. Ownership
/// defaults to "A": absence conventionally implies acquisition.
pub fn build_record(
    issuer: &IssuerInfo,
    owner: &OwnerInfo,
    raw: &RawTransaction,
    source_file: &str,
) -> Option<TransactionRecord> {
    let shares = clean_number(raw.shares.as_deref().unwrap_or_default());
    if shares <= 0.0 {
        debug!("dropping zero-share row in {}", source_file);
        return None;
    }

    let price_per_share = clean_number(raw.price.as_deref().unwrap_or_default());
    let ownership_type = raw
        .ownership
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("A")
        .to_string();

    Some(TransactionRecord {
        company_name: issuer.name.clone(),
        ticker: issuer.trading_symbol.clone(),
        issuer_cik: issuer.cik.clone(),
        insider_name: owner.name.clone(),
        insider_cik: owner.cik.clone(),
        transaction_date: raw.date.clone().unwrap_or_default(),
        transaction_code: raw.code.as_deref().unwrap_or_default().trim().to_uppercase(),
        shares,
        price_per_share,
        total_value: shares * price_per_share,
        ownership_type,
        security_title: raw.security_title.clone().unwrap_or_default(),
        transaction_type: raw.kind,
        conviction_score: 0.0,
        signal: crate::models::Signal::Hold,
        source_file: source_file.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
