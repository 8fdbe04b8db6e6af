//! Conviction scoring: a tunable heuristic ranking of how strongly a
//! transaction suggests informed insider confidence, on a 0–5 scale.

use std::collections::HashMap;

use crate::models::{Signal, TransactionRecord};

pub const MAX_SCORE: f64 = 5.0;

/// Score one record. `insider_count` is the number of transactions the
/// same insider has in the current batch.
///
/// Contributions: purchase +3.0, grant/award +0.5, sale −1.0; value tiers
/// >$1M +2.0, >$100k +1.0, >$10k +0.5; disposal-flagged ownership −0.5,
/// anything else +1.0; repeat insider +1.0. Clamped to [0, 5].
pub fn score_transaction(record: &TransactionRecord, insider_count: usize) -> (f64, Signal) {
    let mut score: f64 = 0.0;

    match record.transaction_code.as_str() {
        "P" => score += 3.0,
        "A" => score += 0.5,
        "S" => score -= 1.0,
        // Disposition (D) direction comes in through the ownership flag.
        _ => {}
    }

    if record.total_value > 1_000_000.0 {
        score += 2.0;
    } else if record.total_value > 100_000.0 {
        score += 1.0;
    } else if record.total_value > 10_000.0 {
        score += 0.5;
    }

    if record.ownership_type == "D" {
        score -= 0.5;
    } else {
        score += 1.0;
    }

    if insider_count > 1 {
        score += 1.0;
    }

    let score = score.clamp(0.0, MAX_SCORE);
    (score, signal_for(score))
}

/// Thresholds are fixed fractions (0.8 / 0.6 / 0.4 / 0.2) of the scale.
fn signal_for(score: f64) -> Signal {
    if score >= 4.0 {
        Signal::StrongBuy
    } else if score >= 3.0 {
        Signal::Buy
    } else if score >= 2.0 {
        Signal::WeakBuy
    } else if score <= 1.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Score a whole batch. The repeat-insider feature is batch-relative, so
/// this must only run after every document has been processed. Returns
/// the records sorted by descending conviction.
pub fn score_batch(records: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in &records {
        *counts.entry(r.insider_name.clone()).or_default() += 1;
    }

    let mut scored: Vec<TransactionRecord> = records
        .into_iter()
        .map(|mut r| {
            let count = counts.get(&r.insider_name).copied().unwrap_or(1);
            let (score, signal) = score_transaction(&r, count);
            r.conviction_score = score;
            r.signal = signal;
            r
        })
        .collect();

    scored.sort_by(|a, b| {
        b.conviction_score
            .partial_cmp(&a.conviction_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

// ── Tests ─────────────────────────────────────────────────────────────────────
