//! CSV persistence: one report per run, plus an optional high-conviction
//! subset and the sentiment/correlation outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::models::{CorrelationRow, SentimentScore, TransactionRecord};

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn create(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Could not create dir {:?}", output_dir))?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn stamped(&self, prefix: &str) -> PathBuf {
        let ts = Utc::now().format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!("{}_{}.csv", prefix, ts))
    }

    fn write_rows<T: serde::Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to open {:?} for writing", path))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Full scored table, one row per transaction.
    pub fn write_report(&self, records: &[TransactionRecord]) -> Result<PathBuf> {
        let path = self.stamped("insider_trades");
        self.write_rows(&path, records)?;
        info!("Saved {} transactions to {:?}", records.len(), path);
        Ok(path)
    }

    /// Subset at or above the conviction threshold. Skipped entirely when
    /// nothing qualifies.
    pub fn write_high_conviction(
        &self,
        records: &[TransactionRecord],
        threshold: f64,
    ) -> Result<Option<PathBuf>> {
        let high: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| r.conviction_score >= threshold)
            .cloned()
            .collect();
        if high.is_empty() {
            return Ok(None);
        }

        let path = self.stamped("high_conviction_signals");
        self.write_rows(&path, &high)?;
        info!("Saved {} high-conviction signals to {:?}", high.len(), path);
        Ok(Some(path))
    }

    pub fn write_sentiment(&self, scores: &[SentimentScore]) -> Result<PathBuf> {
        let path = self.output_dir.join("sentiment_analysis.csv");
        self.write_rows(&path, scores)?;
        info!("Saved {} sentiment rows to {:?}", scores.len(), path);
        Ok(path)
    }

    pub fn write_correlations(&self, rows: &[CorrelationRow]) -> Result<PathBuf> {
        let path = self.output_dir.join("sentiment_insider_correlation.csv");
        self.write_rows(&path, rows)?;
        info!("Saved {} correlation rows to {:?}", rows.len(), path);
        Ok(path)
    }
}

/// Read a previously written report back; used by `stats` and `correlate`.
pub fn read_report(path: &Path) -> Result<Vec<TransactionRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open report {:?}", path))?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: TransactionRecord = row?;
        records.push(record);
    }
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Signal, TransactionKind};

    fn record(score: f64) -> TransactionRecord {
        TransactionRecord {
            company_name: "Apple Inc.".to_string(),
            ticker: "AAPL".to_string(),
            issuer_cik: "0000320193".to_string(),
            insider_name: "O'BRIEN DEIRDRE".to_string(),
            insider_cik: "0001214156".to_string(),
            transaction_date: "2025-08-08".to_string(),
            transaction_code: "S".to_string(),
            shares: 34821.0,
            price_per_share: 223.20,
            total_value: 7_772_047.20,
            ownership_type: "D".to_string(),
            security_title: "Common Stock".to_string(),
            transaction_type: TransactionKind::NonDerivative,
            conviction_score: score,
            signal: Signal::Sell,
            source_file: "wk-form4.xml".to_string(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("insider-etl-storage-{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn report_round_trips_through_csv() {
        let dir = scratch_dir("roundtrip");
        let writer = ReportWriter::create(&dir).unwrap();

        let records = vec![record(0.5), record(4.5)];
        let path = writer.write_report(&records).unwrap();

        let read_back = read_report(&path).unwrap();
        assert_eq!(read_back, records);
    }

    #[test]
    fn high_conviction_subset_respects_threshold() {
        let dir = scratch_dir("threshold");
        let writer = ReportWriter::create(&dir).unwrap();

        let records = vec![record(0.5), record(4.5)];
        let path = writer
            .write_high_conviction(&records, 4.0)
            .unwrap()
            .expect("one record qualifies");
        assert_eq!(read_report(&path).unwrap().len(), 1);

        let none = writer.write_high_conviction(&[record(1.0)], 4.0).unwrap();
        assert!(none.is_none());
    }
}
