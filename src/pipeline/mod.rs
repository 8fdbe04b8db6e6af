//! Batch orchestrator: loader → extraction → scoring → storage.
//!
//! Documents are processed strictly sequentially; every failure is
//! contained at the single-document boundary, so the batch result is
//! always a valid (possibly empty) table. The repeat-insider scoring
//! feature is batch-relative and therefore computed only after the last
//! document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::DocumentError;
use crate::form4;
use crate::form4::cleaner::build_record;
use crate::models::{Strategy, TransactionRecord};
use crate::scoring;
use crate::storage::ReportWriter;
use crate::{loader, utils};

pub struct Pipeline {
    config: AppConfig,
}

#[derive(Debug, Default)]
pub struct BatchStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_errored: usize,
    pub pattern_recovered: usize,
    pub transactions: usize,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<BatchStats> {
        let _t = utils::Timer::start("Form 4 batch");

        let input_dir = &self.config.pipeline.input_dir;
        let files = loader::discover_filing_files(input_dir)
            .with_context(|| format!("Failed to list {:?}", input_dir))?;
        info!("Found {} filing files in {:?}", files.len(), input_dir);

        let (records, stats) = self.collect_records(&files);
        let records = scoring::score_batch(records);

        let writer = ReportWriter::create(&self.config.storage.output_dir)?;
        writer.write_report(&records)?;
        writer.write_high_conviction(&records, self.config.pipeline.high_conviction_threshold)?;

        info!(
            "=== Done: {}/{} files | {} skipped | {} errors | {} transactions ({} via pattern recovery) ===",
            stats.files_processed,
            stats.files_found,
            stats.files_skipped,
            stats.files_errored,
            stats.transactions,
            stats.pattern_recovered,
        );

        Ok(stats)
    }

    /// Sequential extraction pass over the batch. Returns unscored
    /// records: scoring needs the whole batch first.
    pub fn collect_records(&self, files: &[PathBuf]) -> (Vec<TransactionRecord>, BatchStats) {
        let mut stats = BatchStats {
            files_found: files.len(),
            ..Default::default()
        };
        let mut records = Vec::new();

        for path in files {
            match self.process_file(path) {
                Ok((_, file_records)) if file_records.is_empty() => {
                    warn!("{:?}: no transactions found", path);
                    stats.files_skipped += 1;
                }
                Ok((strategy, file_records)) => {
                    info!("{:?}: {} transactions", path, file_records.len());
                    stats.files_processed += 1;
                    stats.transactions += file_records.len();
                    if strategy == Strategy::Pattern {
                        stats.pattern_recovered += 1;
                    }
                    records.extend(file_records);
                }
                Err(DocumentError::Empty) => {
                    warn!("{:?}: empty file, skipping", path);
                    stats.files_skipped += 1;
                }
                Err(e) => {
                    warn!("{:?}: {}", path, e);
                    stats.files_errored += 1;
                }
            }
        }

        (records, stats)
    }

    fn process_file(
        &self,
        path: &Path,
    ) -> Result<(Strategy, Vec<TransactionRecord>), DocumentError> {
        let text = loader::read_document_text(path)?;
        let extraction = form4::parse_document(&text)?;

        if extraction.strategy == Strategy::Pattern {
            info!("{:?}: recovered via pattern matching", path);
        }

        let source_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let file_records = extraction
            .transactions
            .iter()
            .filter_map(|raw| build_record(&extraction.issuer, &extraction.owner, raw, &source_file))
            .collect();

        Ok((extraction.strategy, file_records))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signal;

    const SAMPLE: &str = r#"<ownershipDocument>
        <issuer>
            <issuerCik>0000320193</issuerCik>
            <issuerName>Apple Inc.</issuerName>
            <issuerTradingSymbol>AAPL</issuerTradingSymbol>
        </issuer>
        <reportingOwner>
            <reportingOwnerId>
                <rptOwnerCik>0001214156</rptOwnerCik>
                <rptOwnerName>O'BRIEN DEIRDRE</rptOwnerName>
            </reportingOwnerId>
        </reportingOwner>
        <nonDerivativeTable>
            <nonDerivativeTransaction>
                <securityTitle><value>Common Stock</value></securityTitle>
                <transactionDate><value>2025-08-08</value></transactionDate>
                <transactionCoding><transactionCode>S</transactionCode></transactionCoding>
                <transactionShares><value>34821</value></transactionShares>
                <transactionPricePerShare><value>223.20</value></transactionPricePerShare>
                <ownershipNature>
                    <directOrIndirectOwnership><value>D</value></directOrIndirectOwnership>
                </ownershipNature>
            </nonDerivativeTransaction>
        </nonDerivativeTable>
    </ownershipDocument>"#;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("insider-etl-pipeline-{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(AppConfig::default())
    }

    #[test]
    fn batch_contains_failures_and_still_produces_records() {
        let dir = scratch_dir("mixed");
        std::fs::write(dir.join("good.xml"), SAMPLE).unwrap();
        std::fs::write(dir.join("empty.xml"), "").unwrap();
        std::fs::write(dir.join("broken.xml"), "<ownershipDocument><issuer>").unwrap();

        let files = loader::discover_filing_files(&dir).unwrap();
        let (records, stats) = pipeline().collect_records(&files);

        assert_eq!(stats.files_found, 3);
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_errored, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].source_file, "good.xml");
    }

    #[test]
    fn sample_sale_scores_as_a_sell() {
        let dir = scratch_dir("scenario");
        std::fs::write(dir.join("aapl.xml"), SAMPLE).unwrap();

        let files = loader::discover_filing_files(&dir).unwrap();
        let (records, _) = pipeline().collect_records(&files);
        let scored = scoring::score_batch(records);

        assert_eq!(scored.len(), 1);
        let r = &scored[0];
        assert!((r.total_value - 7_772_047.20).abs() < 1e-6);
        assert_eq!(r.transaction_type.to_string(), "non_derivative");
        assert!(matches!(r.signal, Signal::Sell | Signal::Hold));
    }

    #[test]
    fn repeated_runs_are_idempotent() {
        let dir = scratch_dir("idempotent");
        std::fs::write(dir.join("aapl.xml"), SAMPLE).unwrap();

        let files = loader::discover_filing_files(&dir).unwrap();
        let p = pipeline();
        let (first, _) = p.collect_records(&files);
        let (second, _) = p.collect_records(&files);
        assert_eq!(scoring::score_batch(first), scoring::score_batch(second));
    }

    #[test]
    fn pattern_recovery_is_counted() {
        let dir = scratch_dir("pattern");
        let xml = "<doc><![CDATA[<issuerName>Acme Corp</issuerName>\
                   <transactionDate><value>2025-03-01</value></transactionDate>\
                   <transactionCode>P</transactionCode>\
                   <transactionShares><value>1000</value></transactionShares>\
                   <transactionPricePerShare><value>25.50</value></transactionPricePerShare>]]></doc>";
        std::fs::write(dir.join("cdata.xml"), xml).unwrap();

        let files = loader::discover_filing_files(&dir).unwrap();
        let (records, stats) = pipeline().collect_records(&files);

        assert_eq!(stats.pattern_recovered, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name, "Acme Corp");
    }

    #[test]
    fn zero_share_container_is_excluded() {
        let doc = SAMPLE.replace(
            "<transactionShares><value>34821</value></transactionShares>",
            "<transactionShares><value>0</value></transactionShares>",
        );
        let dir = scratch_dir("zeroshare");
        std::fs::write(dir.join("zero.xml"), doc).unwrap();

        let files = loader::discover_filing_files(&dir).unwrap();
        let (records, stats) = pipeline().collect_records(&files);
        assert!(records.is_empty());
        assert_eq!(stats.files_skipped, 1);
    }
}
