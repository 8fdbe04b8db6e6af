use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Issuer / owner ────────────────────────────────────────────────────────────

/// Company whose securities were transacted. One per filing, shared by
/// every transaction extracted from that filing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuerInfo {
    pub name: String,
    pub trading_symbol: String,
    pub cik: String,
}

impl Default for IssuerInfo {
    fn default() -> Self {
        Self {
            name: "UNKNOWN".to_string(),
            trading_symbol: "UNKNOWN".to_string(),
            cik: String::new(),
        }
    }
}

/// Reporting insider. Only the first reporting owner of a filing is
/// supported; multi-owner filings take the first block found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerInfo {
    pub name: String,
    pub cik: String,
}

impl Default for OwnerInfo {
    fn default() -> Self {
        Self {
            name: "UNKNOWN".to_string(),
            cik: String::new(),
        }
    }
}

// ── Raw transaction ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    #[default]
    #[serde(rename = "non_derivative")]
    NonDerivative,
    #[serde(rename = "derivative")]
    Derivative,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::NonDerivative => write!(f, "non_derivative"),
            TransactionKind::Derivative => write!(f, "derivative"),
        }
    }
}

/// Field values exactly as found in the document, `None` when no
/// candidate path resolved. Dates keep whatever format the filing used;
/// numbers keep separators and stray symbols. Defaults are the record
/// builder's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub kind: TransactionKind,
    pub date: Option<String>,
    pub code: Option<String>,
    pub shares: Option<String>,
    pub price: Option<String>,
    pub ownership: Option<String>,
    pub security_title: Option<String>,
}

// ── Extraction result ─────────────────────────────────────────────────────────

/// Which tier produced a document's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Structural,
    Pattern,
}

/// Everything recovered from a single filing.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub issuer: IssuerInfo,
    pub owner: OwnerInfo,
    pub transactions: Vec<RawTransaction>,
    pub strategy: Strategy,
}

// ── Final record ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Signal {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Weak Buy")]
    WeakBuy,
    #[serde(rename = "Hold")]
    Hold,
    #[serde(rename = "Sell")]
    Sell,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::StrongBuy => "Strong Buy",
            Signal::Buy => "Buy",
            Signal::WeakBuy => "Weak Buy",
            Signal::Hold => "Hold",
            Signal::Sell => "Sell",
        };
        write!(f, "{}", s)
    }
}

/// One row of the output table. Built once per raw transaction, scored
/// once per batch, never updated in place afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub company_name: String,
    pub ticker: String,
    pub issuer_cik: String,
    pub insider_name: String,
    pub insider_cik: String,
    pub transaction_date: String,
    pub transaction_code: String,
    pub shares: f64,
    pub price_per_share: f64,
    pub total_value: f64,
    pub ownership_type: String,
    pub security_title: String,
    pub transaction_type: TransactionKind,
    pub conviction_score: f64,
    pub signal: Signal,
    pub source_file: String,
}

// ── Sentiment side ────────────────────────────────────────────────────────────

/// An earnings-call transcript with just enough metadata to join on.
#[derive(Debug, Clone)]
pub struct TranscriptData {
    pub ticker: String,
    pub company_name: String,
    pub quarter: String,
    pub year: i32,
    pub date: NaiveDate,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "Bullish"),
            Sentiment::Bearish => write!(f, "Bearish"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentScore {
    pub ticker: String,
    pub date: NaiveDate,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub positive_hits: usize,
    pub negative_hits: usize,
    pub key_phrases: String,
}

/// One (transcript, trade) pair that fell inside the correlation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRow {
    pub ticker: String,
    pub sentiment_date: NaiveDate,
    pub transaction_date: String,
    pub days_from_earnings: i64,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub insider_name: String,
    pub transaction_code: String,
    pub total_value: f64,
    pub conviction_score: f64,
    pub signal: Signal,
    pub alignment: String,
    pub key_phrases: String,
}
