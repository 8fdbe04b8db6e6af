//! EDGAR document fetcher. Network is an external collaborator: nothing
//! in the extraction core depends on this module — it only fills the
//! raw-XML input directory that the batch pipeline reads.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::RngExt;
use serde::Deserialize;
use tokio::time::sleep;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetcherConfig;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable filing source abstraction.
#[async_trait]
pub trait FilingSource: Send + Sync {
    async fn recent_form4_filings(&self, cik: &str) -> Result<Vec<FilingRef>>;
    async fn fetch_document(&self, filing: &FilingRef) -> Result<String>;
}

/// One Form 4 filing as listed by the submissions index.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingRef {
    pub cik: String,
    pub accession: String,
    pub primary_document: String,
    pub filed: String,
}

// ── EDGAR wire format ─────────────────────────────────────────────────────────

/// The submissions endpoint returns recent filings as parallel arrays,
/// one entry per filing across every column.
#[derive(Debug, Deserialize)]
struct SubmissionsIndex {
    filings: Filings,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: RecentFilings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    accession_number: Vec<String>,
    form: Vec<String>,
    primary_document: Vec<String>,
    filing_date: Vec<String>,
}

// ── EDGAR client ──────────────────────────────────────────────────────────────

pub struct EdgarClient {
    inner: reqwest::Client,
    config: FetcherConfig,
}

impl EdgarClient {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Submissions index URL for a CIK, zero-padded to the 10 digits the
    /// endpoint expects.
    fn submissions_url(&self, cik: &str) -> Result<Url> {
        let padded = format!("CIK{:0>10}.json", cik.trim_start_matches('0'));
        Url::parse(&self.config.submissions_url)
            .and_then(|u| u.join(&format!("/submissions/{}", padded)))
            .context("Bad submissions URL")
    }

    /// Archive URL for one filing document.
    fn document_url(&self, filing: &FilingRef) -> Result<Url> {
        let accession = filing.accession.replace('-', "");
        let path = format!(
            "/Archives/edgar/data/{}/{}/{}",
            filing.cik.trim_start_matches('0'),
            accession,
            filing.primary_document
        );
        Url::parse(&self.config.archives_url)
            .and_then(|u| u.join(&path))
            .context("Bad archive URL")
    }

    /// Fetch a URL as text with rate-limiting and retry.
    async fn get_text(&self, url: &Url) -> Result<String> {
        self.polite_delay().await;

        let strategy = ExponentialBackoff::from_millis(self.config.request_delay_ms)
            .map(jitter)
            .take(self.config.max_retries as usize);

        let text = Retry::spawn(strategy, || async {
            debug!("GET {}", url);
            let resp = self.inner.get(url.clone()).send().await?;
            let status = resp.status();
            if !status.is_success() {
                warn!("HTTP {} for {}", status, url);
                return Err(anyhow!("HTTP {}", status));
            }
            resp.text().await.context("Failed to read response body")
        })
        .await
        .with_context(|| format!("All retries exhausted for {}", url))?;

        Ok(text)
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        let jitter_ms = rand::rng().random_range(0..=self.config.jitter_ms);
        sleep(Duration::from_millis(self.config.request_delay_ms + jitter_ms)).await;
    }
}

#[async_trait]
impl FilingSource for EdgarClient {
    async fn recent_form4_filings(&self, cik: &str) -> Result<Vec<FilingRef>> {
        let url = self.submissions_url(cik)?;
        info!("Fetching submissions index for CIK {}", cik);

        let body = self.get_text(&url).await?;
        let index: SubmissionsIndex =
            serde_json::from_str(&body).context("Unexpected submissions index shape")?;
        let recent = index.filings.recent;

        let filings: Vec<FilingRef> = recent
            .form
            .iter()
            .enumerate()
            .filter(|(_, form)| form.as_str() == "4")
            .filter_map(|(i, _)| {
                Some(FilingRef {
                    cik: cik.to_string(),
                    accession: recent.accession_number.get(i)?.clone(),
                    primary_document: recent.primary_document.get(i)?.clone(),
                    filed: recent.filing_date.get(i)?.clone(),
                })
            })
            .collect();

        info!("CIK {}: {} Form 4 filings listed", cik, filings.len());
        Ok(filings)
    }

    async fn fetch_document(&self, filing: &FilingRef) -> Result<String> {
        let url = self.document_url(filing)?;
        self.get_text(&url)
            .await
            .with_context(|| format!("fetch_document({})", filing.accession))
    }
}

/// Download up to `limit` recent Form 4 documents into `out_dir`, named
/// by accession number so re-fetches overwrite rather than duplicate.
pub async fn download_recent(
    client: &EdgarClient,
    cik: &str,
    limit: usize,
    out_dir: &std::path::Path,
) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Could not create dir {:?}", out_dir))?;

    let filings = client.recent_form4_filings(cik).await?;
    let mut saved = 0usize;

    for filing in filings.iter().take(limit) {
        match client.fetch_document(filing).await {
            Ok(text) => {
                let path = out_dir.join(format!("{}.xml", filing.accession));
                std::fs::write(&path, text)
                    .with_context(|| format!("Could not write {:?}", path))?;
                info!("Saved {} (filed {})", filing.accession, filing.filed);
                saved += 1;
            }
            Err(e) => {
                warn!("{}: {:#}", filing.accession, e);
            }
        }
    }

    Ok(saved)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
