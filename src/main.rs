mod config;
mod error;
mod fetcher;
mod form4;
mod loader;
mod models;
mod pipeline;
mod scoring;
mod sentiment;
mod storage;
mod utils;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::fetcher::EdgarClient;
use crate::models::TranscriptData;
use crate::pipeline::Pipeline;
use crate::storage::ReportWriter;

#[derive(Parser)]
#[command(name = "insider-etl", about = "SEC Form 4 insider-transaction ETL", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Process all Form 4 XML files in the input directory into a scored CSV
    Process {
        /// Override the configured input directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Download recent Form 4 filings for a CIK into the input directory
    Fetch {
        /// Central index key of the issuer or insider (e.g. 320193)
        #[arg(short, long)]
        cik: String,

        /// Maximum number of filings to download
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Correlate a scored report with earnings-call sentiment
    Correlate {
        /// Path to a previously produced insider_trades CSV
        #[arg(short, long)]
        report: PathBuf,

        /// Directory of saved transcript pages (TICKER_YYYY-MM-DD.html or
        /// .txt); canned transcripts are used when absent
        #[arg(short, long)]
        transcript_dir: Option<PathBuf>,
    },

    /// Show summary statistics for a scored report
    Stats {
        /// Path to a previously produced insider_trades CSV
        #[arg(short, long)]
        report: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "insider_etl=info,warn",
        1 => "insider_etl=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Process { dir } => {
            if let Some(dir) = dir {
                config.pipeline.input_dir = dir;
            }
            let stats = Pipeline::new(config).run()?;
            println!(
                "Done: {}/{} files, {} transactions ({} skipped, {} errors)",
                stats.files_processed,
                stats.files_found,
                stats.transactions,
                stats.files_skipped,
                stats.files_errored,
            );
        }

        Command::Fetch { cik, limit } => {
            let _t = utils::Timer::start("EDGAR fetch");
            let client = EdgarClient::new(&config.fetcher)?;
            let saved =
                fetcher::download_recent(&client, &cik, limit, &config.pipeline.input_dir).await?;
            println!("Saved {} filings to {:?}", saved, config.pipeline.input_dir);
        }

        Command::Correlate {
            report,
            transcript_dir,
        } => {
            let _t = utils::Timer::start("Sentiment correlation");
            let trades = storage::read_report(&report)?;
            info!("{} trades loaded from {:?}", trades.len(), report);

            let transcripts = match transcript_dir {
                Some(dir) => load_transcripts(&dir)?,
                None => {
                    let tickers: BTreeSet<String> =
                        trades.iter().map(|t| t.ticker.clone()).collect();
                    tickers
                        .iter()
                        .flat_map(|t| sentiment::mock_transcripts(t))
                        .collect()
                }
            };

            let scores: Vec<_> = transcripts.iter().map(sentiment::analyze).collect();
            for score in &scores {
                info!(
                    "{} {}: {} (confidence {:.2})",
                    score.ticker, score.date, score.sentiment, score.confidence
                );
            }

            let rows = sentiment::correlate::correlate(
                &trades,
                &scores,
                config.sentiment.window_days,
            );

            let writer = ReportWriter::create(&config.storage.output_dir)?;
            writer.write_sentiment(&scores)?;
            writer.write_correlations(&rows)?;
            println!(
                "{} sentiment scores, {} correlations within ±{} days",
                scores.len(),
                rows.len(),
                config.sentiment.window_days,
            );
        }

        Command::Stats { report } => {
            let records = storage::read_report(&report)?;
            print_summary(&records);
        }
    }

    Ok(())
}

/// Read saved transcript pages named `TICKER_YYYY-MM-DD.html` / `.txt`.
fn load_transcripts(dir: &PathBuf) -> Result<Vec<TranscriptData>> {
    let mut transcripts = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some((ticker, date)) = stem.split_once('_') else {
            continue;
        };
        let Some(date) = form4::cleaner::parse_flexible_date(date) else {
            continue;
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let is_html = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);
        let text = if is_html {
            sentiment::extract_transcript_text(&raw)
        } else {
            raw
        };

        transcripts.push(TranscriptData {
            ticker: ticker.to_uppercase(),
            company_name: ticker.to_uppercase(),
            quarter: String::new(),
            year: 0,
            date,
            text,
            url: path.display().to_string(),
        });
    }

    info!("{} transcripts loaded from {:?}", transcripts.len(), dir);
    Ok(transcripts)
}

fn print_summary(records: &[models::TransactionRecord]) {
    if records.is_empty() {
        println!("No records — run `insider-etl process` first.");
        return;
    }

    let companies: BTreeSet<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    let insiders: BTreeSet<&str> = records.iter().map(|r| r.insider_name.as_str()).collect();
    let volume: f64 = records.iter().map(|r| r.total_value).sum();
    let avg_score: f64 =
        records.iter().map(|r| r.conviction_score).sum::<f64>() / records.len() as f64;

    println!("─────────────────────────────────────────");
    println!("  Insider Trading Report");
    println!("─────────────────────────────────────────");
    println!("  Transactions : {}", utils::fmt_number(records.len() as i64));
    println!("  Companies    : {}", companies.len());
    println!("  Insiders     : {}", insiders.len());
    println!("  Volume       : {}", utils::fmt_money(volume));
    println!("  Avg score    : {:.2}", avg_score);
    println!("─────────────────────────────────────────");

    println!("  Signal distribution:");
    for signal in [
        models::Signal::StrongBuy,
        models::Signal::Buy,
        models::Signal::WeakBuy,
        models::Signal::Hold,
        models::Signal::Sell,
    ] {
        let count = records.iter().filter(|r| r.signal == signal).count();
        if count > 0 {
            let pct = count as f64 / records.len() as f64 * 100.0;
            println!("    {:<10} {:>4} ({:.1}%)", signal.to_string(), count, pct);
        }
    }

    println!("─────────────────────────────────────────");
    println!("  Top conviction trades:");
    for r in records.iter().take(10) {
        println!(
            "    {:<5} | {:<18.18} | {} | {:>14} | {:.1} | {}",
            r.ticker,
            r.insider_name,
            r.transaction_code,
            utils::fmt_money(r.total_value),
            r.conviction_score,
            r.signal,
        );
    }
    println!("─────────────────────────────────────────");
}
