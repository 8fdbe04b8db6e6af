//! Lexicon-based sentiment over earnings-call transcript text.
//!
//! Deliberately not an NLP pipeline: sentiment is a ratio of financial
//! keyword hits, which is cheap, deterministic and good enough to flag
//! bullish/bearish tone for correlation against insider activity.

pub mod correlate;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::models::{Sentiment, SentimentScore, TranscriptData};

const POSITIVE_KEYWORDS: &[&str] = &[
    "revenue", "growth", "profit", "strong", "excellent", "outstanding", "record", "bullish",
    "optimistic", "exceed", "beat", "momentum", "expansion", "opportunity", "confident", "robust",
    "solid", "improving", "increase", "rise", "gain", "successful", "positive", "upside",
    "breakthrough", "innovation",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "loss", "decline", "weak", "poor", "disappointing", "bearish", "pessimistic", "miss", "below",
    "concern", "challenge", "risk", "uncertainty", "volatility", "decrease", "drop", "fall",
    "struggle", "difficulty", "headwind", "pressure", "cautious", "conservative", "downside",
    "slowdown", "contraction",
];

lazy_static! {
    static ref RE_GROWTH: Regex = Regex::new(
        r"(?i)(revenue|profit|sales|earnings)[^.]*?(grew|increased|rose|jumped|surged)[^.]*?(\d+(?:\.\d+)?%)"
    )
    .unwrap();
    static ref RE_DECLINE: Regex = Regex::new(
        r"(?i)(revenue|profit|sales|earnings)[^.]*?(fell|declined|dropped|decreased)[^.]*?(\d+(?:\.\d+)?%)"
    )
    .unwrap();
    static ref RE_OUTLOOK: Regex =
        Regex::new(r"(?i)(outlook|guidance|expect|anticipate|forecast)[^.]*\.").unwrap();
}

/// Score one transcript: keyword hit counts → Bullish/Bearish/Neutral
/// with a confidence ratio.
pub fn analyze(transcript: &TranscriptData) -> SentimentScore {
    let text = transcript.text.to_lowercase();

    let positive_hits = POSITIVE_KEYWORDS.iter().filter(|w| text.contains(**w)).count();
    let negative_hits = NEGATIVE_KEYWORDS.iter().filter(|w| text.contains(**w)).count();

    let (sentiment, confidence) = classify(positive_hits, negative_hits);

    debug!(
        "{} {}: {} ({} pos / {} neg)",
        transcript.ticker, transcript.quarter, sentiment, positive_hits, negative_hits
    );

    SentimentScore {
        ticker: transcript.ticker.clone(),
        date: transcript.date,
        sentiment,
        confidence,
        positive_hits,
        negative_hits,
        key_phrases: extract_key_phrases(&transcript.text).join(", "),
    }
}

fn classify(positive: usize, negative: usize) -> (Sentiment, f64) {
    let total = positive + negative;
    if total == 0 {
        return (Sentiment::Neutral, 0.5);
    }

    let positive_ratio = positive as f64 / total as f64;
    if positive_ratio > 0.6 {
        (Sentiment::Bullish, positive_ratio)
    } else if positive_ratio < 0.4 {
        (Sentiment::Bearish, 1.0 - positive_ratio)
    } else {
        (Sentiment::Neutral, 0.5)
    }
}

/// Pull quotable fragments: "revenue grew 12%" style statements plus the
/// first few outlook sentences. Capped at ten.
fn extract_key_phrases(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();

    for caps in RE_GROWTH.captures_iter(text).chain(RE_DECLINE.captures_iter(text)) {
        phrases.push(format!("{} {} {}", &caps[1], &caps[2], &caps[3]));
    }

    phrases.extend(
        RE_OUTLOOK
            .find_iter(text)
            .take(3)
            .map(|m| m.as_str().trim().to_string()),
    );

    phrases.truncate(10);
    phrases
}

// ── Transcript text extraction ────────────────────────────────────────────────

/// Pull transcript body text out of an already-fetched HTML page. Tries
/// the selectors transcript sites actually use, most specific first.
pub fn extract_transcript_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let candidates = [
        "div[data-module='ArticleViewer']",
        "article",
        "div.article-content",
        "p",
    ];

    for selector_str in &candidates {
        let Ok(sel) = Selector::parse(selector_str) else { continue };
        let text: String = doc
            .select(&sel)
            .flat_map(|el| el.text())
            .collect::<Vec<_>>()
            .join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            return text;
        }
    }

    String::new()
}

// ── Mock transcripts ──────────────────────────────────────────────────────────

/// Canned transcripts for offline runs and demos.
pub fn mock_transcripts(ticker: &str) -> Vec<TranscriptData> {
    let texts: &[&str] = match ticker {
        "AAPL" => &[
            "We're thrilled to report record revenue this quarter. iPhone sales exceeded \
             expectations with strong demand in international markets. Our services business \
             continues to show remarkable growth. We're optimistic about the upcoming product \
             launches and see strong momentum continuing into the next quarter.",
            "This quarter presented some challenges with supply chain constraints, but our team \
             executed well. Mac sales were solid despite market headwinds. We remain cautious \
             about the near-term economic environment but are confident in our long-term strategy \
             and innovation pipeline.",
            "Outstanding quarter with double-digit growth across all product categories. Customer \
             satisfaction remains at all-time highs. We're investing heavily in AI and machine \
             learning capabilities. The market opportunity ahead of us is enormous, and we're \
             well-positioned to capitalize on it.",
        ],
        "GOOGL" => &[
            "Search revenue grew significantly this quarter, driven by mobile and video \
             advertising. Our cloud business is gaining serious traction with enterprise \
             customers. AI investments are paying off with improved ad targeting and user \
             engagement. We're bullish on the digital transformation trend.",
            "YouTube advertising revenue was exceptional this quarter. Google Cloud is showing \
             strong momentum with major enterprise wins. We're seeing good recovery in small \
             business advertising spend. Our AI capabilities continue to differentiate us in the \
             market.",
            "Solid performance across all segments. Search remains robust with healthy \
             click-through rates. Cloud infrastructure revenue exceeded expectations. We're \
             cautiously optimistic about advertising spend recovery and see strong growth \
             opportunities ahead.",
        ],
        _ => &[
            "We delivered a solid quarter with steady revenue growth and disciplined cost \
             management. Our outlook for the remainder of the year remains positive.",
        ],
    };

    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let quarter = (i % 4) as u32 + 1;
            TranscriptData {
                ticker: ticker.to_string(),
                company_name: format!("{} Inc.", ticker),
                quarter: format!("Q{}", quarter),
                year: 2024,
                date: NaiveDate::from_ymd_opt(2024, quarter, 15).expect("static date"),
                text: text.to_string(),
                url: format!(
                    "https://mock-transcript-{}-q{}.example.com",
                    ticker.to_lowercase(),
                    quarter
                ),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
