//! Join insider-transaction records with transcript sentiment.

use tracing::debug;

use crate::form4::cleaner::parse_flexible_date;
use crate::models::{CorrelationRow, SentimentScore, Signal, TransactionRecord};

/// Pair every sentiment score with the same ticker's trades that fall
/// within ± `window_days` of the transcript date. Trades whose date
/// string cannot be parsed are left out of the correlation, not errors.
pub fn correlate(
    trades: &[TransactionRecord],
    scores: &[SentimentScore],
    window_days: i64,
) -> Vec<CorrelationRow> {
    let mut rows = Vec::new();

    for score in scores {
        for trade in trades.iter().filter(|t| t.ticker == score.ticker) {
            let Some(trade_date) = parse_flexible_date(&trade.transaction_date) else {
                debug!(
                    "unparseable transaction date {:?} for {}",
                    trade.transaction_date, trade.ticker
                );
                continue;
            };

            let days_from_earnings = (trade_date - score.date).num_days();
            if days_from_earnings.abs() > window_days {
                continue;
            }

            rows.push(CorrelationRow {
                ticker: score.ticker.clone(),
                sentiment_date: score.date,
                transaction_date: trade.transaction_date.clone(),
                days_from_earnings,
                sentiment: score.sentiment,
                confidence: score.confidence,
                insider_name: trade.insider_name.clone(),
                transaction_code: trade.transaction_code.clone(),
                total_value: trade.total_value,
                conviction_score: trade.conviction_score,
                signal: trade.signal,
                alignment: assess_alignment(score, trade),
                key_phrases: score.key_phrases.clone(),
            });
        }
    }

    rows
}

fn assess_alignment(score: &SentimentScore, trade: &TransactionRecord) -> String {
    let sentiment_positive = score.sentiment == crate::models::Sentiment::Bullish;
    let trade_positive = matches!(
        trade.signal,
        Signal::StrongBuy | Signal::Buy | Signal::WeakBuy
    );

    match (sentiment_positive, trade_positive) {
        (true, true) => "Aligned Positive".to_string(),
        (false, false) => "Aligned Negative".to_string(),
        (true, false) => "Contrarian (Positive Sentiment, Negative Trade)".to_string(),
        (false, true) => "Contrarian (Negative Sentiment, Positive Trade)".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sentiment, TransactionKind};
    use chrono::NaiveDate;

    fn trade(ticker: &str, date: &str, signal: Signal) -> TransactionRecord {
        TransactionRecord {
            company_name: format!("{} Inc.", ticker),
            ticker: ticker.to_string(),
            issuer_cik: String::new(),
            insider_name: "DOE JANE".to_string(),
            insider_cik: String::new(),
            transaction_date: date.to_string(),
            transaction_code: "P".to_string(),
            shares: 100.0,
            price_per_share: 10.0,
            total_value: 1000.0,
            ownership_type: "A".to_string(),
            security_title: "Common Stock".to_string(),
            transaction_type: TransactionKind::NonDerivative,
            conviction_score: 4.0,
            signal,
            source_file: "t.xml".to_string(),
        }
    }

    fn score(ticker: &str, date: NaiveDate, sentiment: Sentiment) -> SentimentScore {
        SentimentScore {
            ticker: ticker.to_string(),
            date,
            sentiment,
            confidence: 0.8,
            positive_hits: 4,
            negative_hits: 1,
            key_phrases: String::new(),
        }
    }

    #[test]
    fn joins_only_inside_the_window() {
        let earnings = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let trades = vec![
            trade("AAPL", "2025-03-11", Signal::StrongBuy), // +10 days
            trade("AAPL", "2025-04-10", Signal::StrongBuy), // +40 days
            trade("MSFT", "2025-03-05", Signal::StrongBuy), // wrong ticker
        ];
        let scores = vec![score("AAPL", earnings, Sentiment::Bullish)];

        let rows = correlate(&trades, &scores, 30);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days_from_earnings, 10);
        assert_eq!(rows[0].alignment, "Aligned Positive");
    }

    #[test]
    fn trades_before_the_call_also_join() {
        let earnings = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let trades = vec![trade("AAPL", "2025-02-20", Signal::Sell)];
        let scores = vec![score("AAPL", earnings, Sentiment::Bullish)];

        let rows = correlate(&trades, &scores, 30);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days_from_earnings, -9);
        assert_eq!(
            rows[0].alignment,
            "Contrarian (Positive Sentiment, Negative Trade)"
        );
    }

    #[test]
    fn bearish_sentiment_with_sell_signal_aligns_negative() {
        let earnings = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let trades = vec![trade("AAPL", "2025-03-02", Signal::Sell)];
        let scores = vec![score("AAPL", earnings, Sentiment::Bearish)];

        let rows = correlate(&trades, &scores, 30);
        assert_eq!(rows[0].alignment, "Aligned Negative");
    }

    #[test]
    fn unparseable_trade_dates_are_dropped() {
        let earnings = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let trades = vec![trade("AAPL", "sometime in March", Signal::Buy)];
        let scores = vec![score("AAPL", earnings, Sentiment::Bullish)];

        assert!(correlate(&trades, &scores, 30).is_empty());
    }
}
