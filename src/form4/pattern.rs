//! Regex recovery for documents that parse to nothing useful.
//!
//! Best-effort degraded mode: the four field lists are captured
//! independently and zipped up to the shortest, so surplus captures are
//! dropped rather than paired up wrong. Occurrence-order correctness is
//! only as good as the underlying text's interleaving.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::{Extraction, IssuerInfo, OwnerInfo, RawTransaction, Strategy, TransactionKind};

lazy_static! {
    static ref RE_COMPANY: Regex = Regex::new(r"<issuerName[^>]*>([^<]+)").unwrap();
    static ref RE_TICKER: Regex = Regex::new(r"<issuerTradingSymbol[^>]*>([^<]+)").unwrap();
    static ref RE_OWNER: Regex = Regex::new(r"<rptOwnerName[^>]*>([^<]+)").unwrap();
    static ref RE_DATE: Regex =
        Regex::new(r"(?s)<transactionDate[^>]*>.*?<value[^>]*>([^<]+)").unwrap();
    static ref RE_CODE: Regex = Regex::new(r"<transactionCode[^>]*>([A-Z])").unwrap();
    static ref RE_SHARES: Regex =
        Regex::new(r"(?s)<transactionShares[^>]*>.*?<value[^>]*>([0-9,.\-]+)").unwrap();
    static ref RE_PRICE: Regex =
        Regex::new(r"(?s)<transactionPricePerShare[^>]*>.*?<value[^>]*>([0-9,.\-]+)").unwrap();
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn all_captures(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Scan raw text for transaction-shaped fragments. Invoked only when the
/// structural pass yields zero transactions for a parsed document.
pub fn extract(raw_text: &str) -> Extraction {
    let mut issuer = IssuerInfo::default();
    if let Some(name) = first_capture(&RE_COMPANY, raw_text) {
        issuer.name = name;
    }
    if let Some(symbol) = first_capture(&RE_TICKER, raw_text) {
        issuer.trading_symbol = symbol;
    }

    let mut owner = OwnerInfo::default();
    if let Some(name) = first_capture(&RE_OWNER, raw_text) {
        owner.name = name;
    }

    let dates = all_captures(&RE_DATE, raw_text);
    let codes = all_captures(&RE_CODE, raw_text);
    let shares = all_captures(&RE_SHARES, raw_text);
    let prices = all_captures(&RE_PRICE, raw_text);

    let usable = dates
        .len()
        .min(codes.len())
        .min(shares.len())
        .min(prices.len());

    debug!(
        "pattern pass: {} dates, {} codes, {} shares, {} prices -> {} aligned",
        dates.len(),
        codes.len(),
        shares.len(),
        prices.len(),
        usable
    );

    // The degraded tier cannot tell container kinds apart, nor see
    // ownership or title elements reliably; builder defaults apply.
    let transactions = (0..usable)
        .map(|i| RawTransaction {
            kind: TransactionKind::NonDerivative,
            date: Some(dates[i].clone()),
            code: Some(codes[i].clone()),
            shares: Some(shares[i].clone()),
            price: Some(prices[i].clone()),
            ..Default::default()
        })
        .collect();

    Extraction {
        issuer,
        owner,
        transactions,
        strategy: Strategy::Pattern,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Truncated mid-element: a structural parse of this fails outright.
    const TRUNCATED: &str = r#"<ownershipDocument>
        <issuerName>Acme Corp</issuerName>
        <issuerTradingSymbol>ACME</issuerTradingSymbol>
        <rptOwnerName>DOE JANE</rptOwnerName>
        <transactionDate><value>2025-03-01</value></transactionDate>
        <transactionCode>P</transactionCode>
        <transactionShares><value>1,000</value></transactionShares>
        <transactionPricePerShare><value>25.50</value></transactionPricePerShare>
        <transactionDate><value>2025-03-02</value></transactionDate>
        <transactionCode>S</transactionCode>
        <transactionShares><value>500</value></transactionShares>
        <transactionPricePerShare><value>26.10</value></transactionPricePerShare>
        <transactionDate><value>2025-03-03</value></transactionDate>
        <transactionCode>S</transactionCode>
    "#;

    #[test]
    fn recovers_min_length_aligned_records() {
        let got = extract(TRUNCATED);

        assert_eq!(got.strategy, Strategy::Pattern);
        assert_eq!(got.issuer.name, "Acme Corp");
        assert_eq!(got.issuer.trading_symbol, "ACME");
        assert_eq!(got.owner.name, "DOE JANE");

        // Three dates and codes but only two share/price pairs: the
        // surplus third capture is dropped, not mismatched.
        assert_eq!(got.transactions.len(), 2);
        assert_eq!(got.transactions[0].date.as_deref(), Some("2025-03-01"));
        assert_eq!(got.transactions[0].code.as_deref(), Some("P"));
        assert_eq!(got.transactions[0].shares.as_deref(), Some("1,000"));
        assert_eq!(got.transactions[1].date.as_deref(), Some("2025-03-02"));
        assert_eq!(got.transactions[1].price.as_deref(), Some("26.10"));
    }

    #[test]
    fn empty_text_yields_defaults_and_no_transactions() {
        let got = extract("");
        assert_eq!(got.issuer.name, "UNKNOWN");
        assert_eq!(got.owner.name, "UNKNOWN");
        assert!(got.transactions.is_empty());
    }

    #[test]
    fn value_wrappers_split_across_lines_still_match() {
        let text = "<transactionDate>\n  <value>2025-04-01</value>\n</transactionDate>\n\
                    <transactionCode>P</transactionCode>\n\
                    <transactionShares>\n  <value>200</value>\n</transactionShares>\n\
                    <transactionPricePerShare>\n  <value>9.99</value>\n</transactionPricePerShare>";
        let got = extract(text);
        assert_eq!(got.transactions.len(), 1);
        assert_eq!(got.transactions[0].shares.as_deref(), Some("200"));
    }
}
