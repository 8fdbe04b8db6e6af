//! Typed candidate-path probing over a parsed filing.
//!
//! Real Form 4 documents disagree on structure: some declare the default
//! ownership-document namespace, some declare none, some prefix every tag,
//! and value wrappers come and go. Each semantic field therefore carries an
//! ordered list of path expressions — most specific first, local-name
//! wildcard last — and the first path whose match has non-empty text wins.

use roxmltree::{Document, Node};

// ── Namespace table ───────────────────────────────────────────────────────────

/// Immutable per-document namespace view, computed once from the root and
/// threaded explicitly through every lookup.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    default_uri: Option<String>,
}

impl NamespaceTable {
    pub fn from_document(doc: &Document) -> Self {
        let default_uri = doc
            .root_element()
            .namespaces()
            .find(|ns| ns.name().is_none())
            .map(|ns| ns.uri().to_string());
        Self { default_uri }
    }

    /// True when an element's namespace is "plain": none at all, or the
    /// document's default namespace.
    fn is_plain(&self, uri: Option<&str>) -> bool {
        match uri {
            None => true,
            Some(u) => self.default_uri.as_deref() == Some(u),
        }
    }
}

// ── Path expressions ──────────────────────────────────────────────────────────

/// A relative path: the first step is searched among all descendants of the
/// scope (document order), each following step among direct children.
#[derive(Debug, Clone, Copy)]
pub enum PathExpr {
    /// Exact tag names in the document's default (or no) namespace.
    Qualified(&'static [&'static str]),
    /// Local tag names, case-insensitive, any namespace.
    AnyName(&'static [&'static str]),
}

impl PathExpr {
    fn steps(&self) -> &'static [&'static str] {
        match self {
            PathExpr::Qualified(s) | PathExpr::AnyName(s) => s,
        }
    }

    fn step_matches(&self, node: Node, step: &str, ns: &NamespaceTable) -> bool {
        if !node.is_element() {
            return false;
        }
        let tag = node.tag_name();
        match self {
            PathExpr::Qualified(_) => tag.name() == step && ns.is_plain(tag.namespace()),
            PathExpr::AnyName(_) => tag.name().eq_ignore_ascii_case(step),
        }
    }

    fn complete<'a, 'i>(
        &self,
        head: Node<'a, 'i>,
        rest: &[&str],
        ns: &NamespaceTable,
    ) -> Option<Node<'a, 'i>> {
        let Some((step, tail)) = rest.split_first() else {
            return Some(head);
        };
        head.children()
            .filter(|c| self.step_matches(*c, step, ns))
            .find_map(|c| self.complete(c, tail, ns))
    }

    /// First full match of the path under `scope`, in document order.
    pub fn first_match<'a, 'i>(
        &self,
        scope: Node<'a, 'i>,
        ns: &NamespaceTable,
    ) -> Option<Node<'a, 'i>> {
        let steps = self.steps();
        let (first, rest) = steps.split_first()?;
        scope
            .descendants()
            .filter(|n| *n != scope && self.step_matches(*n, first, ns))
            .find_map(|n| self.complete(n, rest, ns))
    }

    /// Every full match of the path under `scope`, in document order.
    pub fn all_matches<'a, 'i>(
        &self,
        scope: Node<'a, 'i>,
        ns: &NamespaceTable,
    ) -> Vec<Node<'a, 'i>> {
        let steps = self.steps();
        let Some((first, rest)) = steps.split_first() else {
            return Vec::new();
        };
        scope
            .descendants()
            .filter(|n| *n != scope && self.step_matches(*n, first, ns))
            .filter_map(|n| self.complete(n, rest, ns))
            .collect()
    }
}

/// First-match-wins over an ordered candidate list. Returns the trimmed
/// text of the first path whose match carries non-empty text. `None`
/// means "field not found" — an explicit state, not an error.
pub fn locate(scope: Node, candidates: &[PathExpr], ns: &NamespaceTable) -> Option<String> {
    for path in candidates {
        if let Some(node) = path.first_match(scope, ns) {
            if let Some(text) = node.text() {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }
    None
}

/// First candidate path that yields any matches at all; used for element
/// blocks (owner, issuer, transaction containers) rather than text fields.
pub fn find_all<'a, 'i>(
    scope: Node<'a, 'i>,
    candidates: &[PathExpr],
    ns: &NamespaceTable,
) -> Vec<Node<'a, 'i>> {
    for path in candidates {
        let found = path.all_matches(scope, ns);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

// ── Candidate tables ──────────────────────────────────────────────────────────

use PathExpr::{AnyName, Qualified};

pub const ISSUER_BLOCK: &[PathExpr] = &[Qualified(&["issuer"]), AnyName(&["issuer"])];

pub const OWNER_BLOCK: &[PathExpr] = &[
    Qualified(&["reportingOwner"]),
    Qualified(&["reportingOwnerId"]),
    AnyName(&["reportingOwner"]),
    AnyName(&["reportingOwnerId"]),
];

pub const ISSUER_NAME: &[PathExpr] = &[Qualified(&["issuerName"]), AnyName(&["issuerName"])];

pub const ISSUER_SYMBOL: &[PathExpr] = &[
    Qualified(&["issuerTradingSymbol"]),
    AnyName(&["issuerTradingSymbol"]),
];

pub const ISSUER_CIK: &[PathExpr] = &[Qualified(&["issuerCik"]), AnyName(&["issuerCik"])];

pub const OWNER_NAME: &[PathExpr] = &[
    Qualified(&["rptOwnerName"]),
    Qualified(&["ownerName"]),
    AnyName(&["rptOwnerName"]),
    AnyName(&["ownerName"]),
];

pub const OWNER_CIK: &[PathExpr] = &[
    Qualified(&["rptOwnerCik"]),
    Qualified(&["ownerCik"]),
    AnyName(&["rptOwnerCik"]),
];

pub const TXN_DATE: &[PathExpr] = &[
    Qualified(&["transactionDate", "value"]),
    Qualified(&["transactionDate"]),
    AnyName(&["transactionDate", "value"]),
    AnyName(&["transactionDate"]),
];

pub const TXN_CODE: &[PathExpr] = &[
    Qualified(&["transactionCoding", "transactionCode"]),
    Qualified(&["transactionCode"]),
    AnyName(&["transactionCoding", "transactionCode"]),
];

pub const TXN_SHARES: &[PathExpr] = &[
    Qualified(&["transactionShares", "value"]),
    Qualified(&["transactionAmounts", "transactionShares", "value"]),
    AnyName(&["transactionShares", "value"]),
];

pub const TXN_PRICE: &[PathExpr] = &[
    Qualified(&["transactionAmounts", "transactionPricePerShare", "value"]),
    Qualified(&["transactionPricePerShare", "value"]),
    Qualified(&["pricePerShare", "value"]),
    AnyName(&["transactionPricePerShare", "value"]),
];

pub const OWNERSHIP: &[PathExpr] = &[
    Qualified(&["directOrIndirectOwnership", "value"]),
    Qualified(&["ownershipNature", "directOrIndirectOwnership", "value"]),
    AnyName(&["directOrIndirectOwnership", "value"]),
];

/// In-container fallback; the sibling-relative lookup lives in the
/// structural extractor because it needs to walk upward first.
pub const SECURITY_TITLE: &[PathExpr] = &[AnyName(&["securityTitle", "value"])];

pub const NON_DERIVATIVE_CONTAINERS: &[PathExpr] = &[
    Qualified(&["nonDerivativeTransaction"]),
    AnyName(&["nonDerivativeTransaction"]),
];

pub const DERIVATIVE_CONTAINERS: &[PathExpr] = &[
    Qualified(&["derivativeTransaction"]),
    AnyName(&["derivativeTransaction"]),
];

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Document<'_> {
        Document::parse(xml).expect("test XML must parse")
    }

    #[test]
    fn locate_prefers_earlier_paths() {
        let doc = parse(
            "<root><transactionDate><value>2025-01-02</value></transactionDate>\
             <transactionDate>flat</transactionDate></root>",
        );
        let ns = NamespaceTable::from_document(&doc);
        let got = locate(doc.root_element(), TXN_DATE, &ns);
        assert_eq!(got.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn locate_falls_through_to_flattened_variant() {
        let doc = parse("<root><transactionDate>2025-01-02</transactionDate></root>");
        let ns = NamespaceTable::from_document(&doc);
        let got = locate(doc.root_element(), TXN_DATE, &ns);
        assert_eq!(got.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn locate_is_none_when_no_path_matches() {
        let doc = parse("<root><unrelated>x</unrelated></root>");
        let ns = NamespaceTable::from_document(&doc);
        assert_eq!(locate(doc.root_element(), TXN_DATE, &ns), None);
    }

    #[test]
    fn empty_text_falls_through_to_next_candidate() {
        let doc = parse(
            "<root><transactionDate><value>  </value></transactionDate></root>",
        );
        let ns = NamespaceTable::from_document(&doc);
        // value is whitespace-only; the flattened transactionDate path has
        // no direct text either, so the field is unresolvable.
        assert_eq!(locate(doc.root_element(), TXN_DATE, &ns), None);
    }

    #[test]
    fn qualified_matches_inside_default_namespace() {
        let doc = parse(
            "<ownershipDocument xmlns=\"http://www.sec.gov/edgar/ownership\">\
             <issuerName>Apple Inc.</issuerName></ownershipDocument>",
        );
        let ns = NamespaceTable::from_document(&doc);
        let got = locate(doc.root_element(), ISSUER_NAME, &ns);
        assert_eq!(got.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn prefixed_namespace_resolves_via_local_name() {
        let doc = parse(
            "<o:ownershipDocument xmlns:o=\"http://www.sec.gov/edgar/ownership\">\
             <o:issuerName>Apple Inc.</o:issuerName></o:ownershipDocument>",
        );
        let ns = NamespaceTable::from_document(&doc);
        // The qualified path cannot see o:issuerName; the AnyName variant can.
        let got = locate(doc.root_element(), ISSUER_NAME, &ns);
        assert_eq!(got.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn find_all_stops_at_first_productive_candidate() {
        let doc = parse(
            "<root><nonDerivativeTransaction/><nonDerivativeTransaction/></root>",
        );
        let ns = NamespaceTable::from_document(&doc);
        let found = find_all(doc.root_element(), NON_DERIVATIVE_CONTAINERS, &ns);
        assert_eq!(found.len(), 2);
    }
}
