//! Tree-walking extraction of issuer, owner and transaction data.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::form4::paths::{self, NamespaceTable, find_all, locate};
use crate::models::{Extraction, IssuerInfo, OwnerInfo, RawTransaction, Strategy, TransactionKind};

/// Walk a parsed filing and pull out everything we understand. Pure read
/// of the tree; unresolvable fields come back as defaults, never errors.
pub fn extract(doc: &Document) -> Extraction {
    let ns = NamespaceTable::from_document(doc);
    let root = doc.root_element();

    let issuer = extract_issuer(root, &ns);
    let owner = extract_owner(root, &ns);

    // Two independent passes so both kinds are captured, not just
    // whichever container type happens to appear first.
    let mut transactions = Vec::new();
    for container in find_all(root, paths::NON_DERIVATIVE_CONTAINERS, &ns) {
        transactions.push(parse_transaction(container, TransactionKind::NonDerivative, &ns));
    }
    for container in find_all(root, paths::DERIVATIVE_CONTAINERS, &ns) {
        transactions.push(parse_transaction(container, TransactionKind::Derivative, &ns));
    }

    debug!(
        "structural pass: {} transaction containers for {}",
        transactions.len(),
        issuer.trading_symbol
    );

    Extraction {
        issuer,
        owner,
        transactions,
        strategy: Strategy::Structural,
    }
}

fn extract_issuer(root: Node, ns: &NamespaceTable) -> IssuerInfo {
    let mut info = IssuerInfo::default();

    let Some(block) = find_all(root, paths::ISSUER_BLOCK, ns).into_iter().next() else {
        return info;
    };

    if let Some(name) = locate(block, paths::ISSUER_NAME, ns) {
        info.name = name;
    }
    if let Some(symbol) = locate(block, paths::ISSUER_SYMBOL, ns) {
        info.trading_symbol = symbol;
    }
    if let Some(cik) = locate(block, paths::ISSUER_CIK, ns) {
        info.cik = cik;
    }
    info
}

/// First reporting-owner block wins; multi-owner filings are out of scope.
fn extract_owner(root: Node, ns: &NamespaceTable) -> OwnerInfo {
    let mut info = OwnerInfo::default();

    let Some(block) = find_all(root, paths::OWNER_BLOCK, ns).into_iter().next() else {
        return info;
    };

    if let Some(name) = locate(block, paths::OWNER_NAME, ns) {
        info.name = name;
    }
    if let Some(cik) = locate(block, paths::OWNER_CIK, ns) {
        info.cik = cik;
    }
    info
}

fn parse_transaction(container: Node, kind: TransactionKind, ns: &NamespaceTable) -> RawTransaction {
    RawTransaction {
        kind,
        date: locate(container, paths::TXN_DATE, ns),
        code: locate(container, paths::TXN_CODE, ns),
        shares: locate(container, paths::TXN_SHARES, ns),
        price: locate(container, paths::TXN_PRICE, ns),
        ownership: locate(container, paths::OWNERSHIP, ns),
        security_title: locate_security_title(container, ns),
    }
}

/// The title element often lives outside the transaction subtree (as a
/// sibling of the transaction list), so look upward first: parent scope,
/// then grandparent, then fall back to anywhere inside the container.
fn locate_security_title(container: Node, ns: &NamespaceTable) -> Option<String> {
    let mut scope = container.parent();
    for _ in 0..2 {
        let Some(node) = scope.filter(Node::is_element) else {
            break;
        };
        if let Some(title) = direct_child(node, "securityTitle")
            .and_then(|t| direct_child(t, "value"))
            .and_then(|v| v.text())
        {
            let title = title.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
        scope = node.parent();
    }
    locate(container, paths::SECURITY_TITLE, ns)
}

fn direct_child<'a, 'i>(scope: Node<'a, 'i>, local_name: &str) -> Option<Node<'a, 'i>> {
    scope
        .children()
        .find(|c| c.is_element() && c.tag_name().name().eq_ignore_ascii_case(local_name))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
