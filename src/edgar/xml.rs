//! Namespace-qualified lookups over `roxmltree` documents.

use roxmltree::{Document, Node};

use super::error::{EdgarError, Result};

pub(crate) fn parse_document<'i>(document: &'static str, bytes: &'i [u8]) -> Result<Document<'i>> {
    let text = std::str::from_utf8(bytes).map_err(|e| EdgarError::parse(document, e))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Document::parse(text).map_err(|e| EdgarError::parse(document, e))
}

/// First child element of `node` named `name` in namespace `ns`.
pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, ns: &str, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name((ns, name)))
}

/// Follows a `/`-separated chain of child elements, e.g. `shrsOrPrnAmt/sshPrnamt`.
pub(crate) fn child_path<'a, 'i>(node: Node<'a, 'i>, ns: &str, path: &str) -> Option<Node<'a, 'i>> {
    path.split('/')
        .try_fold(node, |current, segment| child(current, ns, segment))
}

/// First match of `.//path` below `node`, in document order.
pub(crate) fn descendant_path<'a, 'i>(
    node: Node<'a, 'i>,
    ns: &str,
    path: &str,
) -> Option<Node<'a, 'i>> {
    let (head, rest) = match path.split_once('/') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    node.descendants()
        .filter(|n| n.is_element() && n.has_tag_name((ns, head)))
        .find_map(|n| match rest {
            Some(rest) => child_path(n, ns, rest),
            None => Some(n),
        })
}

/// Text of the child at `path`; the element must exist, its text may be empty.
pub(crate) fn required_text(
    document: &'static str,
    node: Node<'_, '_>,
    ns: &str,
    path: &str,
) -> Result<String> {
    child_path(node, ns, path)
        .map(|n| n.text().unwrap_or("").to_string())
        .ok_or_else(|| EdgarError::missing(document, path))
}

pub(crate) fn required_integer(
    document: &'static str,
    node: Node<'_, '_>,
    ns: &str,
    path: &str,
) -> Result<u64> {
    let raw = required_text(document, node, ns, path)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| EdgarError::InvalidInteger {
            document,
            field: path.to_string(),
            value: raw,
        })
}
