#![forbid(unsafe_code)]

//! Typed element accessors.
//!
//! A lookup path is one or more `prefix:LocalName` segments separated by
//! `/`.  Each segment resolves its prefix through the namespace registry
//! and steps to the first matching descendant in document order.  All
//! accessors share the same two-state contract: a missing element is
//! `Ok(None)`, never an error; a present element with text that cannot
//! be converted to the requested type is an error, never `None`.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use pskc_core::{ns, Error, Result};
use roxmltree::Node;

fn resolve_name(name: &str) -> Result<(&'static str, &str)> {
    let (prefix, local) = name
        .split_once(':')
        .ok_or_else(|| Error::UnqualifiedName(name.to_owned()))?;
    Ok((ns::resolve(prefix)?, local))
}

fn resolve_segments(path: &str) -> Result<Vec<(&'static str, &str)>> {
    path.split('/').map(resolve_name).collect()
}

fn is_match(node: &Node<'_, '_>, uri: &str, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace().unwrap_or("") == uri
}

fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    uri: &str,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| *n != node && is_match(n, uri, local))
}

/// Find the first descendant matching the namespace-qualified path.
pub fn find<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Result<Option<Node<'a, 'input>>> {
    let mut current = node;
    for (uri, local) in resolve_segments(path)? {
        match first_descendant(current, uri, local) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Find all descendants matching the final path segment, in document
/// order, after stepping through the leading segments first-match.
pub fn find_all<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Result<Vec<Node<'a, 'input>>> {
    let segments = resolve_segments(path)?;
    let Some(((last_uri, last_local), leading)) = segments.split_last() else {
        return Ok(Vec::new());
    };
    let mut current = node;
    for (uri, local) in leading {
        match first_descendant(current, uri, local) {
            Some(next) => current = next,
            None => return Ok(Vec::new()),
        }
    }
    Ok(current
        .descendants()
        .filter(|n| *n != current && is_match(n, last_uri, last_local))
        .collect())
}

/// Find the first direct child matching a single `prefix:LocalName`.
///
/// Unlike [`find`], this never descends: a matching element nested
/// deeper in the tree is not considered.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Result<Option<Node<'a, 'input>>> {
    let (uri, local) = resolve_name(name)?;
    Ok(node.children().find(|n| is_match(n, uri, local)))
}

/// All direct children matching a single `prefix:LocalName`, in
/// document order.
pub fn children<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Result<Vec<Node<'a, 'input>>> {
    let (uri, local) = resolve_name(name)?;
    Ok(node.children().filter(|n| is_match(n, uri, local)).collect())
}

/// Get the trimmed text value of an element, or `None` if absent.
pub fn find_text(node: Node<'_, '_>, path: &str) -> Result<Option<String>> {
    Ok(find(node, path)?
        .and_then(|n| n.text())
        .map(|t| t.trim().to_owned()))
}

/// Get an element value as a base-10 integer, or `None` if absent.
pub fn find_int(node: Node<'_, '_>, path: &str) -> Result<Option<i64>> {
    let Some(element) = find(node, path)? else {
        return Ok(None);
    };
    let text = element.text().unwrap_or("").trim();
    text.parse::<i64>().map(Some).map_err(|_| Error::InvalidInt {
        path: path.to_owned(),
        text: text.to_owned(),
    })
}

/// Get an element value as an xs:dateTime, or `None` if absent.
///
/// Accepts RFC 3339 timestamps; a timestamp without a zone offset is
/// read as UTC.
pub fn find_time(node: Node<'_, '_>, path: &str) -> Result<Option<DateTime<FixedOffset>>> {
    let Some(element) = find(node, path)? else {
        return Ok(None);
    };
    let text = element.text().unwrap_or("").trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(dt));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc().fixed_offset()));
    }
    Err(Error::InvalidDateTime {
        path: path.to_owned(),
        text: text.to_owned(),
    })
}
