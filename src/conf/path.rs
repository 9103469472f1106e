//! Key-path resolution.
//!
//! A key such as `http.servers[1].port` is split on `.`; each segment names
//! a key of the current mapping, optionally followed by one or more
//! `[index]` suffixes that descend into arrays.

use super::typed::parse_int;
use crate::value::Value;

/// Resolve `key` against `root`. The empty key resolves to `root` itself.
pub(crate) fn resolve<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return Some(root);
    }

    key.split('.')
        .try_fold(root, |node, segment| resolve_segment(node, segment))
}

fn resolve_segment<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    let map = node.as_object()?;

    // A key that literally contains brackets takes precedence over indexing.
    if let Some(value) = map.get(segment) {
        return Some(value);
    }

    let (name, indexes) = split_indexes(segment)?;
    let mut value = map.get(name)?;
    for index in indexes.split("][") {
        let index = usize::try_from(parse_int(index)?).ok()?;
        value = value.as_array()?.get(index)?;
    }
    Some(value)
}

/// Split `name[i][j]` into `("name", "i][j")`.
fn split_indexes(segment: &str) -> Option<(&str, &str)> {
    let inner = segment.strip_suffix(']')?;
    let open = inner.find('[')?;
    if open == 0 {
        return None;
    }
    Some((&inner[..open], &inner[open + 1..]))
}
