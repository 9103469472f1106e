//! Resolution of `#include#` entries.
//!
//! Any mapping in a decoded tree may carry the reserved [`INCLUDE_KEY`]
//! whose value names one file or a list of files, relative to the
//! directory of the including document. The top-level entries of each
//! included document are merged into that mapping, overwriting entries of
//! the same name, and the include key is removed.
//!
//! A missing or malformed include contributes nothing and is not reported
//! to the caller of the load; it is only logged.

use crate::error::Result;
use crate::value::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The reserved key that triggers file inclusion.
pub const INCLUDE_KEY: &str = "#include#";

/// Resolve includes in `map` and in every mapping nested below it.
///
/// `load` performs the full load procedure for an include target, so each
/// included document has already resolved its own includes when it is
/// merged.
pub(crate) fn resolve_includes<F>(map: &mut Map, base_dir: &Path, load: &mut F)
where
    F: FnMut(&Path) -> Result<Map>,
{
    let targets = include_targets(map.get(INCLUDE_KEY));

    for (key, value) in map.iter_mut() {
        if targets.is_some() && key == INCLUDE_KEY {
            continue;
        }
        resolve_value(value, base_dir, load);
    }

    let Some(targets) = targets else { return };
    map.remove(INCLUDE_KEY);

    for target in targets {
        let path = base_dir.join(&target);
        match load(&path) {
            Ok(included) => {
                debug!(
                    path = %path.display(),
                    keys = included.len(),
                    "merging included configuration"
                );
                map.extend(included);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "dropping failed include");
            }
        }
    }
}

fn resolve_value<F>(value: &mut Value, base_dir: &Path, load: &mut F)
where
    F: FnMut(&Path) -> Result<Map>,
{
    match value {
        Value::Object(map) => resolve_includes(Arc::make_mut(map), base_dir, load),
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_value(item, base_dir, load);
            }
        }
        _ => {}
    }
}

/// Paths named by an include entry, or `None` when the entry is absent or
/// of a kind that is left alone.
fn include_targets(entry: Option<&Value>) -> Option<Vec<String>> {
    match entry? {
        Value::String(path) => Some(vec![path.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| {
                    let path = item.as_str();
                    if path.is_none() {
                        warn!(kind = item.kind(), "ignoring non-string include entry");
                    }
                    path.map(str::to_owned)
                })
                .collect(),
        ),
        other => {
            debug!(kind = other.kind(), "include key with unsupported value left as is");
            None
        }
    }
}
