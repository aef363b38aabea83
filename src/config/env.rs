// Environment overlay
// PERSONFROMVID_<GROUP>__<FIELD>[__<FIELD>...] = value
// Overrides are written into the serialized default tree, which is then
// deserialized and validated like a file load.

use serde_json::Value;

use crate::constants::{
    ENV_NESTED_DELIMITER, ENV_PREFIX, KEY_PATH_DELIMITER, STRING_VALUED_KEYS,
};

/// Apply every prefixed variable to `root`. Returns how many were applied.
/// Unknown keys are skipped with a warning.
pub(crate) fn overlay_env<I>(root: &mut Value, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    // Sorted so a whole-group JSON value lands before its per-field overrides.
    let mut matched: Vec<(Vec<String>, String)> = vars
        .into_iter()
        .filter_map(|(name, raw)| env_key_path(&name).map(|path| (path, raw)))
        .collect();
    matched.sort();

    let mut applied = 0;
    for (path, raw) in matched {
        let ok = if path.len() == 1 {
            merge_group(root, &path[0], &raw)
        } else {
            assign(root, &path, &raw)
        };

        if ok {
            applied += 1;
        } else {
            log::warn!(
                "Ignoring unknown config environment variable {}{}",
                ENV_PREFIX,
                path.join(ENV_NESTED_DELIMITER).to_ascii_uppercase()
            );
        }
    }
    applied
}

/// Split a variable name into a lowercase key path, or None if it lacks the prefix.
pub(crate) fn env_key_path(name: &str) -> Option<Vec<String>> {
    let upper = name.to_ascii_uppercase();
    let rest = upper.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(
        rest.split(ENV_NESTED_DELIMITER)
            .map(|segment| segment.to_ascii_lowercase())
            .collect(),
    )
}

/// Overwrite an existing leaf. Returns false if the path does not name one.
pub(crate) fn assign(root: &mut Value, path: &[String], raw: &str) -> bool {
    let Some((leaf, parents)) = path.split_last() else {
        return false;
    };

    let mut node = root;
    for segment in parents {
        node = match node.get_mut(segment.as_str()) {
            Some(child) if child.is_object() => child,
            _ => return false,
        };
    }

    match node.as_object_mut().and_then(|obj| obj.get_mut(leaf.as_str())) {
        Some(current) if !current.is_object() => {
            let text_field = current.is_string() || is_string_valued(path);
            *current = coerce(text_field, raw);
            true
        }
        _ => false,
    }
}

fn is_string_valued(path: &[String]) -> bool {
    let key = path.join(&KEY_PATH_DELIMITER.to_string());
    STRING_VALUED_KEYS.contains(&key.as_str())
}

/// Text-valued fields take the raw string as is. Everything else is read as a
/// YAML scalar, so `4`, `0.5`, `true` and `null` get their natural types.
fn coerce(text_field: bool, raw: &str) -> Value {
    if text_field {
        return Value::String(raw.to_string());
    }
    serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// `PERSONFROMVID_<GROUP>='{"field": ...}'` merges a JSON object into the group.
fn merge_group(root: &mut Value, group: &str, raw: &str) -> bool {
    let Ok(patch @ Value::Object(_)) = serde_json::from_str::<Value>(raw) else {
        return false;
    };
    match root.get_mut(group) {
        Some(target) if target.is_object() => {
            merge(target, patch);
            true
        }
        _ => false,
    }
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge(existing, value)
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
