// Path normalization at the serde boundary
// Paths are read as strings, normalized once here, and written back as plain strings.

use std::path::{Path, PathBuf};

use serde::{de, Deserialize, Deserializer, Serializer};

/// Converts a raw config value into a path. Empty input means "no path".
pub fn normalize_path(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

pub(crate) fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize_path(&raw).ok_or_else(|| de::Error::custom("path must not be empty"))
}

pub(crate) fn deserialize_optional_path<'de, D>(
    deserializer: D,
) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(normalize_path))
}

pub(crate) fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

pub(crate) fn serialize_optional_path<S>(
    path: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match path {
        Some(p) => serializer.serialize_str(&p.to_string_lossy()),
        None => serializer.serialize_none(),
    }
}

/// Parent directory of `path`, falling back to `.` for bare relative names.
pub(crate) fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => path,
    }
}
