use std::fmt;

use chrono::Utc;

use super::error::StorageError;

/// A validated object key of the form `<folder>/<unix millis>-<filename>`.
///
/// Keys are chosen by the caller, never by the store. The millisecond prefix
/// keeps two uploads of the same filename apart; collisions within the same
/// millisecond are not detected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Derive a key for a fresh upload using the current wall-clock time.
    pub fn timestamped(folder: &str, filename: &str) -> Self {
        Self::at(folder, Utc::now().timestamp_millis(), filename)
    }

    /// Derive a key for an upload made at `millis`.
    pub fn at(folder: &str, millis: i64, filename: &str) -> Self {
        let folder = folder.trim_matches('/');
        Self(format!("{folder}/{millis}-{}", base_name(filename)))
    }

    /// Wrap a key previously produced by [`ObjectKey::timestamped`] and read
    /// back from the database.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        if raw.is_empty() || raw.starts_with('/') || raw.contains('\0') {
            return Err(StorageError::InvalidKey(raw.to_string()));
        }
        if raw.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            return Err(StorageError::InvalidKey(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Last path component of a client-supplied filename, with characters that
/// would break the key layout replaced.
fn base_name(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "file".to_string(),
        _ => cleaned,
    }
}
