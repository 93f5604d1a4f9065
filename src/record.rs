//! Ordered key/value records carried by DATA frames.

use std::collections::{BTreeMap, HashMap};

/// An ordered batch of string fields forming one log event.
///
/// Fields are encoded in insertion order. Duplicate keys are kept and sent
/// as-is; the protocol does not require keys to be unique.
///
/// # Examples
///
/// ```
/// use lumberjack::RecordBatch;
///
/// let batch = RecordBatch::new()
///     .with_field("line", "hello")
///     .with_field("host", "web-1");
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.get("host"), Some("web-1"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordBatch {
    fields: Vec<(String, String)>,
}

impl RecordBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a field, returning the updated batch.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Number of key/value pairs, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize { self.fields.len() }

    /// Whether the batch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Value of the first field named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over fields in wire order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Total UTF-8 byte length of all keys and values.
    pub(crate) fn payload_len(&self) -> usize {
        self.fields
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl<K, V> FromIterator<(K, V)> for RecordBatch
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for RecordBatch {
    fn from(map: BTreeMap<String, String>) -> Self { map.into_iter().collect() }
}

impl<S: std::hash::BuildHasher> From<HashMap<String, String, S>> for RecordBatch {
    fn from(map: HashMap<String, String, S>) -> Self { map.into_iter().collect() }
}

impl IntoIterator for RecordBatch {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter { self.fields.into_iter() }
}
