//! Raw response payloads.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::error::{RemitError, Result};

/// Flat wire-key → wire-value entries extracted from a service response.
///
/// Entries keep their order and may repeat; the decoder decides whether a
/// repeat is legal. Payloads flattened from JSON also remember the length of
/// every array, so elements that produced no entries still count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    entries: Vec<(String, String)>,
    arrays: BTreeMap<String, usize>,
}

impl Payload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Records that `key` held an array of `len` elements.
    pub fn mark_array(&mut self, key: impl Into<String>, len: usize) {
        self.arrays.insert(key.into(), len);
    }

    /// Number of elements of the array stored under `key`, if one was marked.
    #[must_use]
    pub fn array_len(&self, key: &str) -> Option<usize> {
        self.arrays.get(key).copied()
    }

    /// Array lengths whose keys start with `prefix`, with the prefix removed.
    pub(crate) fn arrays_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        self.arrays
            .iter()
            .filter_map(move |(k, len)| k.strip_prefix(prefix).map(|rest| (rest, *len)))
    }

    /// Values stored under exactly `key`.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Flattens a JSON response body.
    ///
    /// The body must be a JSON object. Nested objects become `outer.inner` keys,
    /// array elements become `key.1`, `key.2`, ... and `null` members are
    /// dropped. Numbers and booleans are kept as their JSON text. The length
    /// of each array is kept too (see [`array_len`](Self::array_len)).
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::EncodingError`] if the body is not UTF-8, not JSON, or
    /// not an object.
    ///
    /// # Examples
    ///
    /// ```
    /// use remit::coerce::Payload;
    ///
    /// let body = br#"{"numberPending": 1, "transactionResults": [{"transactionId": "t-1"}]}"#;
    /// let payload = Payload::from_json(body).unwrap();
    ///
    /// assert_eq!(payload.values("numberPending").next(), Some("1"));
    /// assert_eq!(payload.values("transactionResults.1.transactionId").next(), Some("t-1"));
    /// ```
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| RemitError::EncodingError(format!("response body is not UTF-8: {e}")))?;
        let json: Json = serde_json::from_str(text)
            .map_err(|e| RemitError::EncodingError(format!("response body is not JSON: {e}")))?;
        let Json::Object(members) = json else {
            return Err(RemitError::EncodingError("response body must be a JSON object".to_owned()));
        };

        let mut payload = Self::new();
        for (key, value) in members {
            payload.flatten(key, value);
        }
        Ok(payload)
    }

    fn flatten(&mut self, key: String, value: Json) {
        match value {
            Json::Null => {}
            Json::Bool(b) => self.push(key, b.to_string()),
            Json::Number(n) => self.push(key, n.to_string()),
            Json::String(s) => self.push(key, s),
            Json::Array(items) => {
                self.mark_array(key.as_str(), items.len());
                for (n, item) in (1..).zip(items) {
                    self.flatten(format!("{key}.{n}"), item);
                }
            }
            Json::Object(members) => {
                for (member, item) in members {
                    self.flatten(format!("{key}.{member}"), item);
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.push(k, v);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_flattens_nested_values() {
        let body = br#"{
            "numberPending": 2,
            "transactionResults": [
                {"transactionId": "t-1", "transactionStatus": "Success"},
                {"transactionId": "t-2", "detail": {"code": 7}}
            ],
            "requestId": null,
            "sandbox": true
        }"#;
        let payload = Payload::from_json(body).unwrap();

        assert_eq!(payload.values("numberPending").collect::<Vec<_>>(), ["2"]);
        assert_eq!(payload.values("transactionResults.2.transactionId").next(), Some("t-2"));
        assert_eq!(payload.values("transactionResults.2.detail.code").next(), Some("7"));
        assert_eq!(payload.values("sandbox").next(), Some("true"));
        assert_eq!(payload.values("requestId").next(), None);
    }

    #[test]
    fn test_from_json_marks_array_lengths() {
        let body = br#"{"transactionResults": [{"transactionId": "t-1"}, {}, {"transactionId": null}], "empty": []}"#;
        let payload = Payload::from_json(body).unwrap();

        assert_eq!(payload.array_len("transactionResults"), Some(3));
        assert_eq!(payload.array_len("empty"), Some(0));
        assert_eq!(payload.array_len("transactionId"), None);
        assert_eq!(payload.entries().len(), 1);
    }

    #[test]
    fn test_arrays_under_strips_prefix() {
        let mut payload = Payload::new();
        payload.mark_array("lines.1.tags", 2);
        payload.mark_array("lines.2.tags", 1);
        payload.mark_array("other", 4);

        assert_eq!(payload.arrays_under("lines.2.").collect::<Vec<_>>(), [("tags", 1)]);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Payload::from_json(b"[1, 2]").unwrap_err();
        assert!(matches!(err, RemitError::EncodingError(_)));
    }

    #[test]
    fn test_from_json_rejects_invalid_utf8() {
        let err = Payload::from_json(&[0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        assert!(matches!(Payload::from_json(b"{\"a\":"), Err(RemitError::EncodingError(_))));
    }

    #[test]
    fn test_values_returns_repeats_in_order() {
        let payload: Payload = [("k", "1"), ("j", "x"), ("k", "2")].into_iter().collect();
        assert_eq!(payload.values("k").collect::<Vec<_>>(), ["1", "2"]);
    }
}
