//! Ordered wire parameter set.

/// Wire key → wire value pairs in insertion order.
///
/// Keys are unique: inserting an existing key replaces its value and keeps its
/// original position. The signer sorts a copy of the entries; this type keeps
/// the order used when the query string is emitted.
///
/// # Examples
///
/// ```
/// use remit::Parameters;
///
/// let mut params = Parameters::new();
/// params.insert("pipelineName", "SingleUse");
/// params.insert("callerReference", "order-17");
/// params.insert("pipelineName", "Recurring");
///
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("pipelineName"), Some("Recurring"));
/// assert_eq!(params.keys().collect::<Vec<_>>(), ["pipelineName", "callerReference"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Parameters {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut params = Parameters::new();
        params.insert("b", "1");
        params.insert("a", "2");
        params.insert("b", "3");

        assert_eq!(params.iter().collect::<Vec<_>>(), [("b", "3"), ("a", "2")]);
    }

    #[test]
    fn test_from_iterator() {
        let params: Parameters = [("Action", "GetResults"), ("operation", "Pay")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert!(params.contains_key("Action"));
        assert!(!params.contains_key("action"));
    }

    #[test]
    fn test_empty() {
        let params = Parameters::new();
        assert!(params.is_empty());
        assert_eq!(params.get("anything"), None);
    }
}
