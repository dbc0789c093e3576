//! URL query parameters: the initial form state comes in as a query string and
//! a submitted form goes back out as one.

use url::form_urlencoded;
use url::Url;

/// Ordered key/value pairs from a query string. Keys are unique; the first
/// occurrence of a repeated key wins, as with `URLSearchParams.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=b&c=d`, `?a=b&c=d` or a full URL (only its query is used).
    /// Never fails: anything unparseable simply yields fewer parameters.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let query = match Url::parse(trimmed) {
            Ok(url) => url.query().unwrap_or("").to_string(),
            Err(_) => {
                let without_fragment = trimmed.split('#').next().unwrap_or("");
                without_fragment
                    .strip_prefix('?')
                    .unwrap_or(without_fragment)
                    .to_string()
            }
        };

        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() || params.get(&key).is_some() {
                continue;
            }
            params.pairs.push((key.into_owned(), value.into_owned()));
        }
        params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize as `application/x-www-form-urlencoded`, in insertion order.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
