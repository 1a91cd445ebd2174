//! Ordered, multi-valued query parameters
//!
//! Keys keep the order in which they first appeared so that encoding the same
//! parameters always yields the same query string.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pairs: Vec<(String, Vec<String>)>,
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string, with or without the leading `?`
    ///
    /// `+` decodes to a space and invalid UTF-8 sequences are replaced.
    /// A key without `=` gets an empty value.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();

        for part in query.trim_start_matches('?').split('&') {
            if part.is_empty() {
                continue;
            }

            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            params.append(decode_component(key), decode_component(value));
        }

        params
    }

    /// Add a value, keeping any existing values for the key
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.pairs.push((key, vec![value])),
        }
    }

    /// Replace every value of `key` with `value`
    ///
    /// The key keeps its position if it already exists, otherwise it goes last.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.pairs.push((key, vec![value])),
        }
    }

    /// Last value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.last())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(key, value)` pairs in encoding order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Percent-encode into `k=v&k=v`, without a leading `?`
    pub fn encode(&self) -> String {
        self.iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order() {
        let params = QueryParams::parse("b=2&a=1&c=3");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(params.encode(), "b=2&a=1&c=3");
    }

    #[test]
    fn test_parse_leading_question_mark_and_empty_parts() {
        let params = QueryParams::parse("?a=1&&b=");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some(""));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_empty() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let params = QueryParams::parse("q=hello+world&name=caf%C3%A9");
        assert_eq!(params.get("q"), Some("hello world"));
        assert_eq!(params.get("name"), Some("café"));
    }

    #[test]
    fn test_repeated_keys_collect_values() {
        let params = QueryParams::parse("tag=a&other=x&tag=b");
        assert_eq!(params.get_all("tag"), &["a".to_string(), "b".to_string()]);
        assert_eq!(params.get("tag"), Some("b"));
        assert_eq!(params.encode(), "tag=a&tag=b&other=x");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = QueryParams::parse("page=3&q=x&page=4");
        params.set("page", "42");
        assert_eq!(params.encode(), "page=42&q=x");
    }

    #[test]
    fn test_set_appends_missing_key() {
        let mut params = QueryParams::parse("arg2=val");
        params.set("page", "42");
        assert_eq!(params.encode(), "arg2=val&page=42");
    }

    #[test]
    fn test_remove() {
        let mut params = QueryParams::parse("a=1&b=2");
        assert_eq!(params.remove("a"), Some(vec!["1".to_string()]));
        assert_eq!(params.remove("missing"), None);
        assert_eq!(params.encode(), "b=2");
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let params: QueryParams = [("q", "a&b=c d"), ("x/y", "#")].into_iter().collect();
        assert_eq!(params.encode(), "q=a%26b%3Dc%20d&x%2Fy=%23");
        assert_eq!(params.to_string(), params.encode());
    }
}
