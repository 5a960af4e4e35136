use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::error::{Error, Result};

/// Ordered header map with case-insensitive keys.
///
/// Names keep the spelling they were first inserted with; lookups, replacement
/// and removal ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Set `name` to `value`, replacing the value of an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert into a transport header map, rejecting names or values the
    /// transport cannot carry.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut header_map = HeaderMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let invalid = || Error::InvalidHeader { name: key.clone() };
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
            header_map.insert(header_name, header_value);
        }
        Ok(header_map)
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Parse "Key: Value" strings into headers, skipping malformed entries
pub fn parse_headers(headers: &[String]) -> Headers {
    let mut parsed = Headers::new();
    for header_str in headers {
        match header_str.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                let key = key.trim();
                if HeaderName::from_bytes(key.as_bytes()).is_err() {
                    warn!(header = %key, "invalid header name");
                    continue;
                }
                parsed.insert(key, value.trim());
            }
            _ => warn!(
                header = %header_str,
                "invalid header format, expected 'Key: Value'"
            ),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = vec![
            "User-Agent: test-agent".to_string(),
            "Content-Type: application/json".to_string(),
        ];
        let parsed = parse_headers(&headers);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("user-agent"), Some("test-agent"));
        assert_eq!(parsed.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_parse_headers_invalid() {
        let headers = vec!["Invalid Header".to_string(), "Bad Name: x".to_string()];
        let parsed = parse_headers(&headers);
        assert_eq!(parsed.len(), 0);
    }

    #[test]
    fn test_insert_preserves_case_and_order() {
        let mut headers = Headers::new();
        headers.insert("X-First", "1");
        headers.insert("x-second", "2");
        headers.insert("x-first", "3");

        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries, vec![("X-First", "3"), ("x-second", "2")]);
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("X-Token", "abc");
        assert_eq!(headers.remove("x-token"), Some("abc".to_string()));
        assert!(!headers.contains("X-Token"));
        assert_eq!(headers.remove("x-token"), None);
    }

    #[test]
    fn test_to_header_map() {
        let headers: Headers = [("X-Custom", "value"), ("Accept", "*/*")].into_iter().collect();
        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get("x-custom").unwrap(), "value");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_to_header_map_rejects_bad_value() {
        let headers: Headers = [("X-Bad", "line\nbreak")].into_iter().collect();
        assert!(matches!(
            headers.to_header_map(),
            Err(Error::InvalidHeader { name }) if name == "X-Bad"
        ));
    }
}
