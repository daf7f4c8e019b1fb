// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Response headers with normalized names.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use log::warn;
use reqwest::header::HeaderMap;

/// Header mapping with case- and dash-insensitive keys.
///
/// Names are stored lowercase with dashes replaced by underscores, so
/// `X-Subject-Token`, `x-subject-token` and `x_subject_token` all refer to
/// the same entry.
///
/// The `Debug` output never shows the value of `X-Subject-Token`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    inner: BTreeMap<String, String>,
}

/// Normalized name of the header carrying the issued token.
pub(crate) const SUBJECT_TOKEN: &str = "x_subject_token";

/// Normalize a header name.
pub fn normalize<S: AsRef<str>>(name: S) -> String {
    name.as_ref()
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

impl ResponseHeaders {
    /// Create an empty mapping.
    pub fn new() -> ResponseHeaders {
        ResponseHeaders::default()
    }

    /// Insert a header, replacing the previous value with the same name.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.inner.insert(normalize(name), value.into())
    }

    /// Get a header value by any spelling of its name.
    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&str> {
        self.inner.get(&normalize(name)).map(String::as_str)
    }

    /// Whether the header is present.
    #[inline]
    pub fn contains<K: AsRef<str>>(&self, name: K) -> bool {
        self.get(name).is_some()
    }

    /// Number of headers.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over normalized names and values.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl fmt::Debug for ResponseHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.iter().map(|(name, value)| {
                if name == SUBJECT_TOKEN {
                    (name.as_str(), "***")
                } else {
                    (name.as_str(), value.as_str())
                }
            }))
            .finish()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> ResponseHeaders {
        let mut result = ResponseHeaders::new();
        for (name, value) in iter {
            let _ = result.insert(name, value);
        }
        result
    }
}

impl From<&HeaderMap> for ResponseHeaders {
    fn from(value: &HeaderMap) -> ResponseHeaders {
        value
            .iter()
            .filter_map(|(name, value)| match value.to_str() {
                Ok(s) => Some((name.as_str(), s.to_string())),
                Err(e) => {
                    warn!("Ignoring non-ASCII header {}: {}", name, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    #![allow(unused_results)]

    use reqwest::header::{HeaderMap, HeaderValue};

    use super::{normalize, ResponseHeaders};

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("X-Subject-Token"), "x_subject_token");
        assert_eq!(normalize("content-type"), "content_type");
        assert_eq!(normalize("already_normal"), "already_normal");
    }

    #[test]
    fn test_lookup_any_spelling() {
        let mut headers = ResponseHeaders::new();
        assert!(headers.insert("X-Subject-Token", "abc123").is_none());
        assert_eq!(headers.get("x-subject-token"), Some("abc123"));
        assert_eq!(headers.get("X_SUBJECT_TOKEN"), Some("abc123"));
        assert_eq!(headers.get("x_subject_token"), Some("abc123"));
        assert!(headers.contains("X-Subject-Token"));
        assert!(!headers.contains("X-Auth-Token"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut headers = ResponseHeaders::new();
        let _ = headers.insert("Vary", "X-Auth-Token");
        assert_eq!(
            headers.insert("vary", "Accept"),
            Some("X-Auth-Token".to_string())
        );
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_debug_hides_subject_token() {
        let headers: ResponseHeaders = [
            ("X-Subject-Token", "gAAAAABsecret"),
            ("Content-Type", "application/json"),
        ]
        .iter()
        .cloned()
        .collect();
        let repr = format!("{:?}", headers);
        assert!(!repr.contains("gAAAAABsecret"));
        assert!(repr.contains("x_subject_token"));
        assert!(repr.contains("application/json"));
        assert_eq!(headers.get("x-subject-token"), Some("gAAAAABsecret"));
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        let _ = map.insert("x-subject-token", HeaderValue::from_static("tok"));
        let _ = map.insert(
            "x-openstack-request-id",
            HeaderValue::from_static("req-1"),
        );
        let _ = map.insert("x-binary", HeaderValue::from_bytes(b"\xff").unwrap());
        let headers = ResponseHeaders::from(&map);
        assert_eq!(headers.get("X-Subject-Token"), Some("tok"));
        assert_eq!(headers.get("x_openstack_request_id"), Some("req-1"));
        assert!(!headers.contains("x-binary"));
        let names: Vec<_> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["x_openstack_request_id", "x_subject_token"]);
    }
}
