//! Codec for GalleryRemote response bodies.
//!
//! The Gallery 2 remote protocol answers every command with a body shaped like a
//! Java properties file: one `key=value` pair per line, preceded by a protocol
//! banner line (`#__GR2PROTO__`). Values escape `:` and `=` with a backslash.
//! Only those two escapes exist on the wire.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{ClientError, ClientResult};

/// Decoded `key=value` mapping from a GalleryRemote response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Decode a response body. Lines without `=` are skipped; a repeated key keeps
/// its last value.
pub fn decode(text: &str) -> Properties {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(name, value)| (name, unescape(value)))
        .collect()
}

/// Decode a raw response body, failing only when it is not UTF-8 text
pub fn decode_bytes(body: &[u8]) -> ClientResult<Properties> {
    let text = std::str::from_utf8(body).map_err(|e| ClientError::DecodeFailed {
        message: format!("GalleryRemote response is not valid text: {}", e),
    })?;
    Ok(decode(text))
}

/// Encode a mapping into the wire format, escaping `:` and `=` in values
pub fn encode(properties: &Properties) -> String {
    let mut out = String::new();
    for (name, value) in properties.iter() {
        out.push_str(name);
        out.push('=');
        out.push_str(&escape(value));
        out.push('\n');
    }
    out
}

fn unescape(value: &str) -> String {
    value.replace("\\:", ":").replace("\\=", "=")
}

fn escape(value: &str) -> String {
    value.replace(':', "\\:").replace('=', "\\=")
}
