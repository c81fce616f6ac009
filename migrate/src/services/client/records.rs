//! Repeated records encoded in flat property keys.
//!
//! GalleryRemote lists albums and images as `album.<field>.<n>` and
//! `image.<field>.<n>`. A record is the set of keys sharing one trailing index.
//! Field names may themselves contain dots (`album.info.extrafields.3`).

use std::collections::BTreeSet;

use super::properties::Properties;

/// Indices `n` of keys shaped exactly `<prefix>.<n>`
pub fn indices_for(properties: &Properties, prefix: &str) -> BTreeSet<u32> {
    properties
        .keys()
        .filter_map(|key| key.strip_prefix(prefix)?.strip_prefix('.'))
        .filter_map(parse_index)
        .collect()
}

/// Indices of every record of the given kind, whatever fields it carries
pub fn record_indices(properties: &Properties, record: &str) -> BTreeSet<u32> {
    properties
        .keys()
        .filter_map(|key| {
            let rest = key.strip_prefix(record)?.strip_prefix('.')?;
            let (field, index) = rest.rsplit_once('.')?;
            if field.is_empty() {
                return None;
            }
            parse_index(index)
        })
        .collect()
}

/// Look up `<record>.<field>.<index>`
pub fn field<'a>(
    properties: &'a Properties,
    record: &str,
    field: &str,
    index: u32,
) -> Option<&'a str> {
    properties.get(&format!("{}.{}.{}", record, field, index))
}

fn parse_index(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
