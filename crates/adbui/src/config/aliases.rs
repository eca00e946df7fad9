//! Attribute alias table for hierarchy queries

use phf::phf_map;

/// Short convenience keys mapped to the attribute names used in dumps.
pub static ATTRIBUTE_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "id" => "resource-id",
    "class_" => "class",
    "desc" => "content-desc",
};

/// Translate a short key to its full attribute name.
///
/// Keys that are not aliases are returned unchanged.
pub fn canonical_key(key: &str) -> &str {
    ATTRIBUTE_ALIASES.get(key).copied().unwrap_or(key)
}
