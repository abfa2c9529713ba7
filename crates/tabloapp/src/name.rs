//! Field name normalization.
//!
//! Raw property names are whatever the database author typed ("Due Date",
//! "On sale?"). Lookups use a normalized key so callers never have to match
//! the exact casing and punctuation of the remote schema.

/// Normalize a raw field name into a lookup key.
///
/// Lower-cases, folds every run of non-alphanumeric characters into a
/// single underscore, and strips leading/trailing underscores. The result
/// is stable under re-normalization: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            key.push(ch);
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}
