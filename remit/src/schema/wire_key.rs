//! Field name to wire key transform.

/// Derives the wire key for a declared field name.
///
/// Every `_` that is followed by a character is dropped and that character is
/// upper-cased. All other characters, including the case of the first
/// segment, are kept exactly as declared. A trailing `_` has nothing to
/// upper-case and is kept.
///
/// # Examples
///
/// ```
/// use remit::schema::wire_key;
///
/// assert_eq!(wire_key("max_results_count"), "maxResultsCount");
/// assert_eq!(wire_key("return_URL"), "returnURL");
/// assert_eq!(wire_key("usage_limit_type1"), "usageLimitType1");
/// ```
#[must_use]
pub fn wire_key(field_name: &str) -> String {
    let mut key = String::with_capacity(field_name.len());
    let mut chars = field_name.chars();

    while let Some(c) = chars.next() {
        if c != '_' {
            key.push(c);
            continue;
        }
        match chars.next() {
            Some(next) => key.extend(next.to_uppercase()),
            None => key.push('_'),
        }
    }

    key
}
