//! Type signature normalization
//!
//! Resolved parameter and result descriptors may carry a parameter name in
//! front of the type (`"ctx context.Context"`). Only the trailing type token
//! is kept. This is best effort: a descriptor is split on whitespace and
//! never validated.

/// Strip any parameter name from a single descriptor
pub fn type_token(descriptor: &str) -> &str {
    descriptor.split_whitespace().last().unwrap_or("")
}

/// Normalize an ordered list of descriptors into bare type names.
///
/// Order and duplicates are preserved.
pub fn type_names<S: AsRef<str>>(descriptors: &[S]) -> Vec<String> {
    descriptors
        .iter()
        .map(|d| type_token(d.as_ref()).to_string())
        .collect()
}
