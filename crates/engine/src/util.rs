//! Internal helpers shared by the filter layer.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes a user-supplied filter value for comparison against the
/// canonical enumerated wire names.
///
/// Decomposes (NFKD), drops combining marks and lowercases, so
/// `"Consignación"` matches `consignacion` and `"ACTIVA"` matches `activa`.
pub(crate) fn normalize_filter(value: &str) -> String {
    value
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize_filter("Consignación"), "consignacion");
        assert_eq!(normalize_filter("  RETIRO "), "retiro");
        assert_eq!(normalize_filter("Crédito"), "credito");
        assert_eq!(normalize_filter("activa"), "activa");
    }
}
