///! Name normalization shared by every lookup key.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a player name into its lookup key.
///
/// Lowercases, decomposes (NFD) and drops combining marks, so "JOSÉ",
/// "José" (precomposed or decomposed) and "Jose" share one key. Lowercasing
/// happens first because some uppercase letters lowercase into a base letter
/// plus a combining mark ('İ'), which keeps the result idempotent.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
