//! Conversion of arbitrary strings into Python identifiers

use once_cell::sync::Lazy;
use regex::Regex;

static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^_a-zA-Z0-9]").expect("identifier pattern must compile"));

/// Replace everything except ASCII letters, digits and underscore with
/// underscores, so that the result can be used as a Python identifier.
///
/// A checksum of the input is appended if at least one replacement was made.
/// Inputs that already are identifiers, including earlier results of this
/// function, are returned unchanged, so `to_identifier` is idempotent.
#[must_use]
pub fn to_identifier(input: &str) -> String {
    let mut safe = NON_IDENTIFIER.replace_all(input, "_").into_owned();
    if safe.starts_with(|c: char| c.is_ascii_digit()) {
        safe.insert(0, '_');
    }
    if safe == input {
        return safe;
    }
    format!("{safe}_{}", checksum(input))
}

fn checksum(input: &str) -> u32 {
    let hash = blake3::hash(input.as_bytes());
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_identifier(s: &str) -> bool {
        !s.starts_with(|c: char| c.is_ascii_digit())
            && s.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
    }

    #[test]
    fn valid_names_are_kept() {
        assert_eq!(to_identifier("abc_D9"), "abc_D9");
        assert_eq!(to_identifier(""), "");
    }

    #[test]
    fn invalid_characters_are_replaced() {
        let id = to_identifier("www.example.com");
        assert!(id.starts_with("www_example_com_"));
        assert!(is_identifier(&id));
    }

    #[test]
    fn leading_digit_is_prefixed() {
        assert!(to_identifier("9lives").starts_with("_9lives_"));
    }

    #[test]
    fn derived_names_are_stable() {
        let once = to_identifier("a.b");
        assert_eq!(to_identifier(&once), once);
        assert_eq!(to_identifier("a_12"), "a_12");
    }

    #[test]
    fn distinct_inputs_with_same_sanitized_form_differ() {
        assert_ne!(to_identifier("a.b"), to_identifier("a-b"));
    }

    proptest! {
        #[test]
        fn prop_always_an_identifier(s in "\\PC{0,30}") {
            prop_assert!(is_identifier(&to_identifier(&s)));
        }

        #[test]
        fn prop_idempotent(s in "\\PC{0,30}") {
            let once = to_identifier(&s);
            prop_assert_eq!(to_identifier(&once), once);
        }
    }
}
