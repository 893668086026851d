//! Text normalization for names and headers.

/// Trims, strips a leading byte-order mark, and collapses inner whitespace
/// runs to a single space.
///
/// ```
/// use cardio_common::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  United \t States "), "United States");
/// ```
pub fn normalize_whitespace(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Title-cases a name: every letter that follows a non-letter is upper-cased,
/// every other letter is lower-cased. Whitespace is normalized first.
///
/// ```
/// use cardio_common::title_case;
///
/// assert_eq!(title_case("korea, rep."), "Korea, Rep.");
/// assert_eq!(title_case("  UNITED   states "), "United States");
/// assert_eq!(title_case("cote d'ivoire"), "Cote D'Ivoire");
/// ```
pub fn title_case(raw: &str) -> String {
    let normalized = normalize_whitespace(raw);
    let mut out = String::with_capacity(normalized.len());
    let mut previous_is_letter = false;
    for ch in normalized.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

/// Case- and whitespace-insensitive key used for name lookups.
pub fn lookup_key(raw: &str) -> String {
    normalize_whitespace(raw).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn title_case_handles_punctuation_and_digits() {
        assert_eq!(title_case("bosnia and herzegovina"), "Bosnia And Herzegovina");
        assert_eq!(title_case("guinea-bissau"), "Guinea-Bissau");
        assert_eq!(title_case("région 2b"), "Région 2B");
    }

    #[test]
    fn normalize_whitespace_strips_bom() {
        assert_eq!(normalize_whitespace("\u{feff}Location"), "Location");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn lookup_key_ignores_case() {
        assert_eq!(lookup_key(" South  AFRICA"), lookup_key("south africa"));
    }

    proptest! {
        #[test]
        fn title_case_is_idempotent(raw in "[ a-zA-Z,.'()-]{0,40}") {
            let once = title_case(&raw);
            prop_assert_eq!(title_case(&once), once.clone());
        }

        #[test]
        fn lookup_key_is_stable_under_title_case(raw in "[ a-zA-Z]{0,40}") {
            prop_assert_eq!(lookup_key(&title_case(&raw)), lookup_key(&raw));
        }
    }
}
