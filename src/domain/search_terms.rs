//! Search-term derivation
//!
//! Builds the ordered list of queries to try against the remote index for
//! one part, most specific first: the part-number slug taken from the
//! product URL (when there is one), then the full display name, then the
//! name with trailing words dropped one by one while more than three remain.

use tracing::debug;

/// Fragment marker the source page uses for parts entered by hand; those
/// have no product URL worth mining for a part number.
const CUSTOM_PART_FRAGMENT: &str = "#view_custom_part";

/// Derive the prioritized search terms for a part.
pub fn derive_search_terms(name: &str, url: &str) -> Vec<String> {
    let mut terms = Vec::new();

    if !url.contains(CUSTOM_PART_FRAGMENT) {
        match part_number_from_url(name, url) {
            Some(part_number) => terms.push(part_number),
            None => debug!(%name, "no part-number slug found in product url"),
        }
    }

    let mut words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() {
        return terms;
    }

    loop {
        terms.push(words.join(" "));
        words.pop();
        if words.len() <= 3 {
            break;
        }
    }

    terms
}

/// Product URLs end in a slug of the form `<name-words>-<part-number>`. The
/// part number is whatever follows the last occurrence of the name's final
/// word (lowercased) plus its separator.
fn part_number_from_url(name: &str, url: &str) -> Option<String> {
    let last_word = name.split_whitespace().next_back()?.to_lowercase();
    let position = url.rfind(&last_word)?;
    let tail = url.get(position + last_word.len() + 1..)?;

    if tail.is_empty() {
        return None;
    }
    Some(tail.to_string())
}
