use std::collections::HashSet;

use rptqa_core::ReportMetadata;

/// Metadata entity names textually referenced by an answer. Matching is
/// case-insensitive but whole-identifier only, so a `Customer` table does not
/// fire on the word "Customers". Output order follows the metadata's own
/// enumeration (tables, parameters, formulas), never answer-text order, and
/// each name appears at most once.
pub fn attribute_sources(answer: &str, metadata: &ReportMetadata) -> Vec<String> {
    let answer_lower = answer.to_lowercase();
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for name in metadata.entity_names() {
        if name.is_empty() {
            continue;
        }
        let name_lower = name.to_lowercase();
        if !seen.contains(&name_lower) && contains_identifier(&answer_lower, &name_lower) {
            seen.insert(name_lower);
            sources.push(name.to_string());
        }
    }
    sources
}

/// Whole-identifier containment check. An occurrence counts only when the
/// characters adjacent to it are not identifier characters (letters, digits,
/// underscore). Both arguments must already be lowercased.
pub(crate) fn contains_identifier(haystack: &str, needle: &str) -> bool {
    debug_assert!(!needle.is_empty());
    for (start, _) in haystack.match_indices(needle) {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_char(c));
        let after_ok = haystack[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_identifier_char(c));
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
