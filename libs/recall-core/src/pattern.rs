//! Clue/answer pattern expansion.
//!
//! A pattern is a compact definition of every literal string a card accepts:
//!
//! ```text
//! to go|to walk          two independent terms
//! {car|automobile} park  a choice group: "car park", "automobile park"
//! colo(u)r               an optional segment: "colour", and "color" when
//!                        ignore-bracketed expansion is enabled
//! word [a hint]          an annotation, removed before expansion
//! ```
//!
//! Expansion is the Cartesian product of every choice group within a term,
//! further multiplied by the optional-segment variants, with every result
//! trimmed and deduplicated.
//!
//! Delimiter recovery follows a single rule: an opening `[`, `{` or `(` with
//! no matching closer makes everything from that delimiter to the end of the
//! string a literal tail. A closer with no opener is an ordinary character.

use std::collections::BTreeSet;

const TERM_SEPARATOR: char = '|';
const OPEN_ANNOTATION: char = '[';
const CLOSE_ANNOTATION: char = ']';
const OPEN_CHOICE: char = '{';
const CLOSE_CHOICE: char = '}';
const OPEN_OPTIONAL: char = '(';
const CLOSE_OPTIONAL: char = ')';

/// Expand a pattern into the set of literal strings it accepts.
///
/// `ignore_bracketed` enables the dropped variant of `(text)` optional
/// segments in addition to the kept one.
pub fn expand(pattern: &str, ignore_bracketed: bool) -> BTreeSet<String> {
    let mut literals = BTreeSet::new();

    let cleaned = strip_annotations(pattern);

    for term in split_terms(&cleaned) {
        for choice in choice_permutations(term.trim()) {
            for option in optional_permutations(choice.trim(), ignore_bracketed) {
                let literal = option.trim();
                // an empty term (stray separator) denotes nothing
                if !literal.is_empty() {
                    literals.insert(literal.to_string());
                }
            }
        }
    }

    literals
}

/// The display form of a pattern: annotations removed, parenthesis
/// characters stripped (contents kept), trimmed.
pub fn display_form(pattern: &str) -> String {
    strip_parens(&strip_annotations(pattern))
}

/// Remove parenthesis characters without touching their contents.
pub fn strip_parens(s: &str) -> String {
    s.chars()
        .filter(|&c| c != OPEN_OPTIONAL && c != CLOSE_OPTIONAL)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove every `[...]` annotation span.
fn strip_annotations(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern.trim();

    while let Some(open) = rest.find(OPEN_ANNOTATION) {
        match matching_close(rest, open, CLOSE_ANNOTATION) {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[close + CLOSE_ANNOTATION.len_utf8()..];
            }
            // unmatched opener: the rest is a literal tail
            None => break,
        }
    }

    out.push_str(rest);
    out.trim().to_string()
}

/// Split on top-level `|`. A separator nested inside a `{...}` group (or
/// after an unmatched `{`) does not split.
fn split_terms(cleaned: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in cleaned.chars() {
        match c {
            OPEN_CHOICE => {
                depth += 1;
                current.push(c);
            }
            CLOSE_CHOICE => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            TERM_SEPARATOR if depth == 0 => {
                terms.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    terms.push(current);
    terms
}

/// Resolve every `{a|b|...}` choice group in a term into the Cartesian
/// product of its alternatives with the surrounding literal spans.
fn choice_permutations(term: &str) -> Vec<String> {
    let mut sections: Vec<Vec<String>> = Vec::new();
    let mut rest = term;

    while !rest.is_empty() {
        let open = match rest.find(OPEN_CHOICE) {
            Some(i) => i,
            None => {
                sections.push(vec![rest.to_string()]);
                break;
            }
        };

        let close = match matching_close(rest, open, CLOSE_CHOICE) {
            Some(i) => i,
            // unmatched opener: literal tail, including the delimiter
            None => {
                sections.push(vec![rest.to_string()]);
                break;
            }
        };

        if open > 0 {
            sections.push(vec![rest[..open].to_string()]);
        }

        let inner = &rest[open + OPEN_CHOICE.len_utf8()..close];
        sections.push(inner.split(TERM_SEPARATOR).map(str::to_string).collect());

        rest = &rest[close + CLOSE_CHOICE.len_utf8()..];
    }

    let mut permutations = vec![String::new()];
    for section in &sections {
        let mut next = Vec::with_capacity(permutations.len() * section.len());
        for prefix in &permutations {
            for alternative in section {
                next.push(format!("{prefix}{alternative}"));
            }
        }
        permutations = next;
    }

    permutations
}

/// Resolve every `(text)` optional segment within a single choice
/// permutation. Each segment yields the kept variant, plus the dropped
/// variant when `ignore_bracketed` is enabled.
fn optional_permutations(choice: &str, ignore_bracketed: bool) -> Vec<String> {
    let mut permutations = vec![String::new()];
    let mut rest = choice;

    while !rest.is_empty() {
        let open = match rest.find(OPEN_OPTIONAL) {
            Some(i) => i,
            None => break,
        };

        let close = match matching_close(rest, open, CLOSE_OPTIONAL) {
            Some(i) => i,
            // unmatched opener: literal tail, including the delimiter
            None => break,
        };

        let before = &rest[..open];
        let optional = &rest[open + OPEN_OPTIONAL.len_utf8()..close];

        let mut next = Vec::with_capacity(permutations.len() * 2);
        for prefix in &permutations {
            if ignore_bracketed {
                next.push(format!("{prefix}{before}"));
            }
            next.push(format!("{prefix}{before}{optional}"));
        }
        permutations = next;

        rest = &rest[close + CLOSE_OPTIONAL.len_utf8()..];
    }

    for permutation in &mut permutations {
        permutation.push_str(rest);
    }

    permutations
}

/// Index of the closer matching the opener at `open`, scanning left to
/// right. Choice and optional groups do not nest, so the first closer after
/// the opener is the match.
fn matching_close(s: &str, open: usize, close: char) -> Option<usize> {
    s[open..].find(close).map(|i| open + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expanded(pattern: &str, ignore_bracketed: bool) -> Vec<String> {
        expand(pattern, ignore_bracketed).into_iter().collect()
    }

    #[test]
    fn plain_pattern_is_singleton() {
        assert_eq!(expanded("  to go  ", true), vec!["to go"]);
    }

    #[test]
    fn terms_split_on_pipe() {
        assert_eq!(expanded("to go|to walk", true), vec!["to go", "to walk"]);
    }

    #[test]
    fn choice_group_expands() {
        assert_eq!(
            expanded("{car|automobile} park", true),
            vec!["automobile park", "car park"]
        );
    }

    #[test]
    fn optional_segment_kept_and_dropped() {
        assert_eq!(expanded("colo(u)r", true), vec!["color", "colour"]);
    }

    #[test]
    fn optional_segment_kept_only_when_disabled() {
        assert_eq!(expanded("colo(u)r", false), vec!["colour"]);
    }

    #[test]
    fn annotations_are_removed() {
        assert_eq!(expanded("word [a hint]", true), vec!["word"]);
    }

    #[test]
    fn reference_pattern_expands_exactly() {
        let literals = expanded("abc{de|fg}h|ij{k|lm}{opq|rs}tu|vw(x){y|z}", false);
        assert_eq!(
            literals,
            vec![
                "abcdeh",
                "abcfgh",
                "ijkopqtu",
                "ijkrstu",
                "ijlmopqtu",
                "ijlmrstu",
                "vwxy",
                "vwxz",
            ]
        );
    }

    #[test]
    fn reference_pattern_gains_dropped_variants_when_ignoring() {
        let literals = expand("abc{de|fg}h|ij{k|lm}{opq|rs}tu|vw(x){y|z}", true);
        assert!(literals.contains("vwy"));
        assert!(literals.contains("vwz"));
        assert_eq!(literals.len(), 10);
    }

    #[test]
    fn pipe_inside_unmatched_choice_does_not_split() {
        // the unmatched opener makes the rest a literal tail
        assert_eq!(expanded("a{b|c", true), vec!["a{b|c"]);
    }

    #[test]
    fn unmatched_optional_is_literal_tail() {
        assert_eq!(expanded("ab(cd", true), vec!["ab(cd"]);
    }

    #[test]
    fn dangling_closer_is_ordinary_text() {
        assert_eq!(expanded("ab}cd", true), vec!["ab}cd"]);
        assert_eq!(expanded("ab)cd", true), vec!["ab)cd"]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(expanded("{a|a}", true), vec!["a"]);
    }

    #[test]
    fn stray_separators_denote_nothing() {
        assert_eq!(expanded("a||b|", true), vec!["a", "b"]);
    }

    #[test]
    fn whitespace_around_alternatives_is_trimmed() {
        assert_eq!(expanded(" {a |b } c ", true), vec!["a  c", "b  c"]);
    }

    #[test]
    fn display_form_strips_annotations_and_parens() {
        assert_eq!(display_form("colo(u)r [spelling]"), "colour");
    }

    #[test]
    fn multiple_optionals_multiply() {
        assert_eq!(
            expanded("a(b)c(d)", true),
            vec!["abc", "abcd", "ac", "acd"]
        );
    }
}
