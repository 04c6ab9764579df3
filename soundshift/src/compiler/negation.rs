//! Phoneme universe inference and `![...]` expansion

use super::error::CompileErrorKind;
use super::scan;
use std::collections::BTreeSet;

/// Characters that separate tokens in rule syntax
const SYNTAX_DELIMITERS: &[char] = &['[', ']', '(', ')', '!', '>', '/', '_', ';', '='];

/// Tokens that mark positions rather than phonemes
const MARKERS: &[&str] = &["#", "∅"];

/// Literal phoneme tokens in `text`, ignoring syntax and markers
pub fn literal_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || SYNTAX_DELIMITERS.contains(&c))
        .filter(|token| !token.is_empty() && !MARKERS.contains(token))
}

/// Every literal token in the given texts, sorted
pub fn collect_universe<'a, I>(texts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .flat_map(literal_tokens)
        .map(str::to_string)
        .collect()
}

/// Replace each `![...]` with the class of universe members it does not list
pub fn expand_negative_sets(
    text: &str,
    universe: &BTreeSet<String>,
) -> Result<String, CompileErrorKind> {
    if !text.contains('!') {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut offset = 0;

    while let Some(relative) = text[offset..].find('!') {
        let bang = offset + relative;
        output.push_str(&text[offset..bang]);

        let after = &text[bang + 1..];
        let gap = after.len() - after.trim_start().len();
        let open = bang + 1 + gap;
        if !text[open..].starts_with('[') {
            return Err(CompileErrorKind::MalformedNegativeSet);
        }

        let close = scan::find_matching(text, open).ok_or(CompileErrorKind::UnclosedClass)?;
        let excluded: BTreeSet<&str> = literal_tokens(&text[open + 1..close]).collect();

        let complement: Vec<&str> = universe
            .iter()
            .map(String::as_str)
            .filter(|token| !excluded.contains(token))
            .collect();

        if complement.is_empty() {
            return Err(CompileErrorKind::EmptyNegativeSet);
        }

        output.push('[');
        output.push_str(&complement.join(" "));
        output.push(']');
        offset = close + 1;
    }

    output.push_str(&text[offset..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn universe(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_universe_ignores_syntax_and_markers() {
        let found = collect_universe(["[p t] > ∅ / # _ (a)", "![k] > x"]);
        assert_eq!(found, universe(&["a", "k", "p", "t", "x"]));
    }

    #[test]
    fn test_complement_is_sorted() {
        let expanded = expand_negative_sets("![a] > x / _ !  [t]", &universe(&["t", "a", "k", "p"]))
            .unwrap();
        assert_eq!(expanded, "[k p t] > x / _ [a k p]");
    }

    #[test]
    fn test_empty_complement() {
        assert_matches!(
            expand_negative_sets("![a b] > c", &universe(&["a", "b"])),
            Err(CompileErrorKind::EmptyNegativeSet)
        );
    }

    #[test]
    fn test_bang_without_class() {
        assert_matches!(
            expand_negative_sets("!a > b", &universe(&["a", "b"])),
            Err(CompileErrorKind::MalformedNegativeSet)
        );
        assert_matches!(
            expand_negative_sets("![a > b", &universe(&["a", "b"])),
            Err(CompileErrorKind::UnclosedClass)
        );
    }
}
