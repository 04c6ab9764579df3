//! Whole-token replacement of variable names
//!
//! A name only matches where it is not flanked by alphanumeric characters, so `V`
//! never matches inside `VV` or `aV`, while `V_V` still yields two matches.
//! Longer names are tried first.

/// Names sorted longest first (ties lexicographic) for deterministic scanning
pub fn sort_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut sorted: Vec<String> = names.into_iter().cloned().collect();
    sorted.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup();
    sorted
}

/// Find the name occurring at byte offset `at`, if any
fn name_at<'n>(text: &str, at: usize, names: &'n [String]) -> Option<&'n str> {
    if text[..at]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
    {
        return None;
    }

    let rest = &text[at..];
    names.iter().map(String::as_str).find(|name| {
        rest.starts_with(name)
            && !rest[name.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric)
    })
}

/// Names referenced by `text`, in order of appearance
pub fn references(text: &str, names: &[String]) -> Vec<String> {
    let mut found = Vec::new();
    let mut offset = 0;

    while offset < text.len() {
        if let Some(name) = name_at(text, offset, names) {
            found.push(name.to_string());
            offset += name.len();
        } else {
            offset += text[offset..].chars().next().map_or(1, char::len_utf8);
        }
    }

    found
}

/// Replace every whole-token occurrence of a name with `lookup(name)`
///
/// The replacement text is not rescanned.
pub fn substitute<F, E>(text: &str, names: &[String], mut lookup: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    let mut output = String::with_capacity(text.len());
    let mut offset = 0;

    while offset < text.len() {
        if let Some(name) = name_at(text, offset, names) {
            output.push_str(&lookup(name)?);
            offset += name.len();
        } else if let Some(c) = text[offset..].chars().next() {
            output.push(c);
            offset += c.len_utf8();
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn replace(text: &str, pairs: &[(&str, &str)]) -> String {
        let owned: Vec<String> = pairs.iter().map(|(n, _)| n.to_string()).collect();
        let names = sort_names(&owned);
        substitute::<_, Infallible>(text, &names, |name| {
            Ok(pairs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default())
        })
        .unwrap()
    }

    #[test]
    fn test_whole_token_matching() {
        let pairs = [("V", "[a e]")];
        assert_eq!(replace("V > x / VV _", &pairs), "[a e] > x / VV _");
        assert_eq!(replace("V_V", &pairs), "[a e]_[a e]");
        assert_eq!(replace("[V i]", &pairs), "[[a e] i]");
    }

    #[test]
    fn test_longest_name_first() {
        let pairs = [("C", "[p t]"), ("Cv", "[b d]")];
        assert_eq!(replace("Cv C", &pairs), "[b d] [p t]");
    }

    #[test]
    fn test_references_in_order() {
        let names = sort_names(&["A".to_string(), "BC".to_string()]);
        assert_eq!(references("BC [A] xA A", &names), vec!["BC", "A", "A"]);
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let pairs = [("V", "[a]")];
        assert_eq!(replace("ʃ V ∅", &pairs), "ʃ [a] ∅");
    }
}
