//! Optional groups as a tagged tree of fixed and optional fragments
//!
//! The tree is generic so inventory patterns reuse it with slots in place of text.

use super::error::CompileErrorKind;
use super::scan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<T> {
    Fixed(T),
    Optional(Vec<Fragment<T>>),
}

impl<T> Fragment<T> {
    /// Number of optional groups in this fragment, nested ones included
    pub fn optional_count(&self) -> usize {
        match self {
            Fragment::Fixed(_) => 0,
            Fragment::Optional(inner) => 1 + count_optionals(inner),
        }
    }

    /// Convert fixed payloads, splicing each result into the tree
    pub fn flat_map<U, E, F>(self, f: &mut F) -> Result<Vec<Fragment<U>>, E>
    where
        F: FnMut(T) -> Result<Vec<U>, E>,
    {
        match self {
            Fragment::Fixed(value) => Ok(f(value)?.into_iter().map(Fragment::Fixed).collect()),
            Fragment::Optional(inner) => {
                let mut converted = Vec::new();
                for fragment in inner {
                    converted.extend(fragment.flat_map(f)?);
                }
                Ok(vec![Fragment::Optional(converted)])
            }
        }
    }
}

pub fn count_optionals<T>(fragments: &[Fragment<T>]) -> usize {
    fragments.iter().map(Fragment::optional_count).sum()
}

/// Every present/absent combination, each as the concatenated fixed payloads
///
/// Variants come out with groups present before absent. Duplicates are kept;
/// callers deduplicate on their own representation.
pub fn enumerate<T: Clone>(fragments: &[Fragment<T>]) -> Vec<Vec<T>> {
    let mut variants: Vec<Vec<T>> = vec![Vec::new()];

    for fragment in fragments {
        let choices: Vec<Vec<T>> = match fragment {
            Fragment::Fixed(value) => vec![vec![value.clone()]],
            Fragment::Optional(inner) => {
                let mut present = enumerate(inner);
                present.push(Vec::new());
                present
            }
        };

        variants = variants
            .iter()
            .flat_map(|prefix| {
                choices.iter().map(move |choice| {
                    let mut combined = prefix.clone();
                    combined.extend(choice.iter().cloned());
                    combined
                })
            })
            .collect();
    }

    variants
}

/// Split context text into fixed text and `( )` groups
pub fn parse_fragments(text: &str) -> Result<Vec<Fragment<String>>, CompileErrorKind> {
    let mut fragments = Vec::new();
    let mut offset = 0;
    let mut fixed_start = 0;
    let mut depth: usize = 0;

    let bytes = text.as_bytes();
    while offset < bytes.len() {
        match bytes[offset] {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'(' if depth == 0 => {
                let close = scan::find_matching(text, offset)
                    .ok_or(CompileErrorKind::UnclosedOptionalGroup)?;
                push_fixed(&mut fragments, &text[fixed_start..offset]);
                let inner = parse_fragments(&text[offset + 1..close])?;
                fragments.push(Fragment::Optional(inner));
                offset = close + 1;
                fixed_start = offset;
                continue;
            }
            b')' if depth == 0 => return Err(CompileErrorKind::UnclosedOptionalGroup),
            _ => {}
        }
        offset += 1;
    }

    push_fixed(&mut fragments, &text[fixed_start..]);
    Ok(fragments)
}

fn push_fixed(fragments: &mut Vec<Fragment<String>>, text: &str) {
    if !text.trim().is_empty() {
        fragments.push(Fragment::Fixed(text.to_string()));
    }
}

/// Expand a context side into its distinct textual variants
///
/// The fully-absent variant comes out as an empty string.
pub fn expand_optional_text(text: &str, max_groups: usize) -> Result<Vec<String>, CompileErrorKind> {
    let fragments = parse_fragments(text)?;

    let count = count_optionals(&fragments);
    if count > max_groups {
        return Err(CompileErrorKind::LimitExceeded {
            what: "optional groups on one side",
            count,
            max: max_groups,
        });
    }

    let mut distinct: Vec<String> = Vec::new();
    for variant in enumerate(&fragments) {
        let joined = scan::normalize_whitespace(&variant.join(" "));
        if !distinct.contains(&joined) {
            distinct.push(joined);
        }
    }

    Ok(distinct)
}
