//! Phoneme classes and the items of a rule side

use super::error::CompileErrorKind;
use super::scan;

/// The empty-option marker inside classes
pub const EMPTY_MARKER: &str = "_";
/// Deletion marker; also accepted as an empty option inside classes
pub const NULL_MARKER: &str = "∅";

/// One whitespace-separated item of a rule side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Literal(String),
    /// Flattened members; `None` is the empty option
    Class(Vec<Option<String>>),
}

impl Item {
    pub fn is_class(&self) -> bool {
        matches!(self, Item::Class(_))
    }
}

/// Split a side of a rule into literal tokens and flattened classes
pub fn parse_items(text: &str) -> Result<Vec<Item>, CompileErrorKind> {
    let mut items = Vec::new();
    let mut offset = 0;

    while offset < text.len() {
        let rest = &text[offset..];
        let Some(c) = rest.chars().next() else { break };

        if c.is_whitespace() {
            offset += c.len_utf8();
            continue;
        }

        match c {
            '[' => {
                let close =
                    scan::find_matching(text, offset).ok_or(CompileErrorKind::UnclosedClass)?;
                items.push(Item::Class(flatten_class(&text[offset + 1..close])?));
                offset = close + 1;
            }
            ']' => return Err(CompileErrorKind::UnclosedClass),
            '(' | ')' => return Err(CompileErrorKind::OptionalGroupOutsideContext),
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')'))
                    .unwrap_or(rest.len());
                items.push(Item::Literal(rest[..end].to_string()));
                offset += end;
            }
        }
    }

    Ok(items)
}

/// Flatten the inside of a class, nested classes included
pub fn flatten_class(inner: &str) -> Result<Vec<Option<String>>, CompileErrorKind> {
    let mut members = Vec::new();

    for item in parse_items(inner)? {
        match item {
            Item::Literal(token) if token == EMPTY_MARKER || token == NULL_MARKER => {
                members.push(None)
            }
            Item::Literal(token) => members.push(Some(token)),
            Item::Class(nested) => members.extend(nested),
        }
    }

    if members.is_empty() {
        return Err(CompileErrorKind::EmptyClass);
    }

    Ok(members)
}

/// Whether a context side could be satisfied by nothing at all
///
/// True when the side has at least one class, every class offers the empty
/// option, and there is no literal to anchor it.
pub fn is_vacuous(items: &[Item]) -> bool {
    let mut has_class = false;
    for item in items {
        match item {
            Item::Literal(_) => return false,
            Item::Class(members) => {
                has_class = true;
                if !members.iter().any(Option::is_none) {
                    return false;
                }
            }
        }
    }
    has_class
}

/// Expand classes embedded in a context side into concrete token sequences
///
/// Every class member is substituted in turn; empty options drop out of the
/// sequence. Order follows the members left to right, duplicates removed.
pub fn expand_context_items(items: &[Item]) -> Vec<Vec<String>> {
    let mut sequences: Vec<Vec<String>> = vec![Vec::new()];

    for item in items {
        sequences = match item {
            Item::Literal(token) => sequences
                .into_iter()
                .map(|mut seq| {
                    seq.push(token.clone());
                    seq
                })
                .collect(),
            Item::Class(members) => sequences
                .iter()
                .flat_map(|seq| {
                    members.iter().map(move |member| {
                        let mut next = seq.clone();
                        if let Some(token) = member {
                            next.push(token.clone());
                        }
                        next
                    })
                })
                .collect(),
        };
    }

    let mut distinct = Vec::with_capacity(sequences.len());
    for seq in sequences {
        if !distinct.contains(&seq) {
            distinct.push(seq);
        }
    }
    distinct
}

/// Reformat items back into rule text, used in diagnostics
pub fn render_items(items: &[Item]) -> String {
    let rendered: Vec<String> = items
        .iter()
        .map(|item| match item {
            Item::Literal(token) => token.clone(),
            Item::Class(members) => {
                let inner: Vec<&str> = members
                    .iter()
                    .map(|m| m.as_deref().unwrap_or(EMPTY_MARKER))
                    .collect();
                format!("[{}]", inner.join(" "))
            }
        })
        .collect();
    scan::normalize_whitespace(&rendered.join(" "))
}
