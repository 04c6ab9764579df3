//! Phoneme/phonotactics definition text
//!
//! Three layouts are accepted and produce the same in-memory inventory:
//!
//! ```text
//! p t k, a i u                 flat list
//!
//! C = [p t k]                  class definitions followed by pattern lines
//! V = [a i u]
//! CV(C)
//!
//! [inventory]                  sectioned
//! C = [p t k]
//! V = [a i u]
//! [phonotactics]
//! CV(C)
//! ```
//!
//! Pattern lines are read greedily, longest symbol first, with class names winning
//! ties against phonemes. Whitespace between symbols is optional.

use super::error::InventoryError;
use super::PhonemeInventory;
use crate::compiler::classes;
use crate::compiler::lines;
use crate::compiler::negation;
use crate::compiler::optional::{self, Fragment};
use crate::compiler::scan;
use crate::compiler::variables::{VariableDefinition, VariableTable};
use crate::compiler::CompileError;
use crate::config::compile_time::compiler::MAX_OPTIONAL_GROUPS_PER_SIDE;
use crate::config::compile_time::inventory::{MAX_PATTERNS, MAX_PHONEMES};
use crate::logging::codes;
use crate::phonotactics::PhonotacticPattern;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No header seen yet
    Unsectioned,
    Phonemes,
    Phonotactics,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
        match inner.to_ascii_lowercase().as_str() {
            "inventory" | "phonemes" => Some(Section::Phonemes),
            "phonotactics" | "patterns" => Some(Section::Phonotactics),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Section::Unsectioned => "top-level",
            Section::Phonemes => "inventory",
            Section::Phonotactics => "phonotactics",
        }
    }
}

#[derive(Debug, Clone)]
struct PatternLine {
    line: usize,
    text: String,
}

/// Parse a phoneme/phonotactics definition
pub fn parse_inventory(text: &str) -> Result<PhonemeInventory, InventoryError> {
    let started = Instant::now();

    let mut table = VariableTable::new();
    let mut listed: BTreeSet<String> = BTreeSet::new();
    let mut pattern_lines: Vec<PatternLine> = Vec::new();
    let mut section = Section::Unsectioned;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() || lines::is_comment(raw_line) {
            continue;
        }
        if let Some(header) = Section::from_header(trimmed) {
            section = header;
            continue;
        }

        for piece in trimmed.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            if lines::is_variable_definition(piece) {
                let (name, value) = lines::parse_variable(piece)
                    .map_err(|kind| CompileError::new(line, raw_line, kind))?;
                table.define(
                    VariableDefinition {
                        name,
                        value,
                        line,
                        source: raw_line.to_string(),
                    },
                    true,
                )?;
                continue;
            }

            let is_list = match section {
                Section::Phonemes => true,
                Section::Phonotactics => false,
                // Until a class is declared, bare lines are a plain phoneme list
                Section::Unsectioned => table.is_empty() && pattern_lines.is_empty(),
            };

            if is_list {
                if piece.contains(['(', ')']) {
                    return Err(InventoryError::UnexpectedContent {
                        line,
                        section: section.name().to_string(),
                    });
                }
                listed.extend(list_tokens(piece));
            } else {
                pattern_lines.push(PatternLine {
                    line,
                    text: piece.to_string(),
                });
            }
        }
    }

    let resolved = table.resolve_all()?;

    let mut class_members: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in table.names() {
        let value = resolved.get(name).unwrap_or_default();
        let members = negation::literal_tokens(value).map(str::to_string).collect();
        class_members.insert(name.clone(), members);
    }

    let mut phonemes = listed;
    phonemes.extend(class_members.values().flatten().cloned());

    if phonemes.len() > MAX_PHONEMES {
        return Err(InventoryError::TooManyPhonemes {
            count: phonemes.len(),
            max: MAX_PHONEMES,
        });
    }

    let symbols = SymbolTable::new(&class_members, &phonemes);
    let mut patterns: Vec<PhonotacticPattern> = Vec::new();
    for pattern_line in &pattern_lines {
        for pattern in parse_pattern_line(pattern_line, &symbols)? {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
            if patterns.len() > MAX_PATTERNS {
                return Err(InventoryError::TooManyPatterns {
                    count: patterns.len(),
                    max: MAX_PATTERNS,
                });
            }
        }
    }

    crate::log_success!(
        codes::success::INVENTORY_PARSE_COMPLETE,
        "Inventory parsed",
        "phonemes" => phonemes.len(),
        "classes" => class_members.len(),
        "patterns" => patterns.len(),
        "duration_ms" => format!("{:.3}", started.elapsed().as_secs_f64() * 1000.0)
    );

    Ok(PhonemeInventory::new(phonemes)
        .with_patterns(patterns)
        .with_classes(class_members))
}

/// Tokens of a flat list line; commas and whitespace both separate
fn list_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .flat_map(negation::literal_tokens)
        .map(str::to_string)
}

#[derive(Debug, Clone)]
enum Symbol {
    Class(BTreeSet<String>),
    Phoneme,
}

/// Everything a pattern line may reference, longest first
struct SymbolTable<'a> {
    entries: Vec<(String, Symbol)>,
    phonemes: &'a BTreeSet<String>,
}

impl<'a> SymbolTable<'a> {
    fn new(classes: &BTreeMap<String, BTreeSet<String>>, phonemes: &'a BTreeSet<String>) -> Self {
        let mut entries: Vec<(String, Symbol)> = classes
            .iter()
            .map(|(name, members)| (name.clone(), Symbol::Class(members.clone())))
            .chain(phonemes.iter().map(|p| (p.clone(), Symbol::Phoneme)))
            .collect();

        entries.sort_by(|(a, a_kind), (b, b_kind)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| rank(a_kind).cmp(&rank(b_kind)))
                .then_with(|| a.cmp(b))
        });

        Self { entries, phonemes }
    }

    fn longest_at(&self, text: &str) -> Option<(&str, &Symbol)> {
        self.entries
            .iter()
            .find(|(name, _)| text.starts_with(name.as_str()))
            .map(|(name, symbol)| (name.as_str(), symbol))
    }
}

fn rank(symbol: &Symbol) -> u8 {
    match symbol {
        Symbol::Class(_) => 0,
        Symbol::Phoneme => 1,
    }
}

fn parse_pattern_line(
    pattern_line: &PatternLine,
    symbols: &SymbolTable<'_>,
) -> Result<Vec<PhonotacticPattern>, InventoryError> {
    let line = pattern_line.line;
    let fragments = optional::parse_fragments(&pattern_line.text)
        .map_err(|kind| InventoryError::malformed_pattern(line, &kind.to_string()))?;

    let mut to_slots = |chunk: String| segment(&chunk, line, symbols);
    let mut slotted: Vec<Fragment<BTreeSet<String>>> = Vec::new();
    for fragment in fragments {
        slotted.extend(fragment.flat_map(&mut to_slots)?);
    }

    if optional::count_optionals(&slotted) > MAX_OPTIONAL_GROUPS_PER_SIDE {
        return Err(InventoryError::malformed_pattern(
            line,
            &format!(
                "more than {} optional groups",
                MAX_OPTIONAL_GROUPS_PER_SIDE
            ),
        ));
    }

    Ok(optional::enumerate(&slotted)
        .into_iter()
        .filter(|slots| !slots.is_empty())
        .map(PhonotacticPattern::new)
        .collect())
}

/// Split fixed pattern text into one allowed-token set per slot
fn segment(
    text: &str,
    line: usize,
    symbols: &SymbolTable<'_>,
) -> Result<Vec<BTreeSet<String>>, InventoryError> {
    let mut slots = Vec::new();
    let mut offset = 0;

    while let Some(c) = text[offset..].chars().next() {
        if c.is_whitespace() || c == ',' {
            offset += c.len_utf8();
            continue;
        }

        if c == '[' {
            let close = scan::find_matching(text, offset)
                .ok_or_else(|| InventoryError::malformed_pattern(line, "unclosed class"))?;
            slots.push(inline_class(&text[offset + 1..close], line, symbols)?);
            offset = close + 1;
            continue;
        }
        if c == ']' {
            return Err(InventoryError::malformed_pattern(line, "unexpected ']'"));
        }

        let (name, symbol) =
            symbols
                .longest_at(&text[offset..])
                .ok_or_else(|| InventoryError::UnknownPatternSymbol {
                    line,
                    symbol: c.to_string(),
                })?;

        let slot = match symbol {
            Symbol::Class(members) if members.is_empty() => {
                return Err(InventoryError::malformed_pattern(
                    line,
                    &format!("class '{}' has no phonemes", name),
                ))
            }
            Symbol::Class(members) => members.clone(),
            Symbol::Phoneme => BTreeSet::from([name.to_string()]),
        };
        slots.push(slot);
        offset += name.len();
    }

    Ok(slots)
}

fn inline_class(
    inner: &str,
    line: usize,
    symbols: &SymbolTable<'_>,
) -> Result<BTreeSet<String>, InventoryError> {
    let members = classes::flatten_class(inner)
        .map_err(|kind| InventoryError::malformed_pattern(line, &kind.to_string()))?;

    let mut slot = BTreeSet::new();
    for member in members {
        let Some(token) = member else {
            return Err(InventoryError::malformed_pattern(
                line,
                "empty option inside a pattern class, use ( ) for optional slots",
            ));
        };
        if !symbols.phonemes.contains(&token) {
            return Err(InventoryError::UnknownPatternSymbol {
                line,
                symbol: token,
            });
        }
        slot.insert(token);
    }
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileErrorKind;
    use assert_matches::assert_matches;

    fn slots(pattern: &PhonotacticPattern) -> String {
        pattern.to_string()
    }

    #[test]
    fn test_flat_list() {
        let inventory = parse_inventory("p t k, a i\nu").unwrap();
        assert_eq!(inventory.len(), 6);
        assert!(inventory.contains("u"));
        assert!(!inventory.is_constrained());
    }

    #[test]
    fn test_classes_and_patterns() {
        let inventory = parse_inventory("C = [p t]\nV = [a i]\nCV(C)").unwrap();
        let patterns: Vec<String> = inventory.patterns().iter().map(slots).collect();
        assert_eq!(patterns, vec!["[p t][a i][p t]", "[p t][a i]"]);
        assert_eq!(inventory.phonemes().len(), 4);
        assert_eq!(
            inventory.classes().get("C"),
            Some(&BTreeSet::from(["p".to_string(), "t".to_string()]))
        );
    }

    #[test]
    fn test_sectioned_form_matches_plain_form() {
        let plain = parse_inventory("C = [p t]\nV = [a i]\nCV(C)\nV").unwrap();
        let sectioned = parse_inventory(
            "[inventory]\nC = [p t]\nV = [a i]\n\n[phonotactics]\nCV(C)\nV\n",
        )
        .unwrap();
        assert_eq!(plain, sectioned);
    }

    #[test]
    fn test_longest_symbol_wins() {
        let inventory = parse_inventory("C = [t h th]\nV = [a]\nthV").unwrap();
        let patterns: Vec<String> = inventory.patterns().iter().map(slots).collect();
        assert_eq!(patterns, vec!["[th][a]"]);
    }

    #[test]
    fn test_class_name_beats_phoneme_of_equal_length() {
        let inventory = parse_inventory("a e\nV = [e]\na = [p]\nVa").unwrap();
        let patterns: Vec<String> = inventory.patterns().iter().map(slots).collect();
        assert_eq!(patterns, vec!["[e][p]"]);
    }

    #[test]
    fn test_inline_class() {
        let inventory = parse_inventory("C = [p]\nV = [a]\n[p a] V").unwrap();
        let patterns: Vec<String> = inventory.patterns().iter().map(slots).collect();
        assert_eq!(patterns, vec!["[a p][a]"]);
    }

    #[test]
    fn test_pattern_errors_carry_lines() {
        assert_matches!(
            parse_inventory("C = [p]\nCx"),
            Err(InventoryError::UnknownPatternSymbol { line: 2, ref symbol }) if symbol == "x"
        );
        assert_matches!(
            parse_inventory("C = [p]\n[p q]"),
            Err(InventoryError::UnknownPatternSymbol { line: 2, .. })
        );
        assert_matches!(
            parse_inventory("C = [p]\n\nC(C"),
            Err(InventoryError::MalformedPattern { line: 3, .. })
        );
        assert_matches!(
            parse_inventory("[phonemes]\np (t)"),
            Err(InventoryError::UnexpectedContent { line: 2, .. })
        );
    }

    #[test]
    fn test_circular_classes() {
        let err = parse_inventory("A = B\nB = A\nAB").unwrap_err();
        assert_matches!(
            err,
            InventoryError::Variable(CompileError {
                kind: CompileErrorKind::CircularReference { .. },
                ..
            })
        );
        assert_eq!(err.error_code().as_str(), "E028");
    }
}
