//! Class pairing and the final Cartesian combination into concrete rules

use super::classes::{self, Item, NULL_MARKER};
use super::error::{CompileErrorKind, ContextSide};
use super::optional;
use crate::config::compile_time::compiler::{MAX_OPTIONAL_GROUPS_PER_SIDE, MAX_RULES_PER_STATEMENT};
use crate::rules::Rule;

/// A concrete `from`/`to` pair before contexts are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// Expand `from`/`to` items into concrete rewrites
///
/// The k-th class of `to` pairs positionally with the k-th class of `from`; classes
/// of `from` without a partner broadcast the same `to` over every member.
pub fn expand_rewrites(from: &[Item], to: &[Item]) -> Result<Vec<Rewrite>, CompileErrorKind> {
    let from_classes: Vec<&Vec<Option<String>>> = class_members(from);
    let to_classes: Vec<&Vec<Option<String>>> = class_members(to);

    if !to_classes.is_empty() && from_classes.is_empty() {
        return Err(CompileErrorKind::ClassTargetRequiresClassSource);
    }
    if to_classes.len() > from_classes.len() {
        return Err(CompileErrorKind::UnpairedTargetClass {
            from_classes: from_classes.len(),
            to_classes: to_classes.len(),
        });
    }
    for (source, target) in from_classes.iter().zip(&to_classes) {
        if source.len() != target.len() {
            return Err(CompileErrorKind::PairedClassArityMismatch {
                from_len: source.len(),
                to_len: target.len(),
            });
        }
    }

    let total = checked_product(from_classes.iter().map(|c| c.len()))?;
    let mut rewrites: Vec<Rewrite> = Vec::with_capacity(total);

    for choice in MemberChoices::new(from_classes.iter().map(|c| c.len()).collect()) {
        let from_tokens = realize(from, &choice);
        if from_tokens.is_empty() {
            return Err(CompileErrorKind::EmptyFrom);
        }
        let rewrite = Rewrite {
            from: from_tokens,
            to: realize(to, &choice),
        };
        if !rewrites.contains(&rewrite) {
            rewrites.push(rewrite);
        }
    }

    Ok(rewrites)
}

fn class_members(items: &[Item]) -> Vec<&Vec<Option<String>>> {
    items
        .iter()
        .filter_map(|item| match item {
            Item::Class(members) => Some(members),
            Item::Literal(_) => None,
        })
        .collect()
}

/// Build one side's tokens, taking member `choice[k]` from the k-th class
fn realize(items: &[Item], choice: &[usize]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut class_index = 0;

    for item in items {
        match item {
            Item::Literal(token) if token == NULL_MARKER => {}
            Item::Literal(token) => tokens.push(token.clone()),
            Item::Class(members) => {
                if let Some(token) = &members[choice[class_index]] {
                    if token != NULL_MARKER {
                        tokens.push(token.clone());
                    }
                }
                class_index += 1;
            }
        }
    }

    tokens
}

/// Odometer over one member index per class, last class fastest
struct MemberChoices {
    sizes: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl MemberChoices {
    fn new(sizes: Vec<usize>) -> Self {
        let current = (!sizes.contains(&0)).then(|| vec![0; sizes.len()]);
        Self { sizes, current }
    }
}

impl Iterator for MemberChoices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.current.take()?;

        let mut next = current.clone();
        let mut position = next.len();
        while position > 0 {
            position -= 1;
            next[position] += 1;
            if next[position] < self.sizes[position] {
                self.current = Some(next);
                break;
            }
            next[position] = 0;
        }

        Some(current)
    }
}

/// Expand one context side into its token-sequence variants
///
/// `None` in the result means "no constraint", produced by an absent side or by
/// the fully-absent optional variant.
pub fn expand_context(
    text: Option<&str>,
    side: ContextSide,
) -> Result<Vec<Option<Vec<String>>>, CompileErrorKind> {
    let Some(text) = text else {
        return Ok(vec![None]);
    };

    let variants_text = optional::expand_optional_text(text, MAX_OPTIONAL_GROUPS_PER_SIDE)?;

    // Vacuity is a property of the whole side, optional content included
    let whole_side: String = text
        .chars()
        .map(|c| if c == '(' || c == ')' { ' ' } else { c })
        .collect();
    if classes::is_vacuous(&classes::parse_items(&whole_side)?) {
        return Err(CompileErrorKind::VacuousContext { side });
    }

    let mut variants: Vec<Option<Vec<String>>> = Vec::new();
    for variant in variants_text {
        let items = classes::parse_items(&variant)?;
        for sequence in classes::expand_context_items(&items) {
            let constraint = (!sequence.is_empty()).then_some(sequence);
            push_distinct(&mut variants, constraint);
        }
    }

    Ok(variants)
}

fn push_distinct<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn checked_product<I: IntoIterator<Item = usize>>(factors: I) -> Result<usize, CompileErrorKind> {
    let mut product: usize = 1;
    for factor in factors {
        product = product
            .checked_mul(factor)
            .filter(|p| *p <= MAX_RULES_PER_STATEMENT)
            .ok_or(CompileErrorKind::ExpansionLimitExceeded {
                count: product.saturating_mul(factor),
                max: MAX_RULES_PER_STATEMENT,
            })?;
    }
    Ok(product)
}

/// Cartesian product rewrites × left variants × right variants, in that order
pub fn combine(
    rewrites: &[Rewrite],
    left: &[Option<Vec<String>>],
    right: &[Option<Vec<String>>],
    line: usize,
) -> Result<Vec<Rule>, CompileErrorKind> {
    let total = checked_product([rewrites.len(), left.len(), right.len()])?;
    let mut rules: Vec<Rule> = Vec::with_capacity(total);

    for rewrite in rewrites {
        for left_context in left {
            for right_context in right {
                push_distinct(
                    &mut rules,
                    Rule {
                        from: rewrite.from.clone(),
                        to: rewrite.to.clone(),
                        left_context: left_context.clone(),
                        right_context: right_context.clone(),
                        line,
                    },
                );
            }
        }
    }

    Ok(rules)
}
