//! Structural split of a rule statement into `from`, `to` and context sides

use super::error::CompileErrorKind;
use super::scan;

/// Raw text of each part of `from > to / left _ right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleShape {
    pub from: String,
    pub to: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

pub fn parse_shape(statement: &str) -> Result<RuleShape, CompileErrorKind> {
    if !scan::is_balanced(statement) {
        return Err(if statement.contains(['(', ')']) && !statement.contains(['[', ']']) {
            CompileErrorKind::UnclosedOptionalGroup
        } else {
            CompileErrorKind::UnclosedClass
        });
    }

    let arrows = statement.matches('>').count();
    if arrows != 1 {
        return Err(CompileErrorKind::malformed_rule(&format!(
            "expected exactly one '>', found {}",
            arrows
        )));
    }

    let (from, right_side) = statement
        .split_once('>')
        .ok_or_else(|| CompileErrorKind::malformed_rule("missing '>'"))?;

    let slashes = scan::find_top_level(right_side, b'/');
    let (to, context) = match slashes.as_slice() {
        [] => (right_side, None),
        [slash] => (&right_side[..*slash], Some(&right_side[slash + 1..])),
        _ => {
            return Err(CompileErrorKind::malformed_rule(
                "more than one '/' context separator",
            ))
        }
    };

    let from = from.trim();
    let to = to.trim();

    if from.is_empty() {
        return Err(CompileErrorKind::EmptyFrom);
    }
    for side in [from, to] {
        if side.contains(['(', ')']) {
            return Err(CompileErrorKind::OptionalGroupOutsideContext);
        }
        if !scan::find_top_level(side, b'_').is_empty() {
            return Err(CompileErrorKind::malformed_rule(
                "'_' may only appear in contexts or inside classes",
            ));
        }
    }

    let (left, right) = match context {
        None => (None, None),
        Some(context) => split_context(context)?,
    };

    Ok(RuleShape {
        from: from.to_string(),
        to: to.to_string(),
        left,
        right,
    })
}

/// Split `left _ right` on the single top-level placeholder
fn split_context(context: &str) -> Result<(Option<String>, Option<String>), CompileErrorKind> {
    let placeholders = scan::find_top_level(context, b'_');
    let position = match placeholders.as_slice() {
        [] => return Err(CompileErrorKind::MissingPlaceholder),
        [position] => *position,
        _ => return Err(CompileErrorKind::DuplicatePlaceholder),
    };

    let side = |text: &str| {
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    };

    Ok((side(&context[..position]), side(&context[position + 1..])))
}
