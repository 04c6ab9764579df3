//! Whole-library scenarios: compile, apply and reverse through the public API

use assert_matches::assert_matches;
use soundshift::{
    apply, compile, parse_inventory, reverse, CompileErrorKind, PhonemeInventory, Session,
};
use std::collections::BTreeSet;

fn inventory(text: &str) -> PhonemeInventory {
    parse_inventory(text).unwrap()
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

const LENITION: &str = "\
V = [a e i]
p > b / V _ V
t > d / V _ V
[a e] > [e i] / _ #
";

#[test]
fn forward_then_reverse_recovers_the_word() {
    let rules = compile(LENITION).unwrap();
    let source = inventory("p t a e i");
    let target = inventory("p t b d a e i");

    for word in ["apata", "tipe", "pate", "ita"] {
        let derived = apply(word, &rules, &source, &target).unwrap();
        let sources = reverse(&derived, &rules, &source, &target).unwrap();
        assert!(
            sources.contains(word),
            "{} -> {} not recovered from {:?}",
            word,
            derived,
            sources
        );
    }

    assert_eq!(apply("apata", &rules, &source, &target).unwrap(), "abadi");
}

#[test]
fn round_trip_ignores_target_patterns() {
    let rules = compile("a > b").unwrap();
    let source = inventory("a");
    let target = inventory("C = [b]\nCC");

    let derived = apply("a", &rules, &source, &target).unwrap();
    assert_eq!(derived, "b");
    assert_eq!(reverse(&derived, &rules, &source, &target).unwrap(), set(&["a"]));
}

#[test]
fn repeated_calls_agree() {
    let rules = compile(LENITION).unwrap();
    let source = inventory("p t a e i");
    let target = inventory("p t b d a e i");

    let first = apply("tapa", &rules, &source, &target).unwrap();
    let second = apply("tapa", &rules, &source, &target).unwrap();
    assert_eq!(first, second);

    let first = reverse("tabe", &rules, &source, &target).unwrap();
    let second = reverse("tabe", &rules, &source, &target).unwrap();
    assert_eq!(first, second);
}

#[test]
fn paired_class_errors() {
    assert_matches!(
        compile("[a b] > [x y z]").unwrap_err().kind,
        CompileErrorKind::PairedClassArityMismatch { from_len: 2, to_len: 3 }
    );
    assert_matches!(
        compile("a > [x y]").unwrap_err().kind,
        CompileErrorKind::ClassTargetRequiresClassSource
    );
}

#[test]
fn circular_variables_name_a_participant() {
    let err = compile("A = B; B = A;").unwrap_err();
    assert_matches!(
        err.kind,
        CompileErrorKind::CircularReference { ref cycle }
            if cycle.iter().any(|name| name == "A" || name == "B")
    );
    assert_eq!(err.error_code().as_str(), "E028");
}

#[test]
fn classes_multiply_with_contexts() {
    let rules = compile("[a b] > [x y] / [c d] _;").unwrap();
    let rendered: BTreeSet<String> = rules.iter().map(|r| r.to_string()).collect();
    assert_eq!(
        rendered,
        set(&["a > x / c _", "a > x / d _", "b > y / c _", "b > y / d _"])
    );
}

#[test]
fn deletion_reversal_lists_every_insertion() {
    let rules = compile("h > ∅;").unwrap();
    let sources = reverse(
        "ello",
        &rules,
        &inventory("h e l o"),
        &inventory("e l o"),
    )
    .unwrap();
    assert_eq!(
        sources,
        set(&["hello", "ehllo", "elhlo", "ellho", "elloh", "ello"])
    );
}

#[test]
fn merged_phonemes_reverse_without_target_leftovers() {
    let rules = compile("a>x; b>y; c>x;").unwrap();
    let sources = reverse("xyx", &rules, &inventory("a b c"), &inventory("x y")).unwrap();
    assert_eq!(sources, set(&["aba", "abc", "cba", "cbc"]));
}

#[test]
fn source_phonotactics_can_leave_nothing() {
    let rules = compile("p > t").unwrap();
    let source = inventory("C = [p t]\nV = [a]\nCV");
    let target = inventory("t a");
    assert!(reverse("tat", &rules, &source, &target).unwrap().is_empty());
    assert_eq!(
        reverse("ta", &rules, &source, &target).unwrap(),
        set(&["pa", "ta"])
    );
}

#[test]
fn inventory_forms_parse_identically() {
    let plain = inventory("C = [p t]\nV = [a i]\nCV(C)");
    let sectioned = inventory("[inventory]\nC = [p t]\nV = [a i]\n\n[phonotactics]\nCV(C)\n");
    assert_eq!(plain, sectioned);
    assert_eq!(plain.phonemes(), &set(&["a", "i", "p", "t"]));
    assert_eq!(plain.patterns().len(), 2);
}

#[test]
fn session_runs_both_directions() {
    let mut session = Session::from_text(LENITION, "p t a e i", "p t b d a e i").unwrap();
    let derived = session.apply("epita").unwrap();
    assert_eq!(derived, "ebidi");
    assert!(session.reverse(&derived).unwrap().contains("epita"));

    let derivation = session.derivation();
    assert!(derivation.produced_only.contains("b"));
    assert!(derivation.consumed_only.contains("p"));
}
