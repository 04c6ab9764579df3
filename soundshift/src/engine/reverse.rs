//! Backward reconstruction: every source word the rules could have turned into a target word
//!
//! Rules are undone last to first. Each step maps every candidate token sequence to
//! the set of its pre-images under one rule; the union, deduplicated, feeds the next
//! step. Candidates that can no longer become valid source words are dropped as
//! soon as they are produced.

use crate::config::compile_time::reverser::MAX_CACHE_ENTRIES;
use crate::config::runtime::ReverserPreferences;
use crate::inventory::PhonemeInventory;
use crate::logging::codes;
use crate::phonotactics::{self, PhonotacticPattern};
use crate::rules::Rule;
use crate::tokenizer::{CompiledInventory, TokenizationError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Instant;

/// Separator for the canonical candidate key; never part of a phoneme
const KEY_SEPARATOR: char = '\u{1F}';

type Candidates = BTreeMap<String, Vec<String>>;

fn candidate_key(tokens: &[String]) -> String {
    let mut key = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(token);
    }
    key
}

/// Start indices where `rule.to` occurs with both contexts holding around it
fn occurrences(rule: &Rule, tokens: &[String]) -> Vec<usize> {
    let width = rule.to.len();
    if width == 0 || width > tokens.len() {
        return Vec::new();
    }

    (0..=tokens.len() - width)
        .filter(|&start| {
            tokens[start..start + width] == rule.to[..]
                && rule.context_holds(tokens, start, start + width)
        })
        .collect()
}

/// Depth-first walk over every non-overlapping subset of occurrences
///
/// Occurrences are ascending and share one width, so a choice only has to be
/// checked against the last occurrence already chosen.
struct OccurrenceSubsets {
    occurrences: Vec<usize>,
    width: usize,
    stack: Vec<(usize, Vec<usize>)>,
}

impl OccurrenceSubsets {
    fn new(occurrences: Vec<usize>, width: usize) -> Self {
        Self {
            occurrences,
            width,
            stack: vec![(0, Vec::new())],
        }
    }
}

impl Iterator for OccurrenceSubsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        while let Some((next, chosen)) = self.stack.pop() {
            let Some(&start) = self.occurrences.get(next) else {
                return Some(chosen);
            };

            let fits = chosen
                .last()
                .map_or(true, |&previous| start >= previous + self.width);

            self.stack.push((next + 1, chosen.clone()));
            if fits {
                let mut with = chosen;
                with.push(start);
                self.stack.push((next + 1, with));
            }
        }
        None
    }
}

/// Replace each chosen occurrence of `rule.to` with `rule.from`
fn undo_at(rule: &Rule, tokens: &[String], chosen: &[usize]) -> Vec<String> {
    let width = rule.to.len();
    let mut result = Vec::with_capacity(tokens.len() + chosen.len() * rule.from.len());
    let mut position = 0;

    for &start in chosen {
        result.extend_from_slice(&tokens[position..start]);
        result.extend(rule.from.iter().cloned());
        position = start + width;
    }
    result.extend_from_slice(&tokens[position..]);
    result
}

/// Reusable reverser for one rule list and pair of inventories
///
/// Results are cached per input word, so reversal takes `&mut self`. Give each
/// thread its own instance.
#[derive(Debug, Clone)]
pub struct Reverser {
    rules: Vec<Rule>,
    source: CompiledInventory,
    /// Source phonemes plus every phoneme a deletion rule removes
    effective_source: CompiledInventory,
    source_patterns: Option<Vec<PhonotacticPattern>>,
    target: CompiledInventory,
    target_patterns: Option<Vec<PhonotacticPattern>>,
    /// `rewritable[i]`: tokens rules `0..i` can produce, i.e. can still be undone
    rewritable: Vec<HashSet<String>>,
    preferences: ReverserPreferences,
    cache: HashMap<String, BTreeSet<String>>,
}

impl Reverser {
    pub fn new(rules: &[Rule], source: &PhonemeInventory, target: &PhonemeInventory) -> Self {
        Self::with_preferences(rules, source, target, ReverserPreferences::default())
    }

    pub fn with_preferences(
        rules: &[Rule],
        source: &PhonemeInventory,
        target: &PhonemeInventory,
        preferences: ReverserPreferences,
    ) -> Self {
        let deleted = rules
            .iter()
            .filter(|rule| rule.is_deletion())
            .flat_map(|rule| rule.from.iter());
        let effective_source = CompiledInventory::new(source.phonemes().iter().chain(deleted));

        let mut rewritable = Vec::with_capacity(rules.len() + 1);
        let mut produced: HashSet<String> = HashSet::new();
        rewritable.push(produced.clone());
        for rule in rules {
            produced.extend(rule.to.iter().cloned());
            rewritable.push(produced.clone());
        }

        Self {
            rules: rules.to_vec(),
            source: source.compile(),
            effective_source,
            source_patterns: source.phonotactics().map(<[_]>::to_vec),
            target: target.compile(),
            target_patterns: target.phonotactics().map(<[_]>::to_vec),
            rewritable,
            preferences,
            cache: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Every source word that derives `word`
    pub fn reverse(&mut self, word: &str) -> Result<BTreeSet<String>, TokenizationError> {
        if self.preferences.enable_cache {
            if let Some(hit) = self.cache.get(word) {
                return Ok(hit.clone());
            }
        }

        let result = self.reconstruct(word)?;

        if self.preferences.enable_cache && self.cache.len() < MAX_CACHE_ENTRIES {
            self.cache.insert(word.to_string(), result.clone());
        }
        Ok(result)
    }

    fn reconstruct(&self, word: &str) -> Result<BTreeSet<String>, TokenizationError> {
        let tokens = self.target.tokenize(word)?;

        if self.preferences.check_target_phonotactics
            && !phonotactics::matches(&tokens, self.target_patterns.as_deref())
        {
            crate::log_debug!("Word violates target phonotactics", "word" => word);
            return Ok(BTreeSet::new());
        }

        let mut candidates: Candidates = BTreeMap::new();
        candidates.insert(candidate_key(&tokens), tokens);

        for (index, rule) in self.rules.iter().enumerate().rev() {
            let mut next: Candidates = BTreeMap::new();
            for candidate in candidates.values() {
                for pre_image in self.pre_images(rule, candidate) {
                    if self.preferences.early_pruning && self.is_dead(&pre_image, index) {
                        continue;
                    }
                    next.entry(candidate_key(&pre_image)).or_insert(pre_image);
                }
            }
            candidates = next;

            if self.preferences.log_candidate_counts {
                crate::log_debug!("Rule undone",
                    "rule" => rule,
                    "candidates" => candidates.len()
                );
            }
            if candidates.is_empty() {
                break;
            }
        }

        Ok(candidates
            .values()
            .map(|tokens| tokens.concat())
            .filter(|joined| self.is_valid_source(joined))
            .collect())
    }

    /// Pre-images of one candidate under one rule
    fn pre_images<'a>(
        &'a self,
        rule: &'a Rule,
        tokens: &'a [String],
    ) -> Box<dyn Iterator<Item = Vec<String>> + 'a> {
        if rule.is_deletion() {
            return Box::new(self.deletion_pre_images(rule, tokens));
        }

        let found = occurrences(rule, tokens);
        if found.is_empty() {
            return Box::new(std::iter::once(tokens.to_vec()));
        }

        Box::new(
            OccurrenceSubsets::new(found, rule.to.len())
                .map(move |chosen| undo_at(rule, tokens, &chosen)),
        )
    }

    /// The candidate as it stands, plus `from` reinserted wherever its context holds
    fn deletion_pre_images<'a>(
        &'a self,
        rule: &'a Rule,
        tokens: &'a [String],
    ) -> impl Iterator<Item = Vec<String>> + 'a {
        let unchanged = rule
            .from
            .iter()
            .all(|token| self.source.contains(token))
            .then(|| tokens.to_vec());

        let insertions = (0..=tokens.len()).filter_map(move |at| {
            let mut inserted = Vec::with_capacity(tokens.len() + rule.from.len());
            inserted.extend_from_slice(&tokens[..at]);
            inserted.extend(rule.from.iter().cloned());
            inserted.extend_from_slice(&tokens[at..]);
            rule.context_holds(&inserted, at, at + rule.from.len())
                .then_some(inserted)
        });

        unchanged.into_iter().chain(insertions)
    }

    /// Whether a candidate can never pass the final source filter
    ///
    /// After undoing rule `index`, only rules before it remain. A token that none of
    /// them can produce stays in the word; if it has a character no source phoneme
    /// uses, the joined word can never tokenize.
    fn is_dead(&self, tokens: &[String], index: usize) -> bool {
        let remaining = &self.rewritable[index];
        tokens.iter().any(|token| {
            !remaining.contains(token) && token.chars().any(|c| !self.effective_source.uses_char(c))
        })
    }

    fn is_valid_source(&self, word: &str) -> bool {
        self.effective_source
            .tokenize(word)
            .map(|tokens| phonotactics::matches(&tokens, self.source_patterns.as_deref()))
            .unwrap_or(false)
    }
}

/// Every source word that derives `word`, with a fresh reverser
pub fn reverse(
    word: &str,
    rules: &[Rule],
    source: &PhonemeInventory,
    target: &PhonemeInventory,
) -> Result<BTreeSet<String>, TokenizationError> {
    let started = Instant::now();
    let sources = Reverser::new(rules, source, target).reverse(word)?;

    crate::log_performance!(
        codes::success::REVERSAL_COMPLETE,
        "Reversal completed",
        duration = started.elapsed(),
        "word" => word,
        "sources" => sources.len()
    );

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::inventory::parse_inventory;

    fn inventory(phonemes: &str) -> PhonemeInventory {
        PhonemeInventory::new(phonemes.split_whitespace())
    }

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn tokens(word: &str) -> Vec<String> {
        word.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_occurrence_subsets_skip_overlaps() {
        let subsets: Vec<Vec<usize>> = OccurrenceSubsets::new(vec![0, 1, 2], 2).collect();
        assert_eq!(subsets.len(), 5);
        assert!(subsets.contains(&vec![]));
        assert!(subsets.contains(&vec![0, 2]));
        assert!(!subsets.contains(&vec![0, 1]));
        assert!(!subsets.contains(&vec![1, 2]));
    }

    #[test]
    fn test_pre_images_are_produced_on_demand() {
        let rules = compile("a > x").unwrap();
        let reverser = Reverser::new(&rules, &inventory("a"), &inventory("x"));
        let tokens = vec!["x".to_string(); 48];

        let first: Vec<Vec<String>> = reverser.pre_images(&rules[0], &tokens).take(3).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], vec!["a".to_string(); 48]);
    }

    #[test]
    fn test_merger_gives_every_combination() {
        let rules = compile("a>x; b>y; c>x;").unwrap();
        let sources = reverse("xyx", &rules, &inventory("a b c"), &inventory("x y")).unwrap();
        assert_eq!(sources, set(&["aba", "abc", "cba", "cbc"]));
    }

    #[test]
    fn test_deletion_reinserts_everywhere() {
        let rules = compile("h > ∅;").unwrap();
        let sources = reverse("ello", &rules, &inventory("h e l o"), &inventory("e l o")).unwrap();
        assert_eq!(
            sources,
            set(&["hello", "ehllo", "elhlo", "ellho", "elloh", "ello"])
        );
    }

    #[test]
    fn test_deletion_context_limits_insertion() {
        let rules = compile("h > / _ #").unwrap();
        let sources = reverse("ello", &rules, &inventory("h e l o"), &inventory("e l o")).unwrap();
        assert_eq!(sources, set(&["ello", "elloh"]));
    }

    #[test]
    fn test_deleted_phoneme_outside_source_inventory() {
        let rules = compile("h > ∅").unwrap();
        let sources = reverse("a", &rules, &inventory("a"), &inventory("a")).unwrap();
        assert_eq!(sources, set(&["ha", "ah"]));
    }

    #[test]
    fn test_contexts_checked_on_output() {
        let rules = compile("t > d / a _ a").unwrap();
        let sources = reverse("adad", &rules, &inventory("a t d"), &inventory("a d")).unwrap();
        assert_eq!(sources, set(&["adad", "atad"]));
    }

    #[test]
    fn test_source_phonotactics_filter() {
        let source = parse_inventory("C = [p t]\nV = [a]\nCV").unwrap();
        let sources = reverse("pat", &[], &source, &inventory("p a t")).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_target_phonotactics_reject_input_when_enabled() {
        let target = parse_inventory("C = [p]\nV = [a]\nCV").unwrap();
        let sources = reverse("pap", &[], &inventory("p a"), &target).unwrap();
        assert_eq!(sources, set(&["pap"]));

        let preferences = ReverserPreferences {
            check_target_phonotactics: true,
            ..ReverserPreferences::default()
        };
        let mut reverser =
            Reverser::with_preferences(&[], &inventory("p a"), &target, preferences);
        assert!(reverser.reverse("pap").unwrap().is_empty());
    }

    #[test]
    fn test_pruning_does_not_change_results() {
        let rules = compile("V = [a e]\nk > g / V _ V\na > e / _ #").unwrap();
        let source = inventory("k a e");
        let target = inventory("k g a e");

        let pruned = Reverser::new(&rules, &source, &target)
            .reverse("agage")
            .unwrap();

        let preferences = ReverserPreferences {
            early_pruning: false,
            ..ReverserPreferences::default()
        };
        let unpruned = Reverser::with_preferences(&rules, &source, &target, preferences)
            .reverse("agage")
            .unwrap();

        assert_eq!(pruned, unpruned);
        assert!(pruned.contains("akaka"));
    }

    #[test]
    fn test_cache_reuse() {
        let rules = compile("a > b").unwrap();
        let mut reverser = Reverser::new(&rules, &inventory("a b"), &inventory("b"));
        let first = reverser.reverse("bb").unwrap();
        assert_eq!(reverser.cache_len(), 1);
        assert_eq!(reverser.reverse("bb").unwrap(), first);
        assert_eq!(first, set(&["aa", "ab", "ba", "bb"]));

        reverser.clear_cache();
        assert_eq!(reverser.cache_len(), 0);
    }

    #[test]
    fn test_undo_at_replaces_chosen_spans() {
        let rule = Rule::new(vec!["a", "b"], vec!["x"]);
        let undone = undo_at(&rule, &tokens("xyx"), &[0, 2]);
        assert_eq!(undone.concat(), "abyab");
    }

    #[test]
    fn test_untokenizable_target() {
        let err = reverse("q", &[], &inventory("a"), &inventory("a")).unwrap_err();
        assert_eq!(err.character, 'q');
    }
}
