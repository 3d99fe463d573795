use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::scan_state::{ScanState, ScannedWord};
use super::speller::Hyphenator;
use super::stopwords::Stopwords;
use crate::graph::VariantGraph;

/// Words already present in an index
pub trait Vocabulary {
    fn contains_word(&self, word: &str) -> bool;
}

impl Vocabulary for HashSet<String> {
    fn contains_word(&self, word: &str) -> bool {
        self.contains(word)
    }
}

/// Word occurrences found in one document, kept apart from the index until
/// the whole document has been scanned.
pub struct DocumentWords<'a> {
    stopwords: &'a Stopwords,
    vocabulary: &'a dyn Vocabulary,
    words: BTreeMap<String, BTreeSet<u32>>,
    occurrences: usize,
}

impl<'a> DocumentWords<'a> {
    pub fn new(stopwords: &'a Stopwords, vocabulary: &'a dyn Vocabulary) -> Self {
        Self {
            stopwords,
            vocabulary,
            words: BTreeMap::new(),
            occurrences: 0,
        }
    }

    /// Known to this document or to the index it will be added to
    pub fn is_known(&self, word: &str) -> bool {
        self.words.contains_key(word) || self.vocabulary.contains_word(word)
    }

    /// Record a lowercase word at `offset`. Returns false for stopwords and
    /// for occurrences already recorded.
    pub fn insert(&mut self, word: String, offset: u32) -> bool {
        if word.is_empty() || self.stopwords.contains(&word) {
            return false;
        }
        let added = self.words.entry(word).or_default().insert(offset);
        if added {
            self.occurrences += 1;
        }
        added
    }

    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub fn distinct_words(&self) -> usize {
        self.words.len()
    }

    pub fn offsets(&self, word: &str) -> Option<&BTreeSet<u32>> {
        self.words.get(word)
    }

    pub fn into_words(self) -> BTreeMap<String, BTreeSet<u32>> {
        self.words
    }
}

/// Extracts words from a variant graph, one scan state per group of
/// versions reading identical text.
pub struct WordFinder<'a> {
    hyphenator: &'a Hyphenator,
}

impl<'a> WordFinder<'a> {
    pub fn new(hyphenator: &'a Hyphenator) -> Self {
        Self { hyphenator }
    }

    /// Scan `graph` into `words`, returning the number of new occurrences
    pub fn find(&self, graph: &VariantGraph, words: &mut DocumentWords<'_>) -> usize {
        let mut found = 0;
        let mut states = vec![ScanState::new(graph.all_versions())];
        let mut offset = 0u32;

        for fragment in graph.fragments() {
            let mut active: Vec<ScanState> = states
                .iter_mut()
                .filter(|state| state.versions().intersects(&fragment.versions))
                .map(|state| state.split(&fragment.versions))
                .collect();
            states.retain(|state| !state.versions().is_empty());

            for c in fragment.chars() {
                for state in active.iter_mut() {
                    if let Some(word) = state.update(c, offset) {
                        found += self.store(word, words) as usize;
                    }
                }
                offset += 1;
            }

            states.append(&mut active);
            merge_states(&mut states);
        }

        for state in states.iter_mut() {
            if let Some(word) = state.finish() {
                found += self.store(word, words) as usize;
            }
        }
        found
    }

    fn store(&self, word: ScannedWord, words: &mut DocumentWords<'_>) -> bool {
        let mut text = word.text.to_lowercase();
        if word.line_broken && !words.is_known(&text) && !self.hyphenator.wants_hyphen(&text) {
            text.retain(|c| c != '-');
        }
        words.insert(text, word.offset)
    }
}

/// Union the versions of states that scan identically
fn merge_states(states: &mut Vec<ScanState>) {
    let mut merged: Vec<ScanState> = Vec::with_capacity(states.len());
    for state in states.drain(..) {
        match merged.iter_mut().find(|m| m.same_scan(&state)) {
            Some(existing) => existing.absorb(state),
            None => merged.push(state),
        }
    }
    debug_assert!(merged
        .iter()
        .enumerate()
        .all(|(i, a)| merged[i + 1..].iter().all(|b| !a.versions().intersects(b.versions()))));
    *states = merged;
}
