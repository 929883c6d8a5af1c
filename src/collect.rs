//! Accumulation of extracted records. Everything is stored in ordered sets so
//! a record seen twice is kept once and output order is stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::pos::PartOfSpeech;

/// Headword and one of its translations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TranslationPair {
    pub headword: String,
    pub translation: String,
}

pub type Sentences = BTreeMap<PartOfSpeech, BTreeMap<String, BTreeSet<String>>>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collections {
    pub wordpairs: BTreeMap<PartOfSpeech, BTreeSet<TranslationPair>>,
    pub definitions: Sentences,
    pub examples: Sentences,
}

fn add_sentence(target: &mut Sentences, pos: PartOfSpeech, headword: &str, sentence: String) -> bool {
    target
        .entry(pos)
        .or_default()
        .entry(headword.to_string())
        .or_default()
        .insert(sentence)
}

fn count_sentences(source: &Sentences) -> usize {
    source
        .values()
        .flat_map(|by_word| by_word.values())
        .map(BTreeSet::len)
        .sum()
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the pair was already present
    pub fn add_pair(&mut self, pos: PartOfSpeech, headword: &str, translation: &str) -> bool {
        self.wordpairs.entry(pos).or_default().insert(TranslationPair {
            headword: headword.to_string(),
            translation: translation.to_string(),
        })
    }

    pub fn add_definition(&mut self, pos: PartOfSpeech, headword: &str, sentence: String) -> bool {
        add_sentence(&mut self.definitions, pos, headword, sentence)
    }

    pub fn add_example(&mut self, pos: PartOfSpeech, headword: &str, sentence: String) -> bool {
        add_sentence(&mut self.examples, pos, headword, sentence)
    }

    pub fn pair_count(&self) -> usize {
        self.wordpairs.values().map(BTreeSet::len).sum()
    }

    pub fn definition_count(&self) -> usize {
        count_sentences(&self.definitions)
    }

    pub fn example_count(&self) -> usize {
        count_sentences(&self.examples)
    }

    #[cfg(test)]
    pub fn examples_of(&self, pos: PartOfSpeech, headword: &str) -> Vec<&str> {
        lookup(&self.examples, pos, headword)
    }

    #[cfg(test)]
    pub fn definitions_of(&self, pos: PartOfSpeech, headword: &str) -> Vec<&str> {
        lookup(&self.definitions, pos, headword)
    }

    #[cfg(test)]
    pub fn pairs_of(&self, pos: PartOfSpeech) -> Vec<(&str, &str)> {
        self.wordpairs
            .get(&pos)
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|p| (p.headword.as_str(), p.translation.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
fn lookup<'a>(source: &'a Sentences, pos: PartOfSpeech, headword: &str) -> Vec<&'a str> {
    source
        .get(&pos)
        .and_then(|by_word| by_word.get(headword))
        .map(|set| set.iter().map(String::as_str).collect())
        .unwrap_or_default()
}
