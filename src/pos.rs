//! Universal part-of-speech categories and the per-edition tag tables that
//! map each wiki's native vocabulary onto them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Universal part-of-speech category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adj,
    Adv,
    Num,
    Det,
    Adp,
    Pron,
    Part,
    Propn,
    Intj,
    Cconj,
    /// Tag seen but not in the table; written as the UD tag `X`
    #[serde(rename = "X", alias = "UNKNOWN")]
    Unknown,
}

impl PartOfSpeech {
    pub fn as_str(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Det => "DET",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Pron => "PRON",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Propn => "PROPN",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Cconj => "CCONJ",
            PartOfSpeech::Unknown => "X",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part-of-speech context of a scanner. `NoPos` means nothing is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosTag {
    #[default]
    NoPos,
    Known(PartOfSpeech),
}

impl PosTag {
    pub fn known(self) -> Option<PartOfSpeech> {
        match self {
            PosTag::NoPos => None,
            PosTag::Known(pos) => Some(pos),
        }
    }
}

/// Lookup table from lower-cased native tags to universal categories
#[derive(Debug, Clone, Default)]
pub struct PosTable {
    map: HashMap<String, PartOfSpeech>,
}

impl PosTable {
    pub fn new(map: HashMap<String, PartOfSpeech>) -> Self {
        PosTable { map }
    }

    /// Map a tag to its category. Empty tags give `NoPos`; tags missing from
    /// the table give `Unknown`.
    pub fn normalize(&self, tag: &str) -> PosTag {
        if tag.is_empty() {
            return PosTag::NoPos;
        }
        PosTag::Known(self.map.get(tag).copied().unwrap_or(PartOfSpeech::Unknown))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}
