//! Run configuration: the Wiktionary edition being parsed, the YAML schema
//! holding its part-of-speech table, and the language-code vocabulary used to
//! segment Hungarian pages.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::pos::{PartOfSpeech, PosTable, PosTag};

/// Schema shipped with the binary, used when `--schema` is not given
const BUILTIN_SCHEMA: &str = include_str!("../schema/pos.yaml");

/// Wiktionary language edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Edition {
    /// Finnish Wiktionary: `==Suomi==` / `==Unkari==` headings
    Fi,
    /// Hungarian Wiktionary: `{{hun...}}` / `{{fin...}}` template markers
    Hu,
}

impl Edition {
    pub fn code(self) -> &'static str {
        match self {
            Edition::Fi => "fi",
            Edition::Hu => "hu",
        }
    }
}

// === Schema YAML structures ===

#[derive(Debug, Deserialize)]
struct EditionSchema {
    #[serde(default)]
    reserved_title_markers: Vec<String>,
    pos_classes: Vec<PosClass>,
}

#[derive(Debug, Deserialize)]
struct PosClass {
    code: PartOfSpeech,
    #[allow(dead_code)]
    name: String,
    variants: Vec<String>,
}

/// Per-edition settings resolved from the schema
#[derive(Debug, Clone, Default)]
pub struct EditionConfig {
    pub pos_table: PosTable,
    /// Titles containing any of these are not dictionary entries
    pub reserved_title_markers: Vec<String>,
}

impl EditionConfig {
    pub fn normalize(&self, tag: &str) -> PosTag {
        self.pos_table.normalize(tag)
    }

    pub fn is_reserved_title(&self, title: &str) -> bool {
        self.reserved_title_markers
            .iter()
            .any(|marker| title.contains(marker.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    fi: EditionConfig,
    hu: EditionConfig,
}

impl Config {
    /// Load the schema from `path`, or the built-in schema when `None`
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|source| ExtractError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Config::from_yaml(&contents)
            }
            None => Config::builtin(),
        }
    }

    pub fn builtin() -> Result<Config> {
        Config::from_yaml(BUILTIN_SCHEMA)
    }

    pub fn from_yaml(contents: &str) -> Result<Config> {
        let mut schema: HashMap<String, EditionSchema> = serde_yaml::from_str(contents)?;

        let mut take = |edition: Edition| -> Result<EditionConfig> {
            let code = edition.code();
            let entry = schema
                .remove(code)
                .ok_or_else(|| ExtractError::MissingEdition(code.to_string()))?;

            let mut map = HashMap::new();
            for class in entry.pos_classes {
                for variant in class.variants {
                    map.insert(variant, class.code);
                }
            }
            let pos_table = PosTable::new(map);
            debug!(edition = code, tags = pos_table.len(), "loaded part-of-speech table");

            Ok(EditionConfig {
                pos_table,
                reserved_title_markers: entry.reserved_title_markers,
            })
        };

        Ok(Config {
            fi: take(Edition::Fi)?,
            hu: take(Edition::Hu)?,
        })
    }

    pub fn edition(&self, edition: Edition) -> &EditionConfig {
        match edition {
            Edition::Fi => &self.fi,
            Edition::Hu => &self.hu,
        }
    }
}

/// Load the language-code vocabulary: one template per line (`{{fin}}`),
/// trimmed, with the closing `}}` cut off (`{{fin`).
pub fn load_language_codes(path: &PathBuf) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.clone(),
        source,
    })?;
    parse_language_codes(&contents, path)
}

fn parse_language_codes(contents: &str, path: &Path) -> Result<Vec<String>> {
    let mut codes = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Cut by characters so a stray multibyte tail cannot split a code point
        let keep = line.chars().count().saturating_sub(2);
        if keep == 0 {
            return Err(ExtractError::LanguageCode {
                path: path.to_path_buf(),
                line: index + 1,
                code: line.to_string(),
            });
        }
        codes.push(line.chars().take(keep).collect());
    }

    if codes.is_empty() {
        return Err(ExtractError::EmptyLanguageCodes(path.to_path_buf()));
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_covers_both_editions() {
        let config = Config::builtin().unwrap();

        let fi = config.edition(Edition::Fi);
        assert_eq!(fi.normalize("substantiivit"), PosTag::Known(PartOfSpeech::Noun));
        assert_eq!(fi.normalize("prepositio"), PosTag::Known(PartOfSpeech::Adp));
        assert_eq!(fi.normalize("fn"), PosTag::Known(PartOfSpeech::Unknown));

        let hu = config.edition(Edition::Hu);
        assert_eq!(hu.normalize("fn"), PosTag::Known(PartOfSpeech::Noun));
        assert_eq!(hu.normalize("proper noun"), PosTag::Known(PartOfSpeech::Propn));
        assert_eq!(hu.normalize("kérd"), PosTag::Known(PartOfSpeech::Pron));
        assert_eq!(hu.normalize("ksz"), PosTag::Known(PartOfSpeech::Cconj));
        assert_eq!(hu.normalize("substantiivi"), PosTag::Known(PartOfSpeech::Unknown));
    }

    #[test]
    fn reserved_titles_per_edition() {
        let config = Config::builtin().unwrap();
        assert!(config.edition(Edition::Fi).is_reserved_title("Malline:fi-subs"));
        assert!(!config.edition(Edition::Fi).is_reserved_title("talo"));
        assert!(config.edition(Edition::Hu).is_reserved_title("Függelék:Finn igék"));
        assert!(config.edition(Edition::Hu).is_reserved_title("Wikiszótár:Kocsmafal"));
        assert!(!config.edition(Edition::Hu).is_reserved_title("talo"));
    }

    #[test]
    fn schema_without_edition_is_rejected() {
        let yaml = "fi:\n  pos_classes: []\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ExtractError::MissingEdition(code)) if code == "hu"
        ));
    }

    #[test]
    fn schema_accepts_unknown_alias() {
        let yaml = "fi:\n  pos_classes:\n    - {code: UNKNOWN, name: muu, variants: [muu]}\nhu:\n  pos_classes: []\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.edition(Edition::Fi).normalize("muu"),
            PosTag::Known(PartOfSpeech::Unknown)
        );
        assert!(config.edition(Edition::Hu).reserved_title_markers.is_empty());
    }

    #[test]
    fn language_codes_are_trimmed_and_cut() {
        let codes = parse_language_codes("{{fin}}\n  {{hun}}  \n\n{{eng}}\n", Path::new("codes")).unwrap();
        assert_eq!(codes, vec!["{{fin", "{{hun", "{{eng"]);
    }

    #[test]
    fn too_short_language_code_is_rejected() {
        let err = parse_language_codes("{{fin}}\n}}\n", Path::new("codes")).unwrap_err();
        assert!(matches!(err, ExtractError::LanguageCode { line: 2, .. }));
    }

    #[test]
    fn empty_language_code_list_is_rejected() {
        assert!(matches!(
            parse_language_codes("\n \n", Path::new("codes")),
            Err(ExtractError::EmptyLanguageCodes(_))
        ));
    }

    #[test]
    fn shipped_language_codes_parse() {
        let path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lang_hun.tsv"));
        let codes = load_language_codes(&path).unwrap();
        assert!(codes.iter().any(|c| c == "{{fin"));
        assert!(codes.iter().any(|c| c == "{{hun"));
    }
}
