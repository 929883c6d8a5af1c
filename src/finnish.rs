//! Entry scanner for Finnish Wiktionary.
//!
//! A `==Suomi==` section holds definitions and examples of Finnish words; a
//! `==Unkari==` section lists Finnish translations of a Hungarian headword.
//! Part of speech comes from `===substantiivi===` style headings.

use lazy_static::lazy_static;
use regex::Regex;

use crate::collect::Collections;
use crate::config::EditionConfig;
use crate::pos::PosTag;
use crate::sanitize::{sanitize, sentence, split_outside_parens, Mode};
use crate::segment::{segment_headings, Block, Section};

lazy_static! {
    static ref POS_HEADING: Regex = Regex::new(r"^===(\w+)===").unwrap();
    // `# {{template}}` with nothing else on the line
    static ref BARE_TEMPLATE: Regex = Regex::new(r"^# ?\{\{[^}]*\}\}$").unwrap();
}

/// Parsing context of one section
#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    pos: PosTag,
}

/// Extract records from one page. Returns the number of sections scanned.
pub fn extract(title: &str, page: &str, config: &EditionConfig, out: &mut Collections) -> usize {
    let sections = segment_headings(page);
    for section in &sections {
        scan_section(title, section, config, out);
    }
    sections.len()
}

fn scan_section(title: &str, section: &Section, config: &EditionConfig, out: &mut Collections) {
    let mut state = ScanState::default();
    let mut translations: Vec<String> = Vec::new();

    // First line is the language heading
    for line in section.text.split('\n').skip(1) {
        if let Some(cap) = POS_HEADING.captures(line) {
            state.pos = config.normalize(&cap[1].to_lowercase());
        } else if line.starts_with("#:") {
            if section.block != Block::Native {
                continue;
            }
            let text = sentence(line);
            if let (Some(pos), false) = (state.pos.known(), text.is_empty()) {
                out.add_example(pos, title, text);
            }
        } else if line.starts_with('#') && !line.starts_with("#*") && !line.starts_with("##") {
            scan_sense(title, line, section.block, state, &mut translations, config, out);
        }
    }
}

/// Definition line in a native section, translation line in a foreign one
fn scan_sense(
    title: &str,
    line: &str,
    block: Block,
    state: ScanState,
    translations: &mut Vec<String>,
    config: &EditionConfig,
    out: &mut Collections,
) {
    if BARE_TEMPLATE.is_match(line) {
        return;
    }
    let text = sanitize(line, Mode::Translation);

    match block {
        Block::Native => {
            let Some(pos) = state.pos.known() else { return };
            if text.is_empty() || config.is_reserved_title(title) {
                return;
            }
            out.add_definition(pos, title, text);
        }
        Block::Foreign => {
            translations.extend(
                split_outside_parens(&text, &[','])
                    .into_iter()
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(String::from),
            );
            let Some(pos) = state.pos.known() else { return };
            if title.is_empty() {
                return;
            }
            for entry in translations.iter() {
                if entry.contains(';') {
                    for piece in entry.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                        out.add_pair(pos, title, piece);
                    }
                } else {
                    out.add_pair(pos, title, entry);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Edition};
    use crate::pos::PartOfSpeech;

    fn run(title: &str, page: &str) -> Collections {
        let config = Config::builtin().unwrap();
        let mut out = Collections::new();
        extract(title, page, config.edition(Edition::Fi), &mut out);
        out
    }

    // ─────────────────────────────────────────────────────────────
    // Native sections: examples and definitions
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn example_under_noun_heading() {
        let out = run("talo", "==Suomi==\n===substantiivi===\n#: esimerkki.\n");
        assert_eq!(out.examples_of(PartOfSpeech::Noun, "talo"), vec!["esimerkki"]);
        assert_eq!(out.definition_count(), 0);
    }

    #[test]
    fn definition_lines_skip_quotes_and_subsenses() {
        let page = "==Suomi==\n===Verbi===\n# [[liikkua|Liikkua]] nopeasti.\n#* lainaus\n## alamerkitys\n";
        let out = run("juosta", page);
        assert_eq!(out.definitions_of(PartOfSpeech::Verb, "juosta"), vec!["Liikkua nopeasti"]);
        assert_eq!(out.definition_count(), 1);
    }

    #[test]
    fn nothing_recorded_before_pos_heading() {
        let out = run("sana", "==Suomi==\n# merkitys\n#: esimerkki\n");
        assert_eq!(out.definition_count() + out.example_count(), 0);
    }

    #[test]
    fn bare_template_line_is_skipped() {
        let out = run("juosta", "==Suomi==\n===verbi===\n# {{taivutus}}\n# {{kuv}} juoksennella\n");
        assert_eq!(out.definitions_of(PartOfSpeech::Verb, "juosta"), vec!["juoksennella"]);
    }

    #[test]
    fn unlisted_heading_gives_unknown_pos() {
        let out = run("jne", "==Suomi==\n===Lyhenne===\n# ja niin edelleen\n");
        assert_eq!(
            out.definitions_of(PartOfSpeech::Unknown, "jne"),
            vec!["ja niin edelleen"]
        );
    }

    #[test]
    fn identical_sentences_are_kept_once() {
        let page = "==Suomi==\n===substantiivi===\n#: Iso talo.\n#: '''Iso''' talo\n";
        let out = run("talo", page);
        assert_eq!(out.examples_of(PartOfSpeech::Noun, "talo"), vec!["Iso talo"]);
    }

    #[test]
    fn template_namespace_titles_get_no_definitions() {
        let out = run("Malline:fi-subs", "==Suomi==\n===substantiivi===\n# ohje\n");
        assert_eq!(out.definition_count(), 0);
    }

    // ─────────────────────────────────────────────────────────────
    // Foreign sections: translations
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn comma_separated_translations() {
        let out = run("ház", "==Unkari==\n===substantiivi===\n# [[talo]], [[koti]]\n");
        assert_eq!(
            out.pairs_of(PartOfSpeech::Noun),
            vec![("ház", "koti"), ("ház", "talo")]
        );
    }

    #[test]
    fn semicolon_splits_into_separate_pairs() {
        let out = run("red", "==Unkari==\n===adjektiivi===\n# piros; vörös\n");
        assert_eq!(
            out.pairs_of(PartOfSpeech::Adj),
            vec![("red", "piros"), ("red", "vörös")]
        );
    }

    #[test]
    fn parenthesized_comma_does_not_split() {
        let out = run("kő", "==Unkari==\n===substantiivi===\n# kivi (geol., min.), kallio\n");
        assert_eq!(
            out.pairs_of(PartOfSpeech::Noun),
            vec![("kő", "kallio"), ("kő", "kivi (geol., min.)")]
        );
    }

    #[test]
    fn translations_accumulate_within_section() {
        let page = "==Unkari==\n===substantiivi===\n# talo\n===verbi===\n# asua\n";
        let out = run("lak", page);
        assert_eq!(out.pairs_of(PartOfSpeech::Noun), vec![("lak", "talo")]);
        // The earlier translation is re-emitted under the newer part of speech
        assert_eq!(
            out.pairs_of(PartOfSpeech::Verb),
            vec![("lak", "asua"), ("lak", "talo")]
        );
    }

    #[test]
    fn foreign_examples_are_ignored() {
        let out = run("ház", "==Unkari==\n===substantiivi===\n#: példa\n");
        assert_eq!(out.example_count(), 0);
        assert_eq!(out.pair_count(), 0);
    }

    #[test]
    fn pos_does_not_leak_between_sections() {
        let page = "==Suomi==\n===verbi===\n# juosta\n==Unkari==\n# fut\n";
        let out = run("futni", page);
        assert_eq!(out.definition_count(), 1);
        assert_eq!(out.pair_count(), 0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let page = "==Suomi==\n===substantiivi===\n# a\n# b\n#: c\n==Unkari==\n===verbi===\n# d, e; f\n";
        assert_eq!(run("x", page), run("x", page));
    }
}
