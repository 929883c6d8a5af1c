//! Entry scanner for Hungarian Wiktionary.
//!
//! Entries are introduced by language templates: `{{hunfn}}` opens a
//! Hungarian noun (definitions, examples), `{{finfn}}` a Finnish noun whose
//! sense lines are Hungarian translations. Because the page is segmented at
//! every marker, the parsing context is carried from one section to the next
//! and only reset per page.

use lazy_static::lazy_static;
use regex::Regex;

use crate::collect::Collections;
use crate::config::EditionConfig;
use crate::pos::{PartOfSpeech, PosTag};
use crate::sanitize::{sanitize, sentence, split_outside_parens, Mode};
use crate::segment::{Block, MarkerSegmenter, Section};

lazy_static! {
    // {{finfn}}, {{hunige|...}}, {{finmell2}}
    static ref POS_TEMPLATE: Regex = Regex::new(r"^\{\{(fin|hun)(\w+)(\|?.*)?\}\}").unwrap();
}

const GRAMMATICAL_FORM: &str = "{{fi-";
const DECLENSION_TABLE: &str = "{{fi-decl";

#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    pos: PosTag,
    sub_lang: Option<Block>,
}

/// Extract records from one page. Returns `None` when the title belongs to
/// a reserved namespace, otherwise the number of sections scanned.
pub fn extract(
    title: &str,
    page: &str,
    config: &EditionConfig,
    segmenter: &MarkerSegmenter,
    out: &mut Collections,
) -> Option<usize> {
    if config.is_reserved_title(title) {
        return None;
    }

    let sections = segmenter.segment(page);
    let mut state = ScanState::default();
    for section in &sections {
        state = scan_section(title, section, state, config, out);
    }
    Some(sections.len())
}

/// Short tag of a `{{fi-ige|...}}` style template, up to `|`, `-` or `}`
fn grammatical_form_tag(line: &str) -> Option<&str> {
    if !line.starts_with(GRAMMATICAL_FORM) || line.starts_with(DECLENSION_TABLE) {
        return None;
    }
    let rest = &line[GRAMMATICAL_FORM.len()..];
    let end = rest.find(&['|', '-', '}'][..]).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn scan_section(
    title: &str,
    section: &Section,
    mut state: ScanState,
    config: &EditionConfig,
    out: &mut Collections,
) -> ScanState {
    let mut translations: Vec<String> = Vec::new();

    for line in section.text.split('\n') {
        // Synonym blocks end the useful part of the section
        if line.starts_with("{{finsyn") || line.starts_with("{{hunsyn") {
            break;
        }
        if line.starts_with("[[Kategória:") {
            continue;
        }

        if let Some(cap) = POS_TEMPLATE.captures(line) {
            state.sub_lang = Some(if &cap[1] == "hun" { Block::Native } else { Block::Foreign });
            let tag = cap[2].to_lowercase();
            let tag = tag.strip_suffix('2').unwrap_or(&tag);
            state.pos = config.normalize(tag);
        } else if line.starts_with("{{Fn}}") {
            state.pos = PosTag::Known(PartOfSpeech::Noun);
        } else if let Some(tag) = grammatical_form_tag(line) {
            state.pos = config.normalize(tag);
        } else if line.starts_with("{{") {
            continue;
        } else if line.starts_with("#:") {
            if state.sub_lang == Some(Block::Native) {
                record_sentence(title, line, state, out, Collections::add_example);
            }
        } else if line.starts_with('#') {
            scan_sense(title, line, state, &mut translations, out);
        }
    }

    state
}

fn record_sentence(
    title: &str,
    line: &str,
    state: ScanState,
    out: &mut Collections,
    add: fn(&mut Collections, PartOfSpeech, &str, String) -> bool,
) {
    let text = sentence(line);
    if text.is_empty() {
        return;
    }
    if let Some(pos) = state.pos.known() {
        add(out, pos, title, text);
    }
}

fn scan_sense(
    title: &str,
    line: &str,
    state: ScanState,
    translations: &mut Vec<String>,
    out: &mut Collections,
) {
    let text = sanitize(line, Mode::Translation);

    match state.sub_lang {
        Some(Block::Foreign) => {
            translations.extend(
                split_outside_parens(&text, &[',', ';'])
                    .into_iter()
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(String::from),
            );
            let Some(pos) = state.pos.known() else { return };
            if title.is_empty() {
                return;
            }
            for translation in translations.iter() {
                out.add_pair(pos, title, translation);
            }
        }
        Some(Block::Native) => {
            record_sentence(title, &text, state, out, Collections::add_definition);
        }
        None => {}
    }
}
