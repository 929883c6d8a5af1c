//! Wikitext line cleanup.
//!
//! A line is cleaned by an ordered table of (pattern, replacement) rules. The
//! order matters: piped links are collapsed before stray brackets go, and
//! whole templates are removed before stray braces. One pass can expose new
//! markup (`[<nowiki/>[x]]`), so passes repeat until the text is stable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which kind of line is being cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Definition or translation lines (`# ...`)
    Translation,
    /// Example sentence lines (`#: ...`)
    Example,
}

type Rules = Vec<(Regex, &'static str)>;

fn rules(table: &[(&str, &'static str)]) -> Rules {
    table
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
}

// [[target|alias]] -> alias
static PIPED_LINK: Lazy<Rules> = Lazy::new(|| rules(&[(r"\[\[[^|\]]*\|([^\]]*)\]\]", "${1}")]));

static EXAMPLE_RULES: Lazy<Rules> = Lazy::new(|| {
    rules(&[
        (r"#:+ ", ""),
        (r"#:+", ""),
        (r"</?small>", ""),
        (r"</?table>", ""),
        (r"</?td( [^>]*)?>", ""),
        (r"</?tr>", ""),
        (r"</?u>", ""),
        (r"\[", ""),
        (r"\]", ""),
    ])
});

static TRANSLATION_RULES: Lazy<Rules> = Lazy::new(|| rules(&[(r"# ", ""), (r"#\**", "")]));

static COMMON_RULES: Lazy<Rules> = Lazy::new(|| {
    rules(&[
        (r"\(''[^)]*''\)", ""),
        (r"\{\{[^}]*\}\}", ""),
        (r"'''", ""),
        (r"\[\[", ""),
        (r"\]\]", ""),
        (r"</?nowiki/?>", ""),
        (r"</?span( [^>]*)?>", ""),
        (r"</?tt>", ""),
        (r"</?ref([^>]*)?>", ""),
        (r"</?su[pb]>", ""),
        (r"\}\}", ""),
        (r"\{\{", ""),
        (r"</br>", ""),
        (r"''", ""),
        (r"<!--.*-->", ""),
        (r"\(\)", ""),
        (r"^\s*:+", ""),
        (r"^\s*,", ""),
        (r"\s*\.$", ""),
    ])
});

fn apply(rules: &Rules, line: String) -> String {
    rules.iter().fold(line, |acc, (re, replacement)| {
        if re.is_match(&acc) {
            re.replace_all(&acc, *replacement).into_owned()
        } else {
            acc
        }
    })
}

fn sanitize_once(line: &str, mode: Mode) -> String {
    let line = apply(&PIPED_LINK, line.to_string());
    let line = match mode {
        Mode::Example => apply(&EXAMPLE_RULES, line),
        Mode::Translation => apply(&TRANSLATION_RULES, line),
    };
    apply(&COMMON_RULES, line).trim().to_string()
}

/// Strip markup from a line. `sanitize(sanitize(x, m), m) == sanitize(x, m)`.
pub fn sanitize(line: &str, mode: Mode) -> String {
    // Every rule deletes text, so a changed pass is strictly shorter
    let mut current = sanitize_once(line, mode);
    loop {
        let next = sanitize_once(&current, mode);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Clean a sentence for the examples (or Hungarian definitions) collection:
/// example-mode sanitizing, then removal of characters that need four UTF-8
/// bytes (emoji and other astral-plane symbols). Only whitespace is trimmed
/// after the removal.
pub fn sentence(line: &str) -> String {
    let cleaned = sanitize(line, Mode::Example);
    if cleaned.chars().all(|c| c.len_utf8() < 4) {
        return cleaned;
    }
    let narrow: String = cleaned.chars().filter(|c| c.len_utf8() < 4).collect();
    narrow.trim().to_string()
}

/// Split `text` at any of `separators` that is not inside parentheses.
///
/// A separator counts as parenthesized when the text after it reaches a `)`
/// before any `(`. Pieces are returned untrimmed.
pub fn split_outside_parens<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        if !separators.contains(&ch) {
            continue;
        }
        let rest = &text[index + ch.len_utf8()..];
        let closes_first = rest.chars().find(|&c| c == '(' || c == ')') == Some(')');
        if closes_first {
            continue;
        }
        pieces.push(&text[start..index]);
        start = index + ch.len_utf8();
    }
    pieces.push(&text[start..]);
    pieces
}
