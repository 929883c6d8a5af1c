//! Streaming page source over MediaWiki XML dumps (`.xml` or `.xml.bz2`).
//!
//! Pages are cut out of the byte stream by their `<page>` tags and picked
//! apart with regexes; no XML tree is ever built.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ExtractError, Result};

const PAGE_OPEN: &str = "<page>";
const PAGE_CLOSE: &str = "</page>";
const CHUNK_SIZE: usize = 1024 * 1024;
const READ_BUFFER: usize = 256 * 1024;

lazy_static! {
    static ref TITLE_PATTERN: Regex = Regex::new(r"<title>([^<]+)</title>").unwrap();
    static ref TEXT_PATTERN: Regex = Regex::new(r"(?s)<text[^>]*>(.+?)</text>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").unwrap();
}

/// One dictionary page: headword title and raw wikitext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub text: String,
}

/// Open a dump file, decompressing on the fly when it ends in `.bz2`
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(READ_BUFFER, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };
    Ok(reader)
}

/// Decode the XML character entities MediaWiki emits in titles and text
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |cap: &Captures| {
            let name = &cap[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let number = &name[1..];
                    let code = match number.strip_prefix('x') {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => number.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| cap[0].to_string(), String::from)
        })
        .into_owned()
}

/// Pull title and text out of one `<page>` element. Pages without revision
/// text give `None`.
fn parse_page(page_xml: &str) -> Option<Page> {
    let title = TITLE_PATTERN.captures(page_xml)?;
    let text = TEXT_PATTERN.captures(page_xml)?;
    Some(Page {
        title: decode_entities(&title[1]).nfc().collect(),
        text: decode_entities(&text[1]),
    })
}

/// Lazy, single-pass iterator over the pages of a dump
pub struct PageReader<R> {
    reader: R,
    chunk: Vec<u8>,
    // Bytes of a code point split across two reads
    pending: Vec<u8>,
    buffer: String,
    done: bool,
    skipped: usize,
}

impl<R: BufRead> PageReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        PageReader {
            reader,
            chunk: vec![0u8; chunk_size.max(1)],
            pending: Vec::new(),
            buffer: String::new(),
            done: false,
            skipped: 0,
        }
    }

    /// Pages dropped because they had no title or no text
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read one chunk into the buffer. Returns false at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        let bytes_read = self.reader.read(&mut self.chunk)?;
        if bytes_read == 0 {
            if !self.pending.is_empty() {
                self.buffer.push_str(&String::from_utf8_lossy(&self.pending));
                self.pending.clear();
            }
            return Ok(false);
        }

        self.pending.extend_from_slice(&self.chunk[..bytes_read]);
        loop {
            let error = match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return Ok(true);
                }
                Err(e) => e,
            };
            let valid = error.valid_up_to();
            self.buffer.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
            match error.error_len() {
                // Incomplete sequence at the end: keep it for the next read
                None => {
                    self.pending.drain(..valid);
                    return Ok(true);
                }
                Some(invalid) => {
                    self.buffer.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + invalid);
                }
            }
        }
    }

    /// Cut the next complete `<page>...</page>` out of the buffer
    fn take_page(&mut self) -> Option<String> {
        let Some(start) = self.buffer.find(PAGE_OPEN) else {
            // Keep a tail that may hold the start of a split `<page>` tag
            let mut cut = self.buffer.len().saturating_sub(PAGE_OPEN.len());
            while !self.buffer.is_char_boundary(cut) {
                cut -= 1;
            }
            self.buffer.drain(..cut);
            return None;
        };

        match self.buffer[start..].find(PAGE_CLOSE) {
            Some(offset) => {
                let end = start + offset + PAGE_CLOSE.len();
                let page_xml = self.buffer[start..end].to_string();
                self.buffer.drain(..end);
                Some(page_xml)
            }
            None => {
                self.buffer.drain(..start);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for PageReader<R> {
    type Item = io::Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(page_xml) = self.take_page() {
                match parse_page(&page_xml) {
                    Some(page) => return Some(Ok(page)),
                    None => {
                        self.skipped += 1;
                        continue;
                    }
                }
            }
            if self.done {
                return None;
            }
            match self.fill() {
                Ok(true) => {}
                Ok(false) => self.done = true,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
