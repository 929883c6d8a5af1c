//! Output writers for the three collections.
//!
//! Files are named `{kind}_{lang}.tsv` (or `.jsonl`). Word pairs are always
//! written Finnish first, Hungarian second, whichever edition they came from.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::collect::{Collections, Sentences, TranslationPair};
use crate::config::Edition;
use crate::error::{ExtractError, Result};
use crate::pos::PartOfSpeech;

const WRITE_BUFFER: usize = 256 * 1024;

/// Which collections to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Wordpairs,
    Definitions,
    Examples,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated values, three columns
    #[default]
    Tsv,
    /// One JSON object per line
    Jsonl,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

#[derive(Serialize)]
struct PairRecord<'a> {
    finnish: &'a str,
    hungarian: &'a str,
    pos: PartOfSpeech,
}

#[derive(Serialize)]
struct SentenceRecord<'a> {
    pos: PartOfSpeech,
    headword: &'a str,
    sentence: &'a str,
}

pub struct Sink {
    dir: PathBuf,
    edition: Edition,
    format: OutputFormat,
}

impl Sink {
    pub fn new(dir: impl Into<PathBuf>, edition: Edition, format: OutputFormat) -> Self {
        Sink {
            dir: dir.into(),
            edition,
            format,
        }
    }

    pub fn path_for(&self, kind: &str) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.{}",
            kind,
            self.edition.code(),
            self.format.extension()
        ))
    }

    /// Write the selected dataset(s). Returns the files written.
    pub fn write(&self, dataset: Dataset, collections: &Collections) -> Result<Vec<PathBuf>> {
        ensure_dir(&self.dir)?;

        let mut written = Vec::new();
        if matches!(dataset, Dataset::Wordpairs | Dataset::All) {
            written.push(self.write_pairs(collections)?);
        }
        if matches!(dataset, Dataset::Definitions | Dataset::All) {
            written.push(self.write_sentences("definitions", &collections.definitions)?);
        }
        if matches!(dataset, Dataset::Examples | Dataset::All) {
            written.push(self.write_sentences("examples", &collections.examples)?);
        }
        Ok(written)
    }

    /// Finnish and Hungarian word of a pair. On Finnish Wiktionary the
    /// headword is Hungarian; on Hungarian Wiktionary it is Finnish.
    fn columns<'a>(&self, pair: &'a TranslationPair) -> (&'a str, &'a str) {
        match self.edition {
            Edition::Fi => (pair.translation.as_str(), pair.headword.as_str()),
            Edition::Hu => (pair.headword.as_str(), pair.translation.as_str()),
        }
    }

    fn write_pairs(&self, collections: &Collections) -> Result<PathBuf> {
        self.write_file("wordpairs", |writer| {
            let mut lines = 0;
            for (&pos, pairs) in &collections.wordpairs {
                for pair in pairs {
                    let (finnish, hungarian) = self.columns(pair);
                    let record = PairRecord { finnish, hungarian, pos };
                    self.emit(writer, [finnish, hungarian, pos.as_str()], &record)?;
                    lines += 1;
                }
            }
            Ok(lines)
        })
    }

    fn write_sentences(&self, kind: &str, sentences: &Sentences) -> Result<PathBuf> {
        self.write_file(kind, |writer| {
            let mut lines = 0;
            for (&pos, by_word) in sentences {
                for (headword, set) in by_word {
                    for sentence in set {
                        let (headword, sentence) = (headword.as_str(), sentence.as_str());
                        let record = SentenceRecord { pos, headword, sentence };
                        self.emit(writer, [pos.as_str(), headword, sentence], &record)?;
                        lines += 1;
                    }
                }
            }
            Ok(lines)
        })
    }

    fn emit<W: Write, T: Serialize>(&self, writer: &mut W, columns: [&str; 3], record: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Tsv => writeln!(writer, "{}", columns.join("\t")),
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)
            }
        }
    }

    fn write_file<F>(&self, kind: &str, body: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<usize>,
    {
        let path = self.path_for(kind);
        let to_error = |source| ExtractError::Write {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(to_error)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);
        let lines = body(&mut writer).map_err(to_error)?;
        writer.flush().map_err(to_error)?;

        debug!(path = %path.display(), lines, "wrote output file");
        Ok(path)
    }
}

/// Output directory must exist or be creatable before scanning starts
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| ExtractError::Write {
        path: dir.to_path_buf(),
        source,
    })
}
