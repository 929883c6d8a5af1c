use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod collect;
mod config;
mod dump;
mod error;
mod finnish;
mod hungarian;
mod pos;
mod sanitize;
mod segment;
mod sink;

use collect::Collections;
use config::{load_language_codes, Config, Edition, EditionConfig};
use dump::{Page, PageReader};
use error::Result;
use segment::MarkerSegmenter;
use sink::{Dataset, OutputFormat, Sink};

#[derive(Parser)]
#[command(name = "wiktionary-fihu")]
#[command(about = "Extract Finnish-Hungarian word pairs, definitions and example sentences from Wiktionary dumps")]
struct Args {
    /// Dataset to write
    #[arg(value_enum)]
    dataset: Dataset,

    /// Wiktionary edition of the dump
    #[arg(short, long, value_enum)]
    lang: Edition,

    /// Input dump (.xml or .xml.bz2), downloaded beforehand from
    /// https://dumps.wikimedia.org/ (fiwiktionary / huwiktionary)
    #[arg(short, long)]
    input: PathBuf,

    /// Folder for the output files
    #[arg(short, long, default_value = "output/")]
    output: PathBuf,

    /// Language code templates of Hungarian Wiktionary, one per line
    #[arg(long, default_value = "data/lang_hun.tsv")]
    langcodes: PathBuf,

    /// POS schema YAML file (default: built-in schema/pos.yaml)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Limit number of pages to scan (for testing)
    #[arg(long)]
    page_limit: Option<usize>,

    /// Quiet mode - no progress or report
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Edition-specific page scanner
enum Extractor<'a> {
    Finnish(&'a EditionConfig),
    Hungarian(&'a EditionConfig, MarkerSegmenter),
}

impl Extractor<'_> {
    /// Sections scanned, or `None` for a skipped page
    fn extract(&self, page: &Page, out: &mut Collections) -> Option<usize> {
        match self {
            Extractor::Finnish(config) => Some(finnish::extract(&page.title, &page.text, config, out)),
            Extractor::Hungarian(config, segmenter) => {
                hungarian::extract(&page.title, &page.text, config, segmenter, out)
            }
        }
    }
}

#[derive(Default)]
struct Stats {
    pages_processed: usize,
    reserved: usize,
    without_text: usize,
    sections: usize,
    wordpairs: usize,
    definitions: usize,
    examples: usize,
    files: Vec<PathBuf>,
    elapsed: Duration,
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

fn run(args: &Args) -> Result<Stats> {
    let start_time = Instant::now();
    let config = Config::load(args.schema.as_deref())?;
    let edition = config.edition(args.lang);

    // Invalid inputs fail here, before any page is read
    let extractor = match args.lang {
        Edition::Fi => Extractor::Finnish(edition),
        Edition::Hu => {
            let codes = load_language_codes(&args.langcodes)?;
            info!(codes = codes.len(), "loaded language codes");
            Extractor::Hungarian(edition, MarkerSegmenter::new(&codes)?)
        }
    };
    sink::ensure_dir(&args.output)?;
    let mut pages = PageReader::new(dump::open_dump(&args.input)?);

    let mut stats = Stats::default();
    let mut collections = Collections::new();
    let pb = spinner(args.quiet);

    for page in pages.by_ref() {
        let page = page?;
        stats.pages_processed += 1;

        match extractor.extract(&page, &mut collections) {
            Some(sections) => stats.sections += sections,
            None => {
                stats.reserved += 1;
                debug!(title = %page.title, "skipped reserved page");
            }
        }

        if !args.quiet && stats.pages_processed % 1000 == 0 {
            let rate = stats.pages_processed as f64 / start_time.elapsed().as_secs_f64();
            pb.set_message(format!(
                "Pages: {} | Pairs: {} | Definitions: {} | Examples: {} | Rate: {:.0} pg/s",
                stats.pages_processed,
                collections.pair_count(),
                collections.definition_count(),
                collections.example_count(),
                rate
            ));
        }

        if let Some(limit) = args.page_limit {
            if stats.pages_processed >= limit {
                info!(limit, "reached page limit");
                break;
            }
        }
    }
    pb.finish_and_clear();
    stats.without_text = pages.skipped();

    stats.wordpairs = collections.pair_count();
    stats.definitions = collections.definition_count();
    stats.examples = collections.example_count();

    let sink = Sink::new(&args.output, args.lang, args.format);
    stats.files = sink.write(args.dataset, &collections)?;

    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

fn print_stats(stats: &Stats, lang: Edition) {
    println!();
    println!("============================================================");
    println!("Edition: {}", lang.code());
    println!("Pages processed: {}", stats.pages_processed);
    println!("Sections scanned: {}", stats.sections);
    println!("------------------------------------------------------------");
    println!("Word pairs: {}", stats.wordpairs);
    println!("Definitions: {}", stats.definitions);
    println!("Examples: {}", stats.examples);
    println!("------------------------------------------------------------");
    println!("Reserved pages: {}", stats.reserved);
    println!("Pages without text: {}", stats.without_text);
    for file in &stats.files {
        println!("Wrote: {}", file.display());
    }
    println!("Time: {}m {}s", stats.elapsed.as_secs() / 60, stats.elapsed.as_secs() % 60);
    println!(
        "Rate: {:.0} pages/sec",
        stats.pages_processed as f64 / stats.elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("============================================================");
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wiktionary_fihu={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !args.quiet {
        println!("Parsing: {}", args.input.display());
        println!("Edition: {}", args.lang.code());
        println!("Output: {}", args.output.display());
        if let Some(limit) = args.page_limit {
            println!("Page limit: {}", limit);
        }
    }

    match run(&args) {
        Ok(stats) => {
            if !args.quiet {
                print_stats(&stats, args.lang);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// End-to-end runs over small dumps
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const FI_DUMP: &str = r#"<mediawiki>
  <page>
    <title>talo</title>
    <revision><text xml:space="preserve">==Suomi==
===substantiivi===
# [[rakennus]], jossa asutaan.
#: Talo on &lt;small&gt;iso&lt;/small&gt;.
==Viro==
===substantiivi===
# maja
</text></revision>
  </page>
  <page>
    <title>ház</title>
    <revision><text xml:space="preserve">==Unkari==
===substantiivi===
# [[talo]], [[rakennus]]
</text></revision>
  </page>
  <page>
    <title>Malline:fi-subs</title>
    <revision><text xml:space="preserve">==Suomi==
===substantiivi===
# ohje
</text></revision>
  </page>
</mediawiki>
"#;

    const HU_DUMP: &str = r#"<mediawiki>
  <page>
    <title>talo</title>
    <revision><text xml:space="preserve">{{fin}}
{{finfn}}
# [[ház]], [[épület]]; [[otthon]]
{{finsyn}}
# lak
[[Kategória:Finn főnevek]]
</text></revision>
  </page>
  <page>
    <title>ház</title>
    <revision><text xml:space="preserve">{{hun}}
{{hunfn}}
# [[épület]], amelyben laknak
#: A '''ház''' nagy. 🏠
{{eng}}
# house
</text></revision>
  </page>
  <page>
    <title>Függelék:Finn főnevek</title>
    <revision><text xml:space="preserve">{{finfn}}
# főnév
</text></revision>
  </page>
</mediawiki>
"#;

    fn args(dir: &Path, dump: &str, extra: &[&str]) -> Args {
        let input = dir.join("dump.xml");
        fs::write(&input, dump).unwrap();
        let langcodes = concat!(env!("CARGO_MANIFEST_DIR"), "/data/lang_hun.tsv");
        let mut argv = vec![
            "wiktionary-fihu".to_string(),
            "--input".to_string(),
            input.display().to_string(),
            "--output".to_string(),
            dir.join("out").display().to_string(),
            "--langcodes".to_string(),
            langcodes.to_string(),
            "--quiet".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join("out").join(name)).unwrap()
    }

    #[test]
    fn finnish_dump_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let stats = run(&args(dir.path(), FI_DUMP, &["all", "--lang", "fi"])).unwrap();

        assert_eq!(stats.pages_processed, 3);
        assert_eq!(stats.reserved, 0);
        assert_eq!(stats.files.len(), 3);
        assert_eq!(read(dir.path(), "definitions_fi.tsv"), "NOUN\ttalo\trakennus, jossa asutaan\n");
        assert_eq!(read(dir.path(), "examples_fi.tsv"), "NOUN\ttalo\tTalo on iso\n");
        assert_eq!(
            read(dir.path(), "wordpairs_fi.tsv"),
            "rakennus\tház\tNOUN\ntalo\tház\tNOUN\n"
        );
    }

    #[test]
    fn hungarian_dump_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let stats = run(&args(dir.path(), HU_DUMP, &["all", "--lang", "hu"])).unwrap();

        assert_eq!(stats.pages_processed, 3);
        assert_eq!(stats.reserved, 1);
        assert_eq!(
            read(dir.path(), "wordpairs_hu.tsv"),
            "talo\tház\tNOUN\ntalo\totthon\tNOUN\ntalo\tépület\tNOUN\n"
        );
        assert_eq!(
            read(dir.path(), "definitions_hu.tsv"),
            "NOUN\tház\tépület, amelyben laknak\n"
        );
        assert_eq!(read(dir.path(), "examples_hu.tsv"), "NOUN\tház\tA ház nagy.\n");
    }

    #[test]
    fn single_dataset_writes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let stats = run(&args(dir.path(), FI_DUMP, &["examples", "--lang", "fi"])).unwrap();
        assert_eq!(stats.files, vec![dir.path().join("out").join("examples_fi.tsv")]);
        assert!(!dir.path().join("out").join("wordpairs_fi.tsv").exists());
    }

    #[test]
    fn page_limit_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        let stats = run(&args(dir.path(), FI_DUMP, &["all", "--lang", "fi", "--page-limit", "1"])).unwrap();
        assert_eq!(stats.pages_processed, 1);
        assert_eq!(stats.wordpairs, 0);
    }

    #[test]
    fn runs_are_byte_identical() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        run(&args(first.path(), HU_DUMP, &["all", "--lang", "hu"])).unwrap();
        run(&args(second.path(), HU_DUMP, &["all", "--lang", "hu"])).unwrap();
        for name in ["wordpairs_hu.tsv", "definitions_hu.tsv", "examples_hu.tsv"] {
            assert_eq!(read(first.path(), name), read(second.path(), name));
        }
    }

    #[test]
    fn input_dump_is_required() {
        let result = Args::try_parse_from(["wiktionary-fihu", "all", "--lang", "fi"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_language_is_rejected_before_processing() {
        let result = Args::try_parse_from(["wiktionary-fihu", "all", "--lang", "sv", "--input", "x.xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_language_codes_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), HU_DUMP, &["all", "--lang", "hu"]);
        a.langcodes = dir.path().join("missing.tsv");
        assert!(run(&a).is_err());
        assert!(!dir.path().join("out").exists());
    }
}
