//! Command-line interface for parsetree
//! Prints constituency trees, dependency listings, and phrases from parsed text.
//!
//! Usage:
//!   parsetree tree `<path>` [--indent]                  - Print constituency trees
//!   parsetree deps `<path>`                             - Print aligned dependency edges
//!   parsetree phrases `<path>` [--min-words `<n>`]      - Print phrases by category
//!   parsetree parse `<text>` --model `<model>` [--model-dir `<dir>`]
//!                                                     - Look up parses of raw text
//!
//! `<path>` is a CoNLL-U file (`.conllu`, `.conll`, optionally gzipped) or a
//! file of bracketed trees.

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use parsetree::{
    CoNLLUReader, ConstituencyNode, ModelLoader, Processors, Sentence, SentenceParser,
    TreebankModels, Word, extract_phrases, format_dependencies, parse_bracketed_forest,
};

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    let path_arg = Arg::new("path")
        .help("CoNLL-U file or file of bracketed trees")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);

    Command::new("parsetree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect constituency and dependency parses")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("processors")
                .long("processors")
                .short('p')
                .global(true)
                .help("Processing stages to show, e.g. 'tokenize,mwt,pos,constituency'")
                .default_value("tokenize,mwt,pos,lemma,constituency,depparse"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("tree")
                .about("Print constituency trees in bracketed notation")
                .arg(path_arg.clone())
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .help("One phrase per line")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("deps")
                .about("Print dependency edges in aligned columns")
                .arg(path_arg.clone()),
        )
        .subcommand(
            Command::new("phrases")
                .about("Print phrases grouped by category")
                .arg(path_arg)
                .arg(
                    Arg::new("min-words")
                        .long("min-words")
                        .short('m')
                        .help("Skip phrases shorter than this")
                        .value_parser(value_parser!(usize))
                        .default_value("2"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Look up parses of raw text in a treebank model")
                .arg(
                    Arg::new("text")
                        .help("Text to parse")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .help("Model name, e.g. 'en'")
                        .default_value("en"),
                )
                .arg(
                    Arg::new("model-dir")
                        .long("model-dir")
                        .env("PARSETREE_MODELS")
                        .help("Directory holding <model>.conllu files")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("."),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .help("One phrase per line")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// RUST_LOG wins; otherwise warnings, or debug output with -v
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    let processors: Processors = matches
        .get_one::<String>("processors")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()
        .context("invalid --processors")?;

    match matches.subcommand() {
        Some(("tree", sub)) => {
            let sentences = load(path(sub)?, processors)?;
            print_trees(&sentences, sub.get_flag("indent"));
        }
        Some(("deps", sub)) => {
            let sentences = load(path(sub)?, processors)?;
            print_dependencies(&sentences);
        }
        Some(("phrases", sub)) => {
            let sentences = load(path(sub)?, processors)?;
            let min_words = sub.get_one::<usize>("min-words").copied().unwrap_or(2);
            print_phrases(&sentences, min_words);
        }
        Some(("parse", sub)) => {
            let text = sub.get_one::<String>("text").map(String::as_str).unwrap_or_default();
            let model = sub.get_one::<String>("model").map(String::as_str).unwrap_or("en");
            let dir = sub
                .get_one::<PathBuf>("model-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));

            let parser = TreebankModels::new(&dir)
                .load(model, processors)
                .with_context(|| format!("failed to load model '{}'", model))?;
            let doc = parser.parse(text)?;

            print_trees(&doc.sentences, sub.get_flag("indent"));
            print_dependencies(&doc.sentences);
        }
        Some((name, _)) => bail!("unknown subcommand '{}'", name),
        None => bail!("no subcommand given"),
    }

    Ok(())
}

fn path(sub: &ArgMatches) -> Result<&Path> {
    sub.get_one::<PathBuf>("path")
        .map(PathBuf::as_path)
        .context("missing input path")
}

/// Read sentences and clear the layers whose stages weren't requested
fn load(path: &Path, processors: Processors) -> Result<Vec<Sentence>> {
    let sentences = read_sentences(path)?;
    debug!(path = %path.display(), sentences = sentences.len(), %processors, "read input");
    Ok(sentences.iter().map(|s| processors.restrict(s)).collect())
}

fn read_sentences(path: &Path) -> Result<Vec<Sentence>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(name);

    if name.ends_with(".conllu") || name.ends_with(".conll") {
        let reader = CoNLLUReader::from_file(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let mut sentences = Vec::new();
        for result in reader {
            match result {
                Ok(sentence) => sentences.push(sentence),
                Err(e) => warn!(path = %path.display(), "skipping sentence: {}", e),
            }
        }
        return Ok(sentences);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let trees = parse_bracketed_forest(&text)
        .with_context(|| format!("failed to parse trees in {}", path.display()))?;

    Ok(trees.into_iter().map(sentence_from_tree).collect())
}

/// Words come from the tree's preterminals, tagged with their XPOS
fn sentence_from_tree(tree: ConstituencyNode) -> Sentence {
    let words = tree
        .tagged_words()
        .into_iter()
        .enumerate()
        .map(|(i, (word, tag))| {
            let mut word = Word::new(i + 1, word);
            word.xpos = Some(tag.to_string());
            word
        })
        .collect();

    let mut sentence = Sentence::from_words(words);
    sentence.constituency = Some(tree);
    sentence
}

fn print_trees(sentences: &[Sentence], indent: bool) {
    for sentence in sentences {
        let Some(tree) = &sentence.constituency else {
            continue;
        };
        if indent {
            println!("{}\n", tree.render_indented());
        } else {
            println!("{}", tree);
        }
    }
}

fn print_dependencies(sentences: &[Sentence]) {
    for sentence in sentences {
        let listing = format_dependencies(sentence);
        if listing.is_empty() {
            continue;
        }
        println!("# {}", sentence.surface_text());
        println!("{}", listing);
    }
}

fn print_phrases(sentences: &[Sentence], min_words: usize) {
    for sentence in sentences {
        let Some(tree) = &sentence.constituency else {
            continue;
        };
        println!("# {}", sentence.surface_text());
        for (label, phrases) in extract_phrases(tree, min_words) {
            println!("{}: {}", label, phrases.join(" | "));
        }
        println!();
    }
}
