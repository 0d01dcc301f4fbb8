//! Processing pipelines
//!
//! A pipeline turns raw text into parsed [`Sentence`]s. Callers choose which
//! processing stages to run; a property whose stage was not loaded comes back
//! empty rather than as an error (no POS tags without `pos`, no dependency
//! edges without `depparse`, and so on).
//!
//! The parsing itself is done elsewhere: [`TreebankPipeline`] serves
//! sentences that were parsed ahead of time and stored as CoNLL-U, and
//! [`TreebankModels`] loads those treebanks by model name.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::conllu::{CoNLLUReader, ParseError};
use crate::sentence::{Features, Sentence};

/// Error type for pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown processor: {0}")]
    UnknownProcessor(String),

    #[error("Processor {processor} requires {requires}")]
    MissingRequirement {
        processor: Processor,
        requires: Processor,
    },

    #[error("Model '{model}' not found in {}; download it first", .dir.display())]
    ModelNotFound { model: String, dir: PathBuf },

    #[error("No parse available for text: {0:?}")]
    UnknownSentence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Processor {
    Tokenize,
    Mwt,
    Pos,
    Lemma,
    Constituency,
    DepParse,
}

impl Processor {
    pub const ALL: [Processor; 6] = [
        Processor::Tokenize,
        Processor::Mwt,
        Processor::Pos,
        Processor::Lemma,
        Processor::Constituency,
        Processor::DepParse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Processor::Tokenize => "tokenize",
            Processor::Mwt => "mwt",
            Processor::Pos => "pos",
            Processor::Lemma => "lemma",
            Processor::Constituency => "constituency",
            Processor::DepParse => "depparse",
        }
    }

    /// Stages that must be loaded for this one to run
    pub fn requires(self) -> &'static [Processor] {
        use Processor::*;
        match self {
            Tokenize => &[],
            Mwt | Pos => &[Tokenize],
            Lemma | Constituency => &[Tokenize, Pos],
            DepParse => &[Tokenize, Pos, Lemma],
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Processor {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Processor::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipelineError::UnknownProcessor(s.to_string()))
    }
}

/// A set of processing stages, written `tokenize,mwt,pos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Processors(u8);

impl Processors {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Processor::ALL.into_iter().collect()
    }

    pub fn with(self, processor: Processor) -> Self {
        Self(self.0 | processor.bit())
    }

    #[inline]
    pub fn contains(&self, processor: Processor) -> bool {
        self.0 & processor.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Processor> {
        let set = *self;
        Processor::ALL.into_iter().filter(move |p| set.contains(*p))
    }

    /// Check that every stage has the stages it depends on
    pub fn validate(&self) -> Result<(), PipelineError> {
        for processor in self.iter() {
            if let Some(&requires) = processor.requires().iter().find(|r| !self.contains(**r)) {
                return Err(PipelineError::MissingRequirement {
                    processor,
                    requires,
                });
            }
        }
        Ok(())
    }

    /// Copy of `sentence` with every layer whose stage is missing cleared
    pub fn restrict(&self, sentence: &Sentence) -> Sentence {
        let mut sentence = sentence.clone();

        if !self.contains(Processor::Tokenize) {
            sentence.words.clear();
        }
        if !self.contains(Processor::Mwt) {
            sentence.tokens.clear();
        }
        if !self.contains(Processor::Constituency) {
            sentence.constituency = None;
        }

        for word in &mut sentence.words {
            if !self.contains(Processor::Pos) {
                word.upos = None;
                word.xpos = None;
                word.feats = Features::new();
            }
            if !self.contains(Processor::Lemma) {
                word.lemma = None;
            }
            if !self.contains(Processor::DepParse) {
                word.head = None;
                word.deprel = None;
            }
        }

        sentence
    }
}

impl FromIterator<Processor> for Processors {
    fn from_iter<I: IntoIterator<Item = Processor>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl FromStr for Processors {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|name| !name.trim().is_empty())
            .map(Processor::from_str)
            .collect()
    }
}

impl fmt::Display for Processors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Processor::name).collect();
        f.write_str(&names.join(","))
    }
}

/// The input text and its parsed sentences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub sentences: Vec<Sentence>,
}

/// Turns raw text into parsed sentences
pub trait SentenceParser {
    /// Stages this parser runs
    fn processors(&self) -> Processors;

    fn parse(&self, text: &str) -> Result<Document, PipelineError>;
}

/// Loads a parser by model name
pub trait ModelLoader {
    type Parser: SentenceParser;

    fn load(&self, model: &str, processors: Processors) -> Result<Self::Parser, PipelineError>;
}

/// Parser backed by sentences that were parsed ahead of time
#[derive(Debug, Clone)]
pub struct TreebankPipeline {
    processors: Processors,
    by_text: FxHashMap<String, Sentence>,
}

impl TreebankPipeline {
    /// Index sentences by their surface text; the first of any duplicates wins
    pub fn new(sentences: impl IntoIterator<Item = Sentence>, processors: Processors) -> Self {
        let mut by_text = FxHashMap::default();
        for sentence in sentences {
            by_text.entry(sentence.surface_text()).or_insert(sentence);
        }
        Self {
            processors,
            by_text,
        }
    }

    /// Build from CoNLL-U text
    pub fn from_conllu(text: &str, processors: Processors) -> Result<Self, PipelineError> {
        let sentences = CoNLLUReader::from_string(text).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(sentences, processors))
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }

    /// Known sentences that `rest` starts with, ending at a word boundary,
    /// longest first
    fn matches(&self, rest: &str) -> Vec<(usize, &Sentence)> {
        let mut found: Vec<(usize, &Sentence)> = self
            .by_text
            .iter()
            .filter(|(text, _)| !text.is_empty() && rest.starts_with(text.as_str()))
            .filter(|(text, _)| {
                let ends_word = text.chars().last().is_some_and(|c| !c.is_alphanumeric());
                ends_word || rest[text.len()..].chars().next().is_none_or(char::is_whitespace)
            })
            .map(|(text, sentence)| (text.len(), sentence))
            .collect();
        found.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        found
    }

    /// Cover `text[offset..]` with known sentences, preferring longer ones
    /// and backing off to shorter ones when the remainder can't be covered
    fn segment<'a>(&'a self, text: &str, offset: usize, search: &mut Search<'a>) -> bool {
        let rest = text[offset..].trim_start();
        let offset = text.len() - rest.len();
        if rest.is_empty() {
            return true;
        }
        if search.dead_ends.contains(&offset) {
            return false;
        }

        for (len, sentence) in self.matches(rest) {
            search.path.push(sentence);
            if self.segment(text, offset + len, search) {
                return true;
            }
            search.path.pop();
        }

        search.dead_ends.insert(offset);
        search.furthest = search.furthest.max(offset);
        false
    }
}

/// Backtracking state for [`TreebankPipeline::segment`]
#[derive(Default)]
struct Search<'a> {
    path: Vec<&'a Sentence>,
    /// Offsets already known not to lead to a full segmentation
    dead_ends: FxHashSet<usize>,
    furthest: usize,
}

impl SentenceParser for TreebankPipeline {
    fn processors(&self) -> Processors {
        self.processors
    }

    fn parse(&self, text: &str) -> Result<Document, PipelineError> {
        let mut search = Search::default();
        if !self.segment(text, 0, &mut search) {
            let rest = text[search.furthest..].trim_end();
            return Err(PipelineError::UnknownSentence(rest.to_string()));
        }

        Ok(Document {
            text: text.to_string(),
            sentences: search
                .path
                .into_iter()
                .map(|sentence| self.processors.restrict(sentence))
                .collect(),
        })
    }
}

/// Loads treebank-backed parsers from a directory of `<model>.conllu[.gz]` files
#[derive(Debug, Clone)]
pub struct TreebankModels {
    dir: PathBuf,
}

impl TreebankModels {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of an available model file, if any
    pub fn model_path(&self, model: &str) -> Option<PathBuf> {
        ["conllu", "conllu.gz"]
            .into_iter()
            .map(|ext| self.dir.join(format!("{}.{}", model, ext)))
            .find(|path| path.is_file())
    }
}

impl ModelLoader for TreebankModels {
    type Parser = TreebankPipeline;

    fn load(&self, model: &str, processors: Processors) -> Result<TreebankPipeline, PipelineError> {
        if let Err(e) = processors.validate() {
            warn!(model, %processors, "{}", e);
            return Err(e);
        }

        let Some(path) = self.model_path(model) else {
            return Err(PipelineError::ModelNotFound {
                model: model.to_string(),
                dir: self.dir.clone(),
            });
        };

        let sentences = CoNLLUReader::from_file(&path)?.collect::<Result<Vec<_>, _>>()?;
        debug!(
            path = %path.display(),
            sentences = sentences.len(),
            %processors,
            "loaded treebank model"
        );

        Ok(TreebankPipeline::new(sentences, processors))
    }
}
