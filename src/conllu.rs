//! CoNLL-U file parsing
//!
//! Parses CoNLL-U text into [`Sentence`]s and writes them back.
//! Multiword token ranges are kept as [`Token`]s, empty nodes are skipped,
//! and a `# constituency = (ROOT ...)` comment is read into the sentence's
//! constituency tree.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use flate2::read::MultiGzDecoder;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines};
use std::path::Path;
use thiserror::Error;

use crate::bracket::parse_bracketed;
use crate::sentence::{Comment, Features, Sentence, Token, Word};

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl ParseError {
    fn new(line_num: usize, message: impl Into<String>) -> Self {
        Self {
            line_num,
            message: message.into(),
        }
    }
}

/// ID column: a word, a multiword range, or an empty node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenId {
    Single(usize),
    Range(usize, usize),
    Decimal(usize, usize),
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl CoNLLUReader<Box<dyn BufRead>> {
    /// Create a reader from a file path
    ///
    /// Files ending in `.gz` are decompressed transparently.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(reader))
    }
}

impl CoNLLUReader<Cursor<String>> {
    /// Create a reader from a string
    pub fn from_string(text: &str) -> Self {
        Self::from_reader(Cursor::new(text.to_string()))
    }
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

/// Lines making up one sentence block
#[derive(Default)]
struct Block {
    comments: Vec<(usize, String)>,
    rows: Vec<(usize, String)>,
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Sentence, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = Block::default();

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if block.rows.is_empty() {
                        return None;
                    }
                    // Last sentence without trailing blank line
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(ParseError::new(
                        self.line_num,
                        format!("IO error: {}", e),
                    )));
                }
                Some(Ok(line)) => {
                    let line = line.trim_end_matches(['\r', '\n']);

                    if line.trim().is_empty() {
                        if !block.rows.is_empty() {
                            break;
                        }
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        block.comments.push((self.line_num, comment.to_string()));
                        continue;
                    }

                    block.rows.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_block(block))
    }
}

fn parse_block(block: Block) -> Result<Sentence, ParseError> {
    let mut sentence = Sentence::new();

    for (line_num, comment) in block.comments {
        parse_comment(&comment, line_num, &mut sentence)?;
    }

    // Line of each word, for errors found after the whole block is read
    let mut word_lines = Vec::with_capacity(block.rows.len());
    for (line_num, line) in block.rows {
        let before = sentence.words.len();
        parse_row(&line, line_num, &mut sentence)?;
        if sentence.words.len() > before {
            word_lines.push(line_num);
        }
    }

    let len = sentence.words.len();
    for (word, &line_num) in sentence.words.iter().zip(&word_lines) {
        if let Some(head) = word.head.filter(|&h| h > len) {
            return Err(ParseError::new(
                line_num,
                format!("HEAD {} of word {} is out of range", head, word.id),
            ));
        }
    }

    Ok(sentence)
}

/// Parse a comment line (without the leading #)
fn parse_comment(comment: &str, line_num: usize, sentence: &mut Sentence) -> Result<(), ParseError> {
    let Some((key, value)) = comment.split_once('=') else {
        sentence.comments.push(Comment::Line(comment.to_string()));
        return Ok(());
    };
    let key = key.trim();
    let value = value.trim();

    let marker = match key {
        "text" => {
            sentence.text = Some(value.to_string());
            Comment::Text
        }
        "constituency" => {
            let tree = parse_bracketed(value)
                .map_err(|e| ParseError::new(line_num, format!("Invalid constituency: {}", e)))?;
            sentence.constituency = Some(tree);
            Comment::Constituency
        }
        _ => Comment::Pair(key.to_string(), value.to_string()),
    };
    // A repeated text or constituency comment replaces the value in place
    if !sentence.comments.contains(&marker) {
        sentence.comments.push(marker);
    }
    Ok(())
}

/// Parse a single token row into the sentence
fn parse_row(line: &str, line_num: usize, sentence: &mut Sentence) -> Result<(), ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError::new(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    let id = match parse_id(fields[0]) {
        Some(TokenId::Single(id)) => id,
        Some(TokenId::Range(start, end)) => {
            sentence.tokens.push(Token {
                start,
                end,
                text: fields[1].to_string(),
                misc: parse_features(fields[9]),
            });
            return Ok(());
        }
        // Empty nodes only take part in enhanced dependencies
        Some(TokenId::Decimal(_, _)) => return Ok(()),
        None => {
            return Err(ParseError::new(line_num, format!("Invalid ID: {}", fields[0])));
        }
    };

    let expected = sentence.words.len() + 1;
    if id != expected {
        return Err(ParseError::new(
            line_num,
            format!("Expected word ID {}, found {}", expected, id),
        ));
    }

    let head = match fields[6] {
        "_" => None,
        s => Some(
            s.parse::<usize>()
                .map_err(|_| ParseError::new(line_num, format!("Invalid HEAD: {}", s)))?,
        ),
    };

    sentence.words.push(Word {
        id,
        text: fields[1].to_string(),
        lemma: optional(fields[2]),
        upos: optional(fields[3]),
        xpos: optional(fields[4]),
        feats: parse_features(fields[5]),
        head,
        deprel: optional(fields[7]),
        misc: parse_features(fields[9]),
    });

    Ok(())
}

/// Parse ID field (integer, range, or decimal)
fn parse_id(s: &str) -> Option<TokenId> {
    if let Some((start, end)) = s.split_once('-') {
        Some(TokenId::Range(start.parse().ok()?, end.parse().ok()?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Some(TokenId::Decimal(main.parse().ok()?, sub.parse().ok()?))
    } else {
        s.parse().ok().filter(|&id| id > 0).map(TokenId::Single)
    }
}

fn optional(s: &str) -> Option<String> {
    (s != "_").then(|| s.to_string())
}

/// Parse FEATS or MISC field (key=value|key=value)
fn parse_features(s: &str) -> Features {
    let mut feats = Features::new();

    if s == "_" {
        return feats;
    }

    for pair in s.split('|') {
        if let Some((key, value)) = pair.split_once('=') {
            feats.insert(key, value);
        }
    }

    feats
}

/// Write a sentence as a CoNLL-U block, including the trailing blank line
pub fn write_sentence(sentence: &Sentence) -> String {
    let mut out = String::new();

    for comment in &sentence.comments {
        match comment {
            Comment::Text => write_text(&mut out, sentence),
            Comment::Constituency => write_constituency(&mut out, sentence),
            Comment::Pair(key, value) => {
                let _ = writeln!(out, "# {} = {}", key, value);
            }
            Comment::Line(line) => {
                let _ = writeln!(out, "#{}", line);
            }
        }
    }
    // Layers set after reading (or on a fresh sentence) go after the rest
    if !sentence.comments.contains(&Comment::Text) {
        write_text(&mut out, sentence);
    }
    if !sentence.comments.contains(&Comment::Constituency) {
        write_constituency(&mut out, sentence);
    }

    for word in &sentence.words {
        for token in sentence.tokens.iter().filter(|t| t.start == word.id) {
            let _ = writeln!(
                out,
                "{}-{}\t{}\t_\t_\t_\t_\t_\t_\t_\t{}",
                token.start,
                token.end,
                token.text,
                write_features(&token.misc)
            );
        }

        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t{}",
            word.id,
            word.text,
            word.lemma.as_deref().unwrap_or("_"),
            word.upos.as_deref().unwrap_or("_"),
            word.xpos.as_deref().unwrap_or("_"),
            write_features(&word.feats),
            word.head.map_or_else(|| "_".to_string(), |h| h.to_string()),
            word.deprel.as_deref().unwrap_or("_"),
            write_features(&word.misc),
        );
    }

    out.push('\n');
    out
}

fn write_text(out: &mut String, sentence: &Sentence) {
    if let Some(text) = &sentence.text {
        let _ = writeln!(out, "# text = {}", text);
    }
}

fn write_constituency(out: &mut String, sentence: &Sentence) {
    if let Some(tree) = &sentence.constituency {
        let _ = writeln!(out, "# constituency = {}", tree);
    }
}

/// Write a sequence of sentences as a CoNLL-U document
pub fn write_document<'a>(sentences: impl IntoIterator<Item = &'a Sentence>) -> String {
    sentences.into_iter().map(write_sentence).collect()
}

fn write_features(feats: &Features) -> String {
    if feats.is_empty() {
        return "_".to_string();
    }
    feats
        .sorted()
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("|")
}
