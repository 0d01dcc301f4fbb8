//! Sentence-level parse results
//!
//! A [`Sentence`] holds the words produced by a tagging/parsing pipeline
//! along with whatever annotation layers were computed: part-of-speech tags,
//! lemmas, dependency heads, and an optional constituency tree. A layer that
//! was never computed is simply empty.

use rustc_hash::FxHashMap;

use crate::tree::ConstituencyNode;

/// Head position of a word attached to the implicit root
pub const ROOT: usize = 0;

/// Text used when the implicit root has to be displayed
pub const ROOT_TEXT: &str = "ROOT";

/// Morphological features or MISC attributes (key=value pairs)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(FxHashMap<String, String>);

impl Features {
    pub fn new() -> Self {
        Self(FxHashMap::default())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs sorted by key, the order CoNLL-U expects
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// A syntactic word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// 1-based position in the sentence
    pub id: usize,
    pub text: String,
    pub lemma: Option<String>,
    pub upos: Option<String>,
    pub xpos: Option<String>,
    pub feats: Features,
    /// Head position; `Some(ROOT)` for the sentence root, `None` when unparsed
    pub head: Option<usize>,
    pub deprel: Option<String>,
    pub misc: Features,
}

impl Word {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            lemma: None,
            upos: None,
            xpos: None,
            feats: Features::new(),
            head: None,
            deprel: None,
            misc: Features::new(),
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn with_pos(mut self, upos: impl Into<String>, xpos: impl Into<String>) -> Self {
        self.upos = Some(upos.into());
        self.xpos = Some(xpos.into());
        self
    }

    pub fn with_head(mut self, head: usize, deprel: impl Into<String>) -> Self {
        self.head = Some(head);
        self.deprel = Some(deprel.into());
        self
    }
}

/// A multiword token spanning words `start..=end`, e.g. French "du" = "de le"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub misc: Features,
}

/// A labeled head → dependent link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    /// Head position, [`ROOT`] for the implicit root
    pub head: usize,
    pub relation: String,
    pub dependent: usize,
}

impl DependencyEdge {
    pub fn new(head: usize, relation: impl Into<String>, dependent: usize) -> Self {
        Self {
            head,
            relation: relation.into(),
            dependent,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.head == ROOT
    }
}

/// A comment line above a sentence
///
/// `text` and `constituency` comments only mark their position; their values
/// live in [`Sentence::text`] and [`Sentence::constituency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    Text,
    Constituency,
    /// `# key = value`, e.g. `sent_id`
    Pair(String, String),
    /// Anything else after the `#`, kept verbatim (e.g. ` newdoc`)
    Line(String),
}

/// One parsed sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub text: Option<String>,
    /// Comment lines in file order
    pub comments: Vec<Comment>,
    pub words: Vec<Word>,
    pub tokens: Vec<Token>,
    pub constituency: Option<ConstituencyNode>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sentence from words numbered consecutively from 1
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a `# key = value` comment (e.g. `sent_id`)
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.comments.iter().find_map(|comment| match comment {
            Comment::Pair(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    /// Word at a 1-based position
    pub fn word(&self, position: usize) -> Option<&Word> {
        position
            .checked_sub(1)
            .and_then(|idx| self.words.get(idx))
            .filter(|word| word.id == position)
            .or_else(|| self.words.iter().find(|word| word.id == position))
    }

    /// Text at a position; the implicit root resolves to [`ROOT_TEXT`]
    pub fn word_text(&self, position: usize) -> Option<&str> {
        if position == ROOT {
            Some(ROOT_TEXT)
        } else {
            self.word(position).map(|word| word.text.as_str())
        }
    }

    /// The word attached to the implicit root
    pub fn root_word(&self) -> Option<&Word> {
        self.words.iter().find(|word| word.head == Some(ROOT))
    }

    /// Dependency edges in dependent order
    ///
    /// Empty when the sentence carries no dependency annotation.
    pub fn dependencies(&self) -> Vec<DependencyEdge> {
        self.words
            .iter()
            .filter_map(|word| {
                Some(DependencyEdge {
                    head: word.head?,
                    relation: word.deprel.clone()?,
                    dependent: word.id,
                })
            })
            .collect()
    }

    /// Dependents of the word at `position`, in sentence order
    pub fn dependents(&self, position: usize) -> Vec<&Word> {
        self.words
            .iter()
            .filter(|word| word.head == Some(position))
            .collect()
    }

    /// The sentence text, rebuilt from tokens and `SpaceAfter` when no
    /// `text` comment was given
    pub fn surface_text(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }

        let mut out = String::new();
        let mut words = self.words.iter().peekable();
        while let Some(word) = words.next() {
            let (form, misc) = match self.tokens.iter().find(|t| t.start == word.id) {
                Some(token) => {
                    while words.next_if(|w| w.id <= token.end).is_some() {}
                    (token.text.as_str(), &token.misc)
                }
                None => (word.text.as_str(), &word.misc),
            };
            out.push_str(form);
            if misc.get("SpaceAfter") != Some("No") && words.peek().is_some() {
                out.push(' ');
            }
        }
        out
    }
}
