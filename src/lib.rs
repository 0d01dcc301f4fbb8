//! Parsetree: constituency and dependency parse structures
//!
//! Reads the output of NLP parsing pipelines and prints it the way people
//! want to look at it: bracketed phrase-structure trees and aligned
//! dependency listings.

pub mod bracket; // Bracketed tree reader (pest grammar)
pub mod conllu; // CoNLL-U reading and writing
pub mod format; // Aligned dependency listings
pub mod phrases; // Phrase extraction by category
pub mod pipeline; // Processing stages and parser/model-loader interfaces
pub mod sentence; // Words, tokens, dependency edges
pub mod tree; // Constituency trees and bracketed rendering

// Re-exports for convenience
pub use bracket::{BracketError, parse_bracketed, parse_bracketed_forest};
pub use conllu::{CoNLLUReader, ParseError, write_document, write_sentence};
pub use format::{format_dependencies, format_edges};
pub use phrases::{extract_phrases, phrases_of};
pub use pipeline::{
    Document, ModelLoader, PipelineError, Processor, Processors, SentenceParser, TreebankModels,
    TreebankPipeline,
};
pub use sentence::{Comment, DependencyEdge, Features, ROOT, ROOT_TEXT, Sentence, Token, Word};
pub use tree::{ConstituencyNode, render_bracketed};
