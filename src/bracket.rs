//! Bracketed tree reader
//!
//! Parses phrase-structure notation back into [`ConstituencyNode`]s using a
//! pest grammar. Reading the output of [`render_bracketed`] gives back an
//! equal tree whenever the tree [`is_well_formed`], and every tree read
//! here is well formed.
//!
//! [`render_bracketed`]: crate::tree::render_bracketed
//! [`is_well_formed`]: crate::tree::ConstituencyNode::is_well_formed

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;

use crate::tree::ConstituencyNode;

#[derive(Parser)]
#[grammar = "bracket.pest"]
struct BracketParser;

/// Error type for bracket parsing failures
#[derive(Debug, Error)]
pub enum BracketError {
    #[error("Bracket error: {0}")]
    Syntax(#[from] pest::error::Error<Rule>),

    #[error("Bracket error: no tree found")]
    Empty,
}

/// Parse exactly one tree
pub fn parse_bracketed(input: &str) -> Result<ConstituencyNode, BracketError> {
    let mut pairs = BracketParser::parse(Rule::tree, input)?;

    let Some(tree_pair) = pairs.next() else {
        return Err(BracketError::Empty);
    };
    let Some(root) = tree_pair.into_inner().next() else {
        return Err(BracketError::Empty);
    };

    Ok(build_node(root))
}

/// Parse any number of whitespace-separated trees, e.g. a treebank file
pub fn parse_bracketed_forest(input: &str) -> Result<Vec<ConstituencyNode>, BracketError> {
    let mut pairs = BracketParser::parse(Rule::forest, input)?;

    let Some(forest_pair) = pairs.next() else {
        return Ok(Vec::new());
    };

    Ok(forest_pair
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(build_node)
        .collect())
}

/// Build a node from a `leaf` or `internal` pair
fn build_node(pair: Pair<Rule>) -> ConstituencyNode {
    if pair.as_rule() == Rule::leaf {
        return ConstituencyNode::leaf(pair.as_str());
    }

    let mut inner = pair.into_inner().peekable();
    let label = inner
        .next_if(|p| p.as_rule() == Rule::symbol)
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let children = inner.map(build_node).collect();

    ConstituencyNode::new(label, children)
}
