//! Phrase extraction from constituency trees
//!
//! Collects the surface strings of every phrase in a tree, grouped by
//! category.

use std::collections::BTreeMap;

use crate::tree::ConstituencyNode;

/// Surface strings of all phrases with at least `min_words` words, by label
///
/// Phrases are the internal nodes of the tree other than the root and the
/// preterminals (POS tags). Categories come back sorted; phrases within a
/// category stay in tree order.
pub fn extract_phrases(tree: &ConstituencyNode, min_words: usize) -> BTreeMap<String, Vec<String>> {
    let mut phrases: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for node in tree.subtrees().skip(1) {
        if node.is_leaf() || node.is_preterminal() {
            continue;
        }
        let words = node.leaves();
        if words.len() >= min_words {
            phrases
                .entry(node.label.clone())
                .or_default()
                .push(words.join(" "));
        }
    }

    phrases
}

/// Phrases of a single category, e.g. all noun phrases
pub fn phrases_of(tree: &ConstituencyNode, label: &str, min_words: usize) -> Vec<String> {
    tree.subtrees()
        .skip(1)
        .filter(|node| node.label == label && !node.is_leaf() && !node.is_preterminal())
        .map(|node| node.leaves())
        .filter(|words| words.len() >= min_words)
        .map(|words| words.join(" "))
        .collect()
}
