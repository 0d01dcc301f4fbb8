//! Constituency tree data structures
//!
//! A constituency parse brackets a sentence into nested phrase categories
//! (S, NP, VP, ...) down to part-of-speech tagged words. Leaves hold the
//! token text; every other node holds a category label.

use std::fmt;

/// A node in a constituency tree
///
/// A node is a leaf iff it has no children. Leaves carry the literal token
/// text in `label`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstituencyNode {
    pub label: String,
    pub children: Vec<ConstituencyNode>,
}

impl ConstituencyNode {
    /// Create an internal node with the given children
    pub fn new(label: impl Into<String>, children: Vec<ConstituencyNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Create a leaf holding a single word
    pub fn leaf(word: impl Into<String>) -> Self {
        Self {
            label: word.into(),
            children: Vec::new(),
        }
    }

    /// Create a preterminal: a part-of-speech tag over a single word
    pub fn tagged(tag: impl Into<String>, word: impl Into<String>) -> Self {
        Self::new(tag, vec![Self::leaf(word)])
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True for a tag node whose only child is a leaf, e.g. `(DT the)`
    #[inline]
    pub fn is_preterminal(&self) -> bool {
        matches!(self.children.as_slice(), [child] if child.is_leaf())
    }

    /// True when the bracketed rendering reads back as this same tree
    ///
    /// Labels and words must be non-empty and free of whitespace and
    /// parentheses. The one exception is an unlabeled bracket whose children
    /// are all bracketed, as in PTB's `( (S ...))`: over a bare word the
    /// word would read back as the label.
    pub fn is_well_formed(&self) -> bool {
        let label_ok = if self.label.is_empty() {
            !self.is_leaf() && self.children.iter().all(|child| !child.is_leaf())
        } else {
            !self
                .label
                .chars()
                .any(|c| c.is_whitespace() || c == '(' || c == ')')
        };
        label_ok && self.children.iter().all(ConstituencyNode::is_well_formed)
    }

    /// Words of the sentence in order (the yield of the tree)
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_leaf() {
            out.push(&self.label);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// (word, tag) pairs read off the preterminals, in sentence order
    pub fn tagged_words(&self) -> Vec<(&str, &str)> {
        self.subtrees()
            .filter(|node| node.is_preterminal())
            .map(|node| (node.children[0].label.as_str(), node.label.as_str()))
            .collect()
    }

    /// Number of nodes on the longest root-to-leaf path; a leaf has height 1
    pub fn height(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ConstituencyNode::height)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn subtrees(&self) -> Subtrees<'_> {
        Subtrees { stack: vec![self] }
    }

    /// Multi-line rendering, one phrase per line
    ///
    /// Nodes whose children are all words or preterminals stay on one line;
    /// anything deeper puts each child on its own line, indented two spaces
    /// per level.
    ///
    /// ```text
    /// (ROOT
    ///   (S
    ///     (NP (PRP I))
    ///     (VP
    ///       (VBP am)
    ///       (NP (DT the) (NN walrus)))
    ///     (. .)))
    /// ```
    pub fn render_indented(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, 0);
        out
    }

    fn write_indented(&self, out: &mut String, depth: usize) {
        if self.is_flat() {
            out.push_str(&self.to_string());
            return;
        }
        out.push('(');
        out.push_str(&self.label);
        for child in &self.children {
            out.push('\n');
            out.extend(std::iter::repeat_n(' ', (depth + 1) * 2));
            child.write_indented(out, depth + 1);
        }
        out.push(')');
    }

    fn is_flat(&self) -> bool {
        self.children
            .iter()
            .all(|child| child.is_leaf() || child.is_preterminal())
    }
}

/// Bracketed phrase-structure notation: `(LABEL child1 child2 ...)`
impl fmt::Display for ConstituencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return f.write_str(&self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        f.write_str(")")
    }
}

/// Render a tree in one-line bracketed notation
pub fn render_bracketed(tree: &ConstituencyNode) -> String {
    tree.to_string()
}

/// Pre-order traversal, see [`ConstituencyNode::subtrees`]
pub struct Subtrees<'a> {
    stack: Vec<&'a ConstituencyNode>,
}

impl<'a> Iterator for Subtrees<'a> {
    type Item = &'a ConstituencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
