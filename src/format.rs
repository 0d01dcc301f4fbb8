//! Aligned dependency listings
//!
//! Prints one edge per line with the relation and head columns padded to a
//! common width:
//!
//! ```text
//! nsubj 'walrus' →  'I'
//! cop   'walrus' →  'am'
//! root  'ROOT'   →  'walrus'
//! ```

use std::fmt::Write as _;

use crate::sentence::Sentence;

/// Format `(head, relation, dependent)` triples
///
/// The relation and quoted-head fields are each padded to the width of the
/// longest entry in their column plus one space, and two spaces follow the
/// arrow. Widths count characters, not bytes.
pub fn format_edges<'a, I>(edges: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
{
    let rows: Vec<(&str, String, String)> = edges
        .into_iter()
        .map(|(head, relation, dependent)| (relation, quote(head), quote(dependent)))
        .collect();

    let relation_width = rows
        .iter()
        .map(|(relation, _, _)| relation.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    let head_width = rows
        .iter()
        .map(|(_, head, _)| head.chars().count())
        .max()
        .unwrap_or(0)
        + 1;

    let mut out = String::new();
    for (relation, head, dependent) in &rows {
        // Writing to a String can't fail
        let _ = writeln!(
            out,
            "{relation:<relation_width$}{head:<head_width$}→  {dependent}"
        );
    }
    out
}

/// Format the dependency edges of a sentence
///
/// Positions are resolved to word text; the implicit root prints as `ROOT`.
/// A sentence without dependency annotation formats to the empty string.
pub fn format_dependencies(sentence: &Sentence) -> String {
    let edges = sentence.dependencies();
    format_edges(edges.iter().map(|edge| {
        (
            sentence.word_text(edge.head).unwrap_or("_"),
            edge.relation.as_str(),
            sentence.word_text(edge.dependent).unwrap_or("_"),
        )
    }))
}

fn quote(text: &str) -> String {
    format!("'{}'", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::{ROOT, Word};

    fn walrus() -> Sentence {
        Sentence::from_words(vec![
            Word::new(1, "I").with_head(4, "nsubj"),
            Word::new(2, "am").with_head(4, "cop"),
            Word::new(3, "the").with_head(4, "det"),
            Word::new(4, "walrus").with_head(ROOT, "root"),
            Word::new(5, ".").with_head(4, "punct"),
        ])
    }

    #[test]
    fn test_format_sentence() {
        let expected = "\
nsubj 'walrus' →  'I'
cop   'walrus' →  'am'
det   'walrus' →  'the'
root  'ROOT'   →  'walrus'
punct 'walrus' →  '.'
";
        assert_eq!(format_dependencies(&walrus()), expected);
    }

    #[test]
    fn test_column_widths() {
        let edges = [
            ("saw", "nsubj", "she"),
            ("ROOT", "root", "saw"),
            ("saw", "obj", "elephant"),
            ("elephant", "det", "an"),
        ];
        let out = format_edges(edges);

        let relation_width = "nsubj".len() + 1;
        let head_width = "'elephant'".len() + 1;

        for (line, (head, relation, dependent)) in out.lines().zip(edges) {
            let (relation_field, rest) = line.split_at(relation_width);
            let (head_field, tail) = rest.split_at(head_width);

            assert_eq!(relation_field.trim_end(), relation);
            assert_eq!(head_field.trim_end(), format!("'{}'", head));
            assert!(relation_field.ends_with(' '));
            assert!(head_field.ends_with(' '));
            assert_eq!(tail, format!("→  '{}'", dependent));
        }
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_width_counts_chars() {
        let out = format_edges([("café", "nmod", "x"), ("a", "det", "y")]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "nmod 'café' →  'x'");
        assert_eq!(lines[1], "det  'a'    →  'y'");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_edges(std::iter::empty::<(&str, &str, &str)>()), "");
        assert_eq!(format_dependencies(&Sentence::new()), "");

        // Words without heads: nothing to print
        let unparsed = Sentence::from_words(vec![Word::new(1, "walrus")]);
        assert_eq!(format_dependencies(&unparsed), "");
    }
}
