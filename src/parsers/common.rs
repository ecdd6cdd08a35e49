use anyhow::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::core::{LineSpan, ParseFailure};

/// Parses `source` with `language`, rejecting trees that contain errors.
pub fn parse_source(language: Language, source: &str) -> Result<Tree, ParseFailure> {
    let tree = parse_tree(language, source)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error(root));
    }
    Ok(tree)
}

/// Like [`parse_source`], but keeps trees whose error nodes cover at most
/// half of the source. Declarations outside the damaged regions are still
/// extracted.
pub fn parse_source_tolerant(language: Language, source: &str) -> Result<Tree, ParseFailure> {
    let tree = parse_tree(language, source)?;
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(tree);
    }
    if root.is_error() || error_bytes(root) * 2 > source.len() {
        return Err(syntax_error(root));
    }
    debug!(
        line = first_error_line(root).unwrap_or(1),
        "keeping tree with localized syntax errors"
    );
    Ok(tree)
}

fn parse_tree(language: Language, source: &str) -> Result<Tree, ParseFailure> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|err| ParseFailure::new(format!("grammar unavailable: {err}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseFailure::new("parser produced no tree"))
}

fn syntax_error(root: TSNode) -> ParseFailure {
    let line = first_error_line(root).unwrap_or(root.start_position().row + 1);
    ParseFailure::new(format!("syntax error near line {line}"))
}

/// Bytes covered by outermost `ERROR` nodes.
fn error_bytes(node: TSNode) -> usize {
    if node.is_error() {
        return node.end_byte() - node.start_byte();
    }
    let mut cursor = node.walk();
    let total: usize = node
        .children(&mut cursor)
        .filter(|child| child.has_error())
        .map(error_bytes)
        .sum();
    total
}

/// Reads a source file with buffering sized to the file.
pub fn read_source(file_path: &Path) -> Result<String> {
    let file = File::open(file_path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader =
        BufReader::with_capacity(if file_size < 8192 { file_size.max(1) } else { 8192 }, file);

    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

fn first_error_line(node: TSNode) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn field_text<'a>(node: &TSNode, field: &str, source: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field)
        .map(|child| extract_text(&child, source))
}

pub fn line_span(node: &TSNode) -> LineSpan {
    LineSpan {
        start: node.start_position().row + 1,
        end: node.end_position().row + 1,
    }
}

pub fn find_child_by_kind<'t>(node: &TSNode<'t>, kind: &str) -> Option<TSNode<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn named_children<'t>(node: &TSNode<'t>) -> Vec<TSNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Descendants whose kind is in `kinds`, in document order. Matching
/// nodes are not searched further.
pub fn collect_descendants_by_kind<'t>(node: &TSNode<'t>, kinds: &[&str]) -> Vec<TSNode<'t>> {
    let mut results = Vec::new();
    let mut stack = vec![*node];

    while let Some(current) = stack.pop() {
        let mut cursor = current.walk();
        let children: Vec<TSNode<'t>> = current.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            if kinds.contains(&child.kind()) {
                results.push(child);
            } else {
                stack.push(child);
            }
        }
    }

    results.sort_by_key(|n| n.start_byte());
    results
}

/// Every descendant of `kind`, including ones nested inside other matches.
pub fn descendants_of_kind<'t>(node: &TSNode<'t>, kind: &str) -> Vec<TSNode<'t>> {
    let mut results = Vec::new();
    let mut cursor = node.walk();
    let mut descending = true;
    loop {
        if descending {
            if cursor.node().kind() == kind {
                results.push(cursor.node());
            }
            if cursor.goto_first_child() {
                continue;
            }
        }
        if cursor.goto_next_sibling() {
            descending = true;
            continue;
        }
        if !cursor.goto_parent() || cursor.node().id() == node.id() {
            break;
        }
        descending = false;
    }
    results
}

/// First named child that is not a comment.
pub fn first_statement<'t>(node: &TSNode<'t>) -> Option<TSNode<'t>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() != "comment")
}

/// Removes surrounding quotes (and Python string prefixes) from a string literal.
pub fn unquote(literal: &str) -> &str {
    let trimmed = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if trimmed.len() >= 2 * quote.len()
            && trimmed.starts_with(quote)
            && trimmed.ends_with(quote)
        {
            return &trimmed[quote.len()..trimmed.len() - quote.len()];
        }
    }
    trimmed
}

/// Collapses whitespace runs so multi-line annotations read on one line.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `@app.route("/x", methods=[...])` -> `app.route`.
pub fn decorator_name(text: &str) -> String {
    let text = text.trim().trim_start_matches('@');
    let end = text.find('(').unwrap_or(text.len());
    squash_whitespace(&text[..end])
}
