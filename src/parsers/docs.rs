//! Line-window documentation association.
//!
//! A declaration owns the comment block that ends on the line directly
//! above it. Scanning walks upward from that line: a run of line comments
//! is collected until the first non-comment line, a block comment is
//! collected back to its opening marker, through continuation lines only.
//! A blank line directly above the declaration means there is no
//! documentation, and so does a block comment trailing code.

#[derive(Debug, Clone, Copy)]
pub struct CommentStyle {
    pub line_marker: &'static str,
    pub block: Option<(&'static str, &'static str)>,
}

pub const HASH_COMMENTS: CommentStyle = CommentStyle {
    line_marker: "#",
    block: None,
};

pub const C_COMMENTS: CommentStyle = CommentStyle {
    line_marker: "//",
    block: Some(("/*", "*/")),
};

/// Documentation block immediately preceding the 0-based `decl_row`.
pub fn preceding_doc(lines: &[&str], decl_row: usize, style: CommentStyle) -> Option<String> {
    if decl_row == 0 || decl_row > lines.len() {
        return None;
    }
    let above = lines[decl_row - 1].trim();
    if above.is_empty() {
        return None;
    }

    if let Some((open, close)) = style.block {
        if above.ends_with(close) {
            return block_comment(lines, decl_row - 1, open, close);
        }
    }

    if !is_line_comment(above, style) {
        return None;
    }

    let mut collected = Vec::new();
    let mut row = decl_row;
    while row > 0 {
        let line = lines[row - 1].trim();
        if !is_line_comment(line, style) {
            break;
        }
        collected.push(line.trim_start_matches(style.line_marker).trim());
        row -= 1;
    }
    collected.reverse();
    non_empty(collected.join("\n"))
}

fn is_line_comment(line: &str, style: CommentStyle) -> bool {
    line.starts_with(style.line_marker)
}

fn block_comment(lines: &[&str], end_row: usize, open: &str, close: &str) -> Option<String> {
    let last = lines[end_row].trim();
    let mut row = end_row;
    if !last.starts_with(open) {
        if last.contains(open) {
            return None;
        }
        loop {
            if row == 0 {
                return None;
            }
            row -= 1;
            let line = lines[row].trim();
            if line.starts_with(open) {
                if line.contains(close) {
                    return None;
                }
                break;
            }
            if !line.starts_with('*') || line.contains(close) {
                return None;
            }
        }
    }

    let body: Vec<String> = lines[row..=end_row]
        .iter()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_suffix(close).unwrap_or(line);
            let line = line.strip_prefix(open).unwrap_or(line);
            line.trim_start_matches('*').trim().to_string()
        })
        .collect();
    non_empty(body.join("\n"))
}

/// Dedents a Python docstring body and trims surrounding blank lines.
pub fn clean_docstring(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                line.trim()
            } else {
                line.get(indent..).map_or_else(|| line.trim(), str::trim_end)
            }
        })
        .collect();
    non_empty(cleaned.join("\n"))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
