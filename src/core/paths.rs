//! String helpers for repository-relative, `/`-separated paths.

/// Directory part of `path`; `""` for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// File name with the last extension removed (`a/b.test.ts` -> `b.test`).
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// `path` with the last extension removed, directory kept.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.len() - file_name(path).len();
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(idx) => &path[..name_start + idx],
    }
}

/// Joins and normalizes `.`/`..` segments. Segments that would climb
/// above the repository root are dropped.
pub fn join(base: &str, rest: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
