//! Pure path helpers for the mirrored tree.
//!
//! Tree paths are plain `/`-separated strings. Every location in the tree is
//! resolved through these functions, never through a disk lookup.

/// The one separator used by every path stored in the tree.
pub const SEPARATOR: char = '/';

/// Convert platform separators to `/`, collapse runs of separators and drop
/// a trailing separator (a root-only path such as `/` or `C:/` keeps it).
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        let ch = if ch == '\\' { SEPARATOR } else { ch };
        if ch == SEPARATOR && out.ends_with(SEPARATOR) {
            continue;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with(SEPARATOR) && !is_root_only(&out) {
        out.pop();
    }
    out
}

/// Final component of `path`, or `""` for a root-only path.
pub fn last_segment(path: &str) -> &str {
    if is_root_only(path) {
        return "";
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Strip `base` from the front of `path`.
///
/// The remainder starts with `/` (or is empty when both are equal). Returns
/// `None` when `path` is not `base` or inside it; the match respects segment
/// boundaries, so `/rootx` is not inside `/root`.
pub fn relative_to<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let base = if is_root_only(base) {
        base.trim_end_matches(SEPARATOR)
    } else {
        base
    };
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with(SEPARATOR) {
        Some(rest)
    } else {
        None
    }
}

/// Everything before the final separator.
///
/// `/a/b` → `/a`, `/a` → `/`, `a` → `""`.
pub fn parent_directory_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) => SEPARATOR.to_string(),
        Some(idx) if is_root_only(&trimmed[..=idx]) => trimmed[..=idx].to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => String::new(),
    }
}

/// Split a relative path on `/`, discarding empty segments (the leading one
/// in particular).
pub fn split_segments(relative: &str) -> Vec<&str> {
    relative
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Join `name` onto `base` with exactly one separator.
pub fn join(base: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);
    if base.is_empty() {
        return name.to_string();
    }
    if base.ends_with(SEPARATOR) {
        format!("{base}{name}")
    } else {
        format!("{base}{SEPARATOR}{name}")
    }
}

/// Whether `path` is `ancestor` itself or lies below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    relative_to(path, ancestor).is_some()
}

/// `/` on its own, or a drive root like `C:/`.
fn is_root_only(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_converts_backslashes() {
        assert_eq!(normalize(r"C:\notes\daily\a.md"), "C:/notes/daily/a.md");
    }

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("/root//a///b/"), "/root/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(r"C:\"), "C:/");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn last_segment_cases() {
        assert_eq!(last_segment("/root/a/b.md"), "b.md");
        assert_eq!(last_segment("/root"), "root");
        assert_eq!(last_segment("plain"), "plain");
        assert_eq!(last_segment("/"), "");
        assert_eq!(last_segment("C:/"), "");
    }

    #[test]
    fn relative_to_strips_base() {
        assert_eq!(relative_to("/root/a/b.md", "/root"), Some("/a/b.md"));
        assert_eq!(relative_to("/root", "/root"), Some(""));
        assert_eq!(relative_to("/a", "/"), Some("/a"));
    }

    #[test]
    fn relative_to_rejects_outside_paths() {
        assert_eq!(relative_to("/other/a.md", "/root"), None);
        assert_eq!(relative_to("/rootx/a.md", "/root"), None);
    }

    #[test]
    fn parent_directory_path_cases() {
        assert_eq!(parent_directory_path("/root/a/b.md"), "/root/a");
        assert_eq!(parent_directory_path("/root"), "/");
        assert_eq!(parent_directory_path("C:/notes"), "C:/");
        assert_eq!(parent_directory_path("a.md"), "");
        assert_eq!(parent_directory_path("/a/b"), "/a");
    }

    #[test]
    fn split_segments_drops_leading_empty() {
        assert_eq!(split_segments("/a/b/c.md"), vec!["a", "b", "c.md"]);
        assert_eq!(split_segments("a/b"), vec!["a", "b"]);
        assert!(split_segments("").is_empty());
        assert!(split_segments("/").is_empty());
    }

    #[test]
    fn join_uses_single_separator() {
        assert_eq!(join("/root", "a.md"), "/root/a.md");
        assert_eq!(join("/", "a.md"), "/a.md");
        assert_eq!(join("/root", "/a.md"), "/root/a.md");
    }

    #[test]
    fn is_within_respects_segment_boundaries() {
        assert!(is_within("/root/a/b", "/root/a"));
        assert!(is_within("/root/a", "/root/a"));
        assert!(!is_within("/root/ab", "/root/a"));
        assert!(!is_within("/root", "/root/a"));
    }

    #[test]
    fn parent_of_relative_rebuilds_ancestor_chain() {
        let root = "/home/me/notes";
        for p in [
            "/home/me/notes/a.md",
            "/home/me/notes/journal/2024/jan.md",
            "/home/me/notes/x/y",
        ] {
            let rel = relative_to(p, root).unwrap();
            let parent_rel = parent_directory_path(rel);
            let rebuilt = if parent_rel == "/" {
                root.to_string()
            } else {
                format!("{root}{parent_rel}")
            };
            assert_eq!(rebuilt, parent_directory_path(p));

            // Walking segments from the root visits every ancestor in order.
            let mut current = root.to_string();
            let segments = split_segments(rel);
            for segment in &segments[..segments.len() - 1] {
                current = join(&current, segment);
                assert!(is_within(p, &current));
            }
            assert_eq!(current, parent_directory_path(p));
        }
    }
}
