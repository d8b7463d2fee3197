//! Path segmentation shared by endpoint definitions and incoming requests.
//!
//! [`segment`] splits a slash-delimited path into its components. A
//! leading or trailing empty component (from `/a/` style paths) is
//! dropped, while empty components in the middle (`a//b`) are kept.
//! The result is never empty: the root path is `[""]`.

/// Split `path` into segments.
///
/// `None`, `""`, whitespace and `"/"` all yield `[""]`.
#[must_use]
pub fn segment(path: Option<&str>) -> Vec<String> {
    let Some(path) = path else {
        return root();
    };

    let parts: Vec<&str> = path.trim().split('/').collect();

    let skip = usize::from(parts.first().is_some_and(|p| p.trim().is_empty()));
    let skip_end = usize::from(parts.len() > 1 && parts.last().is_some_and(|p| p.trim().is_empty()));
    let take = parts.len().saturating_sub(skip + skip_end);

    let segments: Vec<String> = parts
        .into_iter()
        .skip(skip)
        .take(take)
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        root()
    } else {
        segments
    }
}

/// Case-insensitive segment comparison.
#[must_use]
pub fn segment_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn root() -> Vec<String> {
    vec![String::new()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(path: &str) -> Vec<String> {
        segment(Some(path))
    }

    #[test]
    fn empty_variants_collapse_to_root() {
        assert_eq!(segment(None), vec![""]);
        for path in ["", "   ", "/", "  /  ", "//"] {
            assert_eq!(seg(path), vec![""], "path {path:?}");
        }
    }

    #[test]
    fn leading_and_trailing_slashes_are_dropped() {
        assert_eq!(seg("/a/"), vec!["a"]);
        assert_eq!(seg("a/b"), vec!["a", "b"]);
        assert_eq!(seg("/a/b"), vec!["a", "b"]);
        assert_eq!(seg("a/b/"), vec!["a", "b"]);
        assert_eq!(seg("  /a/b/  "), vec!["a", "b"]);
    }

    #[test]
    fn internal_empty_segments_are_kept() {
        assert_eq!(seg("/test//path"), vec!["test", "", "path"]);
        assert_eq!(seg("////"), vec!["", "", ""]);
    }

    #[test]
    fn resegmenting_the_joined_form_is_stable() {
        for path in ["/a/b/", "x//y", "/", "////", "single", "/deep/er/path"] {
            let first = seg(path);
            let again = seg(&format!("/{}/", first.join("/")));
            assert_eq!(first, again, "path {path:?}");
        }
    }

    #[test]
    fn comparison_ignores_case() {
        assert!(segment_eq("Test", "tEST"));
        assert!(segment_eq("", ""));
        assert!(!segment_eq("test", "tests"));
    }
}
