//! Path scoping: decides whether heading checks apply to a document path.
//!
//! Matching is plain string work on forward-slash paths. It is case sensitive
//! and does no platform canonicalization.

/// Path separator used by document paths and roots.
pub const SEPARATOR: char = '/';

/// Trim surrounding whitespace and separators from a root.
///
/// Idempotent: normalizing a normalized root returns it unchanged.
#[must_use]
pub fn normalize_root(root: &str) -> &str {
    root.trim_matches(|c: char| c.is_whitespace() || c == SEPARATOR)
}

/// Strip leading separators from a document path. Trailing separators stay.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches(SEPARATOR)
}

/// Whether `path` is the root itself or lies inside it.
///
/// A root that normalizes to empty never matches. Matching is on whole
/// segments: `Questions` covers `Questions/Foo.md` but not
/// `QuestionsArchive/Foo.md`.
#[must_use]
pub fn matches_root(path: &str, root: &str) -> bool {
    let root = normalize_root(root);
    if root.is_empty() {
        return false;
    }

    let path = normalize_path(path);
    match path.strip_prefix(root) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Decide whether heading checks are enabled for `path`.
///
/// An empty include list admits every path; otherwise the path must match one
/// include root. A matching exclude root then rejects the path, so exclusion
/// always wins over inclusion.
#[must_use]
pub fn is_enabled<S: AsRef<str>>(path: &str, include_roots: &[S], exclude_roots: &[S]) -> bool {
    let path = normalize_path(path);

    if !include_roots.is_empty()
        && !include_roots
            .iter()
            .any(|root| matches_root(path, root.as_ref()))
    {
        return false;
    }

    !exclude_roots
        .iter()
        .any(|root| matches_root(path, root.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn normalize_root_strips_whitespace_and_separators() {
        assert_eq!(normalize_root("  /Questions/ "), "Questions");
        assert_eq!(normalize_root("Questions/Archive//"), "Questions/Archive");
        assert_eq!(normalize_root(" / "), "");
    }

    #[test]
    fn normalize_root_is_idempotent() {
        for raw in ["", " ", "/", "Questions/", " / Study / ", "a/b/c", "//x//", "\t/ y\n"] {
            let once = normalize_root(raw);
            assert_eq!(normalize_root(once), once, "input {raw:?}");
        }
    }

    #[test]
    fn normalize_path_keeps_trailing_separator() {
        assert_eq!(normalize_path("//Notes/Today.md"), "Notes/Today.md");
        assert_eq!(normalize_path("Notes/"), "Notes/");
    }

    #[test]
    fn root_match_is_prefix_on_segment() {
        assert!(matches_root("Questions/Foo.md", "Questions"));
        assert!(!matches_root("QuestionsArchive/Foo.md", "Questions"));
    }

    #[test]
    fn root_matches_exact_path() {
        assert!(matches_root("Study/Bio.md", "Study/Bio.md"));
        assert!(matches_root("/Study/Bio.md", "/Study/Bio.md/"));
        assert!(!matches_root("Study/Bio.md.bak", "Study/Bio.md"));
    }

    #[test]
    fn empty_root_never_matches() {
        assert!(!matches_root("Notes/Today.md", ""));
        assert!(!matches_root("Notes/Today.md", " // "));
        assert!(!matches_root("", ""));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!matches_root("questions/Foo.md", "Questions"));
    }

    #[test]
    fn include_folder_enables_nested_path() {
        assert!(is_enabled("Questions/Math/Q1.md", &["Questions/"], &NONE));
    }

    #[test]
    fn narrower_exclude_disables_included_path() {
        assert!(!is_enabled(
            "Questions/Archive/Q2.md",
            &["Questions/"],
            &["Questions/Archive"],
        ));
    }

    #[test]
    fn exclude_only_leaves_other_paths_enabled() {
        assert!(is_enabled("Notes/Today.md", &NONE, &["Archive/"]));
        assert!(!is_enabled("Archive/Old.md", &NONE, &["Archive/"]));
    }

    #[test]
    fn path_outside_include_roots_is_disabled() {
        assert!(!is_enabled("Notes/Today.md", &["Questions/", "Study"], &NONE));
        assert!(is_enabled("Study/Bio.md", &["Questions/", "Study"], &NONE));
    }

    #[test]
    fn empty_rules_enable_every_path() {
        for path in ["", "/", "A.md", "/Deep/Nested/Path.md", "trailing/"] {
            assert!(is_enabled(path, &NONE, &NONE), "path {path:?}");
        }
    }

    #[test]
    fn exclude_dominates_include() {
        let cases = [
            ("Questions/Q1.md", "Questions", "Questions/Q1.md"),
            ("Study/Bio/Cells.md", "Study", "Study/Bio"),
            ("A.md", "A.md", "A.md"),
        ];
        for (path, include, exclude) in cases {
            assert!(matches_root(path, include));
            assert!(matches_root(path, exclude));
            assert!(!is_enabled(path, &[include], &[exclude]), "path {path:?}");
        }
    }

    #[test]
    fn blank_include_roots_reject_everything() {
        // Include list is non-empty, but no entry can ever match.
        assert!(!is_enabled("Notes/Today.md", &["  ", "/"], &NONE));
    }

    #[test]
    fn leading_separators_on_path_are_ignored() {
        assert!(is_enabled("/Questions/Math/Q1.md", &["Questions"], &NONE));
        assert!(!is_enabled("///Archive/x.md", &NONE, &["Archive"]));
    }
}
