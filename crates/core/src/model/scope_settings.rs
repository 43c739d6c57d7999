use crate::scope;

/// Include/exclude roots deciding where heading checks apply.
///
/// Roots are stored trimmed but otherwise as entered; separator normalization
/// happens when a root is matched. A root that is blank stays in its list and
/// simply never matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSettings {
    include_roots: Vec<String>,
    exclude_roots: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ScopeSettingsDraft {
    pub include_roots: Vec<String>,
    pub exclude_roots: Vec<String>,
}

impl ScopeSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize the draft into settings.
    ///
    /// Entries are trimmed. Entries left empty are kept, so a non-empty list
    /// stays non-empty. Order is kept.
    #[must_use]
    pub fn validate(self) -> ScopeSettings {
        ScopeSettings {
            include_roots: normalize_roots(self.include_roots),
            exclude_roots: normalize_roots(self.exclude_roots),
        }
    }
}

impl ScopeSettings {
    #[must_use]
    pub fn new<I, E, S, T>(include_roots: I, exclude_roots: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        ScopeSettingsDraft {
            include_roots: include_roots.into_iter().map(Into::into).collect(),
            exclude_roots: exclude_roots.into_iter().map(Into::into).collect(),
        }
        .validate()
    }

    /// Build settings from newline separated text, one root per line.
    ///
    /// Blank lines are skipped, as in a one-root-per-line text field.
    #[must_use]
    pub fn from_lines(include_text: &str, exclude_text: &str) -> Self {
        Self::new(non_blank_lines(include_text), non_blank_lines(exclude_text))
    }

    #[must_use]
    pub fn include_roots(&self) -> &[String] {
        &self.include_roots
    }

    #[must_use]
    pub fn exclude_roots(&self) -> &[String] {
        &self.exclude_roots
    }

    /// Whether heading checks apply to `path` under these settings.
    #[must_use]
    pub fn is_path_enabled(&self, path: &str) -> bool {
        scope::is_enabled(path, &self.include_roots, &self.exclude_roots)
    }
}

fn normalize_roots(roots: Vec<String>) -> Vec<String> {
    roots
        .into_iter()
        .map(|root| root.trim().to_string())
        .collect()
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}
