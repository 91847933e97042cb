//! Suffix-based path filter.
//!
//! Matching is a literal suffix comparison against the whole relative path,
//! not the basename: excluding `file1.txt` also excludes `sub/file1.txt` and
//! `otherfile1.txt`.

/// Include/exclude suffix lists, fixed for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FilterSpec {
    /// Build a filter, dropping empty suffixes.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// `true` when the filter keeps every path.
    pub fn is_pass_through(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn keeps(&self, path: &str) -> bool {
        should_keep(path, self)
    }
}

fn normalize<T>(items: T) -> Vec<String>
where
    T: IntoIterator,
    T::Item: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Inclusion first (empty include keeps everything), then exclusion.
pub fn should_keep(path: &str, spec: &FilterSpec) -> bool {
    let included =
        spec.include.is_empty() || spec.include.iter().any(|s| path.ends_with(s.as_str()));

    included && !spec.exclude.iter().any(|s| path.ends_with(s.as_str()))
}
