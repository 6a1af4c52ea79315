//! @ai:module:intent Include/exclude glob predicate over diff paths
//! @ai:module:layer infrastructure
//! @ai:module:public_api PathFilter
//! @ai:module:depends_on error

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// @ai:intent Decides which changed files are linted
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    /// @ai:intent Compile include and exclude glob lists
    /// @ai:post an empty include list admits every path
    /// @ai:effects pure
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// @ai:intent Accept every path
    pub fn all() -> Self {
        Self::default()
    }

    /// @ai:example ("src/main.py") with include ["src/**"] -> true
    /// @ai:effects pure
    pub fn matches(&self, path: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |set| set.is_match(path));
        let excluded = self.exclude.as_ref().is_some_and(|set| set.is_match(path));
        included && !excluded
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        builder.add(glob);
    }

    builder.build().map(Some).map_err(|e| Error::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(","),
        source: e,
    })
}
