//! @ai:module:intent Lint a unified diff against the LINT rules declared in source files
//! @ai:module:layer application
//! @ai:module:public_api lint, lint_with_reader, read_diff, LintOptions, LintResult
//! @ai:module:depends_on diff, filter, resolver, checker, template, error

use crate::checker::{check, UnsatisfiedRule};
use crate::diff::{group_by_file, parse_hunks};
use crate::error::Result;
use crate::filter::PathFilter;
use crate::resolver::{resolve, FsReader, SourceReader};
use crate::template::TemplateTable;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

/// @ai:intent Configuration for one lint run
#[derive(Debug, Clone)]
pub struct LintOptions {
    pub templates: TemplateTable,
    pub filter: PathFilter,
    /// Directory that paths in the diff are relative to.
    pub root: PathBuf,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            templates: TemplateTable::default(),
            filter: PathFilter::all(),
            root: PathBuf::from("."),
        }
    }
}

/// @ai:intent Result of linting one diff
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LintResult {
    pub files_changed: usize,
    pub files_checked: usize,
    pub rules_checked: usize,
    pub unsatisfied: Vec<UnsatisfiedRule>,
}

impl LintResult {
    /// @ai:intent Check if every rule touched by the diff is satisfied
    pub fn passed(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

/// @ai:intent Lint diff text against files on disk under `options.root`
/// @ai:effects fs:read
pub fn lint(diff: &str, options: &LintOptions) -> Result<LintResult> {
    let reader = FsReader::new(&options.root);
    lint_with_reader(diff, options, &reader)
}

/// @ai:intent Lint diff text against files supplied by `reader`
/// @ai:pre diff is unified diff text
/// @ai:post result lists every present rule with unmet targets
/// @ai:effects fs:read
pub fn lint_with_reader(
    diff: &str,
    options: &LintOptions,
    reader: &dyn SourceReader,
) -> Result<LintResult> {
    let hunks = parse_hunks(diff)?;
    let by_file = group_by_file(&hunks);

    let seeds: Vec<&String> = by_file
        .keys()
        .filter(|file| {
            let keep = options.filter.matches(file);
            if !keep {
                tracing::debug!(file = %file, "skipping filtered file");
            }
            keep
        })
        .collect();

    let rule_map = resolve(seeds, &by_file, &options.templates, reader)?;
    let unsatisfied = check(&rule_map);

    let result = LintResult {
        files_changed: by_file.len(),
        files_checked: rule_map.len(),
        rules_checked: rule_map.values().map(Vec::len).sum(),
        unsatisfied,
    };

    tracing::info!(
        hunks = hunks.len(),
        files = result.files_checked,
        rules = result.rules_checked,
        unsatisfied = result.unsatisfied.len(),
        "lint finished"
    );

    Ok(result)
}

/// @ai:intent Read diff bytes from a stream; invalid UTF-8 is replaced, not rejected
/// @ai:effects io:read
pub fn read_diff<R: Read>(mut input: R) -> Result<String> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
