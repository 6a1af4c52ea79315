//! @ai:module:intent Discover and parse every file reachable from the diff through rule targets
//! @ai:module:layer application
//! @ai:module:public_api SourceReader, FsReader, MemoryReader, RuleMap, resolve, parse_file
//! @ai:module:depends_on lexer, rules, template, error
//! @ai:module:thread_safe true

use crate::error::{Error, Result};
use crate::lexer::lex;
use crate::rules::{normalize_path, parse_rules, Range, Rule};
use crate::template::TemplateTable;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::PathBuf;

/// Parsed rules keyed by normalized file path.
pub type RuleMap = BTreeMap<String, Vec<Rule>>;

/// @ai:intent Source of file contents addressed by diff-relative paths
pub trait SourceReader: Send + Sync {
    /// @ai:intent Read the full text of a file
    /// @ai:effects fs:read
    fn read(&self, path: &str) -> Result<String>;
}

/// @ai:intent Reads files from disk relative to a root directory
#[derive(Debug, Clone)]
pub struct FsReader {
    root: PathBuf,
}

impl FsReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceReader for FsReader {
    fn read(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full).map_err(|e| Error::FileRead {
            path: full,
            source: e,
        })
    }
}

/// @ai:intent In-memory file set, for linting content that is not on disk
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: BTreeMap<String, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files
            .insert(normalize_path(path), contents.to_string());
        self
    }
}

impl SourceReader for MemoryReader {
    fn read(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileRead {
                path: PathBuf::from(path),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            })
    }
}

/// @ai:intent Read, lex and parse one file
/// @ai:pre path is normalized; hunks are the diff ranges for this file (maybe empty)
/// @ai:post rules are in source order with `present` set from the hunks
/// @ai:effects fs:read
pub fn parse_file(
    path: &str,
    hunks: &[Range],
    table: &TemplateTable,
    reader: &dyn SourceReader,
) -> Result<Vec<Rule>> {
    let templates = table.templates_for(path)?;
    let contents = reader.read(path)?;
    let tokens = lex(path, &contents, &templates)?;
    let rules = parse_rules(path, &tokens, hunks)?;

    tracing::debug!(
        file = path,
        rules = rules.len(),
        present = rules.iter().filter(|r| r.present).count(),
        "parsed rules"
    );

    Ok(rules)
}

/// @ai:intent Build the complete file -> rules map for a diff
/// @ai:pre seeds are the diff files to lint; hunks hold every diff file's ranges
/// @ai:post every seed and every file transitively named by a target is parsed exactly once
/// @ai:invariant only this coordinator touches the visited set; parse waves run in parallel
/// @ai:effects fs:read
pub fn resolve<I>(
    seeds: I,
    hunks: &BTreeMap<String, Vec<Range>>,
    table: &TemplateTable,
    reader: &dyn SourceReader,
) -> Result<RuleMap>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = seeds
        .into_iter()
        .map(|seed| normalize_path(seed.as_ref()))
        .filter(|seed| visited.insert(seed.clone()))
        .collect();

    let mut rule_map = RuleMap::new();
    let mut wave = 0usize;

    while !pending.is_empty() {
        wave += 1;
        tracing::info!(wave, files = pending.len(), "parsing rule files");

        // Collecting into Result stops scheduling new files after the first failure.
        let parsed = pending
            .into_par_iter()
            .map(|file| {
                let ranges = hunks.get(&file).map(Vec::as_slice).unwrap_or_default();
                let rules = parse_file(&file, ranges, table, reader)?;
                Ok((file, rules))
            })
            .collect::<Result<Vec<(String, Vec<Rule>)>>>()?;

        let mut next = Vec::new();
        for (file, rules) in parsed {
            for target in rules.iter().flat_map(|r| &r.targets) {
                if target.file.is_none() {
                    continue;
                }
                let target_file = target.file_key(&file);
                if visited.insert(target_file.clone()) {
                    tracing::debug!(from = %file, file = %target_file, "discovered target file");
                    next.push(target_file);
                }
            }
            rule_map.insert(file, rules);
        }

        pending = next;
    }

    Ok(rule_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Counts reads per path so tests can assert each file is parsed once.
    struct CountingReader {
        inner: MemoryReader,
        reads: Mutex<HashMap<String, usize>>,
    }

    impl CountingReader {
        fn new(inner: MemoryReader) -> Self {
            Self {
                inner,
                reads: Mutex::new(HashMap::new()),
            }
        }

        fn reads(&self, path: &str) -> usize {
            self.reads.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    impl SourceReader for CountingReader {
        fn read(&self, path: &str) -> Result<String> {
            *self
                .reads
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default() += 1;
            self.inner.read(path)
        }
    }

    fn diamond() -> MemoryReader {
        MemoryReader::new()
            .with_file("main.py", "#LINT.IF ./a.py:x ./b.py:y\nv = 1\n#LINT.END\n")
            .with_file("a.py", "#LINT.IF ./lib/c.py\nx = 1\n#LINT.END x\n")
            .with_file("b.py", "#LINT.IF lib/c.py:z\ny = 1\n#LINT.END y\n")
            .with_file("lib/c.py", "#LINT.IF ../main.py\nz = 1\n#LINT.END z\n")
    }

    #[test]
    fn test_transitive_discovery_parses_each_file_once() {
        let reader = CountingReader::new(diamond());
        let mut hunks = BTreeMap::new();
        hunks.insert("main.py".to_string(), vec![Range::new(2, 2)]);

        let map = resolve(["main.py"], &hunks, &TemplateTable::default(), &reader).unwrap();

        let files: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(files, vec!["a.py", "b.py", "lib/c.py", "main.py"]);
        for file in files {
            assert_eq!(reader.reads(file), 1, "{file} read more than once");
        }
        assert!(map["main.py"][0].present);
        assert!(!map["a.py"][0].present);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let reader = diamond();
        let mut hunks = BTreeMap::new();
        hunks.insert("main.py".to_string(), vec![Range::new(1, 3)]);
        hunks.insert("lib/c.py".to_string(), vec![Range::new(2, 2)]);
        let table = TemplateTable::default();

        let first = resolve(["main.py", "lib/c.py"], &hunks, &table, &reader).unwrap();
        let second = resolve(["lib/c.py", "main.py"], &hunks, &table, &reader).unwrap();

        assert_eq!(first, second);
        assert!(first["lib/c.py"][0].present);
    }

    #[test]
    fn test_discovered_file_uses_known_hunks() {
        let reader = diamond();
        let mut hunks = BTreeMap::new();
        hunks.insert("main.py".to_string(), vec![Range::new(2, 2)]);
        hunks.insert("a.py".to_string(), vec![Range::new(2, 2)]);

        // a.py is in the diff but not seeded; it is reached as a target.
        let map = resolve(["main.py"], &hunks, &TemplateTable::default(), &reader).unwrap();
        assert!(map["a.py"][0].present);
    }

    #[test]
    fn test_missing_target_file_is_fatal() {
        let reader = MemoryReader::new().with_file("main.py", "#LINT.IF ./gone.py\n#LINT.END\n");
        let err = resolve(
            ["main.py"],
            &BTreeMap::new(),
            &TemplateTable::default(),
            &reader,
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_syntax_error_in_target_is_fatal() {
        let reader = MemoryReader::new()
            .with_file("main.py", "#LINT.IF ./bad.py\n#LINT.END\n")
            .with_file("bad.py", "#LINT.END\n");
        let err = resolve(
            ["main.py"],
            &BTreeMap::new(),
            &TemplateTable::default(),
            &reader,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_fs_reader() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let mut file = std::fs::File::create(dir.path().join("src/app.go")).unwrap();
        writeln!(file, "package app\n//LINT.IF\nvar x = 1\n//LINT.END x").unwrap();

        let reader = FsReader::new(dir.path());
        let rules = parse_file("src/app.go", &[], &TemplateTable::default(), &reader).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id.as_deref(), Some("x"));
        assert_eq!(rules[0].range, Range::new(2, 4));
    }
}
