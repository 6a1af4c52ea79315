//! @ai:module:intent Fold directive tokens into rules with ranges, ids and targets
//! @ai:module:layer domain
//! @ai:module:public_api Range, Target, Rule, parse_rules, parse_target, normalize_path, resolve_file
//! @ai:module:depends_on lexer, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::lexer::{Directive, Token};
use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Inclusive range of 1-based line numbers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// @ai:intent Inclusive overlap test; touching boundaries intersect
    /// @ai:example ([5,5], [1,5]) -> true
    /// @ai:example ([5,5], [6,10]) -> false
    /// @ai:effects pure
    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// @ai:intent Reference from a rule to another rule, by file and/or identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Target {
    pub file: Option<String>,
    pub id: Option<String>,
}

impl Target {
    /// @ai:intent Normalized path of the file this target points into
    /// @ai:post equals the normalized origin when the target names no file
    /// @ai:effects pure
    pub fn file_key(&self, origin: &str) -> String {
        match &self.file {
            Some(file) => resolve_file(file, origin),
            None => normalize_path(origin),
        }
    }

    /// @ai:intent Canonical identity of the target as seen from `origin`
    /// @ai:example (":bar", "src/main.py") -> "src/main.py:bar"
    /// @ai:example ("../lib/foo.py:bar", "src/main.py") -> "lib/foo.py:bar"
    /// @ai:effects pure
    pub fn key(&self, origin: &str) -> String {
        with_id(self.file_key(origin), self.id.as_deref())
    }
}

/// @ai:intent A guarded line range with optional identifier and targets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub file: String,
    pub range: Range,
    pub targets: Vec<Target>,
    pub id: Option<String>,
    pub present: bool,
}

impl Rule {
    /// @ai:intent Canonical identity of the rule, matched against target keys
    /// @ai:effects pure
    pub fn key(&self) -> String {
        with_id(normalize_path(&self.file), self.id.as_deref())
    }

    /// @ai:intent Target keys in declaration order
    pub fn target_keys(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.key(&self.file)).collect()
    }
}

fn with_id(file: String, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{file}:{id}"),
        None => file,
    }
}

/// @ai:intent Lexically clean a '/'-separated path
/// @ai:example ("./a/../b//c.py") -> "b/c.py"
/// @ai:example ("../x.py") -> "../x.py"
/// @ai:effects pure
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            normal => parts.push(normal),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// @ai:intent Resolve a target file specifier against the referencing file
/// @ai:post relative specifiers ("./", "../") are joined to the origin's directory
/// @ai:effects pure
pub fn resolve_file(spec: &str, origin: &str) -> String {
    if spec.starts_with("./") || spec.starts_with("../") {
        match origin.rsplit_once('/') {
            Some((dir, _)) => normalize_path(&format!("{dir}/{spec}")),
            None => normalize_path(spec),
        }
    } else {
        normalize_path(spec)
    }
}

/// @ai:intent Parse one IF argument of the form [file][:identifier]
/// @ai:example ("./foo.py:bar") -> Target { file: "./foo.py", id: "bar" }
/// @ai:example (":bar") -> Target { file: None, id: "bar" }
/// @ai:effects pure
pub fn parse_target(arg: &str) -> Option<Target> {
    match arg.split_once(':') {
        Some((_, "")) => None,
        Some((file, id)) => Some(Target {
            file: (!file.is_empty()).then(|| file.to_string()),
            id: Some(id.to_string()),
        }),
        None if arg.is_empty() => None,
        None => Some(Target {
            file: Some(arg.to_string()),
            id: None,
        }),
    }
}

enum ParserState {
    Idle,
    Open { start: usize, targets: Vec<Target> },
}

/// @ai:intent Build the rules of one file from its token stream
/// @ai:pre tokens are in line order; hunks are this file's changed ranges
/// @ai:post one rule per IF/END pair, in source order, with `present` computed
/// @ai:effects pure
pub fn parse_rules(file: &str, tokens: &[Token], hunks: &[Range]) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    let mut state = ParserState::Idle;

    for token in tokens {
        //LINT.IF ./lexer.rs:directive
        state = match (state, token.directive) {
            (ParserState::Idle, Directive::If) => ParserState::Open {
                start: token.line,
                targets: parse_targets(file, token)?,
            },
            (ParserState::Open { start, .. }, Directive::If) => {
                return Err(Error::UnexpectedIf {
                    file: file.to_string(),
                    line: token.line,
                    open_line: start,
                });
            }
            (ParserState::Open { start, targets }, Directive::End) => {
                rules.push(close_rule(file, start, targets, token, hunks)?);
                ParserState::Idle
            }
            (ParserState::Idle, Directive::End) => {
                return Err(Error::UnexpectedEnd {
                    file: file.to_string(),
                    line: token.line,
                });
            }
        };
        //LINT.END state_machine
    }

    if let ParserState::Open { start, .. } = state {
        return Err(Error::UnterminatedRule {
            file: file.to_string(),
            line: start,
        });
    }

    Ok(rules)
}

fn parse_targets(file: &str, token: &Token) -> Result<Vec<Target>> {
    token
        .args
        .iter()
        .map(|arg| {
            parse_target(arg).ok_or_else(|| Error::InvalidTarget {
                file: file.to_string(),
                line: token.line,
                target: arg.clone(),
            })
        })
        .collect()
}

fn close_rule(
    file: &str,
    start: usize,
    targets: Vec<Target>,
    token: &Token,
    hunks: &[Range],
) -> Result<Rule> {
    let id = match token.args.as_slice() {
        [] => None,
        [id] => Some(id.clone()),
        _ => {
            return Err(Error::TooManyEndArguments {
                file: file.to_string(),
                line: token.line,
                args: token.args.clone(),
            });
        }
    };

    let range = Range::new(start, token.line);
    let present = hunks.iter().any(|hunk| hunk.intersects(&range));

    Ok(Rule {
        file: file.to_string(),
        range,
        targets,
        id,
        present,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(directive: Directive, args: &[&str], line: usize) -> Token {
        Token {
            directive,
            args: args.iter().map(|a| a.to_string()).collect(),
            line,
        }
    }

    #[test]
    fn test_intersects_touching_boundaries() {
        let hunk = Range::new(5, 5);
        assert!(hunk.intersects(&Range::new(1, 5)));
        assert!(hunk.intersects(&Range::new(5, 10)));
        assert!(!hunk.intersects(&Range::new(1, 4)));
        assert!(!hunk.intersects(&Range::new(6, 10)));
        assert!(Range::new(1, 5).intersects(&hunk));
        assert!(hunk.intersects(&hunk));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/../b//c.py"), "b/c.py");
        assert_eq!(normalize_path("../x.py"), "../x.py");
        assert_eq!(normalize_path("a/../../x.py"), "../x.py");
        assert_eq!(normalize_path("/a/../../x.py"), "/x.py");
        assert_eq!(normalize_path("main.py"), "main.py");
    }

    #[test]
    fn test_resolve_file() {
        assert_eq!(resolve_file("./foo.py", "main.py"), "foo.py");
        assert_eq!(resolve_file("./foo.py", "src/main.py"), "src/foo.py");
        assert_eq!(resolve_file("../lib/foo.py", "src/main.py"), "lib/foo.py");
        assert_eq!(resolve_file("docs/foo.md", "src/main.py"), "docs/foo.md");
    }

    #[test]
    fn test_same_file_key_is_origin() {
        let target = Target::default();
        assert_eq!(target.key("./src/../main.py"), "main.py");

        let named = parse_target(":bar").unwrap();
        assert_eq!(named.key("src/main.py"), "src/main.py:bar");
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target("./foo.py:bar"),
            Some(Target {
                file: Some("./foo.py".to_string()),
                id: Some("bar".to_string()),
            })
        );
        assert_eq!(
            parse_target("foo.py"),
            Some(Target {
                file: Some("foo.py".to_string()),
                id: None,
            })
        );
        assert_eq!(parse_target("foo.py:"), None);
        assert_eq!(parse_target(":"), None);
    }

    #[test]
    fn test_parse_rules_in_source_order() {
        let tokens = vec![
            token(Directive::If, &[], 1),
            token(Directive::End, &["bar"], 3),
            token(Directive::If, &[":bar", "./foo.py:baz"], 5),
            token(Directive::End, &[], 8),
        ];

        let rules = parse_rules("main.py", &tokens, &[Range::new(6, 6)]).unwrap();

        assert_eq!(
            rules,
            vec![
                Rule {
                    file: "main.py".to_string(),
                    range: Range::new(1, 3),
                    targets: vec![],
                    id: Some("bar".to_string()),
                    present: false,
                },
                Rule {
                    file: "main.py".to_string(),
                    range: Range::new(5, 8),
                    targets: vec![
                        Target {
                            file: None,
                            id: Some("bar".to_string()),
                        },
                        Target {
                            file: Some("./foo.py".to_string()),
                            id: Some("baz".to_string()),
                        },
                    ],
                    id: None,
                    present: true,
                },
            ]
        );
        assert_eq!(
            rules[1].target_keys(),
            vec!["main.py:bar".to_string(), "foo.py:baz".to_string()]
        );
    }

    #[test]
    fn test_nested_if() {
        let tokens = vec![token(Directive::If, &[], 1), token(Directive::If, &[], 2)];
        let err = parse_rules("main.py", &tokens, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedIf {
                line: 2,
                open_line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_end() {
        let tokens = vec![token(Directive::End, &[], 4)];
        let err = parse_rules("main.py", &tokens, &[]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEnd { line: 4, .. }));
    }

    #[test]
    fn test_unterminated() {
        let tokens = vec![token(Directive::If, &["a.py"], 9)];
        let err = parse_rules("main.py", &tokens, &[]).unwrap_err();
        assert!(matches!(err, Error::UnterminatedRule { line: 9, .. }));
    }

    #[test]
    fn test_too_many_end_arguments() {
        let tokens = vec![
            token(Directive::If, &[], 1),
            token(Directive::End, &["a", "b"], 2),
        ];
        let err = parse_rules("main.py", &tokens, &[]).unwrap_err();
        assert!(matches!(err, Error::TooManyEndArguments { line: 2, .. }));
    }

    #[test]
    fn test_invalid_target() {
        let tokens = vec![
            token(Directive::If, &["foo.py:"], 1),
            token(Directive::End, &[], 2),
        ];
        let err = parse_rules("main.py", &tokens, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { line: 1, .. }));
    }
}
