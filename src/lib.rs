//! @ai:module:intent difflint library: check that a diff honors the LINT rules in its files
//! @ai:module:layer infrastructure
//! @ai:module:public_api checker, config, diff, error, filter, lexer, linter, output, resolver, rules, template
//! @ai:module:stateless true
//!
//! # difflint
//!
//! Source files declare change-propagation rules in comments:
//!
//! ```text
//! #LINT.IF ./schema.sql:users
//! USER_FIELDS = ["id", "name"]
//! #LINT.END
//! ```
//!
//! If a diff touches the guarded block, the block named `users` in
//! `schema.sql` must be touched by the same diff.
//!
//! ## Example
//!
//! ```rust,no_run
//! use difflint::{linter, output, LintOptions};
//!
//! let diff = std::fs::read_to_string("changes.diff").unwrap();
//! let result = linter::lint(&diff, &LintOptions::default()).unwrap();
//! println!("{}", output::format_lint_result(&result, output::OutputFormat::Text));
//! ```

pub mod checker;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod linter;
pub mod output;
pub mod resolver;
pub mod rules;
pub mod template;

pub use checker::{check, UnsatisfiedRule};
pub use config::{load_overrides, ExtensionOverrides};
pub use diff::{group_by_file, parse_hunks, Hunk};
pub use error::{Error, ErrorCategory, Result};
pub use filter::PathFilter;
pub use lexer::{lex, Directive, Token};
pub use linter::{lint, lint_with_reader, LintOptions, LintResult};
pub use output::{format_lint_result, to_json, OutputFormat};
pub use resolver::{resolve, FsReader, MemoryReader, RuleMap, SourceReader};
pub use rules::{parse_rules, Range, Rule, Target};
pub use template::{Template, TemplateTable};
