//! @ai:module:intent Format lint results for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_lint_result, to_json
//! @ai:module:depends_on linter, checker
//! @ai:module:stateless true

use crate::checker::UnsatisfiedRule;
use crate::linter::LintResult;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format lint results as a string
/// @ai:effects pure
pub fn format_lint_result(result: &LintResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(result, false),
        OutputFormat::JsonPretty => to_json(result, true),
        OutputFormat::Text => format_lint_result_text(result),
    }
}

/// @ai:intent Format lint results as human-readable text
/// @ai:effects pure
fn format_lint_result_text(result: &LintResult) -> String {
    let mut output = String::new();

    for unsatisfied in &result.unsatisfied {
        output.push_str(&format_unsatisfied(unsatisfied));
    }

    if !result.unsatisfied.is_empty() {
        output.push('\n');
    }

    output.push_str(&format!(
        "Checked {} rules in {} files ({} changed)\n",
        result.rules_checked, result.files_checked, result.files_changed
    ));

    if result.passed() {
        output.push_str(&format!("{} All rules satisfied\n", "OK".green().bold()));
    } else {
        output.push_str(&format!(
            "{} unsatisfied rules\n",
            result.unsatisfied.len().to_string().red().bold()
        ));
    }

    output
}

fn format_unsatisfied(unsatisfied: &UnsatisfiedRule) -> String {
    let rule = &unsatisfied.rule;
    let location = format!("{}:{}", rule.file, rule.range);
    let name = rule
        .id
        .as_deref()
        .map(|id| format!(" ({})", id.cyan()))
        .unwrap_or_default();

    let mut output = format!(
        "{} {}{} - changed block requires changes in:\n",
        "ERROR".red().bold(),
        location.dimmed(),
        name
    );

    for key in unsatisfied.unmet_target_keys() {
        output.push_str(&format!("  {} {}\n", "missing:".yellow(), key));
    }

    output
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}
