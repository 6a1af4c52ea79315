//! @ai:module:intent Scan source text for LINT directives embedded in comments
//! @ai:module:layer application
//! @ai:module:public_api Directive, Token, lex
//! @ai:module:depends_on template, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::template::Template;

//LINT.IF ./rules.rs:state_machine
/// @ai:intent Closed set of directive keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    If,
    End,
}

impl Directive {
    /// @ai:intent Parse a directive keyword
    /// @ai:example ("IF") -> Some(If)
    /// @ai:example ("THEN") -> None
    /// @ai:effects pure
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "IF" => Some(Directive::If),
            "END" => Some(Directive::End),
            _ => None,
        }
    }
}
//LINT.END directive

/// @ai:intent A directive occurrence with its arguments and 1-based line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub directive: Directive,
    pub args: Vec<String>,
    pub line: usize,
}

/// @ai:intent Lex a file's contents into directive tokens, in line order
/// @ai:pre templates are the ones resolved for this file, in declared order
/// @ai:post every token's line is 1-based and tokens are sorted by line
/// @ai:example ("#LINT.IF :bar", ["#LINT.?"]) -> [Token { If, [":bar"], 1 }]
/// @ai:effects pure
pub fn lex(file: &str, contents: &str, templates: &[&Template]) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for (line_idx, line) in contents.lines().enumerate() {
        if let Some(token) = lex_line(file, line.trim(), line_idx + 1, templates)? {
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// @ai:intent Match one line against the templates; the first matching template wins
/// @ai:effects pure
fn lex_line(
    file: &str,
    line: &str,
    line_number: usize,
    templates: &[&Template],
) -> Result<Option<Token>> {
    let Some(body) = templates.iter().find_map(|t| t.strip(line)) else {
        return Ok(None);
    };

    let mut words = body.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    let directive = Directive::from_keyword(keyword).ok_or_else(|| Error::UnknownDirective {
        file: file.to_string(),
        line: line_number,
        directive: keyword.to_string(),
    })?;

    Ok(Some(Token {
        directive,
        args: words.map(str::to_string).collect(),
        line: line_number,
    }))
}
