//! @ai:module:intent Extract changed line ranges from unified diff text
//! @ai:module:layer application
//! @ai:module:public_api Hunk, parse_hunks, group_by_file
//! @ai:module:depends_on rules, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::rules::{normalize_path, Range};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// @ai:intent A changed block of lines on the new side of a diff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hunk {
    pub file: String,
    pub range: Range,
}

/// Lines still expected in the current hunk body, per side.
struct Pending {
    old: usize,
    new: usize,
}

fn hunk_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("Invalid regex")
    })
}

/// @ai:intent Parse unified diff text into new-side hunks
/// @ai:pre text is a (possibly empty) unified diff
/// @ai:post every hunk has start <= end and a path with any "b/" prefix stripped
/// @ai:example ("") -> []
/// @ai:effects pure
pub fn parse_hunks(text: &str) -> Result<Vec<Hunk>> {
    let mut hunks = Vec::new();
    // None: no file section yet; Some(None): file deleted on the new side
    let mut new_file: Option<Option<String>> = None;
    let mut pending: Option<Pending> = None;

    for (line_idx, line) in text.lines().enumerate() {
        let line_number = line_idx + 1;

        if let Some(body) = pending.as_mut() {
            consume_body_line(body, line, line_number)?;
            if body.old == 0 && body.new == 0 {
                pending = None;
            }
            continue;
        }

        if line.starts_with("diff ") {
            new_file = None;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            new_file = Some(new_side_path(path));
        } else if line.starts_with("@@") {
            let Some(file) = new_file.as_ref() else {
                return Err(malformed(line_number, "hunk header outside a file section"));
            };
            let (body, range) = parse_header(line, line_number)?;
            if let Some(file) = file {
                hunks.push(Hunk {
                    file: file.clone(),
                    range,
                });
            }
            if body.old > 0 || body.new > 0 {
                pending = Some(body);
            }
        }
    }

    if pending.is_some() {
        return Err(malformed(text.lines().count(), "unexpected end of hunk body"));
    }

    Ok(hunks)
}

fn consume_body_line(body: &mut Pending, line: &str, line_number: usize) -> Result<()> {
    match line.chars().next() {
        Some('+') => body.new = decrement(body.new, line_number)?,
        Some('-') => body.old = decrement(body.old, line_number)?,
        Some(' ') | None => {
            body.old = decrement(body.old, line_number)?;
            body.new = decrement(body.new, line_number)?;
        }
        Some('\\') => {}
        Some(_) => return Err(malformed(line_number, "unexpected line in hunk body")),
    }
    Ok(())
}

fn decrement(count: usize, line_number: usize) -> Result<usize> {
    count
        .checked_sub(1)
        .ok_or_else(|| malformed(line_number, "hunk body longer than its header"))
}

fn parse_header(line: &str, line_number: usize) -> Result<(Pending, Range)> {
    let captures = hunk_header()
        .captures(line)
        .ok_or_else(|| malformed(line_number, "invalid hunk header"))?;

    let number = |idx: usize| -> Result<usize> {
        match captures.get(idx) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| malformed(line_number, "line number out of range")),
            None => Ok(1),
        }
    };

    let old_lines = number(2)?;
    let new_start = number(3)?;
    let new_lines = number(4)?;

    // A pure deletion has no new-side lines; pin it to the line it follows.
    let range = if new_lines == 0 {
        let anchor = new_start.max(1);
        Range::new(anchor, anchor)
    } else {
        let end = new_start
            .checked_add(new_lines - 1)
            .ok_or_else(|| malformed(line_number, "line number out of range"))?;
        Range::new(new_start, end)
    };

    Ok((
        Pending {
            old: old_lines,
            new: new_lines,
        },
        range,
    ))
}

fn new_side_path(raw: &str) -> Option<String> {
    let path = raw.split('\t').next().unwrap_or(raw).trim_end();
    let path = unquote_path(path);
    if path == "/dev/null" {
        return None;
    }
    let path = path.strip_prefix("b/").unwrap_or(&path);
    Some(normalize_path(path))
}

/// Decode a path git wrapped in double quotes with C-style escapes.
fn unquote_path(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ '0'..='7') => {
                            value = value * 8 + (o as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn malformed(line: usize, message: &str) -> Error {
    Error::MalformedDiff {
        line,
        message: message.to_string(),
    }
}

/// @ai:intent Group hunk ranges by file path
/// @ai:effects pure
pub fn group_by_file(hunks: &[Hunk]) -> BTreeMap<String, Vec<Range>> {
    let mut grouped: BTreeMap<String, Vec<Range>> = BTreeMap::new();
    for hunk in hunks {
        grouped.entry(hunk.file.clone()).or_default().push(hunk.range);
    }
    grouped
}
