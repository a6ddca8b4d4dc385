//! Entry validation and generated-source checks.
//!
//! Entries are checked before rendering so that every name that ends up in
//! the generated file is a usable Rust identifier. After rendering the unit
//! goes through a delimiter balance check and a whitespace normalisation
//! pass.

use crate::catalog::ErrorData;
use crate::error::{GenerateError, Result};
use regex::Regex;
use std::collections::HashSet;

/// Parameter names the generated constructor already uses.
pub const RESERVED_PARAMS: &[&str] = &["fields", "include_stack", "err"];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Compiled patterns used by the checks.
#[derive(Debug, Clone)]
pub struct Validator {
    identifier: Regex,
    import_path: Regex,
    trailing_whitespace: Regex,
    blank_runs: Regex,
}

impl Validator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            identifier: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?,
            import_path: Regex::new(r"^(::)?[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")?,
            trailing_whitespace: Regex::new(r"(?m)[ \t]+$")?,
            blank_runs: Regex::new(r"\n{3,}")?,
        })
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.identifier.is_match(name)
    }

    /// Checks an entry before it is rendered.
    pub fn validate_entry(&self, entry: &ErrorData) -> Result<()> {
        let code = entry.code.as_str();
        if !self.is_identifier(code) {
            return Err(GenerateError::invalid(
                code,
                "code must start with a letter or underscore and contain only letters, digits and underscores",
            ));
        }
        let module = code.to_lowercase();
        if is_keyword(&module) {
            return Err(GenerateError::invalid(
                code,
                format!("lower-cased code '{module}' is a Rust keyword and cannot name a module"),
            ));
        }

        let mut seen = HashSet::new();
        for item in &entry.meta_data {
            let name = item.name.as_str();
            if !self.is_identifier(name) {
                return Err(GenerateError::invalid(
                    code,
                    format!("metadata name '{name}' is not a valid identifier"),
                ));
            }
            if is_keyword(name) {
                return Err(GenerateError::invalid(
                    code,
                    format!("metadata name '{name}' is a Rust keyword"),
                ));
            }
            if RESERVED_PARAMS.contains(&name) {
                return Err(GenerateError::invalid(
                    code,
                    format!("metadata name '{name}' clashes with a generated parameter"),
                ));
            }
            if !seen.insert(name) {
                return Err(GenerateError::invalid(
                    code,
                    format!("metadata name '{name}' is declared twice"),
                ));
            }
            if item.data_type.trim().is_empty() {
                return Err(GenerateError::invalid(
                    code,
                    format!("metadata item '{name}' has no data type"),
                ));
            }
            if let Some(path) = &item.import_path
                && !self.import_path.is_match(path)
            {
                return Err(GenerateError::invalid(
                    code,
                    format!("import path '{path}' for '{name}' is not a valid path"),
                ));
            }
        }
        Ok(())
    }

    /// Strips trailing whitespace, collapses blank-line runs to one blank line
    /// and ends the text with exactly one newline.
    pub fn normalize(&self, source: &str) -> String {
        let trimmed = self.trailing_whitespace.replace_all(source, "");
        let collapsed = self.blank_runs.replace_all(&trimmed, "\n\n");
        let mut output = collapsed.trim_matches('\n').to_string();
        output.push('\n');
        output
    }

    /// Runs the post-render checks and returns the normalised source.
    pub fn finish_unit(&self, code: &str, source: &str) -> Result<String> {
        check_delimiters(code, source)?;
        Ok(self.normalize(source))
    }
}

/// Checks that brackets in `source` balance, skipping string literals and
/// comments.
pub fn check_delimiters(code: &str, source: &str) -> Result<()> {
    let malformed = |reason: String| GenerateError::Malformed {
        code: code.to_string(),
        reason,
    };

    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(malformed(format!("unterminated block comment at line {line}")));
                }
            }
            '"' => {
                let start = line;
                let mut escaped = false;
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(malformed(format!("unterminated string starting at line {start}")));
                }
            }
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, opened_at)) => {
                        return Err(malformed(format!(
                            "'{c}' at line {line} closes '{open}' opened at line {opened_at}"
                        )));
                    }
                    None => {
                        return Err(malformed(format!("unmatched '{c}' at line {line}")));
                    }
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, opened_at)) => Err(malformed(format!(
            "'{open}' opened at line {opened_at} is never closed"
        ))),
        None => Ok(()),
    }
}
