// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! PPL syntax highlighting for the interactive shell.
//!
//! Commands and `by` are blue, aggregate functions magenta, pipes bold white,
//! string literals yellow, and numbers cyan. Lines starting with `\` are
//! meta-commands and are coloured as a whole.

use colored::Colorize;
use rustyline::highlight::Highlighter;
use std::borrow::Cow;

use ppl_autocomplete::grammar;

/// Syntax highlighter for PPL input lines.
pub struct PplHighlighter;

impl Highlighter for PplHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(highlight_line(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: rustyline::highlight::CmdKind) -> bool {
        true
    }

    /// The prompt is coloured in main.
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Borrowed(prompt)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        _completion: rustyline::CompletionType,
    ) -> Cow<'c, str> {
        Cow::Borrowed(candidate)
    }
}

fn is_keyword(word: &str) -> bool {
    let lower = word.to_lowercase();
    grammar::all_keywords().any(|keyword| keyword == lower)
}

/// `sum` for `sum(`, `count` for `count()`.
fn is_function(word: &str) -> bool {
    let lower = word.to_lowercase();
    grammar::STATS_FUNCTIONS
        .iter()
        .any(|function| function.split('(').next() == Some(lower.as_str()))
}

/// Apply syntax highlighting to one line of PPL input.
fn highlight_line(line: &str) -> String {
    if line.starts_with('\\') {
        return line.bright_magenta().to_string();
    }

    let mut result = String::with_capacity(line.len() * 2);
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let ch = chars[i];

        if ch == '"' || ch == '\'' {
            let quote = ch;
            let start = i;
            i += 1;
            while i < len && chars[i] != quote {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(len);
            let literal: String = chars[start..i].iter().collect();
            result.push_str(&literal.yellow().to_string());
            continue;
        }

        if ch == '|' {
            result.push_str(&"|".white().bold().to_string());
            i += 1;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let start = i;
            while i < len && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.' | '-')) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let next = chars.get(i).copied();

            if next == Some('(') && is_function(&word) {
                result.push_str(&word.magenta().to_string());
            } else if is_keyword(&word) {
                result.push_str(&word.blue().bold().to_string());
            } else {
                result.push_str(&word);
            }
            continue;
        }

        if ch.is_ascii_digit() || (ch == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            i += 1;
            while i < len && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let number: String = chars[start..i].iter().collect();
            result.push_str(&number.cyan().to_string());
            continue;
        }

        result.push(ch);
        i += 1;
    }

    result
}
