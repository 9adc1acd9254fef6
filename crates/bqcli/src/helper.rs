//! Line-editor helper: keyword completion, highlighting and dry-run
//! validation wired into rustyline.

use std::borrow::Cow;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::highlight::SqlHighlighter;
use crate::validator::{DryRunValidator, ValidationFailure};

/// SQL keywords for completion and highlighting (lowercase).
pub const SQL_KEYWORDS: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "analyze", "and",
    "as", "asc", "attach", "autoincrement", "before", "begin", "between",
    "by", "cascade", "case", "cast", "check", "collate", "column",
    "commit", "conflict", "constraint", "create", "cross", "current_date",
    "current_time", "current_timestamp", "database", "default",
    "deferrable", "deferred", "delete", "desc", "detach", "distinct",
    "drop", "each", "else", "end", "escape", "except", "exclusive",
    "exists", "explain", "fail", "for", "foreign", "from", "full", "glob",
    "group", "having", "if", "ignore", "immediate", "in", "index",
    "indexed", "initially", "inner", "insert", "instead", "intersect",
    "into", "is", "isnull", "join", "key", "left", "like", "limit",
    "match", "natural", "no", "not", "notnull", "null", "of", "offset",
    "on", "or", "order", "outer", "plan", "pragma", "primary", "query",
    "raise", "recursive", "references", "regexp", "reindex", "release",
    "rename", "replace", "restrict", "right", "rollback", "row",
    "savepoint", "select", "set", "table", "temp", "temporary", "then",
    "to", "transaction", "trigger", "union", "unique", "update", "using",
    "vacuum", "values", "view", "virtual", "when", "where", "with",
    "without",
];

pub struct SqlHelper {
    validator: DryRunValidator,
    highlighter: SqlHighlighter,
}

impl SqlHelper {
    pub fn new(validator: DryRunValidator, color: bool) -> Self {
        Self {
            validator,
            highlighter: SqlHighlighter::new(color),
        }
    }
}

/// Start of the word ending at `pos`.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')' | ';'))
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Keywords starting with `word`, ignoring case. Candidates are upper-cased
/// when the word starts with an upper-case letter.
pub fn complete_keyword(word: &str) -> Vec<Pair> {
    if word.is_empty() {
        return Vec::new();
    }

    let lower = word.to_lowercase();
    let upper = word.chars().next().map_or(false, char::is_uppercase);

    SQL_KEYWORDS
        .iter()
        .filter(|kw| kw.starts_with(&lower))
        .map(|kw| {
            let replacement = if upper {
                kw.to_uppercase()
            } else {
                kw.to_string()
            };
            Pair {
                display: replacement.clone(),
                replacement,
            }
        })
        .collect()
}

impl Completer for SqlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        Ok((start, complete_keyword(&line[start..pos])))
    }
}

impl Hinter for SqlHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for SqlHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match self.highlighter.highlight(line) {
            Some(highlighted) => Cow::Owned(highlighted),
            None => Cow::Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.highlighter.enabled()
    }
}

impl Validator for SqlHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(validation_result(
            self.validator.check(ctx.input()),
            self.highlighter.enabled(),
        ))
    }
}

/// Map a dry-run verdict onto the editor: failures are shown on the line
/// below the buffer, in red when colour is on.
fn validation_result(
    verdict: Result<(), ValidationFailure>,
    color: bool,
) -> ValidationResult {
    match verdict {
        Ok(()) => ValidationResult::Valid(None),
        Err(failure) => {
            let message = if color {
                failure.message.red().to_string()
            } else {
                failure.message
            };
            ValidationResult::Invalid(Some(format!("\n{}", message)))
        }
    }
}

impl Helper for SqlHelper {}
