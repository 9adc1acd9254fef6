//! ANSI highlighting of SQL as it is typed.

use std::collections::HashSet;

use colored::Colorize;

use crate::helper::SQL_KEYWORDS;

type CharIter<'a> = std::iter::Peekable<std::str::Chars<'a>>;

pub struct SqlHighlighter {
    keywords: HashSet<&'static str>,
    enabled: bool,
}

impl SqlHighlighter {
    pub fn new(enabled: bool) -> Self {
        Self {
            keywords: SQL_KEYWORDS.iter().copied().collect(),
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// `None` when highlighting is off or there is nothing to colour.
    pub fn highlight(&self, line: &str) -> Option<String> {
        if !self.enabled || line.trim().is_empty() {
            return None;
        }
        Some(self.highlight_line(line))
    }

    fn highlight_line(&self, line: &str) -> String {
        let mut result = String::with_capacity(line.len() * 2);
        let mut iter = line.chars().peekable();

        while let Some(ch) = iter.next() {
            match ch {
                '-' if iter.peek() == Some(&'-') => {
                    result.push_str(&collect_comment(ch, &mut iter));
                }
                '#' => result.push_str(&collect_comment(ch, &mut iter)),
                '\'' | '"' | '`' => result.push_str(&collect_quoted(ch, &mut iter)),
                c if c.is_ascii_digit() => result.push_str(&collect_number(c, &mut iter)),
                c if c.is_alphabetic() || c == '_' => {
                    let ident = collect_identifier(c, &mut iter);
                    if self.keywords.contains(ident.to_ascii_lowercase().as_str()) {
                        result.push_str(&ident.blue().bold().to_string());
                    } else {
                        result.push_str(&ident);
                    }
                }
                c => result.push(c),
            }
        }

        result
    }
}

/// Comments run to the end of the physical line; the buffer may span several.
fn collect_comment(first: char, iter: &mut CharIter<'_>) -> String {
    let mut comment = String::new();
    comment.push(first);
    while let Some(&next) = iter.peek() {
        if next == '\n' {
            break;
        }
        comment.push(next);
        iter.next();
    }
    comment.dimmed().to_string()
}

fn collect_quoted(quote: char, iter: &mut CharIter<'_>) -> String {
    let mut literal = String::new();
    literal.push(quote);

    let mut escaped = false;
    for next in iter.by_ref() {
        literal.push(next);
        if escaped {
            escaped = false;
            continue;
        }
        if next == '\\' {
            escaped = true;
            continue;
        }
        if next == quote {
            break;
        }
    }

    if quote == '`' {
        literal.cyan().to_string()
    } else {
        literal.green().to_string()
    }
}

fn collect_number(first: char, iter: &mut CharIter<'_>) -> String {
    let mut number = String::new();
    number.push(first);

    let mut exponent = false;
    while let Some(&next) = iter.peek() {
        if next.is_ascii_digit() || (next == '.' && !exponent) {
            number.push(next);
            iter.next();
            continue;
        }

        if matches!(next, 'e' | 'E') && !exponent {
            // Only an exponent when digits follow, optionally signed.
            let mut ahead = iter.clone();
            ahead.next();
            let sign = ahead.peek().copied().filter(|c| *c == '+' || *c == '-');
            if sign.is_some() {
                ahead.next();
            }
            if ahead.peek().map_or(false, char::is_ascii_digit) {
                number.push(next);
                number.extend(sign);
                *iter = ahead;
                exponent = true;
                continue;
            }
        }

        break;
    }

    number.yellow().to_string()
}

fn collect_identifier(first: char, iter: &mut CharIter<'_>) -> String {
    let mut ident = String::new();
    ident.push(first);

    while let Some(&next) = iter.peek() {
        if next.is_alphanumeric() || next == '_' {
            ident.push(next);
            iter.next();
        } else {
            break;
        }
    }

    ident
}
