//! Template compiler.
//!
//! Source text is split into literal text and `{{ ... }}` actions, then folded into a tree of
//! [`Node`]s. All syntax checks happen here so a compiled template can only fail at render time
//! on data it does not understand.

use crate::{StoryError, StoryResult};

/// A dotted field path. An empty path is the current value (`.`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPath(pub(crate) Vec<String>);

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for segment in &self.0 {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Print {
        path: FieldPath,
        line: usize,
    },
    Range {
        path: FieldPath,
        line: usize,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
    If {
        path: FieldPath,
        line: usize,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug)]
enum Token {
    Text(String),
    Print(FieldPath, usize),
    Range(FieldPath, usize),
    If(FieldPath, usize),
    Else(usize),
    End(usize),
}

enum Terminator {
    Eof,
    Else(usize),
    End(usize),
}

fn syntax(line: usize, message: impl Into<String>) -> StoryError {
    StoryError::TemplateSyntax {
        line,
        message: message.into(),
    }
}

/// Compile template source into a node tree.
pub(crate) fn compile(source: &str) -> StoryResult<Vec<Node>> {
    let tokens = tokenize(source)?;
    let mut tokens = tokens.into_iter();
    let (nodes, terminator) = parse_block(&mut tokens)?;
    match terminator {
        Terminator::Eof => Ok(nodes),
        Terminator::End(line) => Err(syntax(line, "unexpected {{end}}")),
        Terminator::Else(line) => Err(syntax(line, "unexpected {{else}}")),
    }
}

/// Whitespace removed by trim markers. Other Unicode spaces are kept.
fn is_trim_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Offset of the `}}` closing the action that starts at `after_open`.
///
/// A comment runs to its `*/`, so a `}}` inside it does not close the action.
fn find_close(after_open: &str, line: usize) -> StoryResult<usize> {
    let lead = after_open
        .strip_prefix('-')
        .filter(|s| s.starts_with(is_trim_space))
        .unwrap_or(after_open)
        .trim_start_matches(is_trim_space);

    let search_from = match lead.strip_prefix("/*") {
        Some(comment) => {
            let end = comment
                .find("*/")
                .ok_or_else(|| syntax(line, "unterminated comment"))?;
            after_open.len() - comment.len() + end + 2
        }
        None => 0,
    };

    after_open[search_from..]
        .find("}}")
        .map(|i| search_from + i)
        .ok_or_else(|| syntax(line, "unterminated action"))
}

fn tokenize(source: &str) -> StoryResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next = false;

    while let Some(open) = rest.find("{{") {
        let mut text = &rest[..open];
        if trim_next {
            text = text.trim_start_matches(is_trim_space);
        }
        line += rest[..open].matches('\n').count();

        let after_open = &rest[open + 2..];
        let close = find_close(after_open, line)?;
        let raw = &after_open[..close];

        let (inner, trim_before, trim_after) = split_trim_markers(raw);
        if trim_before {
            text = text.trim_end_matches(is_trim_space);
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }
        if let Some(token) = parse_action(inner.trim(), line)? {
            tokens.push(token);
        }

        line += raw.matches('\n').count();
        trim_next = trim_after;
        rest = &after_open[close + 2..];
    }

    let tail = if trim_next {
        rest.trim_start_matches(is_trim_space)
    } else {
        rest
    };
    if !tail.is_empty() {
        tokens.push(Token::Text(tail.to_string()));
    }
    Ok(tokens)
}

/// Strip `-` whitespace-trim markers. A marker must be separated from the action by whitespace.
fn split_trim_markers(raw: &str) -> (&str, bool, bool) {
    let mut inner = raw;
    let mut trim_before = false;
    let mut trim_after = false;

    if let Some(stripped) = inner.strip_prefix('-') {
        if stripped.starts_with(is_trim_space) {
            inner = stripped;
            trim_before = true;
        }
    }
    if let Some(stripped) = inner.strip_suffix('-') {
        if stripped.ends_with(is_trim_space) {
            inner = stripped;
            trim_after = true;
        }
    }
    (inner, trim_before, trim_after)
}

fn parse_action(body: &str, line: usize) -> StoryResult<Option<Token>> {
    if let Some(comment) = body.strip_prefix("/*") {
        if comment.ends_with("*/") {
            return Ok(None);
        }
        return Err(syntax(line, "unterminated comment"));
    }

    let mut words = body.split_whitespace();
    let Some(head) = words.next() else {
        return Err(syntax(line, "empty action"));
    };
    let args: Vec<&str> = words.collect();

    let token = match head {
        "range" => Token::Range(single_path(head, &args, line)?, line),
        "if" => Token::If(single_path(head, &args, line)?, line),
        "else" => {
            no_args(head, &args, line)?;
            Token::Else(line)
        }
        "end" => {
            no_args(head, &args, line)?;
            Token::End(line)
        }
        _ if head.starts_with('.') => {
            no_args(head, &args, line)?;
            Token::Print(parse_path(head, line)?, line)
        }
        other => return Err(syntax(line, format!("unknown action {other:?}"))),
    };
    Ok(Some(token))
}

fn single_path(keyword: &str, args: &[&str], line: usize) -> StoryResult<FieldPath> {
    match args {
        [path] => parse_path(path, line),
        [] => Err(syntax(line, format!("missing value for {keyword}"))),
        _ => Err(syntax(line, format!("too many arguments to {keyword}"))),
    }
}

fn no_args(keyword: &str, args: &[&str], line: usize) -> StoryResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(syntax(line, format!("unexpected arguments after {keyword}")))
    }
}

fn parse_path(raw: &str, line: usize) -> StoryResult<FieldPath> {
    if raw == "." {
        return Ok(FieldPath(Vec::new()));
    }
    let Some(dotted) = raw.strip_prefix('.') else {
        return Err(syntax(line, format!("malformed field path {raw:?}")));
    };

    let mut segments = Vec::new();
    for segment in dotted.split('.') {
        let valid = !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !segment.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(syntax(line, format!("malformed field path {raw:?}")));
        }
        segments.push(segment.to_string());
    }
    Ok(FieldPath(segments))
}

fn parse_block(tokens: &mut std::vec::IntoIter<Token>) -> StoryResult<(Vec<Node>, Terminator)> {
    let mut nodes = Vec::new();

    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Print(path, line) => nodes.push(Node::Print { path, line }),
            Token::Else(line) => return Ok((nodes, Terminator::Else(line))),
            Token::End(line) => return Ok((nodes, Terminator::End(line))),
            Token::Range(path, line) => {
                let (body, otherwise) = parse_branches(tokens, "range", line)?;
                nodes.push(Node::Range {
                    path,
                    line,
                    body,
                    otherwise,
                });
            }
            Token::If(path, line) => {
                let (then, otherwise) = parse_branches(tokens, "if", line)?;
                nodes.push(Node::If {
                    path,
                    line,
                    then,
                    otherwise,
                });
            }
        }
    }

    Ok((nodes, Terminator::Eof))
}

/// Parse the body of a block action up to its `{{end}}`, with an optional `{{else}}` branch.
fn parse_branches(
    tokens: &mut std::vec::IntoIter<Token>,
    keyword: &str,
    opened_on: usize,
) -> StoryResult<(Vec<Node>, Vec<Node>)> {
    let unclosed = || syntax(opened_on, format!("unclosed {keyword}: missing {{{{end}}}}"));

    let (body, terminator) = parse_block(tokens)?;
    match terminator {
        Terminator::End(_) => Ok((body, Vec::new())),
        Terminator::Eof => Err(unclosed()),
        Terminator::Else(_) => {
            let (otherwise, terminator) = parse_block(tokens)?;
            match terminator {
                Terminator::End(_) => Ok((body, otherwise)),
                Terminator::Else(line) => Err(syntax(line, format!("duplicate else in {keyword}"))),
                Terminator::Eof => Err(unclosed()),
            }
        }
    }
}
