//! Template execution against a chapter.

use super::parse::{FieldPath, Node};
use crate::story::{Chapter, StoryOption};
use crate::{StoryError, StoryResult};
use std::io::Write;

/// A borrowed view of the data a template can reach.
#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Chapter(&'a Chapter),
    Option(&'a StoryOption),
    Text(&'a str),
    Paragraphs(&'a [String]),
    Options(&'a [StoryOption]),
}

impl<'a> Value<'a> {
    fn kind(&self) -> &'static str {
        match self {
            Value::Chapter(_) => "chapter",
            Value::Option(_) => "option",
            Value::Text(_) => "text",
            Value::Paragraphs(_) => "paragraph list",
            Value::Options(_) => "option list",
        }
    }

    fn field(self, name: &str) -> Option<Value<'a>> {
        match (self, name) {
            (Value::Chapter(c), "Title") => Some(Value::Text(&c.title)),
            (Value::Chapter(c), "Paragraphs") => Some(Value::Paragraphs(&c.paragraphs)),
            (Value::Chapter(c), "Options") => Some(Value::Options(&c.options)),
            (Value::Option(o), "Text") => Some(Value::Text(&o.text)),
            (Value::Option(o), "Chapter") => Some(Value::Text(&o.chapter)),
            _ => None,
        }
    }

    fn items(self) -> Option<Vec<Value<'a>>> {
        match self {
            Value::Paragraphs(ps) => Some(ps.iter().map(|p| Value::Text(p)).collect()),
            Value::Options(os) => Some(os.iter().map(Value::Option).collect()),
            _ => None,
        }
    }

    fn is_truthy(self) -> bool {
        match self {
            Value::Text(s) => !s.is_empty(),
            Value::Paragraphs(ps) => !ps.is_empty(),
            Value::Options(os) => !os.is_empty(),
            Value::Chapter(_) | Value::Option(_) => true,
        }
    }
}

fn render_error(line: usize, message: String) -> StoryError {
    StoryError::Render(format!("line {line}: {message}"))
}

fn resolve<'a>(dot: Value<'a>, path: &FieldPath, line: usize) -> StoryResult<Value<'a>> {
    let mut current = dot;
    for name in &path.0 {
        current = current.field(name).ok_or_else(|| {
            render_error(
                line,
                format!("no field {name} on {} while evaluating {path}", current.kind()),
            )
        })?;
    }
    Ok(current)
}

/// Render `nodes` with `chapter` as the initial current value.
pub(crate) fn execute<W: Write>(nodes: &[Node], chapter: &Chapter, out: &mut W) -> StoryResult<()> {
    walk(nodes, Value::Chapter(chapter), out)
}

fn walk<W: Write>(nodes: &[Node], dot: Value<'_>, out: &mut W) -> StoryResult<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.write_all(text.as_bytes()).map_err(StoryError::Write)?,
            Node::Print { path, line } => match resolve(dot, path, *line)? {
                Value::Text(text) => write_escaped(text, out)?,
                other => {
                    return Err(render_error(
                        *line,
                        format!("cannot print {} at {path}", other.kind()),
                    ))
                }
            },
            Node::Range {
                path,
                line,
                body,
                otherwise,
            } => {
                let value = resolve(dot, path, *line)?;
                let items = value.items().ok_or_else(|| {
                    render_error(*line, format!("cannot range over {} at {path}", value.kind()))
                })?;
                if items.is_empty() {
                    walk(otherwise, dot, out)?;
                }
                for item in items {
                    walk(body, item, out)?;
                }
            }
            Node::If {
                path,
                line,
                then,
                otherwise,
            } => {
                if resolve(dot, path, *line)?.is_truthy() {
                    walk(then, dot, out)?;
                } else {
                    walk(otherwise, dot, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Write `text` with HTML special characters escaped.
fn write_escaped<W: Write>(text: &str, out: &mut W) -> StoryResult<()> {
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let replacement = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&#34;",
            '\'' => "&#39;",
            _ => continue,
        };
        out.write_all(text[start..i].as_bytes())
            .and_then(|()| out.write_all(replacement.as_bytes()))
            .map_err(StoryError::Write)?;
        start = i + c.len_utf8();
    }
    out.write_all(text[start..].as_bytes())
        .map_err(StoryError::Write)
}
