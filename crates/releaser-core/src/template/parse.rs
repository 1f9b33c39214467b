//! Template parsing into a node tree.
//!
//! Supported tags: `{{name}}`, `{{{name}}}`, `{{& name}}`, `{{#name}}`,
//! `{{^name}}`, `{{/name}}` and `{{! comment }}`. Section and comment tags
//! alone on a line ("standalone") consume that whole line.

use super::RenderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Var {
        name: String,
        escape: bool,
    },
    Section {
        name: String,
        inverted: bool,
        /// Unrendered body text, handed to expanders.
        raw: String,
        children: Vec<Node>,
    },
}

#[derive(Debug)]
enum Tag {
    Var { name: String, escape: bool },
    Open { name: String, inverted: bool },
    Close { name: String },
    Comment,
}

struct Frame {
    name: String,
    inverted: bool,
    body_start: usize,
    children: Vec<Node>,
}

pub(crate) fn parse(src: &str) -> Result<Vec<Node>, RenderError> {
    let mut stack = vec![Frame {
        name: String::new(),
        inverted: false,
        body_start: 0,
        children: Vec::new(),
    }];
    let mut pos = 0;

    while let Some(rel) = src[pos..].find("{{") {
        let tag_start = pos + rel;
        let (tag, tag_end) = read_tag(src, tag_start)?;

        let (text_end, next) = match tag {
            Tag::Var { .. } => (tag_start, tag_end),
            _ => standalone_span(src, tag_start, tag_end).unwrap_or((tag_start, tag_end)),
        };
        push_text(&mut stack, &src[pos..text_end]);

        match tag {
            Tag::Var { name, escape } => top(&mut stack).children.push(Node::Var { name, escape }),
            Tag::Comment => {}
            Tag::Open { name, inverted } => stack.push(Frame {
                name,
                inverted,
                body_start: next,
                children: Vec::new(),
            }),
            Tag::Close { name } => {
                if stack.len() == 1 {
                    return Err(RenderError::UnexpectedClose(name));
                }
                let frame = stack.pop().ok_or(RenderError::UnexpectedClose(name.clone()))?;
                if frame.name != name {
                    return Err(RenderError::MismatchedClose {
                        expected: frame.name,
                        found: name,
                    });
                }
                let raw = src[frame.body_start..text_end].to_string();
                top(&mut stack).children.push(Node::Section {
                    name: frame.name,
                    inverted: frame.inverted,
                    raw,
                    children: frame.children,
                });
            }
        }
        pos = next;
    }
    push_text(&mut stack, &src[pos..]);

    if stack.len() > 1 {
        let open = stack.pop().map(|f| f.name).unwrap_or_default();
        return Err(RenderError::UnclosedSection(open));
    }
    Ok(stack.pop().map(|f| f.children).unwrap_or_default())
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    // The root frame is never popped while parsing.
    let last = stack.len() - 1;
    &mut stack[last]
}

fn push_text(stack: &mut [Frame], text: &str) {
    if text.is_empty() {
        return;
    }
    let children = &mut top(stack).children;
    if let Some(Node::Text(prev)) = children.last_mut() {
        prev.push_str(text);
    } else {
        children.push(Node::Text(text.to_string()));
    }
}

/// Reads the tag starting at `start` (which points at `{{`).
/// Returns the tag and the offset just past its closing braces.
fn read_tag(src: &str, start: usize) -> Result<(Tag, usize), RenderError> {
    let inner_start = start + 2;
    if src[inner_start..].starts_with('{') {
        let close = src[inner_start..]
            .find("}}}")
            .ok_or(RenderError::UnclosedTag { offset: start })?;
        let name = tag_name(&src[inner_start + 1..inner_start + close], start)?;
        return Ok((Tag::Var { name, escape: false }, inner_start + close + 3));
    }

    let close = src[inner_start..]
        .find("}}")
        .ok_or(RenderError::UnclosedTag { offset: start })?;
    let content = src[inner_start..inner_start + close].trim();
    let end = inner_start + close + 2;

    let tag = match content.chars().next() {
        Some('!') => Tag::Comment,
        Some('&') => Tag::Var {
            name: tag_name(&content[1..], start)?,
            escape: false,
        },
        Some('#') => Tag::Open {
            name: tag_name(&content[1..], start)?,
            inverted: false,
        },
        Some('^') => Tag::Open {
            name: tag_name(&content[1..], start)?,
            inverted: true,
        },
        Some('/') => Tag::Close {
            name: tag_name(&content[1..], start)?,
        },
        Some('>') | Some('=') => return Err(RenderError::UnsupportedTag(content.to_string())),
        _ => Tag::Var {
            name: tag_name(content, start)?,
            escape: true,
        },
    };
    Ok((tag, end))
}

fn tag_name(raw: &str, offset: usize) -> Result<String, RenderError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RenderError::EmptyTag { offset });
    }
    Ok(name.to_string())
}

/// If the tag at `[tag_start, tag_end)` is the only non-blank content on its
/// line, returns (start of line, offset after the line break).
fn standalone_span(src: &str, tag_start: usize, tag_end: usize) -> Option<(usize, usize)> {
    let line_start = src[..tag_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if !src[line_start..tag_start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let rest = &src[tag_end..];
    let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
    if !rest[..line_end].chars().all(|c| c.is_whitespace()) {
        return None;
    }
    Some((line_start, tag_end + line_end))
}
