//! Inline markup for answer and excerpt text.
//!
//! Three rewrites, in order: `**x**` to strong, `*x*` to emphasis, line
//! breaks to explicit breaks. Input is parsed into [`Inline`] nodes so every
//! text run is escaped when markup is produced.

use std::sync::LazyLock;

use regex::Regex;

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("invalid strong regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    LineBreak,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatted(Vec<Inline>);

impl Formatted {
    pub fn parse(text: &str) -> Self {
        let tokens = tokenize_strong(text);
        let marks = pair_emphasis(&tokens);
        Self(build(&tokens, &marks))
    }

    pub fn nodes(&self) -> &[Inline] {
        &self.0
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(&self.0, &mut out);
        out
    }
}

/// Formats `text` into escaped markup. Absent or empty input yields `""`.
#[cfg(test)]
pub fn format(text: Option<&str>) -> String {
    text.map(Formatted::parse).unwrap_or_default().to_html()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Char(char),
    StrongOpen,
    StrongClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Plain,
    EmphasisOpen,
    EmphasisClose,
}

/// Strong spans are found on the raw text; their markers become tokens so
/// the emphasis pass sees the whole sequence.
fn tokenize_strong(text: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(text.len());
    let mut last = 0;
    for found in STRONG.find_iter(text) {
        tokens.extend(text[last..found.start()].chars().map(Token::Char));
        tokens.push(Token::StrongOpen);
        tokens.extend(
            text[found.start() + 2..found.end() - 2]
                .chars()
                .map(Token::Char),
        );
        tokens.push(Token::StrongClose);
        last = found.end();
    }
    tokens.extend(text[last..].chars().map(Token::Char));
    tokens
}

/// Pairs each `*` with the next `*` on the same line, leftmost first. A pair
/// whose span would cut through a strong span is refused and its opening
/// star stays literal.
fn pair_emphasis(tokens: &[Token]) -> Vec<Mark> {
    let mut inside = Vec::with_capacity(tokens.len());
    let mut depth = false;
    for token in tokens {
        match token {
            Token::StrongOpen => depth = true,
            Token::StrongClose => depth = false,
            Token::Char(_) => {}
        }
        inside.push(depth);
    }

    let mut marks = vec![Mark::Plain; tokens.len()];
    let mut start = 0;
    while let Some(open) = (start..tokens.len()).find(|&i| tokens[i] == Token::Char('*')) {
        let close = (open + 1..tokens.len())
            .find(|&i| matches!(tokens[i], Token::Char('*') | Token::Char('\n')))
            .filter(|&i| tokens[i] == Token::Char('*'));
        match close {
            Some(close) if nests(tokens, &inside, open, close) => {
                marks[open] = Mark::EmphasisOpen;
                marks[close] = Mark::EmphasisClose;
                start = close + 1;
            }
            _ => start = open + 1,
        }
    }
    marks
}

fn nests(tokens: &[Token], inside: &[bool], open: usize, close: usize) -> bool {
    if inside[open] != inside[close] {
        return false;
    }
    // Both ends in the same strong span only if no marker lies between them.
    !inside[open]
        || !tokens[open..close]
            .iter()
            .any(|token| matches!(token, Token::StrongOpen | Token::StrongClose))
}

struct Frame {
    wrap: Option<fn(Vec<Inline>) -> Inline>,
    nodes: Vec<Inline>,
    text: String,
}

impl Frame {
    fn new(wrap: Option<fn(Vec<Inline>) -> Inline>) -> Self {
        Self {
            wrap,
            nodes: Vec::new(),
            text: String::new(),
        }
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(Inline::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> (Option<fn(Vec<Inline>) -> Inline>, Vec<Inline>) {
        self.flush();
        (self.wrap, self.nodes)
    }
}

fn build(tokens: &[Token], marks: &[Mark]) -> Vec<Inline> {
    let mut stack = vec![Frame::new(None)];
    for (token, mark) in tokens.iter().zip(marks) {
        match (token, mark) {
            (Token::StrongOpen, _) => open_frame(&mut stack, Inline::Strong),
            (Token::Char(_), Mark::EmphasisOpen) => open_frame(&mut stack, Inline::Emphasis),
            (Token::StrongClose, _) | (Token::Char(_), Mark::EmphasisClose) => {
                close_frame(&mut stack)
            }
            (Token::Char('\n'), Mark::Plain) => {
                if let Some(frame) = stack.last_mut() {
                    frame.flush();
                    frame.nodes.push(Inline::LineBreak);
                }
            }
            (Token::Char(c), Mark::Plain) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push(*c);
                }
            }
        }
    }
    while stack.len() > 1 {
        close_frame(&mut stack);
    }
    stack
        .pop()
        .map(|root| root.finish().1)
        .unwrap_or_default()
}

fn open_frame(stack: &mut Vec<Frame>, wrap: fn(Vec<Inline>) -> Inline) {
    if let Some(frame) = stack.last_mut() {
        frame.flush();
    }
    stack.push(Frame::new(Some(wrap)));
}

fn close_frame(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    let Some(frame) = stack.pop() else { return };
    let (wrap, nodes) = frame.finish();
    if let (Some(wrap), Some(parent)) = (wrap, stack.last_mut()) {
        parent.nodes.push(wrap(nodes));
    }
}

fn write_html(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                write_html(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                write_html(children, out);
                out.push_str("</em>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
