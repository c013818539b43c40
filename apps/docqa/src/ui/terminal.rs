use std::io::Write;

use crate::controller::{
    state::Transition,
    upload::BROWSE_PROMPT,
};
use crate::ui::{
    answer::{Citations, RenderedAnswer},
    format::{escape_html, Inline},
    status::{StatusKind, StatusMessage},
    Region, Surface,
};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const RESET: &str = "\x1b[0m";

/// How inline markup and regions are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    /// Strong and emphasis as ANSI bold and italic.
    Ansi,
    /// Each region as the HTML fragment a page would insert.
    Html,
}

/// Line-oriented surface writing one block per transition.
pub struct TerminalSurface<W: Write> {
    out: W,
    markup: Markup,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, markup: Markup) -> Self {
        Self { out, markup }
    }

    fn color(&self) -> bool {
        self.markup == Markup::Ansi
    }

    #[cfg(test)]
    pub fn written(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, text: &str) {
        let written = writeln!(self.out, "{text}").and_then(|()| self.out.flush());
        if let Err(err) = written {
            tracing::warn!("failed to write to terminal: {err}");
        }
    }

    fn status_line(&self, message: &StatusMessage) -> String {
        let marker = match message.kind {
            StatusKind::Loading => "…",
            StatusKind::Success => "✓",
            StatusKind::Error => "✗",
        };
        format!("{marker} {}", message.text)
    }

    fn answer_block(&self, rendered: &RenderedAnswer) -> String {
        let mut out = format!(
            "Answer:\n{}\n\nSources:",
            render_inline(rendered.answer.nodes(), self.color())
        );
        match &rendered.citations {
            Citations::Blocks(blocks) => {
                for block in blocks {
                    out.push_str(&format!(
                        "\n  {} (Relevance: {})\n    {}",
                        block.page_label(),
                        block.relevance,
                        render_inline(block.excerpt.nodes(), self.color()).replace('\n', "\n    ")
                    ));
                }
            }
            Citations::Placeholder(text) => out.push_str(&format!("\n  {text}")),
        }
        if let Some(seconds) = rendered.processing_time {
            out.push_str(&format!("\n({seconds:.2}s)"));
        }
        out
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn present(&mut self, transition: &Transition) {
        if self.markup == Markup::Html {
            let html = match transition {
                Transition::Status(message) => message.to_html(),
                Transition::FileSelected(Some(name)) => escape_html(name),
                Transition::FileSelected(None) => BROWSE_PROMPT.to_string(),
                Transition::ShowQuestions(info) => info.to_html(),
                Transition::BeginAnswer => "<div class=\"loader\"></div>".to_string(),
                Transition::ShowAnswer(rendered) => rendered.to_html(),
                Transition::AnswerFailed => return,
            };
            self.emit(&html);
            return;
        }

        let text = match transition {
            Transition::Status(message) => self.status_line(message),
            Transition::FileSelected(Some(name)) => format!("Selected file: {name}"),
            Transition::FileSelected(None) => BROWSE_PROMPT.to_string(),
            Transition::ShowQuestions(info) => format!(
                "{}\nAsk a question with `ask <question>`.",
                info.summary()
            ),
            Transition::BeginAnswer => "Thinking...".to_string(),
            Transition::ShowAnswer(rendered) => self.answer_block(rendered),
            Transition::AnswerFailed => return,
        };
        self.emit(&text);
    }

    fn notice(&mut self, message: &str) {
        let line = match self.markup {
            Markup::Html => format!("<p class=\"notice\">{}</p>", escape_html(message)),
            Markup::Plain | Markup::Ansi => format!("! {message}"),
        };
        self.emit(&line);
    }

    fn focus(&mut self, region: Region) {
        tracing::trace!(?region, "focus");
        self.emit("");
    }
}

pub fn render_inline(nodes: &[Inline], color: bool) -> String {
    let mut out = String::new();
    write_inline(nodes, color, (false, false), &mut out);
    out
}

fn write_inline(nodes: &[Inline], color: bool, style: (bool, bool), out: &mut String) {
    let (bold, italic) = style;
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(text),
            Inline::LineBreak => out.push('\n'),
            Inline::Strong(children) | Inline::Emphasis(children) if !color => {
                write_inline(children, color, style, out);
            }
            Inline::Strong(children) => {
                out.push_str(BOLD);
                write_inline(children, color, (true, italic), out);
                restore(style, out);
            }
            Inline::Emphasis(children) => {
                out.push_str(ITALIC);
                write_inline(children, color, (bold, true), out);
                restore(style, out);
            }
        }
    }
}

fn restore((bold, italic): (bool, bool), out: &mut String) {
    out.push_str(RESET);
    if bold {
        out.push_str(BOLD);
    }
    if italic {
        out.push_str(ITALIC);
    }
}
