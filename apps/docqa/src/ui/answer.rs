//! Answer region: the formatted answer followed by its citations.

use shared::protocol::{AnswerResult, Citation};

use crate::ui::format::{escape_html, Formatted};

pub const NO_SOURCES: &str = "No source chunks available";

#[derive(Debug, Clone, PartialEq)]
pub struct CitationBlock {
    pub page_number: u32,
    pub excerpt: Formatted,
    pub relevance: String,
}

impl CitationBlock {
    fn from_citation(citation: &Citation) -> Self {
        Self {
            page_number: citation.page_number,
            excerpt: Formatted::parse(&citation.excerpt_text),
            relevance: relevance_percent(citation.relevance_score),
        }
    }

    pub fn page_label(&self) -> String {
        format!("Page {}", self.page_number)
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"source-citation\"><div class=\"source-page\">{}</div><div class=\"source-text\">{}</div><div class=\"source-score\">Relevance: {}</div></div>",
            self.page_label(),
            self.excerpt.to_html(),
            escape_html(&self.relevance),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Citations {
    Blocks(Vec<CitationBlock>),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAnswer {
    pub answer: Formatted,
    pub citations: Citations,
    pub processing_time: Option<f64>,
}

impl RenderedAnswer {
    pub fn to_html(&self) -> String {
        let mut out = format!(
            "<div class=\"answer-content\">{}</div><div class=\"sources\">",
            self.answer.to_html()
        );
        match &self.citations {
            Citations::Blocks(blocks) => {
                for block in blocks {
                    out.push_str(&block.to_html());
                }
            }
            Citations::Placeholder(text) => {
                out.push_str(&format!("<p class=\"text-gray-500\">{text}</p>"));
            }
        }
        out.push_str("</div>");
        out
    }
}

/// Citations keep the order the backend sent them in.
pub fn render(result: &AnswerResult) -> RenderedAnswer {
    let citations = if result.citations.is_empty() {
        Citations::Placeholder(NO_SOURCES)
    } else {
        Citations::Blocks(
            result
                .citations
                .iter()
                .map(CitationBlock::from_citation)
                .collect(),
        )
    };

    RenderedAnswer {
        answer: Formatted::parse(&result.answer_text),
        citations,
        processing_time: result.processing_time,
    }
}

/// Two decimals, with exact ties rounded away from zero rather than to even.
pub fn relevance_percent(score: f64) -> String {
    format!("{:.2}%", away_from_even(score * 100.0))
}

fn away_from_even(value: f64) -> f64 {
    let scaled = value * 1000.0;
    let exact = value.mul_add(1000.0, -scaled) == 0.0;
    if exact && scaled.fract() == 0.0 && scaled.abs() % 10.0 == 5.0 {
        // One ulp further from zero lifts the value off the tie.
        f64::from_bits(value.to_bits() + 1)
    } else {
        value
    }
}

#[cfg(test)]
#[path = "tests/answer_tests.rs"]
mod tests;
