//! Single status region for the upload workflow.

use crate::ui::format::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

impl StatusKind {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            StatusKind::Success => Some("status-success"),
            StatusKind::Error => Some("status-error"),
            StatusKind::Loading => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn loading(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Loading, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }

    pub fn to_html(&self) -> String {
        let class = match self.kind.css_class() {
            Some(extra) => format!("status {extra}"),
            None => "status".to_string(),
        };
        let text = escape_html(&self.text);
        match self.kind {
            StatusKind::Loading => format!(
                "<div class=\"{class}\"><div class=\"flex items-center\"><div class=\"loader\"></div><span>{text}</span></div></div>"
            ),
            _ => format!("<div class=\"{class}\">{text}</div>"),
        }
    }
}

/// Holds at most one message; each `show` replaces whatever was there.
#[derive(Debug, Default)]
pub struct StatusRegion {
    current: Option<StatusMessage>,
}

impl StatusRegion {
    pub fn show(&mut self, message: StatusMessage) -> &StatusMessage {
        self.current.insert(message)
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }
}
