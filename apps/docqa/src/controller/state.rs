//! Page state and the single transition function that mutates it.

use shared::{domain::DocumentId, protocol::IngestionResult};

use crate::ui::{
    answer::RenderedAnswer,
    format::escape_html,
    status::{StatusKind, StatusMessage, StatusRegion},
};

/// Identity and size of the document shown in the questions region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub document_id: DocumentId,
    pub filename: String,
    pub page_count: u32,
    pub chunk_count: u32,
}

impl DocumentInfo {
    pub fn summary(&self) -> String {
        format!(
            "Current PDF: {} · {} pages · {} chunks · ID: {}",
            self.filename, self.page_count, self.chunk_count, self.document_id
        )
    }

    pub fn to_html(&self) -> String {
        format!(
            "<span class=\"font-medium\">Current PDF:</span> <span class=\"tag\">{}</span> <span class=\"text-gray-500\">{} pages · {} chunks · ID: {}</span>",
            escape_html(&self.filename),
            self.page_count,
            self.chunk_count,
            escape_html(self.document_id.as_str()),
        )
    }
}

impl From<&IngestionResult> for DocumentInfo {
    fn from(value: &IngestionResult) -> Self {
        Self {
            document_id: value.document_id.clone(),
            filename: value.filename.clone(),
            page_count: value.page_count,
            chunk_count: value.chunk_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Status(StatusMessage),
    FileSelected(Option<String>),
    ShowQuestions(DocumentInfo),
    BeginAnswer,
    ShowAnswer(RenderedAnswer),
    AnswerFailed,
}

/// What the page is showing, derived from [`PageState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    StatusMessage(StatusKind, String),
    QuestionsVisible,
    AnswerLoading,
    AnswerVisible,
}

#[derive(Debug, Default)]
pub struct AnswerPanel {
    loading: bool,
    visible: bool,
    content: Option<RenderedAnswer>,
}

impl AnswerPanel {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last successfully rendered answer, kept even while hidden.
    pub fn content(&self) -> Option<&RenderedAnswer> {
        self.content.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct PageState {
    status: StatusRegion,
    file_label: Option<String>,
    document: Option<DocumentInfo>,
    answer: AnswerPanel,
}

impl PageState {
    pub fn apply(&mut self, transition: &Transition) {
        match transition {
            Transition::Status(message) => {
                self.status.show(message.clone());
            }
            Transition::FileSelected(label) => self.file_label = label.clone(),
            Transition::ShowQuestions(info) => self.document = Some(info.clone()),
            Transition::BeginAnswer => {
                self.answer.loading = true;
                self.answer.visible = false;
            }
            Transition::ShowAnswer(rendered) => {
                self.answer.loading = false;
                self.answer.visible = true;
                self.answer.content = Some(rendered.clone());
            }
            Transition::AnswerFailed => self.answer.loading = false,
        }
    }

    pub fn ui_state(&self) -> UiState {
        if self.answer.is_loading() {
            UiState::AnswerLoading
        } else if self.answer.is_visible() {
            UiState::AnswerVisible
        } else if self.document.is_some() {
            UiState::QuestionsVisible
        } else if let Some(message) = self.status.current() {
            UiState::StatusMessage(message.kind, message.text.clone())
        } else {
            UiState::Idle
        }
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.current()
    }

    pub fn file_label(&self) -> Option<&str> {
        self.file_label.as_deref()
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn answer(&self) -> &AnswerPanel {
        &self.answer
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
