//! Backend events and error modeling for the page controller.

use client_core::ClientError;
use shared::protocol::{AnswerResult, IngestionResult};
use thiserror::Error;

/// Increases with every dispatched request; the controller only accepts the
/// completion of the most recent request of each kind.
pub type RequestToken = u64;

#[derive(Debug)]
pub enum UiEvent {
    DocumentIngested {
        token: RequestToken,
        result: IngestionResult,
    },
    AnswerReceived {
        token: RequestToken,
        result: AnswerResult,
    },
    RequestFailed {
        token: RequestToken,
        error: UiError,
    },
}

/// Bad or missing user input, caught before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a PDF file first.")]
    NoFile,
    #[error("Please upload a valid PDF file.")]
    WrongType { media_type: String },
    #[error("Please enter a question.")]
    EmptyQuestion,
    #[error("Please upload a PDF first.")]
    NoDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Parse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Upload,
    Ask,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Parse(_) => UiErrorCategory::Parse,
            ClientError::InvalidUrl { .. } | ClientError::InvalidUpload(_) => {
                UiErrorCategory::Validation
            }
            ClientError::Status { .. } | ClientError::Transport(_) => UiErrorCategory::Transport,
        };
        Self::new(category, context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
