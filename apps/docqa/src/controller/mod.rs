//! Controller layer: UI events, explicit page state transitions, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod query;
pub mod state;
pub mod upload;

use client_core::Session;
use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::ui::{answer, status::StatusMessage, Region, Surface};
use events::{RequestToken, UiErrorContext, UiEvent, ValidationError};
use orchestration::dispatch_backend_command;
use state::{DocumentInfo, PageState, Transition, UiState};
use upload::SelectedFile;

/// Owns the session and the page state. Every response passes through
/// `handle_event`, which is the only place the session changes.
pub struct PageController<S: Surface> {
    accepted_media_type: String,
    session: Session,
    page: PageState,
    selected_file: Option<SelectedFile>,
    cmd_tx: Sender<BackendCommand>,
    surface: S,
    last_token: RequestToken,
    pending_ingestion: Option<RequestToken>,
    pending_question: Option<RequestToken>,
}

impl<S: Surface> PageController<S> {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        surface: S,
        accepted_media_type: impl Into<String>,
    ) -> Self {
        Self {
            accepted_media_type: accepted_media_type.into(),
            session: Session::new(),
            page: PageState::default(),
            selected_file: None,
            cmd_tx,
            surface,
            last_token: 0,
            pending_ingestion: None,
            pending_question: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn ui_state(&self) -> UiState {
        self.page.ui_state()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn has_pending_requests(&self) -> bool {
        self.pending_ingestion.is_some() || self.pending_question.is_some()
    }

    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let label = file.as_ref().map(|file| file.name.clone());
        self.selected_file = file;
        self.transition(Transition::FileSelected(label));
    }

    pub fn submit_selected_document(&mut self) -> Result<RequestToken, ValidationError> {
        self.submit_document(self.selected_file.clone())
    }

    pub fn submit_document(
        &mut self,
        file: Option<SelectedFile>,
    ) -> Result<RequestToken, ValidationError> {
        let file = match upload::validate_document(file, &self.accepted_media_type) {
            Ok(file) => file,
            Err(err) => {
                if let ValidationError::WrongType { media_type } = &err {
                    debug!(%media_type, accepted = %self.accepted_media_type, "upload: rejected file type");
                }
                self.transition(Transition::Status(StatusMessage::error(err.to_string())));
                return Err(err);
            }
        };

        self.transition(Transition::Status(StatusMessage::loading(upload::UPLOADING)));
        let token = self.next_token();
        info!(token, file = %file.name, "upload: dispatching");
        match dispatch_backend_command(&self.cmd_tx, BackendCommand::Ingest { token, file }) {
            Ok(()) => self.pending_ingestion = Some(token),
            Err(err) => {
                warn!(token, "upload: dispatch failed: {err}");
                self.transition(Transition::Status(StatusMessage::error(
                    upload::failure_message(&err.to_string()),
                )));
            }
        }
        Ok(token)
    }

    pub fn submit_question(&mut self, raw: &str) -> Result<RequestToken, ValidationError> {
        let request = match query::validate_question(raw, &self.session) {
            Ok(request) => request,
            Err(err) => {
                self.surface.notice(&err.to_string());
                return Err(err);
            }
        };

        self.transition(Transition::BeginAnswer);
        let token = self.next_token();
        info!(token, document_id = %request.document_id, "ask: dispatching");
        match dispatch_backend_command(&self.cmd_tx, BackendCommand::Ask { token, request }) {
            Ok(()) => self.pending_question = Some(token),
            Err(err) => {
                warn!(token, "ask: dispatch failed: {err}");
                self.transition(Transition::AnswerFailed);
                self.surface.notice(&query::failure_notice(&err.to_string()));
            }
        }
        Ok(token)
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::DocumentIngested { token, result } => {
                if !accept(&mut self.pending_ingestion, token) {
                    debug!(token, "upload: dropping stale response");
                    return;
                }
                let loaded = self.session.replace(&result);
                info!(token, document_id = %loaded.document_id, "upload: session updated");
                self.transition(Transition::Status(StatusMessage::success(
                    upload::success_message(&result),
                )));
                self.transition(Transition::ShowQuestions(DocumentInfo::from(&result)));
                self.surface.focus(Region::Questions);
            }
            UiEvent::AnswerReceived { token, result } => {
                if !accept(&mut self.pending_question, token) {
                    debug!(token, "ask: dropping stale response");
                    return;
                }
                self.transition(Transition::ShowAnswer(answer::render(&result)));
                self.surface.focus(Region::Answer);
            }
            UiEvent::RequestFailed { token, error } => match error.context() {
                UiErrorContext::Upload => {
                    if !accept(&mut self.pending_ingestion, token) {
                        debug!(token, "upload: dropping stale failure");
                        return;
                    }
                    warn!(token, category = ?error.category(), "upload failed: {}", error.message());
                    self.transition(Transition::Status(StatusMessage::error(
                        upload::failure_message(error.message()),
                    )));
                }
                UiErrorContext::Ask => {
                    if !accept(&mut self.pending_question, token) {
                        debug!(token, "ask: dropping stale failure");
                        return;
                    }
                    warn!(token, category = ?error.category(), "ask failed: {}", error.message());
                    self.transition(Transition::AnswerFailed);
                    self.surface
                        .notice(&query::failure_notice(error.message()));
                }
            },
        }
    }

    fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        self.last_token
    }

    fn transition(&mut self, transition: Transition) {
        self.page.apply(&transition);
        self.surface.present(&transition);
    }
}

/// Clears `pending` and returns true only when `token` is the request it is waiting on.
fn accept(pending: &mut Option<RequestToken>, token: RequestToken) -> bool {
    if *pending == Some(token) {
        *pending = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
