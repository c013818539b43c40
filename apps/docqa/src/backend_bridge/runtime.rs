//! Runtime bridge between UI command queue and backend event intake.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::{DocumentUpload, QaBackend};
use crossbeam_channel::{Receiver, Sender};
use shared::protocol::QueryRequest;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{RequestToken, UiError, UiErrorCategory, UiErrorContext, UiEvent},
    upload::SelectedFile,
};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Starts the worker thread. Each command runs as its own task, so a second
/// request can be in flight before the first one completes.
pub fn launch(
    backend: Arc<dyn QaBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("docqa-backend".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        BackendCommand::Ingest { token, file } => {
                            let backend = Arc::clone(&backend);
                            let ui_tx = ui_tx.clone();
                            tokio::spawn(async move {
                                let event = ingest(backend.as_ref(), token, file).await;
                                forward(&ui_tx, event);
                            });
                        }
                        BackendCommand::Ask { token, request } => {
                            let backend = Arc::clone(&backend);
                            let ui_tx = ui_tx.clone();
                            tokio::spawn(async move {
                                let event = ask(backend.as_ref(), token, request).await;
                                forward(&ui_tx, event);
                            });
                        }
                        BackendCommand::Shutdown => break,
                    }
                }
                tracing::debug!("backend worker stopping");
            });
        })
}

async fn ingest(backend: &dyn QaBackend, token: RequestToken, file: SelectedFile) -> UiEvent {
    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %file.path.display(), "failed to read selected file: {err}");
            return UiEvent::RequestFailed {
                token,
                error: UiError::new(
                    UiErrorCategory::Transport,
                    UiErrorContext::Upload,
                    format!("failed to read {}: {err}", file.path.display()),
                ),
            };
        }
    };

    let upload = DocumentUpload {
        filename: file.name,
        media_type: file
            .media_type
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string()),
        bytes,
    };
    match backend.ingest(upload).await {
        Ok(result) => UiEvent::DocumentIngested { token, result },
        Err(err) => UiEvent::RequestFailed {
            token,
            error: UiError::from_client(UiErrorContext::Upload, &err),
        },
    }
}

async fn ask(backend: &dyn QaBackend, token: RequestToken, request: QueryRequest) -> UiEvent {
    match backend.ask(&request).await {
        Ok(result) => UiEvent::AnswerReceived { token, result },
        Err(err) => UiEvent::RequestFailed {
            token,
            error: UiError::from_client(UiErrorContext::Ask, &err),
        },
    }
}

/// Completions are never dropped while the controller is listening: a full
/// queue blocks this task until the controller catches up, since the
/// controller waits on every pending token.
fn forward(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if tokio::task::block_in_place(|| ui_tx.send(event)).is_err() {
        tracing::debug!("ui event receiver closed; dropping event");
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
