use super::*;
use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use client_core::ClientError;
use crossbeam_channel::bounded;
use shared::{
    domain::DocumentId,
    protocol::{AnswerResult, IngestionResult},
};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct FakeBackend {
    uploads: Mutex<Vec<DocumentUpload>>,
    malformed_answers: bool,
}

#[async_trait]
impl QaBackend for FakeBackend {
    async fn ingest(&self, upload: DocumentUpload) -> Result<IngestionResult, ClientError> {
        let filename = upload.filename.clone();
        self.uploads.lock().expect("uploads lock").push(upload);
        Ok(IngestionResult {
            document_id: DocumentId::from("abc"),
            filename,
            page_count: 10,
            chunk_count: 42,
            processing_time: None,
        })
    }

    async fn ask(&self, request: &QueryRequest) -> Result<AnswerResult, ClientError> {
        if self.malformed_answers {
            return Err(ClientError::Parse("expected a string".to_string()));
        }
        Ok(AnswerResult {
            answer_text: format!("answer to {}", request.question),
            citations: Vec::new(),
            processing_time: None,
        })
    }
}

fn start(backend: Arc<FakeBackend>) -> (Sender<BackendCommand>, Receiver<UiEvent>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let handle = launch(backend, cmd_rx, ui_tx).expect("launch backend worker");
    (cmd_tx, ui_rx, handle)
}

fn stop(cmd_tx: Sender<BackendCommand>, handle: JoinHandle<()>) {
    cmd_tx.send(BackendCommand::Shutdown).expect("send shutdown");
    handle.join().expect("worker exits");
}

#[test]
fn ingest_reads_file_and_reports_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("f.pdf");
    std::fs::write(&path, b"%PDF-1.4 bytes").expect("write pdf");

    let backend = Arc::new(FakeBackend::default());
    let (cmd_tx, ui_rx, handle) = start(Arc::clone(&backend));

    cmd_tx
        .send(BackendCommand::Ingest {
            token: 7,
            file: SelectedFile::from_path(&path),
        })
        .expect("send ingest");

    match ui_rx.recv_timeout(WAIT).expect("event") {
        UiEvent::DocumentIngested { token, result } => {
            assert_eq!(token, 7);
            assert_eq!(result.filename, "f.pdf");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    {
        let uploads = backend.uploads.lock().expect("uploads lock");
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bytes, b"%PDF-1.4 bytes".to_vec());
        assert_eq!(uploads[0].media_type, "application/pdf");
    }
    stop(cmd_tx, handle);
}

#[test]
fn unreadable_file_fails_without_calling_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = Arc::new(FakeBackend::default());
    let (cmd_tx, ui_rx, handle) = start(Arc::clone(&backend));

    cmd_tx
        .send(BackendCommand::Ingest {
            token: 1,
            file: SelectedFile::from_path(dir.path().join("missing.pdf")),
        })
        .expect("send ingest");

    match ui_rx.recv_timeout(WAIT).expect("event") {
        UiEvent::RequestFailed { token, error } => {
            assert_eq!(token, 1);
            assert_eq!(error.context(), UiErrorContext::Upload);
            assert_eq!(error.category(), UiErrorCategory::Transport);
            assert!(error.message().contains("missing.pdf"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(backend.uploads.lock().expect("uploads lock").is_empty());
    stop(cmd_tx, handle);
}

#[test]
fn ask_failure_is_classified_for_the_ask_context() {
    let backend = Arc::new(FakeBackend {
        malformed_answers: true,
        ..FakeBackend::default()
    });
    let (cmd_tx, ui_rx, handle) = start(backend);

    cmd_tx
        .send(BackendCommand::Ask {
            token: 3,
            request: QueryRequest {
                question: "What is X?".to_string(),
                document_id: DocumentId::from("abc"),
            },
        })
        .expect("send ask");

    match ui_rx.recv_timeout(WAIT).expect("event") {
        UiEvent::RequestFailed { token, error } => {
            assert_eq!(token, 3);
            assert_eq!(error.context(), UiErrorContext::Ask);
            assert_eq!(error.category(), UiErrorCategory::Parse);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    stop(cmd_tx, handle);
}

#[test]
fn completions_wait_for_room_in_a_full_event_queue() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(1);
    let handle = launch(Arc::new(FakeBackend::default()), cmd_rx, ui_tx).expect("launch");

    for token in 1..=3 {
        cmd_tx
            .send(BackendCommand::Ask {
                token,
                request: QueryRequest {
                    question: format!("question {token}"),
                    document_id: DocumentId::from("abc"),
                },
            })
            .expect("send ask");
    }
    // Let every task finish while the queue only has room for one event.
    std::thread::sleep(Duration::from_millis(200));

    let mut tokens: Vec<RequestToken> = (0..3)
        .map(|_| match ui_rx.recv_timeout(WAIT).expect("event") {
            UiEvent::AnswerReceived { token, .. } => token,
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    tokens.sort_unstable();
    assert_eq!(tokens, vec![1, 2, 3]);
    stop(cmd_tx, handle);
}
