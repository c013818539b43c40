use std::{net::SocketAddr, path::Path, sync::Arc, thread::JoinHandle, time::Duration};

use axum::{
    extract::Multipart, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use client_core::HttpQaBackend;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::{events::UiEvent, state::UiState, upload::SelectedFile, PageController};
use crate::ui::{
    status::StatusKind,
    terminal::{Markup, TerminalSurface},
};

const WAIT: Duration = Duration::from_secs(5);

async fn upload(mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let _ = field.bytes().await.expect("field bytes");
    }
    Json(json!({
        "pdf_id": "abc",
        "filename": "f.pdf",
        "num_pages": 10,
        "num_chunks": 42
    }))
}

async fn ask(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["pdf_id"], "abc");
    Json(json!({
        "answer": "**It is Y**",
        "source_chunks": [{"page_number": 2, "text": "Y is on this page.", "score": 0.87}]
    }))
}

async fn failing_upload(mut multipart: Multipart) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let _ = field.bytes().await.expect("field bytes");
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "Error processing PDF: boom"})),
    )
}

struct Harness {
    _server: tokio::runtime::Runtime,
    controller: PageController<TerminalSurface<Vec<u8>>>,
    ui_rx: Receiver<UiEvent>,
    cmd_tx: Sender<BackendCommand>,
    worker: Option<JoinHandle<()>>,
    _dir: tempfile::TempDir,
    pdf: std::path::PathBuf,
}

impl Harness {
    fn start(upload_path: &str) -> Self {
        let server = tokio::runtime::Runtime::new().expect("server runtime");
        let addr: SocketAddr = server.block_on(async {
            let app = Router::new()
                .route("/api/upload", post(upload))
                .route("/api/ask", post(ask))
                .route("/broken/upload", post(failing_upload));
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("local addr");
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("serve");
            });
            addr
        });

        let backend = HttpQaBackend::new(&format!("http://{addr}"), upload_path, "/api/ask")
            .expect("backend");
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let worker = runtime::launch(Arc::new(backend), cmd_rx, ui_tx).expect("launch");

        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = dir.path().join("f.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 test").expect("write pdf");

        let surface = TerminalSurface::new(Vec::new(), Markup::Plain);
        Self {
            _server: server,
            controller: PageController::new(cmd_tx.clone(), surface, "pdf"),
            ui_rx,
            cmd_tx,
            worker: Some(worker),
            _dir: dir,
            pdf,
        }
    }

    fn settle(&mut self) {
        while self.controller.has_pending_requests() {
            let event = self.ui_rx.recv_timeout(WAIT).expect("backend event");
            self.controller.handle_event(event);
        }
    }

    fn upload(&mut self, path: &Path) {
        self.controller.select_file(Some(SelectedFile::from_path(path)));
        self.controller.submit_selected_document().expect("valid document");
        self.settle();
    }

    fn output(&self) -> String {
        String::from_utf8(self.controller.surface().written().clone()).expect("utf8")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.ui_rx = crossbeam_channel::never();
        let _ = self.cmd_tx.send(BackendCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[test]
fn upload_then_ask_over_http() {
    let mut harness = Harness::start("/api/upload");
    let pdf = harness.pdf.clone();
    harness.upload(&pdf);

    let loaded = harness.controller.session().document().expect("session loaded");
    assert_eq!(loaded.document_id.as_str(), "abc");
    assert_eq!(loaded.document_name, "f.pdf");
    let status = harness.controller.page().status().expect("status shown");
    assert_eq!(status.kind, StatusKind::Success);
    assert!(status.text.contains("42 chunks"));
    assert!(status.text.contains("10 pages"));

    harness.controller.submit_question("What is X?").expect("valid question");
    assert_eq!(harness.controller.ui_state(), UiState::AnswerLoading);
    harness.settle();

    assert_eq!(harness.controller.ui_state(), UiState::AnswerVisible);
    let output = harness.output();
    assert!(output.contains("Uploading and processing PDF..."));
    assert!(output.contains("It is Y"));
    assert!(output.contains("Page 2 (Relevance: 87.00%)"));
}

#[test]
fn server_error_keeps_session_empty() {
    let mut harness = Harness::start("/broken/upload");
    let pdf = harness.pdf.clone();
    harness.upload(&pdf);

    assert!(harness.controller.session().document().is_none());
    let status = harness.controller.page().status().expect("status shown");
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(
        status.text,
        "Error uploading PDF: HTTP error 500: Error processing PDF: boom"
    );

    assert!(harness.controller.submit_question("What is X?").is_err());
    assert!(harness.output().contains("! Please upload a PDF first."));
}
