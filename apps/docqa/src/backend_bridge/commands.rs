//! Backend commands queued from UI to backend worker.

use shared::protocol::QueryRequest;

use crate::controller::{events::RequestToken, upload::SelectedFile};

#[derive(Debug)]
pub enum BackendCommand {
    Ingest {
        token: RequestToken,
        file: SelectedFile,
    },
    Ask {
        token: RequestToken,
        request: QueryRequest,
    },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Ingest { .. } => "ingest",
            BackendCommand::Ask { .. } => "ask",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
