//! Client-held record of the document that questions are scoped to.

use shared::{domain::DocumentId, protocol::IngestionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub document_id: DocumentId,
    pub document_name: String,
}

/// Either holds a complete document identity or nothing.
///
/// `replace` is the only way to change it, so a half-written session cannot
/// exist. It is never cleared; a later successful ingestion overwrites it.
#[derive(Debug, Default, Clone)]
pub struct Session {
    current: Option<LoadedDocument>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.current.as_ref()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.current.as_ref().map(|doc| &doc.document_id)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn replace(&mut self, ingested: &IngestionResult) -> &LoadedDocument {
        self.current.insert(LoadedDocument {
            document_id: ingested.document_id.clone(),
            document_name: ingested.filename.clone(),
        })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
