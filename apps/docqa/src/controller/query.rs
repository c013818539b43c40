use client_core::Session;
use shared::protocol::QueryRequest;

use crate::controller::events::ValidationError;

/// Builds the request for a question, checking input before session state.
pub fn validate_question(raw: &str, session: &Session) -> Result<QueryRequest, ValidationError> {
    let question = raw.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    let document_id = session.document_id().ok_or(ValidationError::NoDocument)?;
    Ok(QueryRequest {
        question: question.to_string(),
        document_id: document_id.clone(),
    })
}

pub fn failure_notice(reason: &str) -> String {
    format!("Error: {reason}")
}
