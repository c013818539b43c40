//! Document selection and the checks run before an ingestion request.

use std::path::{Path, PathBuf};

use shared::protocol::IngestionResult;

use crate::controller::events::ValidationError;

pub const UPLOADING: &str = "Uploading and processing PDF...";
pub const BROWSE_PROMPT: &str = "Drag & Drop or Click to browse";

/// A file chosen by the user. Contents are read only when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    /// Declared media type, guessed from the file extension.
    pub media_type: Option<String>,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = guess_media_type(&path);
        Self {
            path,
            name,
            media_type,
        }
    }
}

fn guess_media_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Runs the upload checks in order and stops at the first failure.
pub fn validate_document(
    file: Option<SelectedFile>,
    accepted_media_type: &str,
) -> Result<SelectedFile, ValidationError> {
    let file = file.ok_or(ValidationError::NoFile)?;
    let declared = file.media_type.as_deref().unwrap_or_default();
    if !declared.contains(accepted_media_type) {
        return Err(ValidationError::WrongType {
            media_type: declared.to_string(),
        });
    }
    Ok(file)
}

pub fn success_message(result: &IngestionResult) -> String {
    let mut message = format!(
        "PDF uploaded successfully! {} chunks extracted from {} pages.",
        result.chunk_count, result.page_count
    );
    if let Some(seconds) = result.processing_time {
        message.push_str(&format!(" Processed in {seconds:.2}s."));
    }
    message
}

pub fn failure_message(reason: &str) -> String {
    format!("Error uploading PDF: {reason}")
}
