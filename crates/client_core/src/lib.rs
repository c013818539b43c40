use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiErrorBody,
    protocol::{AnswerResult, IngestionResult, QueryRequest},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

mod session;
pub use session::{LoadedDocument, Session};

pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
pub const DEFAULT_ASK_PATH: &str = "/api/ask";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("HTTP error {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    #[error("{0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Parse(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!(": {detail}"),
        _ => String::new(),
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Parse(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// A document ready to be sent to the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The two calls the question-answering backend offers.
///
/// Each call issues exactly one request; failures are returned, never retried.
#[async_trait]
pub trait QaBackend: Send + Sync {
    async fn ingest(&self, upload: DocumentUpload) -> Result<IngestionResult, ClientError>;
    async fn ask(&self, request: &QueryRequest) -> Result<AnswerResult, ClientError>;
}

pub struct HttpQaBackend {
    http: Client,
    upload_url: Url,
    ask_url: Url,
}

impl HttpQaBackend {
    pub fn new(server_url: &str, upload_path: &str, ask_path: &str) -> Result<Self, ClientError> {
        let base = parse_url(server_url, None)?;
        Ok(Self {
            http: Client::new(),
            upload_url: parse_url(upload_path, Some(&base))?,
            ask_url: parse_url(ask_path, Some(&base))?,
        })
    }

    pub fn with_default_paths(server_url: &str) -> Result<Self, ClientError> {
        Self::new(server_url, DEFAULT_UPLOAD_PATH, DEFAULT_ASK_PATH)
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }
}

fn parse_url(raw: &str, base: Option<&Url>) -> Result<Url, ClientError> {
    let parsed = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw.trim()),
    };
    parsed.map_err(|source| ClientError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail: ApiErrorBody::from_body(&body).map(|body| body.message()),
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

#[async_trait]
impl QaBackend for HttpQaBackend {
    async fn ingest(&self, upload: DocumentUpload) -> Result<IngestionResult, ClientError> {
        let size_bytes = upload.bytes.len();
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename.clone())
            .mime_str(&upload.media_type)
            .map_err(|e| ClientError::InvalidUpload(e.to_string()))?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        info!(
            filename = %upload.filename,
            size_bytes,
            url = %self.upload_url,
            "ingest: sending document"
        );
        let outcome = match self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => decode_response::<IngestionResult>(response).await,
            Err(err) => Err(err.into()),
        };

        match &outcome {
            Ok(result) => info!(
                document_id = %result.document_id,
                pages = result.page_count,
                chunks = result.chunk_count,
                "ingest: document accepted"
            ),
            Err(err) => warn!(filename = %upload.filename, "ingest: failed: {err}"),
        }
        outcome
    }

    async fn ask(&self, request: &QueryRequest) -> Result<AnswerResult, ClientError> {
        info!(document_id = %request.document_id, url = %self.ask_url, "ask: sending question");
        let outcome = match self
            .http
            .post(self.ask_url.clone())
            .json(request)
            .send()
            .await
        {
            Ok(response) => decode_response::<AnswerResult>(response).await,
            Err(err) => Err(err.into()),
        };

        match &outcome {
            Ok(answer) => info!(
                document_id = %request.document_id,
                citations = answer.citations.len(),
                "ask: answer received"
            ),
            Err(err) => warn!(document_id = %request.document_id, "ask: failed: {err}"),
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
