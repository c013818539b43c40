use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::DocumentId;

/// Response of the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    #[serde(rename = "pdf_id", alias = "documentId")]
    pub document_id: DocumentId,
    pub filename: String,
    #[serde(rename = "num_pages", alias = "pageCount")]
    pub page_count: u32,
    #[serde(rename = "num_chunks", alias = "chunkCount")]
    pub chunk_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(rename = "pdf_id")]
    pub document_id: DocumentId,
}

/// Response of the query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(rename = "answer")]
    pub answer_text: String,
    /// Ordered as ranked by the backend.
    #[serde(
        rename = "source_chunks",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub page_number: u32,
    #[serde(rename = "text")]
    pub excerpt_text: String,
    /// Relevance in `[0, 1]`.
    #[serde(rename = "score")]
    pub relevance_score: f64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Citation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Citation>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_result_reads_backend_field_names() {
        let parsed: IngestionResult = serde_json::from_str(
            r#"{"pdf_id":"abc","filename":"f.pdf","num_pages":10,"num_chunks":42,"processing_time":1.5}"#,
        )
        .expect("parse");
        assert_eq!(parsed.document_id, DocumentId::from("abc"));
        assert_eq!(parsed.page_count, 10);
        assert_eq!(parsed.chunk_count, 42);
        assert_eq!(parsed.processing_time, Some(1.5));
    }

    #[test]
    fn ingestion_result_accepts_camel_case_aliases() {
        let parsed: IngestionResult = serde_json::from_str(
            r#"{"documentId":"abc","filename":"f.pdf","pageCount":10,"chunkCount":42}"#,
        )
        .expect("parse");
        assert_eq!(parsed.document_id.as_str(), "abc");
        assert_eq!(parsed.processing_time, None);
    }

    #[test]
    fn ingestion_result_rejects_negative_counts() {
        let parsed = serde_json::from_str::<IngestionResult>(
            r#"{"pdf_id":"abc","filename":"f.pdf","num_pages":-1,"num_chunks":42}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn query_request_uses_pdf_id_on_the_wire() {
        let request = QueryRequest {
            question: "What is X?".to_string(),
            document_id: DocumentId::from("abc"),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"question": "What is X?", "pdf_id": "abc"})
        );
    }

    #[test]
    fn missing_or_null_source_chunks_become_empty() {
        let absent: AnswerResult = serde_json::from_str(r#"{"answer":"X"}"#).expect("absent");
        assert!(absent.citations.is_empty());

        let null: AnswerResult =
            serde_json::from_str(r#"{"answer":"X","source_chunks":null}"#).expect("null");
        assert!(null.citations.is_empty());
    }

    #[test]
    fn source_chunks_keep_backend_order() {
        let parsed: AnswerResult = serde_json::from_str(
            r#"{"answer":"X","source_chunks":[
                {"page_number":3,"text":"third","score":0.5},
                {"page_number":1,"text":"first","score":0.9}
            ]}"#,
        )
        .expect("parse");
        let pages: Vec<u32> = parsed.citations.iter().map(|c| c.page_number).collect();
        assert_eq!(pages, vec![3, 1]);
        assert_eq!(parsed.citations[0].excerpt_text, "third");
    }
}
