use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::session::JobHandle;

/// Raised when a success payload carries neither a `sections` sequence nor a
/// flat `content` string. The session converts this into a terminal
/// `MALFORMED_RESULT` failure; it must never escape past the session.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed generation result: {0}")]
pub struct MalformedResult(pub String);

/// One block of the generated cover letter. `heading` is `None` for freeform
/// text the backend returned without a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    pub heading: Option<String>,
    pub body: String,
}

/// Canonical result of a finished generation job, built exactly once from the
/// first success payload and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub job_id: String,
    pub title: String,
    pub sections: Vec<DocumentSection>,
    /// Deterministic concatenation of the retained sections; this is the text
    /// handed to preview and download.
    pub flat_text: String,
    /// Server-rendered thumbnail path, when the backend produced one.
    pub preview_ref: Option<String>,
}

/// Candidate field names per backend response version, tried in order.
const HEADING_FIELDS: &[&str] = &["question", "title", "heading"];
const BODY_FIELDS: &[&str] = &["answer", "content", "body", "text"];

/// Collapse a success payload into a `GeneratedDocument`.
///
/// The backend has shipped several payload shapes; they are resolved in
/// priority order:
///
/// 1. a flat `content` string, used verbatim as `flat_text`;
/// 2. a `sections` array whose entries are either plain strings (body with no
///    heading) or objects carrying question/answer-like fields;
/// 3. anything else fails with [`MalformedResult`].
///
/// Object entries with an empty body are dropped. Flat-text blocks are
/// numbered `Q1.`, `Q2.`, ... over the *retained* sections, while the
/// fallback heading label `문항 {n}` counts original array positions.
pub fn normalize(job: &JobHandle, payload: &Value) -> Result<GeneratedDocument, MalformedResult> {
    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let preview_ref = payload
        .get("previewUrl")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(content) = payload.get("content").and_then(Value::as_str) {
        return Ok(GeneratedDocument {
            job_id: job.job_id.clone(),
            title,
            sections: vec![DocumentSection {
                heading: None,
                body: content.to_string(),
            }],
            flat_text: content.to_string(),
            preview_ref,
        });
    }

    let Some(entries) = payload.get("sections").and_then(Value::as_array) else {
        return Err(MalformedResult(
            "payload has neither a `sections` array nor a `content` string".to_string(),
        ));
    };

    let sections: Vec<DocumentSection> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| resolve_section(idx, entry))
        .collect();

    let flat_text = sections
        .iter()
        .enumerate()
        .map(|(n, section)| match &section.heading {
            Some(heading) => format!("Q{}. {heading}\n{}", n + 1, section.body),
            None => section.body.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(GeneratedDocument {
        job_id: job.job_id.clone(),
        title,
        sections,
        flat_text,
        preview_ref,
    })
}

/// Resolve one raw `sections` entry, or `None` if it contributes nothing.
/// `idx` is the zero-based position in the original array.
fn resolve_section(idx: usize, entry: &Value) -> Option<DocumentSection> {
    match entry {
        Value::String(text) if !text.is_empty() => Some(DocumentSection {
            heading: None,
            body: text.clone(),
        }),
        Value::Object(fields) => {
            let body = first_string(fields, BODY_FIELDS)?;
            let heading = first_string(fields, HEADING_FIELDS)
                .unwrap_or_else(|| format!("문항 {}", idx + 1));
            Some(DocumentSection {
                heading: Some(heading),
                body,
            })
        }
        _ => None,
    }
}

/// First non-empty string among the given fields, in order.
fn first_string(fields: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        fields
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
