//! Google Drive v3 / Docs v1 REST implementation of [`DriveService`].

use async_trait::async_trait;
use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use reqwest::Url;

use super::http::{GoogleApi, Media, base_url, endpoint};
use super::{
    CreatedDocument, DOC_MIME, DriveFile, DriveService, FileContent, FileType, SHEET_MIME,
    SLIDES_MIME, icon_for_mime,
};

const LIST_FIELDS: &str = "files(id, name, mimeType, modifiedTime, webViewLink, iconLink, size, owners)";

/// Shown in place of content that could not be read as text.
pub const UNREADABLE_CONTENT: &str =
    "[Unable to read file content. File may be binary or too large.]";

/// Download cap for plain files. The tool layer keeps 10 000 characters,
/// which is at most 40 000 bytes of UTF-8.
const MEDIA_BYTE_LIMIT: usize = 48 * 1024;

pub struct GoogleDriveService {
    drive: GoogleApi,
    docs: GoogleApi,
    drive_base: Url,
    docs_base: Url,
}

impl GoogleDriveService {
    pub fn new(drive_base: &str, docs_base: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            drive: GoogleApi::new("drive", timeout)?,
            docs: GoogleApi::new("docs", timeout)?,
            drive_base: base_url(drive_base)?,
            docs_base: base_url(docs_base)?,
        })
    }

    fn file_url(&self, id: &str) -> Result<Url, ServiceError> {
        endpoint(&self.drive_base, &["files", id])
    }

    async fn export(
        &self,
        session: &SessionContext,
        id: &str,
        mime_type: &str,
    ) -> Result<String, ServiceError> {
        self.drive
            .get_text(
                session,
                endpoint(&self.drive_base, &["files", id, "export"])?,
                &[("mimeType", mime_type.to_string())],
            )
            .await
    }

    async fn document_text(&self, session: &SessionContext, id: &str) -> Result<String, ServiceError> {
        let document: Value = self
            .docs
            .get_json(session, endpoint(&self.docs_base, &["documents", id])?, &[])
            .await?;
        Ok(document_text(&document))
    }
}

#[async_trait]
impl DriveService for GoogleDriveService {
    async fn list_files(
        &self,
        session: &SessionContext,
        name_query: Option<&str>,
        file_type: Option<FileType>,
        max_results: u32,
    ) -> Result<Vec<DriveFile>, ServiceError> {
        let list: ApiFileList = self
            .drive
            .get_json(
                session,
                endpoint(&self.drive_base, &["files"])?,
                &[
                    ("q", build_query(name_query, file_type)),
                    ("pageSize", max_results.to_string()),
                    ("fields", LIST_FIELDS.to_string()),
                    ("orderBy", "modifiedTime desc".to_string()),
                ],
            )
            .await?;
        Ok(list.files.into_iter().map(ApiFile::into_file).collect())
    }

    async fn file_content(
        &self,
        session: &SessionContext,
        id: &str,
    ) -> Result<FileContent, ServiceError> {
        let meta: ApiFile = self
            .drive
            .get_json(
                session,
                self.file_url(id)?,
                &[("fields", "id, name, mimeType, webViewLink".to_string())],
            )
            .await?;

        let content = match meta.mime_type.as_str() {
            DOC_MIME => self.document_text(session, id).await?,
            SHEET_MIME => self.export(session, id, "text/csv").await?,
            SLIDES_MIME => self.export(session, id, "text/plain").await?,
            _ => match self
                .drive
                .get_media(
                    session,
                    self.file_url(id)?,
                    &[("alt", "media".to_string())],
                    MEDIA_BYTE_LIMIT,
                )
                .await
            {
                Ok(media) => media_text(media, &meta.mime_type).unwrap_or_else(|| {
                    debug!(file = id, mime = %meta.mime_type, "Not a text file, returning placeholder");
                    UNREADABLE_CONTENT.to_string()
                }),
                Err(e) => {
                    debug!(file = id, error = %e, "Download failed, returning placeholder");
                    UNREADABLE_CONTENT.to_string()
                }
            },
        };

        Ok(FileContent {
            icon: icon_for_mime(&meta.mime_type).to_string(),
            id: meta.id,
            name: meta.name,
            mime_type: meta.mime_type,
            web_view_link: meta.web_view_link,
            content,
        })
    }

    async fn create_document(
        &self,
        session: &SessionContext,
        title: &str,
        content: Option<&str>,
    ) -> Result<CreatedDocument, ServiceError> {
        let created: ApiDocument = self
            .docs
            .post_json(
                session,
                endpoint(&self.docs_base, &["documents"])?,
                &[],
                &json!({ "title": title }),
            )
            .await?;

        let has_content = content.is_some_and(|c| !c.is_empty());
        if let Some(text) = content.filter(|c| !c.is_empty()) {
            let batch_update = format!("{}:batchUpdate", created.document_id);
            let _: Value = self
                .docs
                .post_json(
                    session,
                    endpoint(&self.docs_base, &["documents", batch_update.as_str()])?,
                    &[],
                    &json!({
                        "requests": [
                            { "insertText": { "location": { "index": 1 }, "text": text } }
                        ]
                    }),
                )
                .await?;
        }

        let link: ApiFile = self
            .drive
            .get_json(
                session,
                self.file_url(&created.document_id)?,
                &[("fields", "id, name, mimeType, webViewLink".to_string())],
            )
            .await?;

        Ok(CreatedDocument {
            id: created.document_id,
            title: created.title.unwrap_or_else(|| title.to_string()),
            web_view_link: link.web_view_link,
            has_content,
        })
    }
}

/// Whether a MIME type names content that is readable as text.
fn is_textual(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/")
        || essence.ends_with("+json")
        || essence.ends_with("+xml")
        || matches!(
            essence.as_str(),
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/x-yaml"
                | "application/yaml"
                | "application/csv"
        )
}

/// Decode a downloaded body as text. `None` for binary types and for bytes
/// that are not UTF-8; a character split by the download cap is dropped.
fn media_text(media: Media, file_mime: &str) -> Option<String> {
    let mime = media.content_type.as_deref().unwrap_or(file_mime);
    if !is_textual(mime) {
        return None;
    }
    match String::from_utf8(media.bytes) {
        Ok(text) => Some(text),
        Err(e) if media.truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8(bytes).ok()
        }
        Err(_) => None,
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build the Drive `q` parameter.
fn build_query(name_query: Option<&str>, file_type: Option<FileType>) -> String {
    let mut clauses = Vec::new();
    if let Some(q) = name_query {
        let q = escape_literal(q);
        clauses.push(format!("(name contains '{q}' or fullText contains '{q}')"));
    }
    if let Some(ft) = file_type {
        clauses.push(ft.mime_clause());
    }
    clauses.push("trashed = false".to_string());
    clauses.join(" and ")
}

/// Concatenate the text runs of a Docs document body.
fn document_text(document: &Value) -> String {
    let mut text = String::new();
    let Some(content) = document["body"]["content"].as_array() else {
        return text;
    };
    for element in content {
        let Some(runs) = element["paragraph"]["elements"].as_array() else {
            continue;
        };
        for run in runs {
            if let Some(s) = run["textRun"]["content"].as_str() {
                text.push_str(s);
            }
        }
    }
    text
}

// --- Drive / Docs API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiFileList {
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    modified_time: Option<String>,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    owners: Vec<ApiOwner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiOwner {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocument {
    document_id: String,
    #[serde(default)]
    title: Option<String>,
}

impl ApiFile {
    fn into_file(self) -> DriveFile {
        let owner = self
            .owners
            .into_iter()
            .find_map(|o| o.email_address)
            .unwrap_or_else(|| "Unknown".to_string());

        DriveFile {
            icon: icon_for_mime(&self.mime_type).to_string(),
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            modified_time: self.modified_time,
            web_view_link: self.web_view_link,
            size: self.size,
            owner,
        }
    }
}
