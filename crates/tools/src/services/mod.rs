//! Contracts for the external productivity services the tools act on.
//!
//! Tools talk to these traits only. The Google REST implementations live in
//! the submodules; tests substitute in-memory fakes.

pub mod calendar;
pub mod drive;
pub mod gmail;
mod http;

use async_trait::async_trait;
use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use serde::{Deserialize, Serialize};

pub use calendar::GoogleCalendarService;
pub use drive::GoogleDriveService;
pub use gmail::GmailService;

// --- Mail ---

/// One row of a mail search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// A full message with its decoded plain-text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub body: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// A plain-text draft ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// `Message-ID` of the message being answered.
    pub in_reply_to: Option<String>,
}

impl DraftRequest {
    /// Render as an RFC 822 message (CRLF line endings). Line breaks inside
    /// header values are collapsed so each header stays on one line.
    pub fn to_rfc822(&self) -> String {
        let mut lines = vec![
            format!("To: {}", header_value(&self.to)),
            format!("Subject: {}", header_value(&self.subject)),
            "Content-Type: text/plain; charset=utf-8".to_string(),
            String::new(),
            self.body.clone(),
        ];
        if let Some(id) = &self.in_reply_to {
            let id = header_value(id);
            lines.insert(2, format!("In-Reply-To: {id}"));
            lines.insert(3, format!("References: {id}"));
        }
        lines.join("\r\n")
    }
}

fn header_value(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
pub trait MailService: Send + Sync {
    /// Search with mail query syntax, newest first.
    async fn search(
        &self,
        session: &SessionContext,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, ServiceError>;

    async fn read(&self, session: &SessionContext, id: &str)
    -> Result<EmailMessage, ServiceError>;

    /// Store a draft and return its id. Never sends.
    async fn create_draft(
        &self,
        session: &SessionContext,
        draft: &DraftRequest,
    ) -> Result<String, ServiceError>;
}

// --- Calendar ---

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub time_min: String,
    pub time_max: String,
    pub max_results: u32,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_events(
        &self,
        session: &SessionContext,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ServiceError>;

    /// Insert on the primary calendar; invitations go out when attendees are set.
    async fn create_event(
        &self,
        session: &SessionContext,
        event: &NewEvent,
    ) -> Result<CalendarEvent, ServiceError>;
}

// --- Drive ---

/// File categories the model can filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Document,
    Spreadsheet,
    Presentation,
    Pdf,
    Image,
    Folder,
}

impl FileType {
    /// Parse a filter name. `"any"` and unknown names mean no filter.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "document" => Some(Self::Document),
            "spreadsheet" => Some(Self::Spreadsheet),
            "presentation" => Some(Self::Presentation),
            "pdf" => Some(Self::Pdf),
            "image" => Some(Self::Image),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }

    /// The Drive query clause selecting this category.
    pub fn mime_clause(self) -> String {
        match self {
            Self::Image => "mimeType contains 'image/'".to_string(),
            other => format!("mimeType = '{}'", other.mime_type()),
        }
    }

    fn mime_type(self) -> &'static str {
        match self {
            Self::Document => DOC_MIME,
            Self::Spreadsheet => SHEET_MIME,
            Self::Presentation => SLIDES_MIME,
            Self::Pdf => "application/pdf",
            Self::Image => "image/",
            Self::Folder => FOLDER_MIME,
        }
    }
}

pub(crate) const DOC_MIME: &str = "application/vnd.google-apps.document";
pub(crate) const SHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
pub(crate) const SLIDES_MIME: &str = "application/vnd.google-apps.presentation";
pub(crate) const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Emoji shown next to a file in listings.
pub fn icon_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        DOC_MIME => "📄",
        SHEET_MIME => "📊",
        SLIDES_MIME => "📽️",
        FOLDER_MIME => "📁",
        "application/pdf" => "📕",
        m if m.starts_with("image/") => "🖼️",
        m if m.starts_with("video/") => "🎬",
        m if m.starts_with("audio/") => "🎵",
        _ => "📎",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDocument {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    pub has_content: bool,
}

#[async_trait]
pub trait DriveService: Send + Sync {
    /// List non-trashed files, most recently modified first. `name_query`
    /// matches names and full text; `None` lists recent files.
    async fn list_files(
        &self,
        session: &SessionContext,
        name_query: Option<&str>,
        file_type: Option<FileType>,
        max_results: u32,
    ) -> Result<Vec<DriveFile>, ServiceError>;

    /// Fetch a file's text content. Binary files yield a placeholder, not an error.
    async fn file_content(
        &self,
        session: &SessionContext,
        id: &str,
    ) -> Result<FileContent, ServiceError>;

    async fn create_document(
        &self,
        session: &SessionContext,
        title: &str,
        content: Option<&str>,
    ) -> Result<CreatedDocument, ServiceError>;
}
