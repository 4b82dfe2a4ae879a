//! Drive tools: find files, read their content and create documents.

use async_trait::async_trait;
use cowork_core::error::ToolError;
use cowork_core::session::SessionContext;
use cowork_core::tool::{Tool, ToolOutput};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::args::{bounded_count, into_output, optional_str, required_str};
use crate::services::{DriveService, FileType};

const DEFAULT_FILE_RESULTS: u32 = 10;
const MAX_FILE_RESULTS: u32 = 25;
const MAX_CONTENT_CHARS: usize = 10_000;

fn file_type_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["document", "spreadsheet", "presentation", "pdf", "image", "folder", "any"],
        "description": "Restrict results to one kind of file"
    })
}

fn file_type_arg(arguments: &Map<String, Value>) -> Option<FileType> {
    optional_str(arguments, "fileType").and_then(FileType::parse)
}

/// Truncate on a char boundary.
fn truncate_chars(text: String, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text, false),
    }
}

pub struct SearchDriveFilesTool {
    drive: Arc<dyn DriveService>,
}

impl SearchDriveFilesTool {
    pub fn new(drive: Arc<dyn DriveService>) -> Self {
        Self { drive }
    }
}

#[async_trait]
impl Tool for SearchDriveFilesTool {
    fn name(&self) -> &str {
        "searchDriveFiles"
    }

    fn description(&self) -> &str {
        "Search the user's Google Drive by file name and content. \
         Optionally restrict to a file type."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to look for in file names and contents"
                },
                "fileType": file_type_schema(),
                "maxResults": {
                    "type": "number",
                    "description": "Maximum number of files (default 10, max 25)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = required_str(arguments, "query")?;
        let max = bounded_count(arguments, "maxResults", DEFAULT_FILE_RESULTS, MAX_FILE_RESULTS)?;

        let files = self
            .drive
            .list_files(session, Some(query), file_type_arg(arguments), max)
            .await?;

        Ok(into_output(json!({
            "files": files,
            "count": files.len(),
            "query": query,
        })))
    }
}

pub struct GetRecentDriveFilesTool {
    drive: Arc<dyn DriveService>,
}

impl GetRecentDriveFilesTool {
    pub fn new(drive: Arc<dyn DriveService>) -> Self {
        Self { drive }
    }
}

#[async_trait]
impl Tool for GetRecentDriveFilesTool {
    fn name(&self) -> &str {
        "getRecentDriveFiles"
    }

    fn description(&self) -> &str {
        "List the user's most recently modified Google Drive files."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "maxResults": {
                    "type": "number",
                    "description": "Maximum number of files (default 10, max 25)"
                },
                "fileType": file_type_schema()
            }
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let max = bounded_count(arguments, "maxResults", DEFAULT_FILE_RESULTS, MAX_FILE_RESULTS)?;
        let files = self
            .drive
            .list_files(session, None, file_type_arg(arguments), max)
            .await?;

        Ok(into_output(json!({
            "files": files,
            "count": files.len(),
        })))
    }
}

pub struct GetDriveFileContentTool {
    drive: Arc<dyn DriveService>,
}

impl GetDriveFileContentTool {
    pub fn new(drive: Arc<dyn DriveService>) -> Self {
        Self { drive }
    }
}

#[async_trait]
impl Tool for GetDriveFileContentTool {
    fn name(&self) -> &str {
        "getDriveFileContent"
    }

    fn description(&self) -> &str {
        "Read the text content of a Drive file by id. Google Docs come back as text, \
         Sheets as CSV, Slides as text. Long content is truncated."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fileId": {
                    "type": "string",
                    "description": "The id of the file (from searchDriveFiles or getRecentDriveFiles)"
                }
            },
            "required": ["fileId"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let id = required_str(arguments, "fileId")?;
        let mut file = self.drive.file_content(session, id).await?;

        let (content, truncated) = truncate_chars(std::mem::take(&mut file.content), MAX_CONTENT_CHARS);
        file.content = content;

        let mut output = into_output(json!({ "file": file }));
        if truncated {
            output.insert("truncated".into(), Value::Bool(true));
        }
        Ok(output)
    }
}

pub struct CreateDriveDocumentTool {
    drive: Arc<dyn DriveService>,
}

impl CreateDriveDocumentTool {
    pub fn new(drive: Arc<dyn DriveService>) -> Self {
        Self { drive }
    }
}

#[async_trait]
impl Tool for CreateDriveDocumentTool {
    fn name(&self) -> &str {
        "createDriveDocument"
    }

    fn description(&self) -> &str {
        "Create a new Google Doc in the user's Drive, optionally with initial text content."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the new document"
                },
                "content": {
                    "type": "string",
                    "description": "Initial plain-text content"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let title = required_str(arguments, "title")?;
        let content = optional_str(arguments, "content");

        let document = self.drive.create_document(session, title, content).await?;

        Ok(into_output(json!({
            "message": format!("Document \"{}\" created successfully!", document.title),
            "document": document,
        })))
    }
}
