//! The fixed workspace tool catalog and the assistant's system prompt.

use chrono::{DateTime, SecondsFormat, Utc};
use cowork_config::AppConfig;
use cowork_core::error::ServiceError;
use cowork_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;

use crate::calendar::{CreateCalendarEventTool, GetCalendarEventsTool};
use crate::drive::{
    CreateDriveDocumentTool, GetDriveFileContentTool, GetRecentDriveFilesTool,
    SearchDriveFilesTool,
};
use crate::mail::{DraftReplyTool, ReadEmailTool, SearchEmailsTool};
use crate::services::{
    CalendarService, DriveService, GmailService, GoogleCalendarService, GoogleDriveService,
    MailService,
};

/// The service backends the catalog's tools act on.
#[derive(Clone)]
pub struct WorkspaceServices {
    pub mail: Arc<dyn MailService>,
    pub calendar: Arc<dyn CalendarService>,
    pub drive: Arc<dyn DriveService>,
}

impl WorkspaceServices {
    /// Google REST backends using the configured base URLs.
    pub fn google(config: &AppConfig) -> Result<Self, ServiceError> {
        let timeout = Duration::from_secs(config.agent.tool_timeout_secs);
        let urls = &config.services;

        Ok(Self {
            mail: Arc::new(GmailService::new(&urls.gmail_base_url, timeout)?),
            calendar: Arc::new(GoogleCalendarService::new(&urls.calendar_base_url, timeout)?),
            drive: Arc::new(GoogleDriveService::new(
                &urls.drive_base_url,
                &urls.docs_base_url,
                timeout,
            )?),
        })
    }
}

/// Build the registry with every workspace tool, in advertised order.
pub fn workspace_registry(services: &WorkspaceServices) -> ToolRegistry {
    let mail = &services.mail;
    let calendar = &services.calendar;
    let drive = &services.drive;

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(SearchEmailsTool::new(mail.clone())),
        Arc::new(ReadEmailTool::new(mail.clone())),
        Arc::new(DraftReplyTool::new(mail.clone())),
        Arc::new(GetCalendarEventsTool::new(calendar.clone())),
        Arc::new(CreateCalendarEventTool::new(calendar.clone())),
        Arc::new(SearchDriveFilesTool::new(drive.clone())),
        Arc::new(GetRecentDriveFilesTool::new(drive.clone())),
        Arc::new(GetDriveFileContentTool::new(drive.clone())),
        Arc::new(CreateDriveDocumentTool::new(drive.clone())),
    ];
    ToolRegistry::from_tools(tools)
}

pub const SYSTEM_PROMPT: &str = "\
You are Cowork, an assistant that works inside the user's Google Workspace: \
Gmail, Google Calendar and Google Drive.

Use the tools for anything about the user's mail, schedule or files. Never \
guess at inbox contents, events or documents; look them up.

Mail:
- Turn requests into Gmail search syntax before calling searchEmails, for \
example from:, to:, subject:, has:attachment, is:unread, newer_than:7d, \
after:2026/01/01.
- Use readEmail when the user needs more than the snippet.
- draftReply only saves a draft. Say so, and never claim a message was sent.

Calendar:
- getCalendarEvents defaults to the next seven days. Pass timeMin and \
timeMax in ISO 8601 for other ranges.
- For createCalendarEvent, resolve relative dates against the current time \
below and include a UTC offset.

Drive:
- searchDriveFiles matches names and contents; getRecentDriveFiles lists \
what changed lately.
- Read a file with getDriveFileContent before summarizing it.
- createDriveDocument makes a new Google Doc.

When a tool fails, tell the user plainly what went wrong and what they can \
do about it. Keep answers short, and list emails, events and files with \
their key details.";

/// The system prompt with the current time appended.
pub fn system_prompt(now: DateTime<Utc>) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nCurrent time: {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
