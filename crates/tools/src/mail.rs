//! Mail tools: search, read and draft replies.
//!
//! Drafts are only ever stored, never sent; the user reviews them in their
//! mail client.

use async_trait::async_trait;
use cowork_core::error::ToolError;
use cowork_core::session::SessionContext;
use cowork_core::tool::{Tool, ToolOutput};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::args::{bounded_count, into_output, optional_str, required_str, single_line};
use crate::services::{DraftRequest, MailService};

const DEFAULT_SEARCH_RESULTS: u32 = 5;
const MAX_SEARCH_RESULTS: u32 = 10;
const PREVIEW_CHARS: usize = 100;

pub struct SearchEmailsTool {
    mail: Arc<dyn MailService>,
}

impl SearchEmailsTool {
    pub fn new(mail: Arc<dyn MailService>) -> Self {
        Self { mail }
    }
}

#[async_trait]
impl Tool for SearchEmailsTool {
    fn name(&self) -> &str {
        "searchEmails"
    }

    fn description(&self) -> &str {
        "Search the user's Gmail inbox using Gmail search syntax \
         (e.g. 'from:alice subject:invoice newer_than:7d is:unread'). \
         Returns sender, subject, date and a snippet for each match."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Gmail search query, e.g. 'from:boss@company.com is:unread'"
                },
                "maxResults": {
                    "type": "number",
                    "description": "Maximum number of emails to return (default 5, max 10)"
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
        let max = bounded_count(arguments, "maxResults", DEFAULT_SEARCH_RESULTS, MAX_SEARCH_RESULTS)?;

        let emails = self.mail.search(session, query, max).await?;

        if emails.is_empty() {
            return Ok(into_output(json!({
                "emails": [],
                "message": format!("No emails found matching \"{query}\"."),
            })));
        }

        Ok(into_output(json!({
            "emails": emails,
            "count": emails.len(),
            "query": query,
        })))
    }
}

pub struct ReadEmailTool {
    mail: Arc<dyn MailService>,
}

impl ReadEmailTool {
    pub fn new(mail: Arc<dyn MailService>) -> Self {
        Self { mail }
    }
}

#[async_trait]
impl Tool for ReadEmailTool {
    fn name(&self) -> &str {
        "readEmail"
    }

    fn description(&self) -> &str {
        "Read the full content of one email by its id (as returned by searchEmails)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "emailId": {
                    "type": "string",
                    "description": "The id of the email to read"
                }
            },
            "required": ["emailId"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let id = required_str(arguments, "emailId")?;
        let email = self.mail.read(session, id).await?;
        Ok(into_output(json!({ "email": email })))
    }
}

pub struct DraftReplyTool {
    mail: Arc<dyn MailService>,
}

impl DraftReplyTool {
    pub fn new(mail: Arc<dyn MailService>) -> Self {
        Self { mail }
    }
}

/// Prefix `Re: ` unless the subject already carries it.
fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    if trimmed
        .get(..3)
        .is_some_and(|p| p.eq_ignore_ascii_case("re:"))
    {
        trimmed.to_string()
    } else {
        format!("Re: {trimmed}")
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() <= PREVIEW_CHARS {
        body.to_string()
    } else {
        let head: String = body.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}

#[async_trait]
impl Tool for DraftReplyTool {
    fn name(&self) -> &str {
        "draftReply"
    }

    fn description(&self) -> &str {
        "Create a draft email in the user's Gmail Drafts folder. The draft is NOT sent; \
         the user reviews and sends it themselves."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Recipient email address"
                },
                "subject": {
                    "type": "string",
                    "description": "Subject line; 'Re: ' is added if missing"
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text body of the reply"
                },
                "inReplyTo": {
                    "type": "string",
                    "description": "Message-ID of the email being answered, for threading"
                }
            },
            "required": ["to", "subject", "body"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let in_reply_to = optional_str(arguments, "inReplyTo")
            .map(|id| single_line("inReplyTo", id))
            .transpose()?;
        let draft = DraftRequest {
            to: single_line("to", required_str(arguments, "to")?)?.to_string(),
            subject: reply_subject(single_line("subject", required_str(arguments, "subject")?)?),
            body: required_str(arguments, "body")?.to_string(),
            in_reply_to: in_reply_to.map(String::from),
        };

        let id = self.mail.create_draft(session, &draft).await?;

        Ok(into_output(json!({
            "draft": {
                "id": id,
                "to": draft.to,
                "subject": draft.subject,
                "bodyPreview": preview(&draft.body),
            },
            "message": "Draft created! Find it in your Gmail Drafts.",
        })))
    }
}
