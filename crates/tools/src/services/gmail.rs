//! Gmail v1 REST implementation of [`MailService`].

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use reqwest::Url;

use super::http::{GoogleApi, base_url, endpoint};
use super::{DraftRequest, EmailMessage, EmailSummary, MailService};

const METADATA_HEADERS: [&str; 4] = ["From", "To", "Subject", "Date"];

pub struct GmailService {
    api: GoogleApi,
    base: Url,
}

impl GmailService {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            api: GoogleApi::new("gmail", timeout)?,
            base: base_url(base)?,
        })
    }

    fn message_url(&self, id: &str) -> Result<Url, ServiceError> {
        endpoint(&self.base, &["users", "me", "messages", id])
    }

    async fn fetch_metadata(
        &self,
        session: &SessionContext,
        id: &str,
    ) -> Result<EmailSummary, ServiceError> {
        let mut query = vec![("format", "metadata".to_string())];
        query.extend(METADATA_HEADERS.iter().map(|h| ("metadataHeaders", h.to_string())));

        let message: ApiMessage = self
            .api
            .get_json(session, self.message_url(id)?, &query)
            .await?;
        Ok(message.into_summary())
    }
}

#[async_trait]
impl MailService for GmailService {
    async fn search(
        &self,
        session: &SessionContext,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, ServiceError> {
        let list: ApiMessageList = self
            .api
            .get_json(
                session,
                endpoint(&self.base, &["users", "me", "messages"])?,
                &[
                    ("q", query.to_string()),
                    ("maxResults", max_results.to_string()),
                ],
            )
            .await?;

        // Metadata fetches run concurrently; try_join_all keeps list order.
        try_join_all(
            list.messages
                .iter()
                .map(|m| self.fetch_metadata(session, &m.id)),
        )
        .await
    }

    async fn read(
        &self,
        session: &SessionContext,
        id: &str,
    ) -> Result<EmailMessage, ServiceError> {
        let message: ApiMessage = self
            .api
            .get_json(
                session,
                self.message_url(id)?,
                &[("format", "full".to_string())],
            )
            .await?;
        Ok(message.into_full())
    }

    async fn create_draft(
        &self,
        session: &SessionContext,
        draft: &DraftRequest,
    ) -> Result<String, ServiceError> {
        let raw = URL_SAFE_NO_PAD.encode(draft.to_rfc822());
        let created: ApiDraft = self
            .api
            .post_json(
                session,
                endpoint(&self.base, &["users", "me", "drafts"])?,
                &[],
                &json!({ "message": { "raw": raw } }),
            )
            .await?;
        Ok(created.id)
    }
}

// --- Gmail API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiMessageList {
    #[serde(default)]
    messages: Vec<ApiMessageRef>,
}

#[derive(Debug, Deserialize)]
struct ApiMessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiDraft {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMessage {
    id: String,
    #[serde(default)]
    thread_id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    label_ids: Vec<String>,
    #[serde(default)]
    payload: Option<ApiPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPayload {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<ApiHeader>,
    #[serde(default)]
    body: Option<ApiBody>,
    #[serde(default)]
    parts: Vec<ApiPayload>,
}

#[derive(Debug, Deserialize)]
struct ApiHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiBody {
    #[serde(default)]
    data: Option<String>,
}

impl ApiPayload {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    fn inline_data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// The first `text/plain` part, searching nested multiparts depth-first.
    fn plain_text_part(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| {
            if part.mime_type == "text/plain" {
                part.inline_data()
            } else {
                part.plain_text_part()
            }
        })
    }
}

impl ApiMessage {
    fn header(&self, name: &str) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.header(name))
            .unwrap_or_default()
            .to_string()
    }

    fn subject(&self) -> String {
        let subject = self.header("Subject");
        if subject.is_empty() {
            "(No Subject)".to_string()
        } else {
            subject
        }
    }

    fn into_summary(self) -> EmailSummary {
        EmailSummary {
            from: self.header("From"),
            to: self.header("To"),
            subject: self.subject(),
            date: self.header("Date"),
            id: self.id,
            thread_id: self.thread_id,
            snippet: self.snippet,
            label_ids: self.label_ids,
        }
    }

    fn into_full(self) -> EmailMessage {
        let payload = self.payload.as_ref();
        let body = payload
            .and_then(|p| p.inline_data().or_else(|| p.plain_text_part()))
            .and_then(decode_body)
            .unwrap_or_else(|| self.snippet.clone());

        EmailMessage {
            from: self.header("From"),
            to: self.header("To"),
            subject: self.subject(),
            date: self.header("Date"),
            id: self.id,
            thread_id: self.thread_id,
            body,
            label_ids: self.label_ids,
        }
    }
}

/// Decode a base64url body. Gmail sometimes pads, sometimes not.
fn decode_body(data: &str) -> Option<String> {
    URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
