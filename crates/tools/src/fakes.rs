//! In-memory service fakes shared by the tool tests.

use async_trait::async_trait;
use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use std::sync::Mutex;

use crate::services::*;

pub fn email(id: &str, subject: &str) -> EmailSummary {
    EmailSummary {
        id: id.into(),
        thread_id: format!("t-{id}"),
        from: "billing@acme.com".into(),
        to: "me@x.com".into(),
        subject: subject.into(),
        date: "Mon, 5 Jan 2026 10:00:00 +0000".into(),
        snippet: format!("{subject} snippet"),
        label_ids: vec!["INBOX".into()],
    }
}

#[derive(Default)]
pub struct FakeMail {
    pub emails: Vec<EmailSummary>,
    pub fail_with: Option<ServiceError>,
    pub searches: Mutex<Vec<(String, u32)>>,
    pub drafts: Mutex<Vec<DraftRequest>>,
}

#[async_trait]
impl MailService for FakeMail {
    async fn search(
        &self,
        _session: &SessionContext,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, ServiceError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        Ok(self
            .emails
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn read(
        &self,
        _session: &SessionContext,
        id: &str,
    ) -> Result<EmailMessage, ServiceError> {
        let found = self
            .emails
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("message {id}")))?;
        Ok(EmailMessage {
            id: found.id.clone(),
            thread_id: found.thread_id.clone(),
            from: found.from.clone(),
            to: found.to.clone(),
            subject: found.subject.clone(),
            date: found.date.clone(),
            body: format!("Body of {}", found.subject),
            label_ids: found.label_ids.clone(),
        })
    }

    async fn create_draft(
        &self,
        _session: &SessionContext,
        draft: &DraftRequest,
    ) -> Result<String, ServiceError> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        let mut drafts = self.drafts.lock().unwrap();
        drafts.push(draft.clone());
        Ok(format!("draft-{}", drafts.len()))
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    pub events: Vec<CalendarEvent>,
    pub fail_with: Option<ServiceError>,
    pub queries: Mutex<Vec<EventQuery>>,
    pub created: Mutex<Vec<NewEvent>>,
}

pub fn event(id: &str, summary: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        summary: summary.into(),
        description: None,
        start: "2026-01-05T09:00:00Z".into(),
        end: "2026-01-05T10:00:00Z".into(),
        location: None,
        attendees: vec![],
        html_link: Some(format!("https://calendar.test/{id}")),
        is_all_day: false,
    }
}

#[async_trait]
impl CalendarService for FakeCalendar {
    async fn list_events(
        &self,
        _session: &SessionContext,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ServiceError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        Ok(self.events.clone())
    }

    async fn create_event(
        &self,
        _session: &SessionContext,
        new: &NewEvent,
    ) -> Result<CalendarEvent, ServiceError> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.created.lock().unwrap().push(new.clone());
        Ok(CalendarEvent {
            start: new.start_time.clone(),
            end: new.end_time.clone(),
            attendees: new.attendees.clone(),
            ..event("new-1", &new.summary)
        })
    }
}

pub fn file(id: &str, name: &str, mime_type: &str) -> DriveFile {
    DriveFile {
        id: id.into(),
        name: name.into(),
        mime_type: mime_type.into(),
        icon: icon_for_mime(mime_type).into(),
        modified_time: Some("2026-01-04T12:00:00Z".into()),
        web_view_link: Some(format!("https://drive.test/{id}")),
        size: None,
        owner: "me@x.com".into(),
    }
}

#[derive(Default)]
pub struct FakeDrive {
    pub files: Vec<DriveFile>,
    pub content: String,
    pub fail_with: Option<ServiceError>,
    pub listings: Mutex<Vec<(Option<String>, Option<FileType>, u32)>>,
    pub documents: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl DriveService for FakeDrive {
    async fn list_files(
        &self,
        _session: &SessionContext,
        name_query: Option<&str>,
        file_type: Option<FileType>,
        max_results: u32,
    ) -> Result<Vec<DriveFile>, ServiceError> {
        self.listings
            .lock()
            .unwrap()
            .push((name_query.map(String::from), file_type, max_results));
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        Ok(self.files.clone())
    }

    async fn file_content(
        &self,
        _session: &SessionContext,
        id: &str,
    ) -> Result<FileContent, ServiceError> {
        let f = self
            .files
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("file {id}")))?;
        Ok(FileContent {
            id: f.id.clone(),
            name: f.name.clone(),
            mime_type: f.mime_type.clone(),
            icon: f.icon.clone(),
            web_view_link: f.web_view_link.clone(),
            content: self.content.clone(),
        })
    }

    async fn create_document(
        &self,
        _session: &SessionContext,
        title: &str,
        content: Option<&str>,
    ) -> Result<CreatedDocument, ServiceError> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.documents
            .lock()
            .unwrap()
            .push((title.to_string(), content.map(String::from)));
        Ok(CreatedDocument {
            id: "doc-1".into(),
            title: title.into(),
            web_view_link: Some("https://docs.test/doc-1".into()),
            has_content: content.is_some_and(|c| !c.is_empty()),
        })
    }
}

pub fn session() -> SessionContext {
    SessionContext::new("test-token")
}
