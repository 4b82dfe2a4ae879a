//! Google Calendar v3 REST implementation of [`CalendarService`].

use async_trait::async_trait;
use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use reqwest::Url;

use super::http::{GoogleApi, base_url, endpoint};
use super::{CalendarEvent, CalendarService, EventQuery, NewEvent};

pub struct GoogleCalendarService {
    api: GoogleApi,
    base: Url,
}

impl GoogleCalendarService {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            api: GoogleApi::new("calendar", timeout)?,
            base: base_url(base)?,
        })
    }

    fn events_url(&self) -> Result<Url, ServiceError> {
        endpoint(&self.base, &["calendars", "primary", "events"])
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarService {
    async fn list_events(
        &self,
        session: &SessionContext,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ServiceError> {
        let mut params = vec![
            ("timeMin", query.time_min.clone()),
            ("timeMax", query.time_max.clone()),
            ("maxResults", query.max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(q) = &query.query {
            params.push(("q", q.clone()));
        }

        let list: ApiEventList = self
            .api
            .get_json(session, self.events_url()?, &params)
            .await?;
        Ok(list.items.into_iter().map(ApiEvent::into_event).collect())
    }

    async fn create_event(
        &self,
        session: &SessionContext,
        event: &NewEvent,
    ) -> Result<CalendarEvent, ServiceError> {
        let send_updates = if event.attendees.is_empty() {
            "none"
        } else {
            "all"
        };

        let created: ApiEvent = self
            .api
            .post_json(
                session,
                self.events_url()?,
                &[("sendUpdates", send_updates.to_string())],
                &insert_body(event),
            )
            .await?;
        Ok(created.into_event())
    }
}

fn insert_body(event: &NewEvent) -> Value {
    let mut body = json!({
        "summary": event.summary,
        "start": { "dateTime": event.start_time },
        "end": { "dateTime": event.end_time },
    });
    if let Some(description) = &event.description {
        body["description"] = json!(description);
    }
    if let Some(location) = &event.location {
        body["location"] = json!(location);
    }
    if !event.attendees.is_empty() {
        body["attendees"] = event
            .attendees
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();
    }
    body
}

// --- Calendar API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiEventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start: Option<ApiEventTime>,
    #[serde(default)]
    end: Option<ApiEventTime>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    attendees: Vec<ApiAttendee>,
    #[serde(default)]
    html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAttendee {
    #[serde(default)]
    email: Option<String>,
}

impl ApiEventTime {
    fn render(&self) -> String {
        self.date_time
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }
}

impl ApiEvent {
    fn into_event(self) -> CalendarEvent {
        let is_all_day = self
            .start
            .as_ref()
            .is_some_and(|s| s.date_time.is_none() && s.date.is_some());

        CalendarEvent {
            id: self.id,
            summary: self
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "(No title)".to_string()),
            description: self.description,
            start: self.start.as_ref().map(ApiEventTime::render).unwrap_or_default(),
            end: self.end.as_ref().map(ApiEventTime::render).unwrap_or_default(),
            location: self.location,
            attendees: self.attendees.into_iter().filter_map(|a| a.email).collect(),
            html_link: self.html_link,
            is_all_day,
        }
    }
}
