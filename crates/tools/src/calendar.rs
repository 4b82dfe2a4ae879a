//! Calendar tools: list upcoming events and create new ones.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use cowork_core::error::ToolError;
use cowork_core::session::SessionContext;
use cowork_core::tool::{Tool, ToolOutput};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::args::{bounded_count, into_output, optional_str, required_str, string_list};
use crate::services::{CalendarService, EventQuery, NewEvent};

const DEFAULT_EVENT_RESULTS: u32 = 10;
const MAX_EVENT_RESULTS: u32 = 50;
const DEFAULT_WINDOW_DAYS: i64 = 7;

fn iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct GetCalendarEventsTool {
    calendar: Arc<dyn CalendarService>,
}

impl GetCalendarEventsTool {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self { calendar }
    }

    fn event_query(arguments: &Map<String, Value>, now: DateTime<Utc>) -> Result<EventQuery, ToolError> {
        Ok(EventQuery {
            time_min: optional_str(arguments, "timeMin")
                .map(String::from)
                .unwrap_or_else(|| iso(now)),
            time_max: optional_str(arguments, "timeMax")
                .map(String::from)
                .unwrap_or_else(|| iso(now + ChronoDuration::days(DEFAULT_WINDOW_DAYS))),
            max_results: bounded_count(
                arguments,
                "maxResults",
                DEFAULT_EVENT_RESULTS,
                MAX_EVENT_RESULTS,
            )?,
            query: optional_str(arguments, "query").map(String::from),
        })
    }
}

#[async_trait]
impl Tool for GetCalendarEventsTool {
    fn name(&self) -> &str {
        "getCalendarEvents"
    }

    fn description(&self) -> &str {
        "List events on the user's primary Google Calendar within a time window. \
         Defaults to the next 7 days. Times are ISO 8601 (RFC 3339)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timeMin": {
                    "type": "string",
                    "description": "Start of the window, ISO 8601 (default: now)"
                },
                "timeMax": {
                    "type": "string",
                    "description": "End of the window, ISO 8601 (default: 7 days from now)"
                },
                "query": {
                    "type": "string",
                    "description": "Free-text filter on event fields"
                },
                "maxResults": {
                    "type": "number",
                    "description": "Maximum number of events (default 10)"
                }
            }
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = Self::event_query(arguments, Utc::now())?;
        let events = self.calendar.list_events(session, &query).await?;

        Ok(into_output(json!({
            "events": events,
            "count": events.len(),
            "timeRange": { "from": query.time_min, "to": query.time_max },
        })))
    }
}

pub struct CreateCalendarEventTool {
    calendar: Arc<dyn CalendarService>,
}

impl CreateCalendarEventTool {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for CreateCalendarEventTool {
    fn name(&self) -> &str {
        "createCalendarEvent"
    }

    fn description(&self) -> &str {
        "Create an event on the user's primary Google Calendar. \
         If attendees are given, they receive invitations."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Event title"
                },
                "startTime": {
                    "type": "string",
                    "description": "Start time, ISO 8601 with offset (e.g. 2026-03-02T14:00:00-05:00)"
                },
                "endTime": {
                    "type": "string",
                    "description": "End time, ISO 8601 with offset"
                },
                "description": {
                    "type": "string",
                    "description": "Event description or agenda"
                },
                "location": {
                    "type": "string",
                    "description": "Where the event takes place"
                },
                "attendees": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Email addresses to invite"
                }
            },
            "required": ["summary", "startTime", "endTime"]
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let new_event = NewEvent {
            summary: required_str(arguments, "summary")?.to_string(),
            start_time: required_str(arguments, "startTime")?.to_string(),
            end_time: required_str(arguments, "endTime")?.to_string(),
            description: optional_str(arguments, "description").map(String::from),
            location: optional_str(arguments, "location").map(String::from),
            attendees: string_list(arguments, "attendees")?,
        };

        let event = self.calendar.create_event(session, &new_event).await?;

        Ok(into_output(json!({
            "event": {
                "id": event.id,
                "summary": event.summary,
                "start": event.start,
                "end": event.end,
                "htmlLink": event.html_link,
                "attendees": event.attendees,
            },
            "message": "Event created successfully!",
        })))
    }
}
