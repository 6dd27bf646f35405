//! Google Calendar API client.
//!
//! Reads the next few events from a calendar for the signed-in user.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gglance_core::CalendarEvent;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, CalendarSource};

use super::http;
use super::tokens::TokenInfo;

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar read by the glance.
const PRIMARY_CALENDAR: &str = "primary";

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a client for the user's primary calendar.
    pub fn new(timeout: Duration, user_agent: &str) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout, user_agent)?,
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Lists events starting at or after `time_min`, ordered by start time.
    ///
    /// Recurring events are expanded server-side so each instance is
    /// returned on its own.
    pub async fn list_upcoming(
        &self,
        token: &TokenInfo,
        time_min: DateTime<Utc>,
        max_results: usize,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let url = format!("{}/calendars/{}/events", self.base_url, PRIMARY_CALENDAR);

        let request = self
            .http_client
            .get(&url)
            .bearer_auth(token.secret())
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);

        let list: EventListResponse = http::send_json(request, "calendar").await?;

        let events: Vec<CalendarEvent> = list
            .items
            .into_iter()
            .filter(|e| e.status.as_deref() != Some("cancelled"))
            .map(ApiEvent::into_event)
            .take(max_results)
            .collect();

        debug!("fetched {} events from calendar {}", events.len(), PRIMARY_CALENDAR);
        Ok(events)
    }
}

impl CalendarSource for GoogleCalendarClient {
    fn upcoming_events<'a>(
        &'a self,
        token: &'a TokenInfo,
        max_results: usize,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(self.list_upcoming(token, Utc::now(), max_results))
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    summary: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    status: Option<String>,
}

/// Event time from the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl ApiEvent {
    fn into_event(self) -> CalendarEvent {
        // All-day events carry only a date.
        let start = self
            .start
            .date_time
            .or(self.start.date)
            .unwrap_or_default();
        CalendarEvent::new(self.summary.unwrap_or_default(), start)
    }
}
