//! Resource types fetched on behalf of a signed-in user.
//!
//! This module provides the provider-agnostic shapes that flow from the
//! resource fetchers into the HTML renderer:
//! - [`CalendarEvent`]: an upcoming calendar entry
//! - [`DriveFile`]: a file from the user's Drive listing
//! - [`ResourceSnapshot`]: both listings, in the order the provider returned them

use serde::{Deserialize, Serialize};

/// Maximum number of upcoming events shown after login.
pub const MAX_EVENTS: usize = 5;

/// Maximum number of files shown after login.
pub const MAX_FILES: usize = 10;

/// An upcoming calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The event title.
    pub summary: String,
    /// The start time as reported by the provider.
    ///
    /// RFC 3339 date-time for timed events, `YYYY-MM-DD` for all-day
    /// events, empty when the provider sent neither.
    pub start: String,
}

impl CalendarEvent {
    /// Creates a new calendar event.
    pub fn new(summary: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            start: start.into(),
        }
    }
}

/// A file entry from a Drive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    /// Display name of the file.
    pub name: String,
    /// Provider identifier of the file.
    pub id: String,
}

impl DriveFile {
    /// Creates a new drive file entry.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Everything fetched for a user in a single callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Upcoming events, at most [`MAX_EVENTS`].
    pub events: Vec<CalendarEvent>,
    /// Drive files, at most [`MAX_FILES`].
    pub files: Vec<DriveFile>,
}

impl ResourceSnapshot {
    /// Creates a snapshot, truncating each listing to its display limit.
    pub fn new(mut events: Vec<CalendarEvent>, mut files: Vec<DriveFile>) -> Self {
        events.truncate(MAX_EVENTS);
        files.truncate(MAX_FILES);
        Self { events, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_truncates_to_limits() {
        let events = (0..8)
            .map(|i| CalendarEvent::new(format!("event {i}"), "2024-03-15"))
            .collect();
        let files = (0..12)
            .map(|i| DriveFile::new(format!("file {i}"), format!("id{i}")))
            .collect();

        let snapshot = ResourceSnapshot::new(events, files);
        assert_eq!(snapshot.events.len(), MAX_EVENTS);
        assert_eq!(snapshot.files.len(), MAX_FILES);
        assert_eq!(snapshot.events[0].summary, "event 0");
        assert_eq!(snapshot.files[9].id, "id9");
    }

    #[test]
    fn short_listings_are_kept() {
        let snapshot = ResourceSnapshot::new(vec![], vec![DriveFile::new("a", "b")]);
        assert!(snapshot.events.is_empty());
        assert_eq!(snapshot.files, vec![DriveFile::new("a", "b")]);
    }
}
