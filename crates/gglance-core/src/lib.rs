//! Core types: calendar/drive resources, HTML rendering, tracing

pub mod format;
pub mod resource;
pub mod tracing;

pub use format::{
    INDEX_HTML, LOGIN_PATH, NO_EVENTS, NO_FILES, html_escape, render_error, render_events,
    render_files, render_snapshot,
};
pub use resource::{CalendarEvent, DriveFile, MAX_EVENTS, MAX_FILES, ResourceSnapshot};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
