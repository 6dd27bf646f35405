//! HTML rendering for the login page and the post-login glance.
//!
//! Output is plain HTML fragments: one line per event or file, each
//! terminated by `<br>`. All provider-supplied text is escaped.

use crate::resource::{CalendarEvent, DriveFile, ResourceSnapshot};

/// Path of the login initiator, linked from the index page.
pub const LOGIN_PATH: &str = "/GoogleLogin";

/// Static landing page with the login link.
pub const INDEX_HTML: &str = "<html><body>
<a href=\"/GoogleLogin\">Log in with Google</a>
</body></html>
";

/// Line shown when the calendar has no upcoming events.
pub const NO_EVENTS: &str = "No upcoming events found.<br>";

/// Line shown when the Drive listing is empty.
pub const NO_FILES: &str = "No files found.<br>";

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders the upcoming events, or the empty fallback line.
pub fn render_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }
    events
        .iter()
        .map(|e| {
            format!(
                "Event: {} at {}<br>",
                html_escape(&e.summary),
                html_escape(&e.start)
            )
        })
        .collect()
}

/// Renders the Drive files, or the empty fallback line.
pub fn render_files(files: &[DriveFile]) -> String {
    if files.is_empty() {
        return NO_FILES.to_string();
    }
    files
        .iter()
        .map(|f| format!("File: {} ({})<br>", html_escape(&f.name), html_escape(&f.id)))
        .collect()
}

/// Renders a full snapshot: events first, then files.
pub fn render_snapshot(snapshot: &ResourceSnapshot) -> String {
    let mut out = render_events(&snapshot.events);
    out.push_str(&render_files(&snapshot.files));
    out
}

/// Renders an error message as an escaped text fragment.
pub fn render_error(message: &str) -> String {
    html_escape(message)
}
