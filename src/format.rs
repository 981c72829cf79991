use chrono::{ DateTime, Utc };

use crate::config::DEFAULT_DATE_FORMAT;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative_time_with(timestamp, now, DEFAULT_DATE_FORMAT)
}

/// Timestamps in the future (clock skew between client and server) read as "now".
pub fn relative_time_with(timestamp: DateTime<Utc>, now: DateTime<Utc>, date_format: &str) -> String {
    let seconds = (now - timestamp).num_seconds();
    match seconds {
        s if s < MINUTE => "now".to_string(),
        s if s < HOUR => format!("{} min", s / MINUTE),
        s if s < DAY => format!("{} h", s / HOUR),
        s if s < WEEK => format!("{} d", s / DAY),
        _ => timestamp.format(date_format).to_string(),
    }
}

/// Replaces the characters an HTML sink would interpret. Apply to every field
/// that another user controls before it is rendered.
pub fn escape_for_display(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Neutralizes what a terminal would act on instead of print: C0/C1 control
/// characters (ESC sequences, BEL, carriage return) and bidi overrides. Line
/// feeds survive and tabs become spaces.
pub fn sanitize_for_terminal(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => '\n',
            '\t' => ' ',
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => '\u{FFFD}',
            c if c.is_control() => '\u{FFFD}',
            c => c,
        })
        .collect()
}

/// Shortens a last-message preview to `max_chars` characters, ellipsis included.
pub fn preview(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let keep = max_chars.saturating_sub(1);
    let mut short: String = flat.chars().take(keep).collect();
    short.push('…');
    short
}
