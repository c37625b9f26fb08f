use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Resolve the configured whole-hour UTC offset. Config validation bounds the
/// value, so the fallback to UTC is unreachable in practice.
fn resolve_offset(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Format an instant as `YYYY-MM-DD HH:mm:ss` in the configured offset.
/// This is the canonical `submitted_at` representation.
pub fn format_timestamp(instant: DateTime<Utc>, utc_offset_hours: i32) -> String {
    instant
        .with_timezone(&resolve_offset(utc_offset_hours))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Format an instant as `YYYY-MM-DD_HHMMSS` for the CSV export filename.
pub fn format_export_stamp(instant: DateTime<Utc>, utc_offset_hours: i32) -> String {
    instant
        .with_timezone(&resolve_offset(utc_offset_hours))
        .format("%Y-%m-%d_%H%M%S")
        .to_string()
}

/// Escape text for interpolation into HTML (viewer page and admin email).
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
