use chrono::NaiveDate;

/// Date format shown to and typed by the user.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";
/// ISO date format produced by calendar pickers.
pub const INTERNAL_FORMAT: &str = "%Y-%m-%d";

fn has_shape(s: &str, separator: u8, separator_at: [usize; 2]) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| {
            if separator_at.contains(&i) {
                *b == separator
            } else {
                b.is_ascii_digit()
            }
        })
}

/// Parse a strictly zero-padded `MM/DD/YYYY` date.
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !has_shape(s, b'/', [2, 5]) {
        return None;
    }
    NaiveDate::parse_from_str(s, DISPLAY_FORMAT).ok()
}

/// Parse a strictly zero-padded `YYYY-MM-DD` date.
pub fn parse_internal_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !has_shape(s, b'-', [4, 7]) {
        return None;
    }
    NaiveDate::parse_from_str(s, INTERNAL_FORMAT).ok()
}

/// Convert `YYYY-MM-DD` to `MM/DD/YYYY`. Anything else is returned unchanged.
pub fn to_display(s: &str) -> String {
    match parse_internal_date(s) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => s.to_string(),
    }
}

/// Convert `MM/DD/YYYY` to `YYYY-MM-DD`. Anything else is returned unchanged.
pub fn to_internal(s: &str) -> String {
    match parse_display_date(s) {
        Some(date) => date.format(INTERNAL_FORMAT).to_string(),
        None => s.to_string(),
    }
}

/// Format a number of seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
