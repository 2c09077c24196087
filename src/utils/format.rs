const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size using 1024-based units, capped at GB.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", SIZE_UNITS[unit])
}

/// Items processed per minute, or `None` when nothing meaningful can be computed.
pub fn rate_per_minute(count: u64, elapsed_secs: u64) -> Option<f64> {
    if count == 0 || elapsed_secs == 0 {
        return None;
    }
    Some(count as f64 / elapsed_secs as f64 * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024 * 1024), "3072.00 GB");
    }

    #[test]
    fn rates() {
        assert_eq!(rate_per_minute(0, 10), None);
        assert_eq!(rate_per_minute(10, 0), None);
        let r = rate_per_minute(20, 30).unwrap();
        assert!((r - 40.0).abs() < 1e-9);
    }
}
