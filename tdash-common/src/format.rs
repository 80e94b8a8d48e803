//! Human-readable display formatting
//!
//! Provides consistent byte-size and timestamp rendering for file listings.

use chrono::DateTime;

/// Unit ladder for byte-size display, scaled by 1024 per step
const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Sentinel shown when a listing record carries no timestamp
pub const MISSING_TIMESTAMP: &str = "N/A";

/// Format a byte count as a human-readable size.
///
/// Selects the unit by `floor(log1024(bytes))`, clamped to the ladder, and
/// rounds the scaled value to at most two decimal places with trailing
/// zeros trimmed.
///
/// # Examples
///
/// ```
/// use tdash_common::format::format_size;
///
/// assert_eq!(format_size(0), "0 Bytes");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(1073741824), "1 GB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).log2() / 10.0).floor() as usize;
    let unit_index = exponent.min(SIZE_UNITS.len() - 1);
    let scaled = bytes as f64 / 1024_f64.powi(unit_index as i32);

    // Round to 2 decimals first, then check if we can simplify
    let rounded_2dp = (scaled * 100.0).round() / 100.0;
    let rounded_1dp = (scaled * 10.0).round() / 10.0;

    let value = if (rounded_2dp - rounded_2dp.floor()).abs() < 0.001 {
        // It's effectively a whole number
        format!("{:.0}", rounded_2dp)
    } else if (rounded_2dp * 10.0 - (rounded_2dp * 10.0).floor()).abs() < 0.001 {
        // Second decimal is 0, use 1 decimal place
        format!("{:.1}", rounded_1dp)
    } else {
        format!("{:.2}", rounded_2dp)
    };

    format!("{} {}", value, SIZE_UNITS[unit_index])
}

/// Format an RFC-3339 timestamp for listing display.
///
/// Fixed field set: day, abbreviated month, year, hour, minute. Absent or
/// unparseable input yields the [`MISSING_TIMESTAMP`] sentinel.
pub fn format_timestamp(iso: Option<&str>) -> String {
    let Some(raw) = iso else {
        return MISSING_TIMESTAMP.to_string();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%d %b %Y %H:%M").to_string(),
        Err(_) => MISSING_TIMESTAMP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn test_byte_range() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(500), "500 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_kb_range() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1100), "1.07 KB");
    }

    #[test]
    fn test_mb_range() {
        assert_eq!(format_size(1048576), "1 MB");
        assert_eq!(format_size(5 * 1048576 + 1048576 / 2), "5.5 MB");
    }

    #[test]
    fn test_gb_range() {
        assert_eq!(format_size(1073741824), "1 GB");
        assert_eq!(format_size(2 * 1073741824), "2 GB");
    }

    #[test]
    fn test_clamped_to_gb() {
        // Values beyond the ladder stay in the largest unit
        assert_eq!(format_size(1024 * 1073741824), "1024 GB");
    }

    #[test]
    fn test_timestamp_present() {
        assert_eq!(
            format_timestamp(Some("2024-08-07T14:30:00+07:00")),
            "07 Aug 2024 14:30"
        );
    }

    #[test]
    fn test_timestamp_absent() {
        assert_eq!(format_timestamp(None), "N/A");
    }

    #[test]
    fn test_timestamp_unparseable() {
        assert_eq!(format_timestamp(Some("yesterday")), "N/A");
    }
}
