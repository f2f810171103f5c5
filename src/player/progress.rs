//! Time formatting and progress mapping for ErfPlayer
//!
//! Converts a device's reported position/duration into a normalized
//! progress fraction and a display-friendly elapsed time.

use std::time::Duration;

/// Format a number of seconds as "MM:SS"
///
/// Minutes count total whole minutes and are not clamped to 60, so an
/// hour-long track formats as "60:00". Both fields are zero-padded to
/// two digits.
pub fn format_time(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Compute the progress fraction for a position within a duration
///
/// Returns `0.0` when the duration is zero (unknown or not yet probed),
/// and clamps to `[0.0, 1.0]` against devices that report a position
/// slightly past the end of the track.
pub fn progress_fraction(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(5), "00:05");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(600), "10:00");
        // Minutes are unbounded, no hour rollover
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(3661), "61:01");
    }

    #[test]
    fn test_progress_fraction() {
        let dur = Duration::from_secs(200);
        assert_eq!(progress_fraction(Duration::from_secs(50), dur), 0.25);
        assert_eq!(progress_fraction(Duration::ZERO, dur), 0.0);
        assert_eq!(progress_fraction(dur, dur), 1.0);
    }

    #[test]
    fn test_progress_fraction_zero_duration() {
        assert_eq!(
            progress_fraction(Duration::from_secs(10), Duration::ZERO),
            0.0
        );
    }

    #[test]
    fn test_progress_fraction_overrun_clamped() {
        // Position reported slightly past the duration
        assert_eq!(
            progress_fraction(Duration::from_secs(201), Duration::from_secs(200)),
            1.0
        );
    }
}
