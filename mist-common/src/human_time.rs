//! Human-readable clip duration formatting
//!
//! Sound clips are mostly a few seconds long, so short durations keep their
//! tenths while longer ones switch to minutes.

/// Durations below this many seconds use the `X.Xs` form
const SHORT_FORMAT_MAX: f64 = 60.0;

/// Format a duration in seconds for display.
///
/// - below one minute: `X.Xs`
/// - one minute and longer: `M:SS.Xs`
///
/// # Examples
///
/// ```
/// use mist_common::human_time::format_clip_duration;
///
/// assert_eq!(format_clip_duration(2.5), "2.5s");
/// assert_eq!(format_clip_duration(75.0), "1:15.0s");
/// ```
pub fn format_clip_duration(seconds: f64) -> String {
    let is_negative = seconds < 0.0;
    // Work in tenths so rounding never produces "60.0" in the seconds field
    let tenths = (seconds.abs() * 10.0).round() as u64;

    let formatted = if (tenths as f64) < SHORT_FORMAT_MAX * 10.0 {
        format!("{}.{}s", tenths / 10, tenths % 10)
    } else {
        let minutes = tenths / 600;
        let rem = tenths % 600;
        format!("{}:{:02}.{}s", minutes, rem / 10, rem % 10)
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format an optional duration; `None` renders as `unknown length`
pub fn format_clip_duration_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) => format_clip_duration(s),
        None => "unknown length".to_string(),
    }
}
