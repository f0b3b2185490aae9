//! Duration formatting for log lines and anomaly descriptions.

/// Render a span of seconds using its two largest units, e.g. `"1m 35s"` for
/// the gap between a voter's first and last vote.
pub fn format_duration(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3_599 => format!("{}m {}s", secs / 60, secs % 60),
        3_600..=86_399 => format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60),
        _ => format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600),
    }
}
