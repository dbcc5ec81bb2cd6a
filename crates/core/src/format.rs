//! Human-readable formatting helpers for log lines and notifications.

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Render `bytes` in binary units with two decimals, e.g. `1.50 KB`.
/// Values under 1 KiB are printed as whole bytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
