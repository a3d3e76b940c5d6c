use std::time::Duration;

/// Unit suffixes and their length in seconds, largest first
const UNITS: [(char, u64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parse a duration like "30s", "5m", "1h", "1d", or raw seconds
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim().to_lowercase();

    let (digits, unit_secs) = UNITS
        .iter()
        .find_map(|&(suffix, secs)| text.strip_suffix(suffix).map(|rest| (rest, secs)))
        .unwrap_or((text.as_str(), 1));

    let count: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration: {}. Use format like '30s', '5m', '1h'", text))?;

    count
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("Duration too large: {}", text))
}

/// Format a duration with the largest unit that divides it evenly
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    UNITS
        .iter()
        .find(|&&(_, unit_secs)| secs >= unit_secs && secs % unit_secs == 0)
        .map(|&(suffix, unit_secs)| format!("{}{}", secs / unit_secs, suffix))
        .unwrap_or_else(|| format!("{}s", secs))
}
