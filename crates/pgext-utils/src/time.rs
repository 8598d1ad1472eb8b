use std::time::Duration;

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(24 * 60 * 60),
        _ => None,
    }
}

/// Parses a timeout such as `30s`, `2m` or `1h30m`.
///
/// Each component is a number followed by one of `s`, `m`, `h` or `d`.
/// Returns `None` for empty or malformed input, a bare number without a
/// unit, and values that overflow.
///
/// ```
/// use std::time::Duration;
/// use pgext_utils::time::parse_timeout;
///
/// assert_eq!(parse_timeout("1m30s"), Some(Duration::from_secs(90)));
/// ```
pub fn parse_timeout(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 || digits == rest.len() {
            return None;
        }
        let (number, tail) = rest.split_at(digits);
        let mut tail = tail.chars();
        let unit = unit_seconds(tail.next()?)?;

        total = total.checked_add(number.parse::<u64>().ok()?.checked_mul(unit)?)?;
        rest = tail.as_str();
    }

    Some(Duration::from_secs(total))
}
