/// Formats a second count as `M:SS` (minutes are not zero-padded).
pub fn format_time(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_seconds_but_not_minutes() {
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(5 * 60 + 7), "5:07");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(0), "0:00");
    }
}
