/// Format a duration as `"D days H hours M minutes S seconds"`
pub fn human_readable_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    format!(
        "{} days {} hours {} minutes {} seconds",
        days, hours, minutes, seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(human_readable_uptime(0), "0 days 0 hours 0 minutes 0 seconds");
    }

    #[test]
    fn test_mixed_units() {
        let seconds = 3 * 86_400 + 4 * 3_600 + 5 * 60 + 6;
        assert_eq!(human_readable_uptime(seconds), "3 days 4 hours 5 minutes 6 seconds");
    }

    #[test]
    fn test_days_do_not_roll_into_months() {
        assert_eq!(human_readable_uptime(400 * 86_400), "400 days 0 hours 0 minutes 0 seconds");
    }
}
