//! Duration formatting for the front-end's `Duration.*` / `Runtime` labels.

use crate::Record;

/// Breakdown of a total number of minutes.
///
/// `90` → `{Duration: "1:30", Duration.Hours: "1", Duration.Minutes: "30", Runtime: "90"}`
pub fn duration_from_minutes(total_minutes: u64) -> Record {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    Record::new()
        .with("Duration", format!("{hours}:{minutes:02}"))
        .with("Duration.Hours", hours.to_string())
        .with("Duration.Minutes", minutes.to_string())
        .with("Runtime", total_minutes.to_string())
}

/// Accepts `"H:MM"` or a plain number of minutes. Anything else yields an
/// empty record.
pub fn parse_duration(input: &str) -> Record {
    let input = input.trim();
    if let Some((hours, minutes)) = input.split_once(':') {
        let (hours, minutes) = (hours.trim(), minutes.trim());
        let (Ok(h), Ok(m)) = (hours.parse::<u64>(), minutes.parse::<u64>()) else {
            return Record::new();
        };
        return Record::new()
            .with("Duration", format!("{hours}:{minutes}"))
            .with("Duration.Hours", hours.to_string())
            .with("Duration.Minutes", minutes.to_string())
            .with("Runtime", (h * 60 + m).to_string());
    }

    match input.parse::<f64>() {
        Ok(minutes) if minutes.is_finite() && minutes >= 0.0 => {
            duration_from_minutes(minutes as u64)
        }
        _ => Record::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_duration_is_broken_down() {
        let rec = parse_duration("2:15");
        assert_eq!(rec.get_str("Duration"), Some("2:15"));
        assert_eq!(rec.get_str("Duration.Hours"), Some("2"));
        assert_eq!(rec.get_str("Duration.Minutes"), Some("15"));
        assert_eq!(rec.get_str("Runtime"), Some("135"));
    }

    #[test]
    fn raw_minutes_are_broken_down() {
        let rec = parse_duration("90");
        assert_eq!(rec.get_str("Duration"), Some("1:30"));
        assert_eq!(rec.get_str("Duration.Hours"), Some("1"));
        assert_eq!(rec.get_str("Duration.Minutes"), Some("30"));
        assert_eq!(rec.get_str("Runtime"), Some("90"));

        let rec = duration_from_minutes(65);
        assert_eq!(rec.get_str("Duration"), Some("1:05"));
        assert_eq!(rec.get_str("Duration.Minutes"), Some("5"));
    }

    #[test]
    fn garbage_yields_empty_record() {
        assert!(parse_duration("").is_empty());
        assert!(parse_duration("abc").is_empty());
        assert!(parse_duration("1:xx").is_empty());
        assert!(parse_duration("-5").is_empty());
    }
}
