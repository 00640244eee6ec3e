use chrono::NaiveTime;

/// 12/24-hour clock value as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ClockText<'a> {
    pub hour: &'a str,
    pub minute: Option<&'a str>,
    pub meridiem: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn meridiem(text: Option<&str>) -> Option<Meridiem> {
    match text.map(str::to_ascii_lowercase).as_deref() {
        Some("am") => Some(Meridiem::Am),
        Some("pm") => Some(Meridiem::Pm),
        _ => None,
    }
}

fn to_time(hour: u32, minute: u32, meridiem: Option<Meridiem>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(Meridiem::Pm) if hour == 12 => 12,
        Some(Meridiem::Pm) => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Am) => hour,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn numbers(clock: &ClockText<'_>) -> Option<(u32, u32)> {
    let hour = clock.hour.parse().ok()?;
    let minute = match clock.minute {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    Some((hour, minute))
}

/// Parse a single clock value. `None` for out-of-range input.
pub(super) fn parse_clock(clock: &ClockText<'_>) -> Option<NaiveTime> {
    let (hour, minute) = numbers(clock)?;
    to_time(hour, minute, meridiem(clock.meridiem))
}

/// Parse a `start-end` clock range.
///
/// When only one side names am/pm the other side borrows it, preferring the
/// reading that keeps the start before the end (`3-4pm`, `11-1pm`).
pub(super) fn parse_clock_range(
    start: &ClockText<'_>,
    end: &ClockText<'_>,
) -> Option<(NaiveTime, NaiveTime)> {
    let (start_hour, start_minute) = numbers(start)?;
    let (end_hour, end_minute) = numbers(end)?;
    let start_meridiem = meridiem(start.meridiem);
    let end_meridiem = meridiem(end.meridiem);

    match (start_meridiem, end_meridiem) {
        (None, Some(borrowed)) if (1..=12).contains(&start_hour) => {
            let end_time = to_time(end_hour, end_minute, end_meridiem)?;
            let same = to_time(start_hour, start_minute, Some(borrowed))?;
            if same < end_time {
                return Some((same, end_time));
            }
            let other = if borrowed == Meridiem::Am { Meridiem::Pm } else { Meridiem::Am };
            let flipped = to_time(start_hour, start_minute, Some(other))?;
            Some((if flipped < end_time { flipped } else { same }, end_time))
        }
        (Some(borrowed), None) if (1..=12).contains(&end_hour) => {
            let start_time = to_time(start_hour, start_minute, start_meridiem)?;
            Some((start_time, to_time(end_hour, end_minute, Some(borrowed))?))
        }
        _ => Some((
            to_time(start_hour, start_minute, start_meridiem)?,
            to_time(end_hour, end_minute, end_meridiem)?,
        )),
    }
}

/// Convert `N unit` to minutes. Unknown units yield `None`.
pub(super) fn unit_minutes(amount: &str, unit: &str) -> Option<u32> {
    let amount: u32 = amount.parse().ok()?;
    let unit = unit.to_ascii_lowercase();
    let factor = if unit.starts_with('d') {
        1440
    } else if unit.starts_with('h') {
        60
    } else if unit.starts_with('m') {
        1
    } else {
        return None;
    };
    amount.checked_mul(factor)
}

/// True when the text right after a match is a duration unit, as in
/// `tomorrow 2 hours`, where the number is not a clock time.
pub(super) fn followed_by_unit(rest: &str) -> bool {
    let word: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(
        word.as_str(),
        "m" | "min" | "mins" | "minute" | "minutes" | "h" | "hr" | "hrs" | "hour" | "hours"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock<'a>(hour: &'a str, minute: Option<&'a str>, meridiem: Option<&'a str>) -> ClockText<'a> {
        ClockText { hour, minute, meridiem }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_twelve_hour_normalization() {
        assert_eq!(parse_clock(&clock("3", None, Some("pm"))), Some(hm(15, 0)));
        assert_eq!(parse_clock(&clock("12", None, Some("pm"))), Some(hm(12, 0)));
        assert_eq!(parse_clock(&clock("12", Some("30"), Some("AM"))), Some(hm(0, 30)));
        assert_eq!(parse_clock(&clock("9", Some("05"), Some("am"))), Some(hm(9, 5)));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(parse_clock(&clock("13", None, Some("pm"))), None);
        assert_eq!(parse_clock(&clock("0", None, Some("am"))), None);
        assert_eq!(parse_clock(&clock("24", None, None)), None);
        assert_eq!(parse_clock(&clock("10", Some("60"), None)), None);
        assert_eq!(parse_clock(&clock("17", Some("45"), None)), Some(hm(17, 45)));
    }

    #[test]
    fn test_range_borrows_meridiem() {
        assert_eq!(
            parse_clock_range(&clock("3", None, None), &clock("4", None, Some("pm"))),
            Some((hm(15, 0), hm(16, 0)))
        );
        assert_eq!(
            parse_clock_range(&clock("11", None, None), &clock("1", None, Some("pm"))),
            Some((hm(11, 0), hm(13, 0)))
        );
        assert_eq!(
            parse_clock_range(&clock("3", None, Some("pm")), &clock("4", Some("30"), None)),
            Some((hm(15, 0), hm(16, 30)))
        );
        assert_eq!(
            parse_clock_range(&clock("14", None, None), &clock("15", Some("30"), None)),
            Some((hm(14, 0), hm(15, 30)))
        );
    }

    #[test]
    fn test_unit_minutes() {
        assert_eq!(unit_minutes("25", "m"), Some(25));
        assert_eq!(unit_minutes("2", "hours"), Some(120));
        assert_eq!(unit_minutes("1", "day"), Some(1440));
        assert_eq!(unit_minutes("1", "week"), None);
    }

    #[test]
    fn test_followed_by_unit() {
        assert!(followed_by_unit(" hours of work"));
        assert!(followed_by_unit("h"));
        assert!(!followed_by_unit(" with bob"));
        assert!(!followed_by_unit(""));
    }
}
