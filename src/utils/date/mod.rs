// Date utility functions
// Day boundaries and wall-clock anchoring in the caller's time zone

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};

pub fn is_same_day<Tz: TimeZone>(date1: &DateTime<Tz>, date2: &DateTime<Tz>) -> bool {
    date1.date_naive() == date2.date_naive()
}

/// Resolve a wall-clock time on a calendar day in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are shifted forward by an hour.
pub fn at_local_time<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => {
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}

pub fn start_of_day<Tz: TimeZone>(date: &DateTime<Tz>) -> DateTime<Tz> {
    at_local_time(&date.timezone(), date.date_naive(), NaiveTime::MIN)
}

/// Wall-clock `hour:00` on the same day as `date`. Hour 24 is next midnight.
pub fn at_hour<Tz: TimeZone>(date: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let day = date.date_naive();
    if hour >= 24 {
        let next = day.succ_opt().unwrap_or(day);
        return at_local_time(&date.timezone(), next, NaiveTime::MIN);
    }
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    at_local_time(&date.timezone(), day, time)
}

/// The next date strictly after `from` that falls on `weekday`.
///
/// A date that already is `weekday` resolves to the same weekday a week later.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    from + Duration::days(ahead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    #[test]
    fn test_next_weekday_skips_today() {
        // 2025-03-14 is a Friday
        let friday = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(next_weekday(friday, Weekday::Fri), NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(next_weekday(friday, Weekday::Sat), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(next_weekday(friday, Weekday::Thu), NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
    }

    #[test]
    fn test_start_of_day_in_offset_zone() {
        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        let t = tz.with_ymd_and_hms(2025, 3, 14, 17, 45, 12).unwrap();
        let start = start_of_day(&t);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.date_naive(), t.date_naive());
        assert_eq!(start.with_timezone(&Utc).hour(), 14);
    }

    #[test]
    fn test_at_hour() {
        let t = Utc.with_ymd_and_hms(2025, 3, 14, 10, 7, 0).unwrap();
        assert_eq!(at_hour(&t, 9), Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());
        assert_eq!(at_hour(&t, 24), Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_is_same_day() {
        let a = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 59).unwrap();
        assert!(is_same_day(&a, &b));
        assert!(!is_same_day(&a, &(b + Duration::seconds(1))));
    }
}
