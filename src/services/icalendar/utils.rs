use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Longest content line, in octets, before folding.
const FOLD_WIDTH: usize = 75;

pub(super) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

pub(super) fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d").to_string()
}

pub(super) fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

pub(super) fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Append one content line, folded at 75 octets, terminated with CRLF.
pub(super) fn push_line(buffer: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > FOLD_WIDTH {
            buffer.push_str("\r\n ");
            // The leading space counts towards the continuation line
            width = 1;
        }
        buffer.push(c);
        width += len;
    }
    buffer.push_str("\r\n");
}

/// Join folded continuation lines back onto their parent line.
pub(super) fn unfold_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in content.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

/// Decoded `DTSTART`/`DTEND` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DateToken {
    pub instant: DateTime<Utc>,
    pub all_day: bool,
}

/// Decode a date or date-time token.
///
/// An 8-digit token is an all-day date at midnight UTC. A token with `T` is
/// `YYYYMMDDTHHMMSS[Z]`; floating values use `tzid` when it names a known
/// zone and UTC otherwise.
pub(super) fn parse_date_token(token: &str, tzid: Option<&str>) -> Option<DateToken> {
    let token = token.trim();

    if token.len() == 8 {
        let date = parse_ymd(token)?;
        return Some(DateToken {
            instant: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            all_day: true,
        });
    }

    if !token.contains('T') {
        return None;
    }

    let has_utc_suffix = token.ends_with('Z') || token.ends_with('z');
    let normalized = token.trim_end_matches(['Z', 'z']);
    let (date_part, time_part) = normalized.split_once('T')?;
    if date_part.len() != 8 || time_part.len() < 6 {
        return None;
    }

    let date = parse_ymd(date_part)?;
    let hour: u32 = time_part.get(0..2)?.parse().ok()?;
    let minute: u32 = time_part.get(2..4)?.parse().ok()?;
    let second: u32 = time_part.get(4..6)?.parse().ok()?;
    let naive = NaiveDateTime::new(date, NaiveTime::from_hms_opt(hour, minute, second)?);

    let instant = if has_utc_suffix {
        Utc.from_utc_datetime(&naive)
    } else {
        match tzid.and_then(|name| Tz::from_str(name.trim_matches('"')).ok()) {
            Some(zone) => zone
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&Utc),
            None => Utc.from_utc_datetime(&naive),
        }
    };

    Some(DateToken {
        instant,
        all_day: false,
    })
}

fn parse_ymd(s: &str) -> Option<NaiveDate> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6)?.parse().ok()?;
    let day: u32 = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_utc_suffix() {
        let parsed = parse_date_token("20260227T010203Z", None).unwrap();
        assert_eq!(parsed.instant, Utc.with_ymd_and_hms(2026, 2, 27, 1, 2, 3).unwrap());
        assert!(!parsed.all_day);
    }

    #[test]
    fn test_parse_datetime_with_tzid() {
        let parsed = parse_date_token("20260227T090000", Some("Australia/Sydney")).unwrap();
        // Sydney is UTC+11 in February
        assert_eq!(parsed.instant, Utc.with_ymd_and_hms(2026, 2, 26, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_floating_without_zone_is_utc() {
        let parsed = parse_date_token("20251107T140000", Some("Not/AZone")).unwrap();
        assert_eq!(parsed.instant, Utc.with_ymd_and_hms(2025, 11, 7, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_date_token("20251107", None).unwrap();
        assert!(parsed.all_day);
        assert_eq!(parsed.instant, Utc.with_ymd_and_hms(2025, 11, 7, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date_token("2025110", None), None);
        assert_eq!(parse_date_token("2025AB07", None), None);
        assert_eq!(parse_date_token("20251340T000000Z", None), None);
        assert_eq!(parse_date_token("20251107T2500", None), None);
        assert_eq!(parse_date_token("tomorrow", None), None);
    }

    #[test]
    fn test_escape_text() {
        let text = "Line1\nLine2,with,commas;and;semicolons\\backslash";
        let escaped = escape_text(text);
        assert_eq!(escaped, "Line1\\nLine2\\,with\\,commas\\;and\\;semicolons\\\\backslash");
        assert_eq!(unescape_text(&escaped), text);
    }

    #[test]
    fn test_unescape_literal_backslash_n() {
        // An escaped backslash followed by `n` is not a newline
        assert_eq!(unescape_text("C:\\\\notes"), "C:\\notes");
    }

    #[test]
    fn test_fold_and_unfold() {
        let long = format!("DESCRIPTION:{}", "é".repeat(60));
        let mut buffer = String::new();
        push_line(&mut buffer, &long);

        for physical in buffer.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(physical.len() <= FOLD_WIDTH, "line too long: {}", physical.len());
        }
        assert_eq!(unfold_lines(&buffer)[0], long);
    }
}
