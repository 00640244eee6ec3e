use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{DragSession, Grab};

/// Range spanned by a create drag, in either direction.
///
/// A click, or a drag that snaps back onto the anchor, yields the default length.
pub(super) fn create_range<Tz: TimeZone>(
    session: &DragSession,
    tz: &Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let anchor = session.anchor.to_instant(tz);
    let current = session.current.to_instant(tz);

    if anchor == current {
        return (anchor, anchor + Duration::minutes(i64::from(session.default_minutes)));
    }
    (anchor.min(current), anchor.max(current))
}

/// Event range shifted by the pointer's travel since pointer-down.
///
/// Shifting by the travel keeps both the duration and the spot where the
/// event was grabbed.
pub(super) fn moved_range<Tz: TimeZone>(
    session: &DragSession,
    grab: &Grab,
    tz: &Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let travel = session.current.to_instant(tz) - session.anchor.to_instant(tz);
    (grab.start + travel, grab.end + travel)
}
