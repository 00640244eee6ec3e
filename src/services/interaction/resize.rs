// Event resize
//
// Top/Bottom handles drag the start/end time. The opposite edge stays put and
// the event never shrinks below one grid step.

use chrono::{DateTime, TimeZone, Utc};

use super::{DragSession, Grab};

/// Which edge of the event is being resized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Top edge - adjusts start time
    Top,
    /// Bottom edge - adjusts end time
    Bottom,
}

impl ResizeHandle {
    /// Handle nearest to a pointer inside an event box spanning `top..bottom`.
    pub fn nearest(pointer_y: f32, top: f32, bottom: f32) -> Self {
        if (pointer_y - top).abs() <= (bottom - pointer_y).abs() {
            ResizeHandle::Top
        } else {
            ResizeHandle::Bottom
        }
    }
}

pub(super) fn resized_range<Tz: TimeZone>(
    session: &DragSession,
    grab: &Grab,
    handle: ResizeHandle,
    tz: &Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let pointer = session.current.to_instant(tz);
    let step = session.step();

    match handle {
        ResizeHandle::Top => (pointer.min(grab.end - step), grab.end),
        ResizeHandle::Bottom => (grab.start, pointer.max(grab.start + step)),
    }
}
