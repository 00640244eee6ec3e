//! Pointer gestures on the time grid.
//!
//! A gesture is pointer-down (`begin_*`), any number of pointer-moves
//! (`update`, pure geometry), and pointer-up (`finish`). Only the commit
//! returned by `finish` touches the store.

use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Utc};

use crate::models::event::{Event, EventDraft};
use crate::services::store::Store;
use crate::utils::date::at_local_time;
use crate::utils::grid::{minutes_since_midnight, time_of_day, GridColumn, MINUTES_PER_DAY};

mod drag;
mod resize;

pub use resize::ResizeHandle;

/// Length given to a range created by a click without movement.
pub const DEFAULT_CREATE_MINUTES: u32 = 60;

/// A snapped position on the grid: a day column and a minute within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub date: NaiveDate,
    /// Minutes since midnight, `0..=1440`.
    pub minutes: u32,
}

impl GridPoint {
    pub fn new(date: NaiveDate, minutes: u32) -> Self {
        Self {
            date,
            minutes: minutes.min(MINUTES_PER_DAY),
        }
    }

    /// Point of an instant as seen in `tz`.
    pub fn of<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        Self::new(local.date_naive(), minutes_since_midnight(&local))
    }

    /// Wall-clock instant of this point in `tz`. Minute 1440 is next midnight.
    pub fn to_instant<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        let days = u64::from(self.minutes / MINUTES_PER_DAY);
        let date = self.date.checked_add_days(Days::new(days)).unwrap_or(self.date);
        at_local_time(tz, date, time_of_day(self.minutes % MINUTES_PER_DAY)).with_timezone(&Utc)
    }
}

/// What a session is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Create,
    Move,
    Resize(ResizeHandle),
}

/// Range picked by a create drag, handed to the create dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CreateRequest {
    pub fn into_draft(self, title: Option<String>) -> EventDraft {
        let mut draft = EventDraft::new(self.start, self.end);
        draft.title = title;
        draft
    }
}

/// Result of a finished gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragCommit {
    Create(CreateRequest),
    Reschedule {
        event_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl DragCommit {
    /// Perform the single store mutation for this gesture.
    ///
    /// A create commit applied directly makes an untitled event.
    pub fn apply(self, store: &mut Store) -> Option<Event> {
        match self {
            DragCommit::Create(request) => Some(store.create_event(request.into_draft(None))),
            DragCommit::Reschedule {
                event_id,
                start,
                end,
            } => store.reschedule_event(&event_id, start, end),
        }
    }
}

/// Event being moved or resized, as it was at pointer-down.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Grab {
    event_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Grab {
    fn of(event: &Event) -> Self {
        Self {
            event_id: event.id.clone(),
            start: event.start,
            end: event.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Gesture {
    Create,
    Move(Grab),
    Resize(Grab, ResizeHandle),
}

/// One drag interaction on a day or week grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    gesture: Gesture,
    column: GridColumn,
    step_minutes: u32,
    default_minutes: u32,
    anchor: GridPoint,
    current: GridPoint,
}

impl DragSession {
    fn begin(gesture: Gesture, column: GridColumn, step_minutes: u32, date: NaiveDate, pointer_y: f32) -> Self {
        let anchor = GridPoint::new(date, column.minutes_at(pointer_y, step_minutes));
        Self {
            gesture,
            column,
            step_minutes,
            default_minutes: DEFAULT_CREATE_MINUTES,
            anchor,
            current: anchor,
        }
    }

    /// Pointer-down on empty grid space.
    pub fn begin_create(column: GridColumn, step_minutes: u32, date: NaiveDate, pointer_y: f32) -> Self {
        Self::begin(Gesture::Create, column, step_minutes, date, pointer_y)
    }

    /// Pointer-down on the body of an event.
    pub fn begin_move(
        event: &Event,
        column: GridColumn,
        step_minutes: u32,
        date: NaiveDate,
        pointer_y: f32,
    ) -> Self {
        Self::begin(Gesture::Move(Grab::of(event)), column, step_minutes, date, pointer_y)
    }

    /// Pointer-down on a resize handle of an event.
    pub fn begin_resize(
        event: &Event,
        handle: ResizeHandle,
        column: GridColumn,
        step_minutes: u32,
        date: NaiveDate,
        pointer_y: f32,
    ) -> Self {
        Self::begin(
            Gesture::Resize(Grab::of(event), handle),
            column,
            step_minutes,
            date,
            pointer_y,
        )
    }

    /// Length of a click-created range, normally the configured default duration.
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_minutes = minutes.max(1);
        self
    }

    pub fn kind(&self) -> GestureKind {
        match &self.gesture {
            Gesture::Create => GestureKind::Create,
            Gesture::Move(_) => GestureKind::Move,
            Gesture::Resize(_, handle) => GestureKind::Resize(*handle),
        }
    }

    /// Id of the event under the gesture, `None` while creating.
    pub fn event_id(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Create => None,
            Gesture::Move(grab) | Gesture::Resize(grab, _) => Some(&grab.event_id),
        }
    }

    pub fn anchor(&self) -> GridPoint {
        self.anchor
    }

    pub fn current(&self) -> GridPoint {
        self.current
    }

    /// Pointer-move, possibly into another day column.
    pub fn update(&mut self, pointer_y: f32, date: NaiveDate) {
        self.current = GridPoint::new(date, self.column.minutes_at(pointer_y, self.step_minutes));
    }

    /// Pointer-move over a column with different geometry (e.g. a resized view).
    pub fn update_in(&mut self, column: GridColumn, pointer_y: f32, date: NaiveDate) {
        self.column = column;
        self.update(pointer_y, date);
    }

    /// Live range for rendering the gesture in progress.
    pub fn preview<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        match &self.gesture {
            Gesture::Create => drag::create_range(self, tz),
            Gesture::Move(grab) => drag::moved_range(self, grab, tz),
            Gesture::Resize(grab, handle) => resize::resized_range(self, grab, *handle, tz),
        }
    }

    /// Pointer-up. `None` when a move or resize ends on the original times.
    pub fn finish<Tz: TimeZone>(self, tz: &Tz) -> Option<DragCommit> {
        let (start, end) = self.preview(tz);
        match self.gesture {
            Gesture::Create => Some(DragCommit::Create(CreateRequest { start, end })),
            Gesture::Move(grab) | Gesture::Resize(grab, _) => {
                if start == grab.start && end == grab.end {
                    log::debug!("Drag on {} ended where it began", grab.event_id);
                    return None;
                }
                Some(DragCommit::Reschedule {
                    event_id: grab.event_id,
                    start,
                    end,
                })
            }
        }
    }

    fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes.clamp(1, MINUTES_PER_DAY)))
    }
}


#[cfg(test)]
mod tests {
    use super::tests_support::*;
    use super::*;
    use crate::utils::clock::FixedClock;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_grid_point_end_of_day_is_next_midnight() {
        let point = GridPoint::new(day(2), 1440);
        assert_eq!(point.to_instant(&Utc), at(3, 0, 0));
        assert_eq!(GridPoint::new(day(2), 5000).minutes, 1440);
    }

    #[test]
    fn test_grid_point_round_trip_in_zone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let point = GridPoint::of(at(2, 3, 30), &tz);
        assert_eq!(point, GridPoint::new(day(1), 22 * 60 + 30));
        assert_eq!(point.to_instant(&tz), at(2, 3, 30));
    }

    #[test]
    fn test_kind_and_event_id() {
        let event = sample_event(at(2, 10, 0), at(2, 11, 0));
        let session = DragSession::begin_resize(&event, ResizeHandle::Top, COLUMN, 15, day(2), y(10, 0));

        assert_eq!(session.kind(), GestureKind::Resize(ResizeHandle::Top));
        assert_eq!(session.event_id(), Some(event.id.as_str()));
        assert_eq!(DragSession::begin_create(COLUMN, 15, day(2), y(9, 0)).event_id(), None);
    }

    #[test]
    fn test_create_request_into_draft() {
        let request = CreateRequest {
            start: at(2, 9, 0),
            end: at(2, 10, 0),
        };
        let draft = request.into_draft(Some("Sync".into()));
        assert_eq!(draft.title.as_deref(), Some("Sync"));
        assert_eq!((draft.start, draft.end), (at(2, 9, 0), at(2, 10, 0)));
    }

    #[test]
    fn test_commit_apply_makes_one_mutation() {
        let mut store = Store::with_clock(FixedClock::new(at(1, 0, 0)));
        let event = store.create_event(EventDraft::new(at(2, 10, 0), at(2, 11, 0)));

        let mut session = DragSession::begin_move(&event, COLUMN, 15, day(2), y(10, 0));
        session.update(y(13, 0), day(2));
        let moved = session.finish(&Utc).unwrap().apply(&mut store).unwrap();

        assert_eq!((moved.start, moved.end), (at(2, 13, 0), at(2, 14, 0)));
        assert_eq!(store.events().len(), 1);

        let created = DragSession::begin_create(COLUMN, 15, day(3), y(9, 0))
            .finish(&Utc)
            .unwrap()
            .apply(&mut store)
            .unwrap();
        assert_eq!(created.title, "Untitled Event");
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_reschedule_of_deleted_event_is_noop() {
        let mut store = Store::with_clock(FixedClock::new(at(1, 0, 0)));
        let commit = DragCommit::Reschedule {
            event_id: "gone".into(),
            start: at(2, 9, 0),
            end: at(2, 10, 0),
        };
        assert_eq!(commit.apply(&mut store), None);
    }
}
