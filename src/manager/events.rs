use super::AttendanceManager;
use crate::error::{AttendanceError, AttendanceResult};
use crate::identity::{Identity, require_admin};
use crate::models::{Attendance, Event, EventDetail, NewEvent, Student};
use crate::schema::{attendance, events, students};
use chrono::NaiveDateTime;
use diesel::prelude::*;

impl AttendanceManager {
    /// Retrieves every event, across all forums, in date order.
    pub fn list_events(&mut self, identity: &Identity) -> AttendanceResult<Vec<Event>> {
        require_admin(identity)?;

        Ok(events::table
            .order((events::event_date.asc(), events::id.asc()))
            .select(Event::as_select())
            .load(&mut self.db)?)
    }

    pub fn get_event(&mut self, identity: &Identity, event_id: i32) -> AttendanceResult<Event> {
        require_admin(identity)?;

        find_event(&mut self.db, event_id)
    }

    /// Creates an event, along with an unmarked [`Attendance`] record for every student in the
    /// caller's forum.
    ///
    /// Students in other forums get no record for this event. The event and its records are written
    /// in one transaction, so a failure part way through leaves nothing behind.
    pub fn add_event(
        &mut self,
        identity: &Identity,
        event_name: &str,
        event_description: &str,
        event_date: NaiveDateTime,
    ) -> AttendanceResult<Event> {
        require_admin(identity)?;
        AttendanceError::require_field("event name", event_name)?;
        AttendanceError::require_field("event description", event_description)?;

        let forum = identity.forum.as_str();

        let (event, records) = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                let event = diesel::insert_into(events::table)
                    .values(&NewEvent {
                        event_name,
                        event_description,
                        event_date,
                    })
                    .returning(Event::as_returning())
                    .get_result(conn)?;

                let records: Vec<Attendance> = students::table
                    .filter(students::forum.eq(forum))
                    .select(students::id)
                    .load::<i32>(conn)?
                    .into_iter()
                    .map(|student_id| Attendance::unmarked(event.id, student_id))
                    .collect();

                if !records.is_empty() {
                    diesel::insert_into(attendance::table)
                        .values(&records)
                        .execute(conn)?;
                }

                Ok((event, records.len()))
            })
            .map_err(|err| err.describe_violation("can not add event"))
            .inspect_err(|err| tracing::warn!(event_name, "could not add event: {err}"))?;

        tracing::info!(id = event.id, event_name, forum, records, "added event");

        Ok(event)
    }

    /// Renames an event. The description and date are left as they are.
    pub fn edit_event(
        &mut self,
        identity: &Identity,
        event_id: i32,
        event_name: &str,
    ) -> AttendanceResult<Event> {
        require_admin(identity)?;
        AttendanceError::require_field("event name", event_name)?;

        let event = self.db.transaction::<_, AttendanceError, _>(|conn| {
            diesel::update(events::table.find(event_id))
                .set(events::event_name.eq(event_name))
                .returning(Event::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| AttendanceError::not_found("Event", event_id))
        })?;

        tracing::info!(id = event_id, event_name, "edited event");

        Ok(event)
    }

    /// Removes and returns an event, along with every attendance record it owns.
    pub fn delete_event(&mut self, identity: &Identity, event_id: i32) -> AttendanceResult<Event> {
        require_admin(identity)?;

        let (event, records) = self.db.transaction::<_, AttendanceError, _>(|conn| {
            let records =
                diesel::delete(attendance::table.filter(attendance::event_id.eq(event_id)))
                    .execute(conn)?;

            let event = diesel::delete(events::table.find(event_id))
                .returning(Event::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| AttendanceError::not_found("Event", event_id))?;

            Ok((event, records))
        })?;

        tracing::info!(id = event_id, records, "deleted event");

        Ok(event)
    }

    /// Retrieves an event with the attendance records of the students in the caller's forum,
    /// ordered by student name.
    pub fn detail_event(&mut self, identity: &Identity, event_id: i32) -> AttendanceResult<EventDetail> {
        require_admin(identity)?;

        let event = find_event(&mut self.db, event_id)?;

        let attendance = attendance::table
            .inner_join(students::table)
            .filter(attendance::event_id.eq(event.id))
            .filter(students::forum.eq(&identity.forum))
            .order(students::name.asc())
            .select((Attendance::as_select(), Student::as_select()))
            .load::<(Attendance, Student)>(&mut self.db)?;

        Ok(EventDetail { event, attendance })
    }
}

pub(super) fn find_event(conn: &mut SqliteConnection, event_id: i32) -> AttendanceResult<Event> {
    events::table
        .find(event_id)
        .select(Event::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AttendanceError::not_found("Event", event_id))
}
