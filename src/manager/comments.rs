use super::AttendanceManager;
use crate::error::{AttendanceError, AttendanceResult};
use crate::identity::{Identity, require_admin};
use crate::models::{Attendance, Student};
use crate::schema::{attendance, students};
use diesel::prelude::*;

impl AttendanceManager {
    /// Retrieves one attendance record together with its student.
    pub fn get_attendance(
        &mut self,
        identity: &Identity,
        event_id: i32,
        student_id: i32,
    ) -> AttendanceResult<(Attendance, Student)> {
        require_admin(identity)?;

        attendance::table
            .inner_join(students::table)
            .filter(attendance::event_id.eq(event_id))
            .filter(attendance::student_id.eq(student_id))
            .select((Attendance::as_select(), Student::as_select()))
            .first(&mut self.db)
            .optional()?
            .ok_or_else(|| record_not_found(event_id, student_id))
    }

    /// Marks whether a student attended an event and records their teaching fellow's comment,
    /// replacing whatever was there before.
    pub fn record_comment(
        &mut self,
        identity: &Identity,
        event_id: i32,
        student_id: i32,
        is_attended: bool,
        comment: &str,
    ) -> AttendanceResult<Attendance> {
        require_admin(identity)?;

        let record = self.db.transaction::<_, AttendanceError, _>(|conn| {
            diesel::update(attendance::table.find((event_id, student_id)))
                .set((
                    attendance::is_attended.eq(is_attended),
                    attendance::tf_comment.eq(comment),
                ))
                .returning(Attendance::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| record_not_found(event_id, student_id))
        })?;

        tracing::info!(event_id, student_id, is_attended, "recorded comment");

        Ok(record)
    }
}

fn record_not_found(event_id: i32, student_id: i32) -> AttendanceError {
    AttendanceError::not_found("Attendance", format!("{event_id}/{student_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::test_support::{enroll, fellow, manager, outsider};
    use chrono::NaiveDate;

    fn kickoff(manager: &mut AttendanceManager, forum: &str) -> i32 {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        manager
            .add_event(&fellow(forum), "Kickoff", "Forum meeting", date)
            .unwrap()
            .id
    }

    #[test]
    fn record_comment_updates_exactly_one_record() {
        let mut manager = manager();
        let tf = fellow("F1");
        let students = enroll(&mut manager, "F1", &["Ada", "Grace"]);
        let first = kickoff(&mut manager, "F1");
        let second = kickoff(&mut manager, "F1");

        let updated = manager
            .record_comment(&tf, first, students[0].id, true, "Asked great questions")
            .unwrap();
        assert!(updated.is_attended);
        assert_eq!(updated.tf_comment, "Asked great questions");

        let (record, student) = manager.get_attendance(&tf, first, students[0].id).unwrap();
        assert_eq!(record, updated);
        assert_eq!(student, students[0]);

        let untouched = [
            (first, students[1].id),
            (second, students[0].id),
            (second, students[1].id),
        ];
        for (event_id, student_id) in untouched {
            let (record, _) = manager.get_attendance(&tf, event_id, student_id).unwrap();
            assert_eq!(record, Attendance::unmarked(event_id, student_id));
        }
    }

    #[test]
    fn comments_can_be_overwritten() {
        let mut manager = manager();
        let tf = fellow("F1");
        let ada = enroll(&mut manager, "F1", &["Ada"]).remove(0);
        let event = kickoff(&mut manager, "F1");

        manager.record_comment(&tf, event, ada.id, true, "Present").unwrap();
        let record = manager.record_comment(&tf, event, ada.id, false, "").unwrap();
        assert_eq!(record, Attendance::unmarked(event, ada.id));
    }

    #[test]
    fn missing_record_is_not_found() {
        let mut manager = manager();
        let tf = fellow("F1");
        let linus = enroll(&mut manager, "F2", &["Linus"]).remove(0);
        let event = kickoff(&mut manager, "F1");

        let err = manager
            .record_comment(&tf, event, linus.id, true, "Wrong forum")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Attendance with ID {event}/{} not found", linus.id)
        );
        assert!(matches!(
            manager.get_attendance(&tf, event, linus.id),
            Err(AttendanceError::NotFound { .. })
        ));
    }

    #[test]
    fn non_admins_cannot_comment() {
        let mut manager = manager();
        let ada = enroll(&mut manager, "F1", &["Ada"]).remove(0);
        let event = kickoff(&mut manager, "F1");

        assert!(matches!(
            manager.record_comment(&outsider("F1"), event, ada.id, true, "Sneaky"),
            Err(AttendanceError::Forbidden)
        ));
        let (record, _) = manager.get_attendance(&fellow("F1"), event, ada.id).unwrap();
        assert_eq!(record, Attendance::unmarked(event, ada.id));
    }
}
