use super::AttendanceManager;
use crate::error::{AttendanceError, AttendanceResult};
use crate::identity::{Identity, require_admin};
use crate::models::{NewStudent, Student};
use crate::roster::RosterEntry;
use crate::schema::students;
use diesel::prelude::*;

impl AttendanceManager {
    /// Retrieves every student in the caller's forum, ordered by name.
    pub fn list_students(&mut self, identity: &Identity) -> AttendanceResult<Vec<Student>> {
        require_admin(identity)?;

        let roster = students::table
            .filter(students::forum.eq(&identity.forum))
            .order(students::name.asc())
            .select(Student::as_select())
            .load(&mut self.db)?;

        tracing::debug!(forum = %identity.forum, count = roster.len(), "listed students");

        Ok(roster)
    }

    /// Retrieves a specific student based on their ID.
    pub fn get_student(&mut self, identity: &Identity, student_id: i32) -> AttendanceResult<Student> {
        require_admin(identity)?;

        find_student(&mut self.db, student_id)
    }

    /// Adds a new student to `forum`.
    ///
    /// A student with the same name already in that forum is rejected with a
    /// [`AttendanceError::ConstraintViolation`], and nothing is written.
    pub fn add_student(
        &mut self,
        identity: &Identity,
        name: &str,
        forum: &str,
    ) -> AttendanceResult<Student> {
        require_admin(identity)?;
        AttendanceError::require_field("name", name)?;
        AttendanceError::require_field("forum", forum)?;

        let student = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                Ok(diesel::insert_into(students::table)
                    .values(&NewStudent { name, forum })
                    .returning(Student::as_returning())
                    .get_result(conn)?)
            })
            .map_err(|err| err.describe_violation("student name already exists"))
            .inspect_err(|err| tracing::warn!(name, forum, "could not add student: {err}"))?;

        tracing::info!(id = student.id, name, forum, "added student");

        Ok(student)
    }

    /// Overwrites a student's name and forum.
    pub fn edit_student(
        &mut self,
        identity: &Identity,
        student_id: i32,
        name: &str,
        forum: &str,
    ) -> AttendanceResult<Student> {
        require_admin(identity)?;
        AttendanceError::require_field("name", name)?;
        AttendanceError::require_field("forum", forum)?;

        let student = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                diesel::update(students::table.find(student_id))
                    .set((students::name.eq(name), students::forum.eq(forum)))
                    .returning(Student::as_returning())
                    .get_result(conn)
                    .optional()?
                    .ok_or_else(|| AttendanceError::not_found("Student", student_id))
            })
            .map_err(|err| err.describe_violation("student name already exists"))?;

        tracing::info!(id = student_id, name, forum, "edited student");

        Ok(student)
    }

    /// Removes and returns a student given their ID.
    ///
    /// Students that still have attendance records are kept, and the call fails with a
    /// [`AttendanceError::ConstraintViolation`].
    pub fn delete_student(&mut self, identity: &Identity, student_id: i32) -> AttendanceResult<Student> {
        require_admin(identity)?;

        let student = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                diesel::delete(students::table.find(student_id))
                    .returning(Student::as_returning())
                    .get_result(conn)
                    .optional()?
                    .ok_or_else(|| AttendanceError::not_found("Student", student_id))
            })
            .map_err(|err| err.describe_violation("student still has attendance records"))?;

        tracing::info!(id = student_id, name = %student.name, "deleted student");

        Ok(student)
    }

    /// Inserts every roster entry as a new student. Either all of them are added or none are.
    pub fn import_students(
        &mut self,
        identity: &Identity,
        entries: &[RosterEntry],
    ) -> AttendanceResult<Vec<Student>> {
        require_admin(identity)?;

        for entry in entries {
            AttendanceError::require_field("name", &entry.name)?;
            AttendanceError::require_field("forum", &entry.forum)?;
        }

        let new_students: Vec<NewStudent> = entries
            .iter()
            .map(|entry| NewStudent {
                name: &entry.name,
                forum: &entry.forum,
            })
            .collect();

        let imported = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                let mut imported = Vec::with_capacity(new_students.len());
                for student in &new_students {
                    let inserted = diesel::insert_into(students::table)
                        .values(student)
                        .returning(Student::as_returning())
                        .get_result(conn)
                        .map_err(|err| {
                            AttendanceError::from(err).describe_violation(format!(
                                "student {} already exists in forum {}",
                                student.name, student.forum
                            ))
                        })?;
                    imported.push(inserted);
                }
                Ok(imported)
            })
            .inspect_err(|err| tracing::warn!("roster import rolled back: {err}"))?;

        tracing::info!(count = imported.len(), "imported roster");

        Ok(imported)
    }
}

pub(super) fn find_student(conn: &mut SqliteConnection, student_id: i32) -> AttendanceResult<Student> {
    students::table
        .find(student_id)
        .select(Student::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AttendanceError::not_found("Student", student_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::test_support::{enroll, fellow, manager, outsider};
    use crate::models::Attendance;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn student_count(manager: &mut AttendanceManager) -> i64 {
        students::table.count().get_result(&mut manager.db).unwrap()
    }

    #[test]
    fn list_students_is_scoped_to_the_callers_forum() {
        let mut manager = manager();
        enroll(&mut manager, "F1", &["Ada", "Grace"]);
        enroll(&mut manager, "F2", &["Linus"]);

        let names: Vec<String> = manager
            .list_students(&fellow("F1"))
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Ada", "Grace"]);

        let f2 = manager.list_students(&fellow("F2")).unwrap();
        assert_eq!(f2.len(), 1);
        assert!(f2.iter().all(|s| s.forum == "F2"));

        assert!(manager.list_students(&fellow("F3")).unwrap().is_empty());
    }

    #[test]
    fn duplicate_student_is_a_recoverable_error() {
        let mut manager = manager();
        let tf = fellow("F1");
        manager.add_student(&tf, "Ada", "F1").unwrap();

        let err = manager.add_student(&tf, "Ada", "F1").unwrap_err();
        assert!(matches!(err, AttendanceError::ConstraintViolation(_)));
        assert!(err.is_recoverable());
        assert_eq!(student_count(&mut manager), 1);

        // The same name in another forum is a different student.
        manager.add_student(&tf, "Ada", "F2").unwrap();
        assert_eq!(student_count(&mut manager), 2);
    }

    #[test]
    fn edit_student_overwrites_name_and_forum() {
        let mut manager = manager();
        let tf = fellow("F1");
        let ada = manager.add_student(&tf, "Ada", "F1").unwrap();

        let moved = manager.edit_student(&tf, ada.id, "Ada L.", "F2").unwrap();
        assert_eq!(moved.name, "Ada L.");
        assert_eq!(moved.forum, "F2");
        assert!(manager.list_students(&tf).unwrap().is_empty());
        assert_eq!(manager.get_student(&tf, ada.id).unwrap(), moved);
    }

    #[test]
    fn edit_missing_student_is_not_found() {
        let mut manager = manager();
        let err = manager.edit_student(&fellow("F1"), 99, "Nobody", "F1").unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound { entity: "Student", .. }));
    }

    #[test]
    fn delete_missing_student_leaves_table_unchanged() {
        let mut manager = manager();
        enroll(&mut manager, "F1", &["Ada"]);

        let err = manager.delete_student(&fellow("F1"), 12345).unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound { .. }));
        assert_eq!(student_count(&mut manager), 1);
    }

    #[test]
    fn delete_student_removes_them() {
        let mut manager = manager();
        let tf = fellow("F1");
        let students = enroll(&mut manager, "F1", &["Ada", "Grace"]);

        let deleted = manager.delete_student(&tf, students[0].id).unwrap();
        assert_eq!(deleted, students[0]);
        assert_eq!(manager.list_students(&tf).unwrap(), &students[1..]);
    }

    #[test]
    fn blank_names_and_forums_are_rejected() {
        let mut manager = manager();
        let tf = fellow("F1");

        let err = manager.add_student(&tf, "", "").unwrap_err();
        assert!(matches!(err, AttendanceError::MissingField("name")));
        assert!(err.is_recoverable());
        assert!(matches!(
            manager.add_student(&tf, "Ada", "  "),
            Err(AttendanceError::MissingField("forum"))
        ));
        assert_eq!(student_count(&mut manager), 0);

        let ada = manager.add_student(&tf, "Ada", "F1").unwrap();
        assert!(matches!(
            manager.edit_student(&tf, ada.id, " \t", "F1"),
            Err(AttendanceError::MissingField("name"))
        ));
        assert!(matches!(
            manager.import_students(
                &tf,
                &[RosterEntry::new("Grace", "F1"), RosterEntry::new("", "F1")]
            ),
            Err(AttendanceError::MissingField("name"))
        ));
        assert_eq!(manager.list_students(&tf).unwrap(), [ada]);
    }

    #[test]
    fn student_with_attendance_records_is_not_deleted() {
        let mut manager = manager();
        let tf = fellow("F1");
        let ada = enroll(&mut manager, "F1", &["Ada"]).remove(0);
        let event = manager.add_event(&tf, "Kickoff", "First meeting", date()).unwrap();

        let err = manager.delete_student(&tf, ada.id).unwrap_err();
        assert!(matches!(err, AttendanceError::ConstraintViolation(_)));
        assert_eq!(err.to_string(), "Error: student still has attendance records");

        assert_eq!(student_count(&mut manager), 1);
        let (record, student) = manager.get_attendance(&tf, event.id, ada.id).unwrap();
        assert_eq!(record, Attendance::unmarked(event.id, ada.id));
        assert_eq!(student, ada);
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut manager = manager();
        let tf = fellow("F1");
        enroll(&mut manager, "F1", &["Grace"]);

        let entries = vec![
            RosterEntry::new("Ada", "F1"),
            RosterEntry::new("Grace", "F1"),
        ];
        let err = manager.import_students(&tf, &entries).unwrap_err();
        assert!(matches!(err, AttendanceError::ConstraintViolation(_)));
        assert_eq!(student_count(&mut manager), 1);

        let imported = manager
            .import_students(&tf, &entries[..1])
            .unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(student_count(&mut manager), 2);
    }

    #[test]
    fn non_admins_cannot_manage_students() {
        let mut manager = manager();
        let ada = enroll(&mut manager, "F1", &["Ada"]).remove(0);
        let nobody = outsider("F1");

        assert!(matches!(
            manager.list_students(&nobody),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.add_student(&nobody, "Eve", "F1"),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.edit_student(&nobody, ada.id, "Eve", "F1"),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.delete_student(&nobody, ada.id),
            Err(AttendanceError::Forbidden)
        ));
        assert_eq!(student_count(&mut manager), 1);
    }
}
