use crate::schema::{attendance, departments, employees, events, roles, students};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// A staff account. The password is only ever stored as an argon2 hash and cannot be read back.
#[derive(Queryable, Selectable, Identifiable, Clone, Serialize)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Employee {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip)]
    pub(crate) password_hash: String,
    pub department_id: Option<i32>,
    pub role_id: Option<i32>,
    pub is_admin: bool,
    pub forum: Option<String>,
}

impl Employee {
    /// Checks `password` against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        crate::password::verify_password(password, &self.password_hash)
    }
}

impl fmt::Debug for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Employee")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("department_id", &self.department_id)
            .field("role_id", &self.role_id)
            .field("is_admin", &self.is_admin)
            .field("forum", &self.forum)
            .finish_non_exhaustive()
    }
}

#[derive(Insertable)]
#[diesel(table_name = employees)]
pub(crate) struct NewEmployeeRow<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub forum: Option<&'a str>,
}

/// Registration input for a new [`Employee`].
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub forum: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = roles)]
pub struct NewRole<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub forum: String,
}

#[derive(Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent<'a> {
    pub name: &'a str,
    pub forum: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Event {
    pub id: i32,
    pub event_name: String,
    pub event_description: String,
    pub event_date: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent<'a> {
    pub event_name: &'a str,
    pub event_description: &'a str,
    pub event_date: NaiveDateTime,
}

/// Whether a student attended an event, and what their teaching fellow had to say about it.
///
/// Rows are keyed by `(event_id, student_id)` and are only ever created alongside their event.
#[derive(
    Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq, Eq, Serialize,
)]
#[diesel(table_name = attendance)]
#[diesel(primary_key(event_id, student_id))]
#[diesel(belongs_to(Event))]
#[diesel(belongs_to(Student))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attendance {
    pub event_id: i32,
    pub student_id: i32,
    pub is_attended: bool,
    pub tf_comment: String,
}

impl Attendance {
    /// A fresh, unmarked record for `student_id` at `event_id`.
    pub fn unmarked(event_id: i32, student_id: i32) -> Self {
        Self {
            event_id,
            student_id,
            is_attended: false,
            tf_comment: String::new(),
        }
    }
}

/// An event together with the attendance records visible from one forum.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub attendance: Vec<(Attendance, Student)>,
}
