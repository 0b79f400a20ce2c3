//! Rendering of query results, either as tables or as JSON.

use crate::error::AttendanceResult;
use crate::models::{Department, Employee, Event, EventDetail, Role, Student};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

fn print_table<T: Tabled>(title: &str, rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::modern());

    println!("{title}:\n{table}");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> AttendanceResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Pretty prints a forum's students.
pub fn show_students(forum: &str, students: Vec<Student>, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&students);
    }

    print_table(&format!("Forum {forum} students"), students);
    Ok(())
}

pub fn show_events(events: Vec<Event>, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&events);
    }

    print_table("Events", events);
    Ok(())
}

/// Pretty prints an event and the attendance of the students who can be seen from the caller's forum.
pub fn show_event_detail(detail: EventDetail, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&detail);
    }

    #[derive(Tabled)]
    struct AttendanceRow {
        student_id: i32,
        name: String,
        attended: &'static str,
        comment: String,
    }

    let rows: Vec<AttendanceRow> = detail
        .attendance
        .into_iter()
        .map(|(record, student)| AttendanceRow {
            student_id: student.id,
            name: student.name,
            attended: if record.is_attended { "yes" } else { "no" },
            comment: record.tf_comment,
        })
        .collect();

    let event = detail.event;
    println!(
        "{} ({})\n{}",
        event.event_name, event.event_date, event.event_description
    );
    print_table("Attendance", rows);

    Ok(())
}

#[derive(Tabled)]
struct CatalogRow {
    id: i32,
    name: String,
    description: String,
}

pub fn show_departments(departments: Vec<Department>, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&departments);
    }

    let rows: Vec<CatalogRow> = departments
        .into_iter()
        .map(|department| CatalogRow {
            id: department.id,
            name: department.name,
            description: department.description.unwrap_or_default(),
        })
        .collect();

    print_table("Departments", rows);
    Ok(())
}

pub fn show_roles(roles: Vec<Role>, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&roles);
    }

    let rows: Vec<CatalogRow> = roles
        .into_iter()
        .map(|role| CatalogRow {
            id: role.id,
            name: role.name,
            description: role.description.unwrap_or_default(),
        })
        .collect();

    print_table("Roles", rows);
    Ok(())
}

pub fn show_employees(employees: Vec<Employee>, json: bool) -> AttendanceResult<()> {
    if json {
        return print_json(&employees);
    }

    #[derive(Tabled)]
    struct EmployeeRow {
        id: i32,
        username: String,
        name: String,
        email: String,
        forum: String,
        admin: bool,
    }

    let rows: Vec<EmployeeRow> = employees
        .into_iter()
        .map(|employee| EmployeeRow {
            id: employee.id,
            name: format!("{} {}", employee.first_name, employee.last_name),
            username: employee.username,
            email: employee.email,
            forum: employee.forum.unwrap_or_default(),
            admin: employee.is_admin,
        })
        .collect();

    print_table("Staff", rows);
    Ok(())
}

/// Prints a single record after a successful change.
pub fn show_record<T: Serialize + std::fmt::Debug>(
    message: &str,
    record: &T,
    json: bool,
) -> AttendanceResult<()> {
    if json {
        return print_json(record);
    }

    println!("{message}\n{record:#?}");
    Ok(())
}
