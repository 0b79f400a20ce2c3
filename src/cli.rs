//! This module contains the command-line interface [`Cli`] parser for managing students, events and
//! attendance records.

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "forum-attendance", version, about = "Track student attendance at forum events")]
pub struct Cli {
    /// The database to use instead of the configured one.
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// The username or email to act as.
    #[arg(long, short, global = true, env = "TF_USER")]
    pub user: Option<String>,

    /// The password for `--user`, or for the account being registered.
    #[arg(long, global = true, env = "TF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// The different commands available for managing attendance records.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database tables.
    Init,

    /// Register a new staff account, using `--password` as its password.
    Register(Registration),

    /// Manage the students of your forum.
    Students {
        #[command(subcommand)]
        command: StudentCommand,
    },

    /// Manage events and view their attendance.
    Events {
        #[command(subcommand)]
        command: EventCommand,
    },

    /// Record whether a student attended an event, with a comment.
    Comment(CommentArgs),

    /// Manage departments.
    Departments {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Manage roles.
    Roles {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Manage staff accounts.
    Staff {
        #[command(subcommand)]
        command: StaffCommand,
    },
}

#[derive(Args, Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// The forum this account teaches.
    #[arg(long)]
    pub forum: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    /// List the students in your forum.
    List,

    /// Add a new student.
    Add { name: String, forum: String },

    /// Change a student's name and forum.
    Edit { id: i32, name: String, forum: String },

    /// Remove a student.
    Delete { id: i32 },

    /// Add every student listed in a `name,forum` CSV file.
    Import { file_path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// List all events.
    List,

    /// Create an event, with an attendance record for every student in your forum.
    Add {
        name: String,
        description: String,
        /// When the event takes place, e.g. `2025-03-14 18:30`.
        #[arg(value_parser = parse_event_date)]
        date: NaiveDateTime,
    },

    /// Rename an event.
    Edit { id: i32, name: String },

    /// Remove an event and its attendance records.
    Delete { id: i32 },

    /// Show an event with the attendance of your forum.
    Show { id: i32 },
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    pub event_id: i32,
    pub student_id: i32,

    /// Mark the student as having attended.
    #[arg(long)]
    pub attended: bool,

    #[arg(long, short, default_value = "")]
    pub comment: String,
}

/// Commands shared by departments and roles.
#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    List,

    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    Edit {
        id: i32,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    Delete { id: i32 },
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
    /// List all staff accounts.
    List,

    /// Place an employee in a department and role. Omitted options clear the assignment.
    Assign {
        username: String,
        #[arg(long)]
        department: Option<i32>,
        #[arg(long)]
        role: Option<i32>,
    },

    /// Make an employee an administrator.
    GrantAdmin { username: String },

    /// Take administrator privileges away from an employee.
    RevokeAdmin { username: String },

    /// Set (or clear) the forum an employee teaches.
    SetForum {
        username: String,
        forum: Option<String>,
    },
}

/// Parses an event date, with or without a time of day.
pub fn parse_event_date(input: &str) -> Result<NaiveDateTime, String> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let input = input.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid date '{input}', expected YYYY-MM-DD [HH:MM[:SS]]"))
}
