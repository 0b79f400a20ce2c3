use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use forum_attendance::cli::{
    CatalogCommand, Cli, Command, CommentArgs, EventCommand, Registration, StaffCommand,
    StudentCommand,
};
use forum_attendance::manager::AttendanceManager;
use forum_attendance::models::NewEmployee;
use forum_attendance::settings::Settings;
use forum_attendance::{AttendanceError, AttendanceResult, Identity, display, roster};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    forum_attendance::init_tracing(&settings.logging.filter);

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            exit_code(&err)
        }
    }
}

fn exit_code(err: &AttendanceError) -> ExitCode {
    match err {
        AttendanceError::Forbidden | AttendanceError::InvalidCredentials => ExitCode::from(3),
        AttendanceError::NotFound { .. } => ExitCode::from(4),
        err if err.is_recoverable() => ExitCode::from(1),
        _ => ExitCode::from(2),
    }
}

/// Unwraps an option the current command cannot do without, or exits with a usage error.
///
/// Usage errors exit through clap with code 2, the same code as fatal errors.
fn require(value: Option<String>, message: &str) -> String {
    value.unwrap_or_else(|| {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, message)
            .exit()
    })
}

fn run(cli: Cli, settings: &Settings) -> AttendanceResult<()> {
    let Cli {
        database,
        user,
        password,
        json,
        command,
    } = cli;

    let database_url = database.as_deref().unwrap_or(settings.database.url.as_str());
    let mut manager = AttendanceManager::connect(database_url)?;

    match command {
        Command::Init => {
            manager.initialize_schema()?;
            println!("Initialized database at {database_url}.");
        }
        Command::Register(registration) => {
            let password = require(password, "--password is required to register");
            register(&mut manager, registration, password, json)?;
        }
        command => {
            let user = require(user, "--user is required for this command");
            let password = require(password, "--password is required for this command");
            let identity = manager.authenticate(&user, &password)?;

            match command {
                Command::Students { command } => students(&mut manager, &identity, command, json)?,
                Command::Events { command } => events(&mut manager, &identity, command, json)?,
                Command::Comment(args) => comment(&mut manager, &identity, args, json)?,
                Command::Departments { command } => {
                    departments(&mut manager, &identity, command, json)?
                }
                Command::Roles { command } => roles(&mut manager, &identity, command, json)?,
                Command::Staff { command } => staff(&mut manager, &identity, command, json)?,
                Command::Init | Command::Register(_) => unreachable!("handled above"),
            }
        }
    }

    Ok(())
}

fn register(
    manager: &mut AttendanceManager,
    registration: Registration,
    password: String,
    json: bool,
) -> AttendanceResult<()> {
    let employee = manager.register_employee(&NewEmployee {
        email: registration.email,
        username: registration.username,
        first_name: registration.first_name,
        last_name: registration.last_name,
        password,
        forum: registration.forum,
    })?;

    display::show_record("You have successfully registered.", &employee, json)
}

fn students(
    manager: &mut AttendanceManager,
    identity: &Identity,
    command: StudentCommand,
    json: bool,
) -> AttendanceResult<()> {
    match command {
        StudentCommand::List => {
            let students = manager.list_students(identity)?;
            display::show_students(&identity.forum, students, json)
        }
        StudentCommand::Add { name, forum } => {
            let student = manager.add_student(identity, &name, &forum)?;
            display::show_record("You have successfully added a new student.", &student, json)
        }
        StudentCommand::Edit { id, name, forum } => {
            let student = manager.edit_student(identity, id, &name, &forum)?;
            display::show_record("You have successfully edited the student.", &student, json)
        }
        StudentCommand::Delete { id } => {
            let student = manager.delete_student(identity, id)?;
            display::show_record("You have successfully deleted the student.", &student, json)
        }
        StudentCommand::Import { file_path } => {
            let entries = roster::read_roster(&file_path)?;
            let students = manager.import_students(identity, &entries)?;
            println!(
                "You have successfully imported {} students from {}.",
                students.len(),
                file_path.display()
            );
            Ok(())
        }
    }
}

fn events(
    manager: &mut AttendanceManager,
    identity: &Identity,
    command: EventCommand,
    json: bool,
) -> AttendanceResult<()> {
    match command {
        EventCommand::List => display::show_events(manager.list_events(identity)?, json),
        EventCommand::Add {
            name,
            description,
            date,
        } => {
            let event = manager.add_event(identity, &name, &description, date)?;
            display::show_record("You have successfully added a new event.", &event, json)
        }
        EventCommand::Edit { id, name } => {
            let event = manager.edit_event(identity, id, &name)?;
            display::show_record("You have successfully edited the event.", &event, json)
        }
        EventCommand::Delete { id } => {
            let event = manager.delete_event(identity, id)?;
            display::show_record("You have successfully deleted the event.", &event, json)
        }
        EventCommand::Show { id } => {
            display::show_event_detail(manager.detail_event(identity, id)?, json)
        }
    }
}

fn comment(
    manager: &mut AttendanceManager,
    identity: &Identity,
    args: CommentArgs,
    json: bool,
) -> AttendanceResult<()> {
    let record = manager.record_comment(
        identity,
        args.event_id,
        args.student_id,
        args.attended,
        &args.comment,
    )?;

    display::show_record("You have successfully commented this student.", &record, json)
}

fn departments(
    manager: &mut AttendanceManager,
    identity: &Identity,
    command: CatalogCommand,
    json: bool,
) -> AttendanceResult<()> {
    match command {
        CatalogCommand::List => display::show_departments(manager.list_departments(identity)?, json),
        CatalogCommand::Add { name, description } => {
            let department = manager.add_department(identity, &name, description.as_deref())?;
            display::show_record("You have successfully added a new department.", &department, json)
        }
        CatalogCommand::Edit {
            id,
            name,
            description,
        } => {
            let department =
                manager.edit_department(identity, id, &name, description.as_deref())?;
            display::show_record("You have successfully edited the department.", &department, json)
        }
        CatalogCommand::Delete { id } => {
            let department = manager.delete_department(identity, id)?;
            display::show_record("You have successfully deleted the department.", &department, json)
        }
    }
}

fn roles(
    manager: &mut AttendanceManager,
    identity: &Identity,
    command: CatalogCommand,
    json: bool,
) -> AttendanceResult<()> {
    match command {
        CatalogCommand::List => display::show_roles(manager.list_roles(identity)?, json),
        CatalogCommand::Add { name, description } => {
            let role = manager.add_role(identity, &name, description.as_deref())?;
            display::show_record("You have successfully added a new role.", &role, json)
        }
        CatalogCommand::Edit {
            id,
            name,
            description,
        } => {
            let role = manager.edit_role(identity, id, &name, description.as_deref())?;
            display::show_record("You have successfully edited the role.", &role, json)
        }
        CatalogCommand::Delete { id } => {
            let role = manager.delete_role(identity, id)?;
            display::show_record("You have successfully deleted the role.", &role, json)
        }
    }
}

fn staff(
    manager: &mut AttendanceManager,
    identity: &Identity,
    command: StaffCommand,
    json: bool,
) -> AttendanceResult<()> {
    match command {
        StaffCommand::List => display::show_employees(manager.list_employees(identity)?, json),
        StaffCommand::Assign {
            username,
            department,
            role,
        } => {
            let employee = manager.assign_employee(identity, &username, department, role)?;
            display::show_record("You have successfully assigned the employee.", &employee, json)
        }
        StaffCommand::GrantAdmin { username } => {
            let employee = manager.set_admin(identity, &username, true)?;
            display::show_record("You have successfully granted admin rights.", &employee, json)
        }
        StaffCommand::RevokeAdmin { username } => {
            let employee = manager.set_admin(identity, &username, false)?;
            display::show_record("You have successfully revoked admin rights.", &employee, json)
        }
        StaffCommand::SetForum { username, forum } => {
            let employee = manager.set_forum(identity, &username, forum.as_deref())?;
            display::show_record("You have successfully changed the forum.", &employee, json)
        }
    }
}
