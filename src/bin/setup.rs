//! Sets up a new attendance database.
//!
//! This binary creates the tables in the configured database (see [`Settings`]) and registers the
//! first administrator account, who can then grant admin rights to the other teaching fellows.

use anyhow::{Context, Result};
use clap::Parser;
use forum_attendance::manager::AttendanceManager;
use forum_attendance::models::NewEmployee;
use forum_attendance::settings::Settings;

#[derive(Parser, Debug)]
#[command(about = "Create the attendance database and its first administrator")]
struct SetupArgs {
    /// The database to create instead of the configured one.
    #[arg(long)]
    database: Option<String>,

    username: String,
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// The forum the administrator teaches.
    #[arg(long)]
    forum: Option<String>,

    #[arg(long, env = "TF_PASSWORD", hide_env_values = true)]
    password: String,
}

pub fn main() -> Result<()> {
    let args = SetupArgs::parse();

    let settings = Settings::load().context("failed to load settings")?;
    forum_attendance::init_tracing(&settings.logging.filter);

    let database_url = args.database.unwrap_or(settings.database.url);

    let mut manager = AttendanceManager::connect(&database_url)
        .with_context(|| format!("failed to open {database_url}"))?;
    manager.initialize_schema()?;

    let admin = manager
        .bootstrap_admin(&NewEmployee {
            email: args.email,
            username: args.username,
            first_name: args.first_name,
            last_name: args.last_name,
            password: args.password,
            forum: args.forum,
        })
        .context("failed to create the administrator account")?;

    println!(
        "Created {database_url} with administrator '{}' (ID {}).",
        admin.username, admin.id
    );

    Ok(())
}
