#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod commands;
pub mod db;
pub mod helpers;
pub mod id;
pub mod models;
pub mod output;
pub mod session;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use cli::{AppointmentCommands, Cli, CommentCommands, Commands, ModuleCommands, PostCommands,
    UserCommands};
use db::Database;
use output::Output;
use session::Session;

pub const CALMA_DIR: &str = ".calma";

/// How long `post watch` waits for the next snapshot before giving up.
const WATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Finds the `.calma/` directory by walking up from the current directory.
/// Returns `None` if no `.calma/` directory is found.
pub fn find_calma_dir() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    let mut dir = current_dir.as_path();

    loop {
        let calma_path = dir.join(CALMA_DIR);
        if calma_path.is_dir() {
            return Some(calma_path);
        }

        dir = dir.parent()?;
    }
}

fn ensure_initialized() -> Result<Database> {
    let calma_dir =
        find_calma_dir().ok_or_else(|| anyhow!("Calma not initialized. Run 'calma init' first."))?;

    Database::open(&calma_dir).context("Failed to open data directory")
}

fn require_session(db: &Database) -> Result<Session> {
    Session::require(db.base_path())
}

fn run_user(user_cmd: UserCommands, db: &mut Database) -> Result<()> {
    match user_cmd {
        UserCommands::Register {
            name,
            email,
            password,
            role,
        } => {
            let user = commands::user::register(name, email, password, &role, db)?;
            Output::new(false).user_registered(&user)
        }
        UserCommands::List { json } => {
            let users = commands::user::list(db);
            Output::new(json).user_list(&users)
        }
    }
}

fn run_post(post_cmd: PostCommands, db: &mut Database) -> Result<()> {
    match post_cmd {
        PostCommands::Create {
            title,
            content,
            image,
        } => {
            let session = require_session(db)?;
            let post = commands::post::create(title, content, image, &session, db)?;
            Output::new(false).post_created(&post)
        }
        PostCommands::List { limit, after, json } => {
            let page = commands::post::list(limit, after.as_deref(), db);
            Output::new(json).post_list(&page)
        }
        PostCommands::Show { post_id, json } => {
            let post = commands::post::show(&post_id, db)?;
            Output::new(json).post_shown(&post)
        }
        PostCommands::Edit { post_id, content } => {
            let session = require_session(db)?;
            let post = commands::post::edit(&post_id, content, &session, db)?;
            Output::new(false).post_updated(&post)
        }
        PostCommands::Delete { post_id } => {
            let session = require_session(db)?;
            let post = commands::post::delete(&post_id, &session, db)?;
            Output::new(false).post_deleted(&post)
        }
        PostCommands::Like { post_id } => {
            let session = require_session(db)?;
            let (post, liked) = commands::post::like(&post_id, &session, db)?;
            Output::new(false).post_liked(&post, liked)
        }
        PostCommands::Watch {
            post_id,
            count,
            interval_ms,
        } => {
            let subscription = commands::post::watch(&post_id, interval_ms, db)?;
            let output = Output::new(false);

            let mut seen = 0;
            while seen < count {
                match subscription.next_snapshot(WATCH_TIMEOUT) {
                    Some(post) => {
                        seen += 1;
                        output.post_snapshot(&post, seen)?;
                    }
                    None => break,
                }
            }

            subscription.cancel();
            output.watch_ended()
        }
    }
}

fn run_comment(comment_cmd: CommentCommands, db: &mut Database) -> Result<()> {
    let session = require_session(db)?;
    match comment_cmd {
        CommentCommands::Add {
            post_id,
            text,
            reply_to,
        } => {
            let (post, comment) =
                commands::comment::add(&post_id, text, reply_to.as_deref(), &session, db)?;
            Output::new(false).comment_added(&post, &comment)
        }
        CommentCommands::Edit {
            post_id,
            comment_id,
            text,
        } => {
            let post = commands::comment::edit(&post_id, &comment_id, &text, &session, db)?;
            Output::new(false).comment_updated(&post, &comment_id)
        }
        CommentCommands::Delete {
            post_id,
            comment_id,
        } => {
            let post = commands::comment::delete(&post_id, &comment_id, &session, db)?;
            Output::new(false).comment_deleted(&post, &comment_id)
        }
    }
}

fn run_module(module_cmd: ModuleCommands, db: &mut Database) -> Result<()> {
    match module_cmd {
        ModuleCommands::Create {
            title,
            description,
            content,
            image,
            question,
        } => {
            let session = require_session(db)?;
            let module = commands::module::create(
                title,
                description,
                content,
                image,
                &question,
                &session,
                db,
            )?;
            Output::new(false).module_created(&module)
        }
        ModuleCommands::List { json } => {
            let modules = commands::module::list(db);
            Output::new(json).module_list(&modules)
        }
        ModuleCommands::Show { module_id, json } => {
            let module = commands::module::show(&module_id, db)?;
            Output::new(json).module_shown(&module)
        }
        ModuleCommands::Quiz { module_id, answers } => {
            let report = commands::module::quiz(&module_id, &answers, db)?;
            Output::new(false).quiz_graded(&report)
        }
    }
}

fn run_appointment(appointment_cmd: AppointmentCommands, db: &mut Database) -> Result<()> {
    let session = require_session(db)?;
    match appointment_cmd {
        AppointmentCommands::Book { expert_id, start } => {
            let appointment = commands::appointment::book(&expert_id, &start, &session, db)?;
            Output::new(false).appointment_booked(&appointment)
        }
        AppointmentCommands::List { json } => {
            let appointments = commands::appointment::list(&session, db);
            Output::new(json).appointment_list(&appointments)
        }
        AppointmentCommands::Finish { appointment_id } => {
            let appointment = commands::appointment::finish(&appointment_id, &session, db)?;
            Output::new(false).appointment_finished(&appointment)
        }
        AppointmentCommands::Chat {
            appointment_id,
            message,
            kind,
        } => {
            let appointment =
                commands::appointment::chat(&appointment_id, message, &kind, &session, db)?;
            Output::new(false).chat_sent(&appointment)
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::User(user_cmd) => {
            let mut db = ensure_initialized()?;
            run_user(user_cmd, &mut db)
        }
        Commands::Login { email, password } => {
            let db = ensure_initialized()?;
            let (_session, user) = commands::auth::login(&email, &password, &db)?;
            Output::new(false).signed_in(&user)
        }
        Commands::Logout => {
            let db = ensure_initialized()?;
            commands::auth::logout(&db)?;
            Output::new(false).signed_out()
        }
        Commands::Whoami { json } => {
            let db = ensure_initialized()?;
            let user = commands::auth::whoami(&db)?;
            Output::new(json).whoami(&user)
        }
        Commands::Post(post_cmd) => {
            let mut db = ensure_initialized()?;
            run_post(post_cmd, &mut db)
        }
        Commands::Comment(comment_cmd) => {
            let mut db = ensure_initialized()?;
            run_comment(comment_cmd, &mut db)
        }
        Commands::Module(module_cmd) => {
            let mut db = ensure_initialized()?;
            run_module(module_cmd, &mut db)
        }
        Commands::Appointment(appointment_cmd) => {
            let mut db = ensure_initialized()?;
            run_appointment(appointment_cmd, &mut db)
        }
    }
}
