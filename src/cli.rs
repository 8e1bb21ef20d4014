use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calma")]
#[command(about = "Local-first client for a mental-wellness community", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the calma data directory in the current project
    Init,

    /// Manage accounts
    #[command(subcommand)]
    User(UserCommands),

    /// Sign in as an existing user
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage forum posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Manage comments on a post
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Browse educational modules
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Manage appointments with experts
    #[command(subcommand)]
    Appointment(AppointmentCommands),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new account
    Register {
        /// Display name
        name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (min 8 chars, upper, lower, digit)
        #[arg(long)]
        password: String,

        /// Account role
        #[arg(long, default_value = "user")]
        role: String,
    },

    /// List all accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Create a new forum post
    Create {
        /// Post title
        title: String,

        /// Post body
        #[arg(long)]
        content: String,

        /// Image files to attach (copied into the uploads area)
        #[arg(long)]
        image: Vec<String>,
    },

    /// List posts, newest first
    List {
        /// Maximum posts per page
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Show the page after this post ID
        #[arg(long)]
        after: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a post with its comment tree
    Show {
        /// The post ID to show
        post_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a post's body (author or admin)
    Edit {
        /// The post ID to edit
        post_id: String,

        /// New post body
        #[arg(long)]
        content: String,
    },

    /// Delete a post (author or admin)
    Delete {
        /// The post ID to delete
        post_id: String,
    },

    /// Like a post, or unlike it if already liked
    Like {
        /// The post ID to like
        post_id: String,
    },

    /// Watch a post for changes, printing each new snapshot
    Watch {
        /// The post ID to watch
        post_id: String,

        /// Stop after this many snapshots
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Add a comment to a post, optionally as a reply to another comment
    Add {
        /// The post ID to comment on
        post_id: String,

        /// The comment text
        text: String,

        /// Reply to this comment instead of the post itself
        #[arg(long)]
        reply_to: Option<String>,
    },

    /// Edit a comment's text (author or admin)
    Edit {
        /// The post ID the comment belongs to
        post_id: String,

        /// The comment ID to edit
        comment_id: String,

        /// New comment text
        text: String,
    },

    /// Delete a comment and all its replies (author or admin)
    Delete {
        /// The post ID the comment belongs to
        post_id: String,

        /// The comment ID to delete
        comment_id: String,
    },
}

#[derive(Subcommand)]
pub enum ModuleCommands {
    /// Create a module (expert or admin)
    Create {
        /// Module title
        title: String,

        /// Short description
        #[arg(long)]
        description: String,

        /// Long-form content
        #[arg(long)]
        content: String,

        /// Cover image file to attach
        #[arg(long)]
        image: Option<String>,

        /// Quiz question as "question|option1,option2,...|answer"
        #[arg(long)]
        question: Vec<String>,
    },

    /// List modules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a module and its quiz
    Show {
        /// The module ID to show
        module_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit quiz answers for grading
    Quiz {
        /// The module ID whose quiz to take
        module_id: String,

        /// Answers in question order
        #[arg(long, value_delimiter = ',')]
        answers: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Book an appointment with an expert
    Book {
        /// The expert's user ID
        expert_id: String,

        /// Start time (RFC 3339, e.g. 2026-09-01T10:00:00Z)
        #[arg(long)]
        start: String,
    },

    /// List your appointments
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an appointment as finished
    Finish {
        /// The appointment ID to finish
        appointment_id: String,
    },

    /// Send a chat message in an appointment
    Chat {
        /// The appointment ID to chat in
        appointment_id: String,

        /// The message text (or image file name with --kind image)
        message: String,

        /// Message kind
        #[arg(long, default_value = "text")]
        kind: String,
    },
}
