use clap::{Args, Parser, Subcommand};
use quizcraft::models::order::Plan;
use quizcraft::models::quiz::Difficulty;
use std::path::PathBuf;

/// Top-level CLI parser for the `quizcraft` binary.
#[derive(Debug, Parser)]
#[command(name = "quizcraft", version, about = "Build, host and join quizzes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account.
    Signup(SignupArgs),
    /// Sign in and remember the session.
    Login(LoginArgs),
    /// Sign out and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Request a password reset email.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the token from the reset email.
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    /// Walk a draft file through every wizard step without sending it.
    Validate {
        draft: PathBuf,
    },
    /// Validate, encode and publish a draft file.
    Create {
        draft: PathBuf,
    },
    /// Generate questions with AI and write them into a draft file.
    Generate(GenerateArgs),
    /// Manage published quizzes.
    Quizzes {
        #[command(subcommand)]
        action: QuizCommands,
    },
    /// Join a live session and follow it until it ends. Answers are read
    /// from stdin as `<question-index> <answer>` lines.
    Join(JoinArgs),
    /// Show results of a finished session.
    Results {
        code: String,
        /// Also write the leaderboard to an XLSX file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Notifications inbox.
    Notifications {
        #[command(subcommand)]
        action: NotificationCommands,
    },
    /// Show dashboard totals and recent quizzes.
    Dashboard,
    /// Search stock images or GIFs for question media.
    Media {
        #[command(subcommand)]
        action: MediaCommands,
    },
    /// Billing orders.
    Order {
        #[command(subcommand)]
        action: OrderCommands,
    },
    /// Profile and activity.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false, id = "source")]
pub struct GenerateSource {
    #[arg(long)]
    pub pdf: Option<PathBuf>,
    #[arg(long)]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: GenerateSource,
    /// Number of questions to ask for
    #[arg(long, default_value_t = 10)]
    pub count: u32,
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,
    /// Draft file to create, or to extend if it already exists
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum QuizCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    pub code: String,
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Subcommand)]
pub enum NotificationCommands {
    List,
    Read { id: String },
    ReadAll,
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum MediaCommands {
    Images {
        query: String,
        #[arg(long, default_value_t = 12)]
        limit: u32,
    },
    Gifs {
        query: String,
        #[arg(long, default_value_t = 12)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrderCommands {
    Create {
        #[arg(long, value_enum)]
        plan: Plan,
    },
    Validate {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    Activity,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}
