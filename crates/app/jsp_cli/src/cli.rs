use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Learner dashboard for the JSP training backend.
#[derive(Parser)]
#[command(name = "jsp", version, about)]
pub struct Cli {
    /// Backend API base URL.
    #[arg(long, global = true, env = "JSP_API_URL")]
    pub api_url: Option<String>,

    /// Token file, overriding the per-origin default.
    #[arg(long, global = true, env = "JSP_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and keep the session token for later commands.
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "JSP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token.
    Logout,

    /// Show the logged-in learner.
    Whoami,

    /// List followed courses, or the whole catalog with `--all`.
    Courses {
        #[arg(long)]
        all: bool,
    },

    /// Follow a course.
    Subscribe { course_id: i64 },

    /// Stop following a course.
    Unsubscribe { course_id: i64 },

    /// Show the personal schedule.
    Events,

    /// List available quizzes.
    Quizzes,

    /// Print version information.
    Version,
}
