//! CLI module for qamon
//!
//! Provides the command-line interface for the QA monitor.

pub mod run_once;
pub mod serve;

use clap::{Parser, Subcommand};

/// QA monitor - periodically runs an API checklist and reports regressions
#[derive(Parser, Debug)]
#[command(name = "qamon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    QAMON_HOST                   Bind address (default: 0.0.0.0)
    QAMON_PORT                   Listen port (default: 5000)
    QAMON_LOG_LEVEL              Log level (default: info)
    QAMON_LOG_DIR                Also write daily-rotated log files here
    QAMON_API_BASE_URL           Target service base URL (default: http://localhost:3000)
    QAMON_REFRESH_INTERVAL_SECS  Pause between cycles (default: 10)
    QAMON_REQUEST_TIMEOUT_SECS   Per-test request timeout (default: 5)
    QAMON_PLACEHOLDERS           Endpoint placeholders (key=value,key=value)
    QAMON_CHECKLIST_FILE         Checklist input (default: kilo_qa_checklist.json)
    QAMON_RESULTS_FILE           Results output (default: kilo_qa_checklist_results.json)
    QAMON_HISTORY_FILE           History output (default: kilo_qa_history.json)
    QAMON_SLACK_WEBHOOK_URL      Slack incoming webhook
    QAMON_DISCORD_WEBHOOK_URL    Discord webhook
    QAMON_TEAMS_WEBHOOK_URL      Microsoft Teams webhook
    QAMON_SMTP_SERVER            SMTP relay (default: smtp.gmail.com)
    QAMON_SMTP_PORT              SMTP port (default: 587)
    QAMON_SMTP_USERNAME          SMTP username
    QAMON_SMTP_PASSWORD          SMTP password
    QAMON_EMAIL_FROM             Sender address (default: SMTP username)
    QAMON_EMAIL_TO               Recipient address
"#)]
pub struct Cli {
    /// Subcommand to execute (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the QA loop and the dashboard API server
    Serve(serve::ServeArgs),
    /// Run a single QA cycle, print a summary and exit
    RunOnce,
}
