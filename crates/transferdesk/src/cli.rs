//! Clap derive structures for the `transferdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use transferdesk_core::MAX_WINDOW_DAYS;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// transferdesk -- reservation portal for travel agencies
#[derive(Debug, Parser)]
#[command(
    name = "transferdesk",
    version,
    about = "Request transfer packages for your agency from the command line",
    long_about = "Check vehicle availability, pick a period on the calendar, and send\n\
        reservation requests that staff confirm or cancel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "TRANSFERDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Project URL (overrides profile)
    #[arg(long, short = 'u', env = "TRANSFERDESK_URL", global = true)]
    pub url: Option<String>,

    /// Project anon key (overrides profile)
    #[arg(long, env = "TRANSFERDESK_ANON_KEY", global = true, hide_env_values = true)]
    pub anon_key: Option<String>,

    /// User access token (overrides profile and keyring)
    #[arg(long, env = "TRANSFERDESK_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Agency to book for (overrides profile)
    #[arg(long, short = 'a', env = "TRANSFERDESK_AGENCY", global = true)]
    pub agency: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TRANSFERDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local development only)
    #[arg(long, short = 'k', env = "TRANSFERDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TRANSFERDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show vehicle availability per day
    #[command(alias = "avail")]
    Availability(AvailabilityArgs),

    /// Show the reservation calendar and preview a period selection
    #[command(alias = "cal")]
    Calendar(CalendarArgs),

    /// Request a transfer package for a period
    Reserve(ReserveArgs),

    /// List and moderate reservation requests
    #[command(alias = "res")]
    Reservations(ReservationsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Availability ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AvailabilityArgs {
    /// First day to check [default: today]
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to check [default: window end]
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Days after the first day to check (overrides profile)
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_WINDOW_DAYS))
    )]
    pub window: Option<u32>,

    /// Only show days with free vehicles
    #[arg(long)]
    pub available_only: bool,
}

// ── Calendar ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Click this day first (start of the period)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Click this day second (end of the period)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// First day of the calendar window [default: today]
    #[arg(long)]
    pub from: Option<NaiveDate>,
}

// ── Reserve ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReserveArgs {
    /// Package title (e.g. the tour name)
    #[arg(long, short = 't')]
    pub title: String,

    /// First day of the period
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the period (defaults to a single day)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Notes for staff (group size, pickup details)
    #[arg(long)]
    pub observation: Option<String>,

    /// First day of the availability window [default: today]
    #[arg(long)]
    pub from: Option<NaiveDate>,
}

// ── Reservations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List your agency's requests, newest first
    #[command(alias = "ls")]
    List,

    /// Show one request
    Get {
        /// Reservation ID
        id: String,
    },

    /// Confirm a pending request (staff only)
    Confirm {
        /// Reservation ID
        id: String,
    },

    /// Cancel a pending or confirmed request (staff only)
    Cancel {
        /// Reservation ID
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current configuration (secrets redacted)
    Show,

    /// Set a profile value
    Set {
        /// Key (url, anon_key_env, agency_id, user_id, full_name, is_admin, insecure, timeout, ca_cert, window_days)
        key: String,
        /// Value
        value: String,
    },

    /// Store the user's access token in the system keyring
    SetToken {
        /// Token value (prompted when omitted)
        token: Option<String>,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
