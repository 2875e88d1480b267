use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kinverify")]
#[command(about = "Finds suspicious dates, ages and relationships in a genealogy database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every rule and print the problems found
    Check(CheckArgs),

    /// Acknowledge problems so later runs show them as marked
    Mark(MarkArgs),

    /// Remove acknowledgements
    Unmark(MarkArgs),

    /// Flip every acknowledgement
    Invert(InvertArgs),

    /// Show or delete the ignore file of a database
    Ignores(IgnoresArgs),

    /// Show the effective rule options
    Options(OptionsArgs),
}

/// Arguments shared by every command that runs a scan.
#[derive(Args, Clone)]
pub struct RuleArgs {
    /// Estimate missing or partial dates
    #[arg(long, default_value_t = false)]
    pub estimate_dates: bool,

    /// Do not report text-only birth and death dates
    #[arg(long, default_value_t = false)]
    pub no_invalid_dates: bool,

    /// Override an option for this run, e.g. --set oldage=100
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Options file (defaults to the user config directory)
    #[arg(long)]
    pub options_file: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct CheckArgs {
    /// Database file (.json tree export or .db sqlite)
    pub database: PathBuf,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// One line per problem: "E: message, Person: id, name"
    #[arg(long, default_value_t = false, conflicts_with = "json")]
    pub plain: bool,

    /// Leave out problems that were acknowledged
    #[arg(long, default_value_t = false)]
    pub hide_marked: bool,

    /// Ignore the ignore file for this run
    #[arg(long, default_value_t = false)]
    pub no_ignores: bool,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Write the effective options back to the options file
    #[arg(long, default_value_t = false)]
    pub save_options: bool,

    /// Show detailed output including skipped records
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Report progress on stderr
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl CheckArgs {
    /// A quiet table run over `database`, used by the marking commands.
    pub fn for_marking(database: PathBuf, rules: RuleArgs) -> Self {
        CheckArgs {
            database,
            json: false,
            plain: false,
            hide_marked: false,
            no_ignores: false,
            rules,
            save_options: false,
            verbose: false,
            progress: false,
        }
    }
}

#[derive(Parser)]
pub struct MarkArgs {
    pub database: PathBuf,

    /// Every problem
    #[arg(long, default_value_t = false, conflicts_with_all = ["message", "row"])]
    pub all: bool,

    /// Every problem with this message
    #[arg(long, conflicts_with = "row")]
    pub message: Option<String>,

    /// Problem numbers as shown by `check`
    #[arg(long, num_args = 1..)]
    pub row: Vec<usize>,

    #[command(flatten)]
    pub rules: RuleArgs,
}

impl MarkArgs {
    pub fn has_selector(&self) -> bool {
        self.all || self.message.is_some() || !self.row.is_empty()
    }
}

#[derive(Parser)]
pub struct InvertArgs {
    pub database: PathBuf,

    #[command(flatten)]
    pub rules: RuleArgs,
}

#[derive(Parser)]
pub struct IgnoresArgs {
    pub database: PathBuf,

    /// Delete the ignore file
    #[arg(long, default_value_t = false)]
    pub clear: bool,
}

#[derive(Parser)]
pub struct OptionsArgs {
    /// Set an option, e.g. --set cspace=10
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Write the result to the options file
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Options file (defaults to the user config directory)
    #[arg(long)]
    pub options_file: Option<PathBuf>,
}
