use clap::{Parser, Subcommand};

/// Parse, shift, truncate and compare dates from the command line.
#[derive(Parser)]
#[command(
    name = "anydate",
    version,
    about = "Parse, shift, truncate and compare dates"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Locale stamped on values (drives week rules).
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// IANA zone treated as local. Defaults to the host zone.
    #[arg(long, global = true)]
    pub tz: Option<String>,

    /// Work with calendar dates instead of instants.
    #[arg(long = "date-only", global = true)]
    pub date_only: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Coerce an input and print every projection of it.
    Parse(InputArgs),
    /// Add, subtract or assign an amount of a unit.
    Shift(ShiftArgs),
    /// Truncate to the start of a unit.
    StartOf(TruncateArgs),
    /// Extend to the end of a unit.
    EndOf(TruncateArgs),
    /// Compare two inputs by instant.
    Compare(CompareArgs),
    /// Parse text with an explicit format pattern.
    Format(FormatArgs),
}

/// A single date input.
#[derive(clap::Args)]
pub struct InputArgs {
    /// ISO string, free text, or `{...}` object notation.
    #[arg(allow_hyphen_values = true)]
    pub input: String,

    /// Read the input as epoch milliseconds.
    #[arg(long)]
    pub epoch: bool,
}

/// Arguments for the `shift` subcommand.
#[derive(clap::Args)]
pub struct ShiftArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Amount to apply.
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,

    /// Unit token (`days`, `M`, `isoWeek`, ...).
    pub unit: String,

    /// Subtract instead of add.
    #[arg(long, conflicts_with = "set")]
    pub subtract: bool,

    /// Assign the unit instead of adding to it.
    #[arg(long)]
    pub set: bool,
}

/// Arguments for `start-of` and `end-of`.
#[derive(clap::Args)]
pub struct TruncateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Unit token (`year`, `Q`, `week`, `day`, ...).
    pub unit: String,
}

/// Arguments for the `compare` subcommand.
#[derive(clap::Args)]
pub struct CompareArgs {
    /// Left-hand input.
    #[arg(allow_hyphen_values = true)]
    pub left: String,

    /// Right-hand input.
    #[arg(allow_hyphen_values = true)]
    pub right: String,
}

/// Arguments for the `format` subcommand.
#[derive(clap::Args)]
pub struct FormatArgs {
    /// Text to parse.
    pub text: String,

    /// Format pattern, e.g. `DD/MM/YYYY HH:mm`.
    pub pattern: String,
}
