//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
}

pub mod commands;
pub mod output;

/// Timecard store - schema-aware access to the timecard database
#[derive(Parser, Debug)]
#[command(name = "tc", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ./timecard.db)
    #[arg(long, global = true, env = "TIMECARD_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the timecard table if it does not exist
    Init,

    /// Print version information
    Version,

    /// Table management (list, show, create, drop)
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },

    /// Insert a record
    Insert(InsertArgs),

    /// Fetch records by id
    Get(GetArgs),

    /// Search records by conditions
    Search(SearchArgs),

    /// Update records matching conditions
    Update(UpdateArgs),

    /// Delete records matching conditions
    Delete(DeleteArgs),

    /// Record a punch in or out
    Punch(PunchArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Table Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// List tables and their columns
    List,

    /// Show one table's columns and row count
    Show {
        /// Table name
        name: String,
    },

    /// Create a table
    Create {
        /// Table name
        name: String,

        /// Column definition "<name> <type> [constraints]" (repeatable, in order)
        #[arg(long = "column", short = 'c', required = true)]
        columns: Vec<String>,
    },

    /// Drop a table
    Drop {
        /// Table name
        name: String,
    },
}

// ============================================================================
// Record Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Target table
    pub table: String,

    /// Record as a JSON object, e.g. '{"name":"Alice","age":30}'
    #[arg(long, conflicts_with_all = ["values", "columns"])]
    pub record: Option<String>,

    /// Values as a JSON array, in table column order (or --columns order)
    #[arg(long, required_unless_present = "record")]
    pub values: Option<String>,

    /// Comma-separated column names matching --values
    #[arg(long, value_delimiter = ',', requires = "values")]
    pub columns: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Table to read
    pub table: String,

    /// Identifier (value of the `id` column)
    pub id: String,

    /// Comma-separated columns to return
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Table to search
    pub table: String,

    /// Condition "<field> <op> <value>" (repeatable, ANDed)
    #[arg(long = "where", short = 'w')]
    pub conditions: Vec<String>,

    /// Comma-separated columns to return
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Table to update
    pub table: String,

    /// New values as a JSON object
    #[arg(long)]
    pub set: String,

    /// Condition "<field> <op> <value>" (repeatable, ANDed, at least one)
    #[arg(long = "where", short = 'w', required = true)]
    pub conditions: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Table to delete from
    pub table: String,

    /// Condition "<field> <op> <value>" (repeatable, ANDed, at least one)
    #[arg(long = "where", short = 'w', required = true)]
    pub conditions: Vec<String>,
}

// ============================================================================
// Punch
// ============================================================================

/// Punch direction.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Args, Debug)]
pub struct PunchArgs {
    /// Punch in or out
    #[arg(value_enum)]
    pub direction: Direction,

    /// Raw location string from the device
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub altitude: Option<f64>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zipcode: Option<String>,
}
