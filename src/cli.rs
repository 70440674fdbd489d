use clap::Parser;

use crate::cmd::Commands;
use crate::fields::Role;

/// Team task dashboard over an in-memory, seeded task store.
/// Nothing is persisted: every run starts from the reference dataset.
#[derive(Parser)]
#[command(name = "td", version, about = "Role-based team task dashboard")]
pub struct Cli {
    /// Role to act as (the first user holding it becomes current).
    #[arg(long, global = true, value_enum, env = "TASKDECK_ROLE")]
    pub role: Option<Role>,

    /// Pin "now" to a date: YYYY-MM-DD, "today", "yesterday", "in Nd", "Nd ago".
    #[arg(long, global = true, env = "TASKDECK_AS_OF")]
    pub as_of: Option<String>,

    /// Log store activity to stderr (same as RUST_LOG=td=debug).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
