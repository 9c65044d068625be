use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dl", about = concat!("daylist v", env!("CARGO_PKG_VERSION"), " - a dated, reorderable task list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task at the end of the list
    Add(AddArgs),
    /// List tasks in display order
    List(ListArgs),
    /// Toggle a task between done and not done
    Done(IdArgs),
    /// Delete a task
    Rm(IdArgs),
    /// Change a task's text
    Edit(EditArgs),
    /// Set or clear a task's date
    Date(DateArgs),
    /// Put tasks in a new order
    Reorder(ReorderArgs),
    /// Sort every task by date, then by current order
    Sort,
    /// Show or cycle the theme
    Theme(ThemeArgs),
    /// Show data that could not be loaded or saved
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks on this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "today")]
    pub date: Option<String>,
    /// Only tasks dated today
    #[arg(long)]
    pub today: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct DateArgs {
    /// Task ID
    pub id: String,
    /// New date (YYYY-MM-DD); omit to clear
    pub date: Option<String>,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Task IDs in their new order
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
    /// The filter date the IDs were listed under
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// Advance to the next theme (light, dark, colored)
    #[arg(long)]
    pub cycle: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value = "10")]
    pub limit: usize,
}
