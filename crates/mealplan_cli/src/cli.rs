use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mealplan_core::ShoppingListId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mealplan")]
#[command(about = "Plan menus and derive shopping lists", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database path (overrides MEALPLAN_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides MEALPLAN_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, global = true)]
    pub log_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load recipes, dishes, menu assignments and categories from a JSON bundle (all or nothing)
    Import {
        /// Path to the bundle file
        bundle: PathBuf,
    },
    /// Generate and store a shopping list for an inclusive date range
    Generate {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Rebuild a stored list from the current plan, keeping item flags
    Regenerate {
        #[arg(long)]
        list_id: ShoppingListId,
    },
    /// Print a stored list grouped by category
    Show {
        #[arg(long)]
        list_id: ShoppingListId,
    },
    /// List stored shopping lists, newest first
    Lists,
    /// Mark an item as bought (or not)
    Check {
        #[arg(long)]
        list_id: ShoppingListId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        /// Clear the flag instead of setting it
        #[arg(long)]
        undo: bool,
    },
    /// Mark an item as not needed (or needed again)
    Cancel {
        #[arg(long)]
        list_id: ShoppingListId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a stored list
    Delete {
        #[arg(long)]
        list_id: ShoppingListId,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
