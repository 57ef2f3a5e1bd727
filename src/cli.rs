use clap::{Parser, Subcommand};

use crate::config::DB_DIR_ENV;

#[derive(Parser)]
#[command(name = "items", about = "Items is a small command line task tracking application.", version)]
pub struct Cli {
    /// Directory holding the item database [default: ~/items_db]
    #[arg(long, env = DB_DIR_ENV, global = true)]
    pub db_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the version of the items application
    Version,

    /// Add an item
    Add {
        /// Item summary (words are joined with spaces)
        #[arg(required = true)]
        summary: Vec<String>,
        /// Responsible person
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Remove an item
    Delete {
        /// Item id
        id: i64,
    },

    /// List items
    List {
        /// Only items with this owner
        #[arg(short, long)]
        owner: Option<String>,
        /// Only items in this state
        #[arg(short, long)]
        state: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the owner and/or summary of an item
    Update {
        /// Item id
        id: i64,
        /// New owner
        #[arg(short, long)]
        owner: Option<String>,
        /// New summary
        #[arg(short, long, num_args = 1..)]
        summary: Option<Vec<String>>,
    },

    /// Set an item's state to "in progress"
    Start {
        /// Item id
        id: i64,
    },

    /// Set an item's state to "done"
    Finish {
        /// Item id
        id: i64,
    },

    /// Print the path of the item database directory
    Config,

    /// Print the number of items
    Count,

    /// Serve the items over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
        /// Directory of static files served at /
        #[arg(long)]
        static_dir: Option<String>,
    },
}

/// Join summary words the way they were typed on the command line.
pub fn join_words(words: &[String]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
