use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snipkeep")]
#[command(about = "Keep text snippets in a tree of folders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the folder tree
    Tree,

    /// List the snippets of a folder (default: the selected folder)
    #[command(alias = "ls")]
    List {
        /// Folder id or unique id prefix
        folder: Option<String>,
    },

    /// Print a snippet (default: the selected snippet)
    #[command(alias = "v")]
    Show {
        /// Snippet id or unique id prefix
        snippet: Option<String>,
    },

    /// Select a folder or a snippet
    Select {
        /// Folder or snippet id (or unique id prefix)
        id: String,
    },

    /// Folder operations
    #[command(subcommand)]
    Folder(FolderCommands),

    /// Create a new snippet
    #[command(alias = "n")]
    New {
        /// Folder to create it in (default: the selected folder)
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Save a snippet's title and content
    #[command(alias = "s")]
    Save {
        /// Snippet id or unique id prefix
        id: String,

        /// New title (blank becomes "Untitled Snippet")
        #[arg(short, long)]
        title: Option<String>,

        /// New content (read from stdin when omitted)
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete a snippet
    #[command(alias = "rm")]
    Delete {
        /// Snippet id or unique id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a snippet to another folder
    #[command(alias = "mv")]
    Move {
        /// Snippet id or unique id prefix
        id: String,

        /// Destination folder
        folder: String,
    },

    /// Export everything to a timestamped JSON file
    Export {
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Replace everything with the contents of an exported JSON file
    Import { file: PathBuf },

    /// Check and repair folder/snippet links
    Doctor,

    /// Get or set configuration
    Config {
        /// Configuration key (storage-key, export-prefix)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// Create a folder
    #[command(alias = "n")]
    New {
        /// Name (blank becomes "New Folder")
        #[arg(default_value = "")]
        name: String,

        /// Parent folder (default: the selected folder)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Rename a folder
    Rename { id: String, name: String },

    /// Delete a folder with everything inside it
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a folder under another parent
    #[command(alias = "mv")]
    Move { id: String, parent: String },
}
