use clap::{Parser, Subcommand, ValueEnum};
use plotnamer_core::{MachineTag, OutputFormat};
use std::path::PathBuf;

/// Deterministic renaming of print-shop production files
#[derive(Parser, Debug)]
#[command(name = "plotnamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Machine the batch is routed to (overrides the config default)
    #[arg(short = 'm', long, global = true, value_enum)]
    pub machine: Option<MachineArg>,

    /// Path to the party-code CSV (overrides the config default)
    #[arg(long, global = true, value_name = "CSV")]
    pub parties: Option<PathBuf>,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum, default_value_t = OutputArg::Summary)]
    pub output: OutputArg,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List candidate files under a root folder
    Scan {
        /// Root folder to walk (defaults to the current directory)
        root: Option<PathBuf>,

        /// List files already in Done folders that still need finalizing
        #[arg(long)]
        finalized: bool,
    },

    /// Show the canonical name a file would receive, without renaming it
    Preview {
        /// File to preview
        file: PathBuf,
    },

    /// Rename one file and move it into its sibling Done folder
    Rename {
        /// File to rename
        file: PathBuf,
    },

    /// Rename every candidate file under a root folder (best effort)
    Batch {
        /// Root folder to walk (defaults to the current directory)
        root: Option<PathBuf>,
    },

    /// Apply corrected quantity/category to a processed file and mark it [ok]
    Finalize {
        /// File inside a Done folder
        file: PathBuf,

        /// Corrected quantity
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        qty: u32,

        /// Category string; empty renders as %%
        #[arg(long, default_value = "")]
        category: String,
    },

    /// Reverse the most recent rename
    Undo,

    /// Re-apply the most recently undone rename
    Redo,

    /// Reverse every rename recorded in this session
    UndoAll,

    /// Show the session's rename log
    History {
        /// Only show the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export the session's rename log as CSV
    ExportLog {
        /// Destination file
        out: PathBuf,
    },

    /// Manage quantity keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeywordsAction {
    /// List keywords in match-priority order
    List,
    /// Append a keyword to the priority list
    Add { keyword: String },
    /// Remove a keyword
    Remove { keyword: String },
    /// Restore the built-in keyword list
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineArg {
    /// Solvent printer, tagged (C.S)
    Cs,
    /// Eco-solvent printer, tagged (C.E)
    Ce,
}

impl From<MachineArg> for MachineTag {
    fn from(arg: MachineArg) -> Self {
        match arg {
            MachineArg::Cs => Self::Solvent,
            MachineArg::Ce => Self::Eco,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Summary,
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Summary => Self::Summary,
            OutputArg::Json => Self::Json,
        }
    }
}
