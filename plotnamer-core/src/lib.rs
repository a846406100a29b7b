#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod compose;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod history;
pub mod machine;
pub mod output;
pub mod party;
pub mod quantity;
pub mod scan;

pub use compose::{compose_name, finalize_name};
pub use config::Config;
pub use dimension::{extract_dimensions, to_feet, DimensionClass};
pub use engine::{
    finalize_file, preview_name, redo_last, rename_batch, rename_file, undo_all, undo_last,
    BatchSummary, EngineError, RenameContext, UndoAllSummary,
};
pub use history::{RenameLog, RenameRecord};
pub use machine::MachineTag;
pub use output::{
    BatchResult, HistoryResult, OutcomeKind, OutputFormat, OutputFormatter, RedoResult,
    RenameOutcome, ScanItem, ScanResult, UndoAllResult, UndoResult,
};
pub use party::{PartyTable, UNKNOWN_CODE};
pub use quantity::{detect_quantity, DEFAULT_KEYWORDS};
pub use scan::{scan, FileCandidate, ALLOWED_EXTENSIONS, DONE_FOLDER};
