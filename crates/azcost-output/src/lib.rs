//! # azcost-output
//!
//! Everything that leaves the process after a run: console tables and
//! progress lines, CSV export, and the export prompt.

pub mod console;
pub mod error;
pub mod export;
pub mod selection;

pub use console::{ConsoleProgress, configure_colors, print_exports, print_outcome};
pub use error::{OutputError, Result};
pub use export::{CsvRecord, ExportedFile, Exporter, escape_field, export_to_file, write_csv};
pub use selection::{ExportAction, ExportSelection, prompt_selection};
