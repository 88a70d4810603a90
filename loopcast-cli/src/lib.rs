// loopcast-cli/src/lib.rs
//
// Library portion of the Loopcast CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, GenerateArgs, ScanArgs, ToolArgs};
pub use commands::check::run_check;
pub use commands::generate::{create_core_config, dump_config, run_generate};
pub use commands::scan::run_scan;
