//! CLI layer - user-facing command-line interface.
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions using clap
//! - `exit_status`: exit status codes
//! - `report`: cargo-style diagnostic rendering
//! - `run`: input resolution, orchestrator dispatch, and output rendering

pub mod args;
mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, CliConfigName};
pub use exit_status::ExitStatus;
pub use run::run_cli;
