//! zchk - a validator, sanitizer, and restructurer for `zod`-rooted schema
//! source code of unknown provenance.
//!
//! ## Module structure
//!
//! - `governor`: resource limits (node count, time, recursion depth)
//! - `issues`: diagnostic collection
//! - `allowlist`: the constructor/chain-method allow-lists and argument rules
//! - `regex_safety`: the catastrophic-backtracking heuristic
//! - `config`: presets and partial overrides
//! - `session`: per-run state shared across validators
//! - `object_validator`, `argument_validator`, `chain_validator`: the
//!   recognizer/sanitizer core
//! - `printer`: AST-to-source rendering
//! - `dependency_analyzer`: schema-group computation
//! - `orchestrator`: the top-level `validate_schema` entry point
//! - `cli`: the command-line driver

pub mod allowlist;
pub mod argument_validator;
pub mod chain_validator;
pub mod cli;
pub mod config;
pub mod dependency_analyzer;
pub mod governor;
pub mod issues;
pub mod object_validator;
pub mod orchestrator;
pub mod printer;
pub mod regex_safety;
pub mod session;

#[cfg(test)]
mod test_support;

pub use orchestrator::validate_schema;
